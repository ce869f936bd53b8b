//! Visual mappers: pure functions from tracker outputs to style values.
//!
//! Keyframe interpolation is piecewise linear and clamps outside the first and
//! last breakpoints. Equal breakpoints are allowed; at such a breakpoint the
//! later keyframe wins, which is how plateaus and hard cuts are written.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ResolvedTheme;
use crate::error::MotionError;
use crate::geometry::Point;
use crate::pointer::ProximityState;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub at: f32,
    pub value: f32,
}

/// Sorted, validated keyframe list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct Keyframes(Vec<Keyframe>);

impl Keyframes {
    pub fn new(points: Vec<Keyframe>) -> Result<Self, MotionError> {
        if points.is_empty() {
            return Err(MotionError::EmptyKeyframes);
        }
        for (index, k) in points.iter().enumerate() {
            if !(k.at.is_finite() && k.value.is_finite()) {
                return Err(MotionError::NonFiniteKeyframe { index });
            }
        }
        for pair in points.windows(2) {
            if pair[1].at < pair[0].at {
                return Err(MotionError::NonMonotonicKeyframes {
                    previous: pair[0].at,
                    next: pair[1].at,
                });
            }
        }
        Ok(Self(points))
    }

    /// Build from parallel breakpoint/value slices, the way hosts usually write them.
    pub fn from_slices(breakpoints: &[f32], values: &[f32]) -> Result<Self, MotionError> {
        if breakpoints.len() != values.len() {
            return Err(MotionError::KeyframeLengthMismatch {
                breakpoints: breakpoints.len(),
                values: values.len(),
            });
        }
        Self::new(
            breakpoints
                .iter()
                .zip(values)
                .map(|(&at, &value)| Keyframe { at, value })
                .collect(),
        )
    }

    /// Presets are known-good; skip validation.
    fn preset(breakpoints: [f32; 4], values: [f32; 4]) -> Self {
        Self(
            breakpoints
                .into_iter()
                .zip(values)
                .map(|(at, value)| Keyframe { at, value })
                .collect(),
        )
    }

    fn segment(from: f32, to: f32, start: f32, end: f32) -> Self {
        Self(vec![
            Keyframe {
                at: from,
                value: start,
            },
            Keyframe { at: to, value: end },
        ])
    }

    pub fn points(&self) -> &[Keyframe] {
        &self.0
    }

    pub fn first_value(&self) -> f32 {
        self.0[0].value
    }

    /// Interpolated value at `t`. NaN input yields the first keyframe.
    pub fn sample(&self, t: f32) -> f32 {
        let points = &self.0;
        let first = points[0];
        if !(t >= first.at) {
            return first.value;
        }
        // Index of the last keyframe whose breakpoint is <= t.
        let i = points.partition_point(|k| k.at <= t) - 1;
        let Some(next) = points.get(i + 1) else {
            return points[i].value;
        };
        let cur = points[i];
        let local = (t - cur.at) / (next.at - cur.at);
        lerp_f32(cur.value, next.value, local)
    }
}

impl TryFrom<Vec<Keyframe>> for Keyframes {
    type Error = MotionError;

    fn try_from(points: Vec<Keyframe>) -> Result<Self, Self::Error> {
        Keyframes::new(points)
    }
}

impl From<Keyframes> for Vec<Keyframe> {
    fn from(k: Keyframes) -> Self {
        k.0
    }
}

/// Free-function form of [`Keyframes::sample`].
#[inline]
pub fn lerp(keyframes: &Keyframes, t: f32) -> f32 {
    keyframes.sample(t)
}

/// Format a number for CSS: three decimals at most, no trailing zeros, no `-0`.
pub fn css_number(v: f32) -> String {
    let r = (v * 1000.0).round() / 1000.0;
    if r == 0.0 {
        "0".to_string()
    } else {
        format!("{r}")
    }
}

pub fn blur_css(px: f32) -> String {
    format!("blur({}px)", css_number(px))
}

/// Opacity and blur for a section fading in and out as it crosses the viewport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionFade {
    pub opacity: Keyframes,
    pub blur_px: Keyframes,
    /// Drive from the spring-smoothed progress rather than the raw value.
    pub smoothed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionStyle {
    pub opacity: f32,
    pub blur_px: f32,
}

impl SectionFade {
    /// Fully visible and sharp between `enter_end` and `exit_start`.
    pub fn with_plateau(enter_end: f32, exit_start: f32, smoothed: bool) -> Result<Self, MotionError> {
        let breakpoints = [0.0, enter_end, exit_start, 1.0];
        Ok(Self {
            opacity: Keyframes::from_slices(&breakpoints, &[0.0, 1.0, 1.0, 0.0])?,
            blur_px: Keyframes::from_slices(&breakpoints, &[8.0, 0.0, 0.0, 8.0])?,
            smoothed,
        })
    }

    pub fn skills() -> Self {
        Self::plateau_preset(0.2, 0.8, true)
    }

    pub fn projects() -> Self {
        Self::plateau_preset(0.2, 0.8, true)
    }

    pub fn contact() -> Self {
        Self::plateau_preset(0.3, 0.7, false)
    }

    fn plateau_preset(enter_end: f32, exit_start: f32, smoothed: bool) -> Self {
        let breakpoints = [0.0, enter_end, exit_start, 1.0];
        Self {
            opacity: Keyframes::preset(breakpoints, [0.0, 1.0, 1.0, 0.0]),
            blur_px: Keyframes::preset(breakpoints, [8.0, 0.0, 0.0, 8.0]),
            smoothed,
        }
    }

    pub fn evaluate(&self, progress: f32) -> SectionStyle {
        SectionStyle {
            opacity: self.opacity.sample(progress),
            blur_px: self.blur_px.sample(progress),
        }
    }
}

/// One card of a stacked cascade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CascadeCard {
    pub translate_y: Keyframes,
    pub rotate_deg: Keyframes,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardPose {
    pub translate_y: f32,
    pub rotate_deg: f32,
}

impl CardPose {
    pub fn transform_css(&self) -> String {
        format!(
            "translateY({}px) rotate({}deg)",
            css_number(self.translate_y),
            css_number(self.rotate_deg)
        )
    }
}

/// Cards that slide up and straighten one after another on raw scroll progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardCascade {
    pub cards: Vec<CascadeCard>,
}

impl CardCascade {
    /// The three project cards: each starts where the previous one settles.
    pub fn stacked_projects() -> Self {
        let card = |from: f32, to: f32, y: (f32, f32), rot: (f32, f32)| CascadeCard {
            translate_y: Keyframes::segment(from, to, y.0, y.1),
            rotate_deg: Keyframes::segment(from, to, rot.0, rot.1),
        };
        Self {
            cards: vec![
                card(0.0, 0.3, (0.0, 0.0), (0.0, 0.0)),
                card(0.3, 0.5, (400.0, 20.0), (-10.0, 0.0)),
                card(0.5, 0.8, (800.0, 40.0), (10.0, 0.0)),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn evaluate(&self, progress: f32) -> Vec<CardPose> {
        self.cards
            .iter()
            .map(|c| CardPose {
                translate_y: c.translate_y.sample(progress),
                rotate_deg: c.rotate_deg.sample(progress),
            })
            .collect()
    }
}

/// Straight-alpha RGBA colour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn white(a: f32) -> Self {
        Self {
            r: 255,
            g: 255,
            b: 255,
            a,
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({},{},{},{})",
            self.r,
            self.g,
            self.b,
            css_number(self.a)
        )
    }
}

/// CSS radial gradient centred at `center` that fades to transparent at
/// `outer_stop` (0..1) of `radius`.
pub fn radial_gradient_css(center: Point, radius: f32, inner: Rgba, outer_stop: f32) -> String {
    format!(
        "radial-gradient({}px circle at {}px {}px, {}, transparent {}%)",
        css_number(radius),
        css_number(center.x),
        css_number(center.y),
        inner,
        css_number(outer_stop * 100.0)
    )
}

/// Glow flavours used by the site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlowVariant {
    /// Soft halo on form/contact cards, lit while the pointer is near.
    Card,
    /// Bright halo around call-to-action buttons, hidden while directly hovered.
    Button,
    /// Wide sheen across a project card, lit only while hovered.
    ProjectCard,
}

pub const GLOW_OUTER_STOP: f32 = 0.4;

#[derive(Clone, Debug, PartialEq)]
pub struct GlowStyle {
    pub opacity: f32,
    pub background: String,
}

impl GlowVariant {
    pub fn radius(self) -> f32 {
        match self {
            GlowVariant::Card => 90.0,
            GlowVariant::Button => 150.0,
            GlowVariant::ProjectCard => 600.0,
        }
    }

    pub fn inner_color(self, theme: ResolvedTheme) -> Rgba {
        match (self, theme) {
            (GlowVariant::Card, ResolvedTheme::Dark) => Rgba::white(0.2),
            (GlowVariant::Card, ResolvedTheme::Light) => Rgba::white(0.4),
            (GlowVariant::Button, _) => Rgba::white(0.9),
            (GlowVariant::ProjectCard, _) => Rgba::white(0.1),
        }
    }

    pub fn is_lit(self, state: &ProximityState) -> bool {
        match self {
            GlowVariant::Card => state.is_near,
            GlowVariant::Button => state.is_near && !state.inside,
            GlowVariant::ProjectCard => state.inside,
        }
    }

    pub fn evaluate(self, state: &ProximityState, theme: ResolvedTheme) -> GlowStyle {
        GlowStyle {
            opacity: if self.is_lit(state) { 1.0 } else { 0.0 },
            background: radial_gradient_css(
                Point::new(state.local_x, state.local_y),
                self.radius(),
                self.inner_color(theme),
                GLOW_OUTER_STOP,
            ),
        }
    }
}

/// Uniform scale for a hover affordance.
#[inline]
pub fn hover_scale(hovering: bool, scale: f32) -> f32 {
    if hovering {
        scale
    } else {
        1.0
    }
}
