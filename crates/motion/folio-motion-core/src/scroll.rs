//! Scroll progress of a region as it traverses the viewport.
//!
//! Progress is a linear function of the region's viewport offset between two
//! anchor events: `enter` (default: region start meets viewport end) maps to
//! 0 and `exit` (default: region end meets viewport start) maps to 1. Raw
//! progress is recomputed only after a scroll/layout change; an optional
//! spring smooths it at frame cadence.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;
use crate::geometry::{Rect, RegionProvider, Viewport};
use crate::ids::{IdAllocator, ScrollId};
use crate::spring::{Spring, SpringConfig};

/// A position along one axis of the region or the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Start,
    Center,
    End,
    /// Fraction of the length, 0 = start, 1 = end.
    Fraction(f32),
}

impl Edge {
    pub fn fraction(self) -> f32 {
        match self {
            Edge::Start => 0.0,
            Edge::Center => 0.5,
            Edge::End => 1.0,
            Edge::Fraction(f) => f,
        }
    }
}

/// "`region` edge meets `viewport` edge".
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub region: Edge,
    pub viewport: Edge,
}

impl Anchor {
    pub const fn new(region: Edge, viewport: Edge) -> Self {
        Self { region, viewport }
    }

    /// Region top (viewport-relative) at which this anchor is met.
    fn top_when_met(&self, region_height: f32, viewport_height: f32) -> f32 {
        viewport_height * self.viewport.fraction() - region_height * self.region.fraction()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OffsetWindow {
    pub enter: Anchor,
    pub exit: Anchor,
}

impl Default for OffsetWindow {
    fn default() -> Self {
        Self {
            enter: Anchor::new(Edge::Start, Edge::End),
            exit: Anchor::new(Edge::End, Edge::Start),
        }
    }
}

impl OffsetWindow {
    /// Unsmoothed progress in [0, 1]. Detached or zero-size regions report 0.
    pub fn raw_progress(&self, rect: Option<Rect>, viewport: Viewport) -> f32 {
        let Some(rect) = rect else {
            return 0.0;
        };
        if rect.is_empty() {
            return 0.0;
        }
        let start = self.enter.top_when_met(rect.height, viewport.height);
        let end = self.exit.top_when_met(rect.height, viewport.height);
        let span = start - end;
        if !(span.is_finite() && span > 0.0) {
            return 0.0;
        }
        ((start - rect.top) / span).clamp(0.0, 1.0)
    }
}

#[derive(Debug)]
struct ProgressCell {
    raw: f32,
    spring: Option<Spring>,
    primed: bool,
    cancelled: bool,
}

/// Read side of a scroll observation.
#[derive(Clone, Debug)]
pub struct ScrollHandle {
    id: ScrollId,
    cell: Rc<RefCell<ProgressCell>>,
}

impl ScrollHandle {
    pub fn id(&self) -> ScrollId {
        self.id
    }

    /// Smoothed progress (raw progress when the observation has no spring).
    pub fn read(&self) -> f32 {
        let cell = self.cell.borrow();
        cell.spring.as_ref().map(Spring::position).unwrap_or(cell.raw)
    }

    pub fn raw(&self) -> f32 {
        self.cell.borrow().raw
    }

    pub fn is_settled(&self) -> bool {
        self.cell
            .borrow()
            .spring
            .as_ref()
            .map(Spring::is_at_rest)
            .unwrap_or(true)
    }

    /// Stop observing. Idempotent; the last values stay readable.
    pub fn cancel(&self) {
        let mut cell = self.cell.borrow_mut();
        if !cell.cancelled {
            cell.cancelled = true;
            log::debug!("scroll observation {:?} cancelled", self.id);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cell.borrow().cancelled
    }
}

/// Options for [`ScrollProgressTracker::observe_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ObserveOptions {
    pub window: Option<OffsetWindow>,
    /// `None` disables smoothing.
    pub smoothing: Option<SpringConfig>,
}

struct Observation {
    id: ScrollId,
    region: Box<dyn RegionProvider>,
    window: OffsetWindow,
    cell: Rc<RefCell<ProgressCell>>,
}

pub struct ScrollProgressTracker {
    ids: IdAllocator,
    default_spring: SpringConfig,
    viewport: Viewport,
    observations: Vec<Observation>,
    dirty: bool,
}

impl std::fmt::Debug for ScrollProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollProgressTracker")
            .field("viewport", &self.viewport)
            .field("observations", &self.observations.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl ScrollProgressTracker {
    pub fn new(default_spring: SpringConfig, viewport: Viewport) -> Self {
        Self {
            ids: IdAllocator::new(),
            default_spring,
            viewport,
            observations: Vec::new(),
            dirty: true,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Observe with the default window and the default spring.
    pub fn observe(
        &mut self,
        region: impl RegionProvider + 'static,
        window: Option<OffsetWindow>,
    ) -> Result<ScrollHandle, MotionError> {
        self.observe_with(
            region,
            ObserveOptions {
                window,
                smoothing: Some(self.default_spring),
            },
        )
    }

    pub fn observe_with(
        &mut self,
        region: impl RegionProvider + 'static,
        options: ObserveOptions,
    ) -> Result<ScrollHandle, MotionError> {
        if let Some(cfg) = &options.smoothing {
            cfg.validate()?;
        }
        let id = self.ids.alloc_scroll();
        let cell = Rc::new(RefCell::new(ProgressCell {
            raw: 0.0,
            spring: options.smoothing.map(|cfg| Spring::new(cfg, 0.0)),
            primed: false,
            cancelled: false,
        }));
        self.observations.push(Observation {
            id,
            region: Box::new(region),
            window: options.window.unwrap_or_default(),
            cell: Rc::clone(&cell),
        });
        self.dirty = true;
        log::debug!("scroll observation {id:?} added");
        Ok(ScrollHandle { id, cell })
    }

    /// Viewport resized.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.dirty = true;
    }

    /// Something scrolled or reflowed; recompute raw progress on the next sample.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.observations
            .iter()
            .filter(|o| !o.cell.borrow().cancelled)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recompute raw progress for every observation if a layout change is
    /// pending. Returns whether anything was recomputed.
    pub fn sample(&mut self) -> bool {
        self.observations.retain(|o| !o.cell.borrow().cancelled);
        if !self.dirty {
            return false;
        }
        self.dirty = false;
        for obs in &self.observations {
            let raw = obs.window.raw_progress(obs.region.rect(), self.viewport);
            let mut cell = obs.cell.borrow_mut();
            cell.raw = raw;
            let first = !cell.primed;
            cell.primed = true;
            if let Some(spring) = cell.spring.as_mut() {
                if first {
                    spring.jump_to(raw);
                } else {
                    spring.set_target(raw);
                }
            }
        }
        true
    }

    /// Step every spring by `dt` seconds. Returns the observations that came
    /// to rest during this step.
    pub fn advance(&mut self, dt: f32) -> Vec<ScrollId> {
        let mut settled = Vec::new();
        for obs in &self.observations {
            let mut cell = obs.cell.borrow_mut();
            if cell.cancelled {
                continue;
            }
            if let Some(spring) = cell.spring.as_mut() {
                let was_moving = !spring.is_at_rest();
                spring.step(dt);
                if was_moving && spring.is_at_rest() {
                    settled.push(obs.id);
                }
            }
        }
        settled
    }

    /// Whether another frame is needed to finish pending work.
    pub fn needs_frame(&self) -> bool {
        self.dirty
            || self.observations.iter().any(|o| {
                let cell = o.cell.borrow();
                !cell.cancelled && cell.spring.as_ref().is_some_and(|s| !s.is_at_rest())
            })
    }
}
