use approx::assert_abs_diff_eq;
use folio_motion_core::{
    radial_gradient_css, CardCascade, GlowVariant, Keyframe, Keyframes, MotionError, Point,
    ProximityState, ResolvedTheme, Rgba, SectionFade,
};
use proptest::prelude::*;

#[test]
fn opacity_keyframes_with_plateau() {
    let fade = SectionFade::contact();
    let cases = [
        (0.0, 0.0),
        (0.15, 0.5),
        (0.3, 1.0),
        (0.5, 1.0),
        (0.85, 0.5),
        (1.0, 0.0),
    ];
    for (progress, opacity) in cases {
        assert_abs_diff_eq!(fade.evaluate(progress).opacity, opacity, epsilon = 1e-5);
    }
    assert_abs_diff_eq!(fade.evaluate(0.15).blur_px, 4.0, epsilon = 1e-4);
    assert_eq!(fade.evaluate(0.5).blur_px, 0.0);
}

#[test]
fn skills_fade_uses_a_wider_plateau() {
    let fade = SectionFade::skills();
    assert!(fade.smoothed);
    assert_eq!(fade.evaluate(0.2).opacity, 1.0);
    assert_eq!(fade.evaluate(0.8).opacity, 1.0);
    assert_abs_diff_eq!(fade.evaluate(0.1).opacity, 0.5, epsilon = 1e-5);
    assert!(!SectionFade::contact().smoothed);
}

#[test]
fn second_card_of_the_cascade() {
    let cascade = CardCascade::stacked_projects();
    assert_eq!(cascade.len(), 3);
    let expected = [(0.3, 400.0, -10.0), (0.4, 210.0, -5.0), (0.5, 20.0, 0.0)];
    for (progress, y, rotation) in expected {
        let pose = cascade.evaluate(progress)[1];
        assert_abs_diff_eq!(pose.translate_y, y, epsilon = 1e-3);
        assert_abs_diff_eq!(pose.rotate_deg, rotation, epsilon = 1e-4);
    }
    assert_eq!(
        cascade.evaluate(0.4)[1].transform_css(),
        "translateY(210px) rotate(-5deg)"
    );
}

#[test]
fn cascade_cards_hold_their_end_pose() {
    let poses = CardCascade::stacked_projects().evaluate(1.0);
    let resting: Vec<f32> = poses.iter().map(|p| p.translate_y).collect();
    assert_eq!(resting, vec![0.0, 20.0, 40.0]);
    assert!(poses.iter().all(|p| p.rotate_deg == 0.0));
    let waiting = CardCascade::stacked_projects().evaluate(0.0);
    assert_eq!(waiting[2].translate_y, 800.0);
    assert_eq!(waiting[2].rotate_deg, 10.0);
}

#[test]
fn duplicate_breakpoint_takes_the_later_value() {
    let k = Keyframes::from_slices(&[0.0, 0.5, 0.5, 1.0], &[0.0, 1.0, 3.0, 3.0]).unwrap();
    assert_eq!(k.sample(0.5), 3.0);
    assert_abs_diff_eq!(k.sample(0.25), 0.5);
}

#[test]
fn clamps_outside_the_breakpoints() {
    let k = Keyframes::from_slices(&[0.2, 0.6], &[10.0, 20.0]).unwrap();
    assert_eq!(k.sample(-3.0), 10.0);
    assert_eq!(k.sample(0.0), 10.0);
    assert_eq!(k.sample(7.0), 20.0);
}

#[test]
fn malformed_keyframes_are_rejected() {
    assert_eq!(
        Keyframes::new(Vec::new()).unwrap_err(),
        MotionError::EmptyKeyframes
    );
    assert_eq!(
        Keyframes::from_slices(&[0.0, 1.0], &[1.0]).unwrap_err(),
        MotionError::KeyframeLengthMismatch {
            breakpoints: 2,
            values: 1
        }
    );
    assert_eq!(
        Keyframes::from_slices(&[0.0, 0.6, 0.4], &[0.0, 1.0, 2.0]).unwrap_err(),
        MotionError::NonMonotonicKeyframes {
            previous: 0.6,
            next: 0.4
        }
    );
    assert_eq!(
        Keyframes::new(vec![Keyframe {
            at: f32::INFINITY,
            value: 0.0
        }])
        .unwrap_err(),
        MotionError::NonFiniteKeyframe { index: 0 }
    );
    assert!(SectionFade::with_plateau(0.8, 0.2, true).is_err());
}

#[test]
fn gradient_css_matches_browser_syntax() {
    let css = radial_gradient_css(Point::new(12.0, 30.5), 90.0, Rgba::white(0.2), 0.4);
    assert_eq!(
        css,
        "radial-gradient(90px circle at 12px 30.5px, rgba(255,255,255,0.2), transparent 40%)"
    );
}

#[test]
fn glow_variants_light_differently() {
    let near_outside = ProximityState {
        is_near: true,
        inside: false,
        local_x: -20.0,
        local_y: 10.0,
    };
    let inside = ProximityState {
        inside: true,
        local_x: 20.0,
        ..near_outside
    };
    let far = ProximityState::default();

    assert!(GlowVariant::Card.is_lit(&near_outside));
    assert!(GlowVariant::Card.is_lit(&inside));
    assert!(!GlowVariant::Card.is_lit(&far));

    assert!(GlowVariant::Button.is_lit(&near_outside));
    assert!(!GlowVariant::Button.is_lit(&inside));

    assert!(!GlowVariant::ProjectCard.is_lit(&near_outside));
    assert!(GlowVariant::ProjectCard.is_lit(&inside));
}

#[test]
fn card_glow_follows_the_theme() {
    let state = ProximityState {
        is_near: true,
        inside: true,
        local_x: 50.0,
        local_y: 20.0,
    };
    let light = GlowVariant::Card.evaluate(&state, ResolvedTheme::Light);
    let dark = GlowVariant::Card.evaluate(&state, ResolvedTheme::Dark);
    assert_eq!(light.opacity, 1.0);
    assert_eq!(
        light.background,
        "radial-gradient(90px circle at 50px 20px, rgba(255,255,255,0.4), transparent 40%)"
    );
    assert_eq!(
        dark.background,
        "radial-gradient(90px circle at 50px 20px, rgba(255,255,255,0.2), transparent 40%)"
    );
}

fn sorted_keyframes() -> impl Strategy<Value = Vec<(f32, f32)>> {
    // Strictly increasing interior breakpoints between 0 and 1.
    prop::collection::vec((0.01f32..1.0, -500.0f32..500.0), 1..6).prop_map(|mut points| {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-3);
        points
    })
}

proptest! {
    #[test]
    fn sample_hits_values_and_stays_on_segments(
        first in -500.0f32..500.0,
        interior in sorted_keyframes(),
        t in 0.0f32..=1.0,
    ) {
        let mut breakpoints = vec![0.0];
        let mut values = vec![first];
        for (at, v) in interior {
            if at < 0.999 {
                breakpoints.push(at);
                values.push(v);
            }
        }
        breakpoints.push(1.0);
        values.push(first * 0.5);
        let k = Keyframes::from_slices(&breakpoints, &values).unwrap();

        for (at, v) in breakpoints.iter().zip(&values) {
            prop_assert_eq!(k.sample(*at), *v);
        }

        let i = breakpoints.partition_point(|b| *b <= t).saturating_sub(1);
        let out = k.sample(t);
        if let Some(next) = values.get(i + 1) {
            let lo = values[i].min(*next) - 1e-3;
            let hi = values[i].max(*next) + 1e-3;
            prop_assert!(out >= lo && out <= hi, "{} not in [{}, {}]", out, lo, hi);
        } else {
            prop_assert_eq!(out, values[i]);
        }
    }
}
