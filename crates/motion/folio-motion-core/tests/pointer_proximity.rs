use std::cell::RefCell;
use std::rc::Rc;

use folio_motion_core::{
    FixedRegion, PointerKind, PointerSample, PointerTracker, ProximityState, Rect,
    SubscriberFault,
};
use proptest::prelude::*;

type Log = Rc<RefCell<Vec<ProximityState>>>;

fn recorder() -> (
    Log,
    impl FnMut(&ProximityState) -> Result<(), SubscriberFault> + 'static,
) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    (log, move |s: &ProximityState| -> Result<(), SubscriberFault> {
        sink.borrow_mut().push(*s);
        Ok(())
    })
}

fn card() -> FixedRegion {
    // (100,100)-(300,200)
    FixedRegion(Rect::from_corners(100.0, 100.0, 300.0, 200.0))
}

#[test]
fn card_glow_near_miss() {
    let mut tracker = PointerTracker::new();
    let (log, listener) = recorder();
    tracker.subscribe(card(), 50.0, listener).expect("subscribe");

    tracker.handle_sample(PointerSample::mouse(49.0, 100.0, 0.0));
    assert!(log.borrow().is_empty(), "far and unchanged: nothing published");

    tracker.handle_sample(PointerSample::mouse(50.0, 100.0, 16.0));
    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert!(log[0].is_near);
    assert_eq!(log[0].local_x, -50.0);
    assert_eq!(log[0].local_y, 0.0);
    assert!(!log[0].inside);
}

#[test]
fn publishes_while_near_and_once_on_exit() {
    let mut tracker = PointerTracker::new();
    let (log, listener) = recorder();
    tracker.subscribe(card(), 50.0, listener).unwrap();

    for (i, x) in [120.0, 140.0, 160.0].into_iter().enumerate() {
        tracker.handle_sample(PointerSample::mouse(x, 150.0, i as f64));
    }
    assert_eq!(log.borrow().len(), 3);

    tracker.handle_sample(PointerSample::mouse(600.0, 150.0, 10.0));
    tracker.handle_sample(PointerSample::mouse(700.0, 150.0, 11.0));
    tracker.handle_sample(PointerSample::mouse(800.0, 150.0, 12.0));
    let log = log.borrow();
    assert_eq!(log.len(), 4, "exit transition is delivered exactly once");
    assert!(!log[3].is_near);
    assert_eq!(log[3].local_x, 500.0);
}

#[test]
fn faulting_subscriber_does_not_starve_others() {
    let mut tracker = PointerTracker::new();
    let bad = tracker
        .subscribe(card(), 50.0, |_: &ProximityState| -> Result<(), SubscriberFault> {
            Err(SubscriberFault::new("boom"))
        })
        .unwrap();
    let (log, listener) = recorder();
    tracker.subscribe(card(), 50.0, listener).unwrap();

    let path = [(150.0, 150.0), (160.0, 150.0), (900.0, 150.0), (150.0, 150.0)];
    for (i, (x, y)) in path.into_iter().enumerate() {
        tracker.handle_sample(PointerSample::mouse(x, y, i as f64));
    }

    let seen: Vec<bool> = log.borrow().iter().map(|s| s.is_near).collect();
    assert_eq!(seen, vec![true, true, false, true]);
    assert_eq!(tracker.drain_faults(), vec![bad.id()], "logged once per subscriber");
    tracker.handle_sample(PointerSample::mouse(151.0, 150.0, 9.0));
    assert!(tracker.drain_faults().is_empty());
}

#[test]
fn cancel_is_idempotent_and_final() {
    let mut tracker = PointerTracker::new();
    let (log, listener) = recorder();
    let sub = tracker.subscribe(card(), 0.0, listener).unwrap();
    tracker.handle_sample(PointerSample::mouse(150.0, 150.0, 0.0));
    sub.cancel();
    sub.cancel();
    assert!(sub.is_cancelled());
    tracker.handle_sample(PointerSample::mouse(160.0, 150.0, 1.0));
    tracker.handle_sample(PointerSample::mouse(900.0, 150.0, 2.0));
    assert_eq!(log.borrow().len(), 1);
    assert!(tracker.is_empty());
}

#[test]
fn touch_samples_are_ignored() {
    let mut tracker = PointerTracker::new();
    let (log, listener) = recorder();
    tracker.subscribe(card(), 50.0, listener).unwrap();
    tracker.handle_sample(PointerSample {
        x: 150.0,
        y: 150.0,
        timestamp_ms: 0.0,
        kind: PointerKind::Touch,
    });
    assert!(log.borrow().is_empty());
    assert_eq!(tracker.latest(), None);
}

#[test]
fn detached_region_decays_to_not_near() {
    let attached = Rc::new(RefCell::new(true));
    let flag = Rc::clone(&attached);
    let region = move || {
        if *flag.borrow() {
            Some(Rect::new(0.0, 0.0, 100.0, 100.0))
        } else {
            None
        }
    };
    let mut tracker = PointerTracker::new();
    let (log, listener) = recorder();
    tracker.subscribe(region, 10.0, listener).unwrap();

    tracker.handle_sample(PointerSample::mouse(50.0, 50.0, 0.0));
    *attached.borrow_mut() = false;
    tracker.invalidate_layout();
    tracker.handle_sample(PointerSample::mouse(50.0, 50.0, 1.0));
    tracker.handle_sample(PointerSample::mouse(55.0, 50.0, 2.0));

    let near: Vec<bool> = log.borrow().iter().map(|s| s.is_near).collect();
    assert_eq!(near, vec![true, false]);
}

#[test]
fn zero_size_region_is_never_near() {
    // A `display: none` element measures as an empty rect at the origin.
    let mut tracker = PointerTracker::new();
    let (log, listener) = recorder();
    tracker
        .subscribe(FixedRegion(Rect::new(0.0, 0.0, 0.0, 0.0)), 100.0, listener)
        .unwrap();
    for (i, (x, y)) in [(40.0, 40.0), (0.0, 0.0), (-10.0, 5.0)].into_iter().enumerate() {
        tracker.handle_sample(PointerSample::mouse(x, y, i as f64));
    }
    assert!(log.borrow().is_empty());
    assert!(!tracker.hovering());
}

#[test]
fn collapsing_region_decays_to_not_near() {
    let size = Rc::new(RefCell::new(100.0f32));
    let s = Rc::clone(&size);
    let region = move || {
        let side = *s.borrow();
        Some(Rect::new(0.0, 0.0, side, side))
    };
    let mut tracker = PointerTracker::new();
    let (log, listener) = recorder();
    tracker.subscribe(region, 100.0, listener).unwrap();

    tracker.handle_sample(PointerSample::mouse(40.0, 40.0, 0.0));
    *size.borrow_mut() = 0.0;
    tracker.invalidate_layout();
    tracker.handle_sample(PointerSample::mouse(40.0, 40.0, 1.0));
    tracker.handle_sample(PointerSample::mouse(0.0, 0.0, 2.0));

    let near: Vec<bool> = log.borrow().iter().map(|s| s.is_near).collect();
    assert_eq!(near, vec![true, false]);
}

#[test]
fn latest_sample_survives_leaving_the_document() {
    let mut tracker = PointerTracker::new();
    tracker.handle_sample(PointerSample::mouse(12.0, 34.0, 5.0));
    tracker.pointer_left();
    assert!(!tracker.is_present());
    let latest = tracker.latest().expect("latest sample retained");
    assert_eq!((latest.x, latest.y), (12.0, 34.0));
}

proptest! {
    #[test]
    fn near_iff_inside_padded_rect(
        left in -500.0f32..500.0,
        top in -500.0f32..500.0,
        width in 0.0f32..400.0,
        height in 0.0f32..400.0,
        padding in 0.0f32..150.0,
        x in -1000.0f32..1000.0,
        y in -1000.0f32..1000.0,
    ) {
        let rect = Rect::new(left, top, width, height);
        let mut tracker = PointerTracker::new();
        let (log, listener) = recorder();
        tracker.subscribe(FixedRegion(rect), padding, listener).unwrap();
        tracker.handle_sample(PointerSample::mouse(x, y, 0.0));

        let (lx, ly) = (x - left, y - top);
        let expected = width > 0.0 && height > 0.0
            && lx >= -padding && lx <= width + padding
            && ly >= -padding && ly <= height + padding;
        let log = log.borrow();
        if expected {
            prop_assert_eq!(log.len(), 1);
            prop_assert!(log[0].is_near);
        } else {
            prop_assert!(log.is_empty());
        }
    }
}
