//! Process-wide pointer tracking with region-filtered subscriptions.
//!
//! One tracker stands in for every per-component `mousemove` listener. Each
//! subscription names a live region and a padding radius; on every sample the
//! tracker measures the region (at most once per frame), derives a
//! [`ProximityState`] and calls the listener when nearness flipped or while the
//! pointer stays near.

use std::cell::Cell;
use std::rc::Rc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{check_padding, MotionError, SubscriberFault};
use crate::geometry::{PointerKind, PointerSample, Rect, RegionProvider};
use crate::ids::{IdAllocator, SubscriptionId};

/// Pointer position relative to one region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityState {
    /// Inside the region grown by its padding.
    pub is_near: bool,
    /// Inside the unpadded region.
    pub inside: bool,
    pub local_x: f32,
    pub local_y: f32,
}

impl ProximityState {
    /// Derive the state of `sample` against `rect` with `padding`.
    /// A detached (`None`) or zero-size region is never near.
    pub fn compute(rect: Option<Rect>, padding: f32, sample: &PointerSample) -> Self {
        let Some(rect) = rect.filter(|r| !r.is_empty()) else {
            return Self::default();
        };
        let (local_x, local_y) = rect.local(sample.x, sample.y);
        Self {
            is_near: rect.contains_local(local_x, local_y, padding),
            inside: rect.contains_local(local_x, local_y, 0.0),
            local_x,
            local_y,
        }
    }
}

/// Receives proximity updates for one subscription.
pub trait ProximityListener {
    fn on_change(&mut self, state: &ProximityState) -> Result<(), SubscriberFault>;
}

impl<F> ProximityListener for F
where
    F: FnMut(&ProximityState) -> Result<(), SubscriberFault>,
{
    fn on_change(&mut self, state: &ProximityState) -> Result<(), SubscriberFault> {
        self(state)
    }
}

/// Handle returned by [`PointerTracker::subscribe`]. Cancelling is idempotent
/// and safe from inside the subscription's own callback.
#[derive(Clone, Debug)]
pub struct Subscription {
    id: SubscriptionId,
    cancelled: Rc<Cell<bool>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn cancel(&self) {
        if !self.cancelled.replace(true) {
            log::debug!("pointer subscription {:?} cancelled", self.id);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

struct Entry {
    id: SubscriptionId,
    region: Box<dyn RegionProvider>,
    padding: f32,
    listener: Box<dyn ProximityListener>,
    cancelled: Rc<Cell<bool>>,
    was_near: bool,
    inside: bool,
    faulted: bool,
}

/// Per-frame rectangle cache. Cleared at frame start and on layout changes.
#[derive(Default, Debug)]
struct GeometryCache {
    rects: HashMap<SubscriptionId, Option<Rect>>,
}

impl GeometryCache {
    fn measure(&mut self, id: SubscriptionId, region: &dyn RegionProvider) -> Option<Rect> {
        *self.rects.entry(id).or_insert_with(|| region.rect())
    }

    fn clear(&mut self) {
        self.rects.clear();
    }
}

#[derive(Default)]
pub struct PointerTracker {
    ids: IdAllocator,
    entries: Vec<Entry>,
    geometry: GeometryCache,
    latest: Option<PointerSample>,
    present: bool,
    faults: Vec<SubscriptionId>,
}

impl std::fmt::Debug for PointerTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerTracker")
            .field("subscriptions", &self.entries.len())
            .field("latest", &self.latest)
            .field("present", &self.present)
            .finish()
    }
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for pointer proximity to `region` grown by `padding`.
    pub fn subscribe(
        &mut self,
        region: impl RegionProvider + 'static,
        padding: f32,
        listener: impl ProximityListener + 'static,
    ) -> Result<Subscription, MotionError> {
        let padding = check_padding(padding)?;
        let id = self.ids.alloc_subscription();
        let cancelled = Rc::new(Cell::new(false));
        self.entries.push(Entry {
            id,
            region: Box::new(region),
            padding,
            listener: Box::new(listener),
            cancelled: Rc::clone(&cancelled),
            was_near: false,
            inside: false,
            faulted: false,
        });
        log::debug!("pointer subscription {id:?} added (padding {padding}px)");
        Ok(Subscription { id, cancelled })
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.cancelled.get()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most recent non-touch sample, kept even after the pointer leaves.
    pub fn latest(&self) -> Option<PointerSample> {
        self.latest
    }

    /// Whether the pointer is currently over the document.
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Whether the latest sample lies inside any subscribed (unpadded) region.
    pub fn hovering(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.inside && !e.cancelled.get())
    }

    /// Start of a frame: rectangles are measured afresh on next use.
    pub fn begin_frame(&mut self) {
        self.geometry.clear();
    }

    /// Scroll or resize moved things; drop cached rectangles now.
    pub fn invalidate_layout(&mut self) {
        self.geometry.clear();
    }

    /// Pointer left the document. The latest sample is retained.
    pub fn pointer_left(&mut self) {
        self.present = false;
    }

    /// Subscriptions whose listener failed for the first time since last drained.
    pub fn drain_faults(&mut self) -> Vec<SubscriptionId> {
        std::mem::take(&mut self.faults)
    }

    /// Feed one pointer sample. Returns the number of listener calls made.
    pub fn handle_sample(&mut self, sample: PointerSample) -> usize {
        if sample.kind == PointerKind::Touch {
            return 0;
        }
        self.latest = Some(sample);
        self.present = true;

        let geometry = &mut self.geometry;
        self.entries.retain(|e| {
            if e.cancelled.get() {
                geometry.rects.remove(&e.id);
                false
            } else {
                true
            }
        });

        let mut calls = 0;
        for entry in self.entries.iter_mut() {
            // A listener earlier in this pass may have cancelled this one.
            if entry.cancelled.get() {
                continue;
            }
            let rect = self.geometry.measure(entry.id, entry.region.as_ref());
            let state = ProximityState::compute(rect, entry.padding, &sample);
            let transitioned = state.is_near != entry.was_near;
            entry.was_near = state.is_near;
            entry.inside = state.inside;
            if !(transitioned || state.is_near) {
                continue;
            }
            calls += 1;
            if let Err(fault) = entry.listener.on_change(&state) {
                if !entry.faulted {
                    entry.faulted = true;
                    log::warn!("pointer subscription {:?} failed: {fault}", entry.id);
                    self.faults.push(entry.id);
                }
            }
        }
        calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FixedRegion;
    use std::cell::RefCell;

    fn ignore(_: &ProximityState) -> Result<(), SubscriberFault> {
        Ok(())
    }

    #[test]
    fn region_measured_once_per_frame() {
        let measured = Rc::new(Cell::new(0u32));
        let m = Rc::clone(&measured);
        let region = move || {
            m.set(m.get() + 1);
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        };
        let mut tracker = PointerTracker::new();
        tracker
            .subscribe(region, 0.0, ignore)
            .unwrap();
        tracker.handle_sample(PointerSample::mouse(1.0, 1.0, 0.0));
        tracker.handle_sample(PointerSample::mouse(2.0, 2.0, 1.0));
        assert_eq!(measured.get(), 1);
        tracker.begin_frame();
        tracker.handle_sample(PointerSample::mouse(3.0, 3.0, 2.0));
        assert_eq!(measured.get(), 2);
        tracker.invalidate_layout();
        tracker.handle_sample(PointerSample::mouse(3.0, 3.0, 3.0));
        assert_eq!(measured.get(), 3);
    }

    #[test]
    fn cancel_from_inside_callback() {
        let mut tracker = PointerTracker::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(Cell::new(0u32));
        let (s, c) = (Rc::clone(&slot), Rc::clone(&calls));
        let sub = tracker
            .subscribe(
                FixedRegion(Rect::new(0.0, 0.0, 10.0, 10.0)),
                0.0,
                move |_: &ProximityState| -> Result<(), SubscriberFault> {
                    c.set(c.get() + 1);
                    if let Some(sub) = s.borrow().as_ref() {
                        sub.cancel();
                    }
                    Ok(())
                },
            )
            .unwrap();
        *slot.borrow_mut() = Some(sub);
        tracker.handle_sample(PointerSample::mouse(5.0, 5.0, 0.0));
        tracker.handle_sample(PointerSample::mouse(6.0, 5.0, 1.0));
        assert_eq!(calls.get(), 1);
        assert!(tracker.is_empty());
    }

    #[test]
    fn negative_padding_is_rejected() {
        let mut tracker = PointerTracker::new();
        let err = tracker
            .subscribe(FixedRegion(Rect::default()), -5.0, ignore)
            .unwrap_err();
        assert_eq!(err, MotionError::NegativePadding { padding: -5.0 });
    }
}
