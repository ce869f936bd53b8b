//! Viewport-space geometry shared by the trackers.
//!
//! All coordinates are CSS pixels relative to the viewport's top-left corner,
//! matching what `getBoundingClientRect()` and `MouseEvent.clientX/Y` report.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build from two corners, `(x0, y0)` top-left and `(x1, y1)` bottom-right.
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// A rectangle with no area carries no usable layout metrics.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Translate a viewport point into this rectangle's local space.
    #[inline]
    pub fn local(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.left, y - self.top)
    }

    /// Whether local point `(lx, ly)` lies inside the rectangle grown by `padding`
    /// on every side. Edges are inclusive.
    #[inline]
    pub fn contains_local(&self, lx: f32, ly: f32, padding: f32) -> bool {
        lx >= -padding
            && lx <= self.width + padding
            && ly >= -padding
            && ly <= self.height + padding
    }
}

/// 2D point in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Input device that produced a pointer sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[default]
    Mouse,
    Pen,
    Touch,
}

impl PointerKind {
    /// Map a DOM `PointerEvent.pointerType` string. Unknown values count as mouse.
    pub fn from_dom(kind: &str) -> Self {
        match kind {
            "touch" => PointerKind::Touch,
            "pen" => PointerKind::Pen,
            _ => PointerKind::Mouse,
        }
    }
}

/// One pointer movement. Emitted per event and never retained beyond the
/// tracker's "latest sample" slot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    /// Monotonic timestamp in milliseconds.
    pub timestamp_ms: f64,
    #[serde(default)]
    pub kind: PointerKind,
}

impl PointerSample {
    pub fn mouse(x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self {
            x,
            y,
            timestamp_ms,
            kind: PointerKind::Mouse,
        }
    }
}

/// Visible viewport size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Live query for a host element's current bounding rectangle.
///
/// Returns `None` once the element is detached; callers treat that as
/// "not near" and "no progress" rather than as an error.
pub trait RegionProvider {
    fn rect(&self) -> Option<Rect>;
}

impl<F> RegionProvider for F
where
    F: Fn() -> Option<Rect>,
{
    fn rect(&self) -> Option<Rect> {
        self()
    }
}

/// A rectangle that never moves. Handy for tests and static layouts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedRegion(pub Rect);

impl RegionProvider for FixedRegion {
    fn rect(&self) -> Option<Rect> {
        Some(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_containment_is_inclusive() {
        let r = Rect::from_corners(100.0, 100.0, 300.0, 200.0);
        assert_eq!(r.width, 200.0);
        assert_eq!(r.height, 100.0);
        let (lx, ly) = r.local(50.0, 100.0);
        assert!(r.contains_local(lx, ly, 50.0));
        let (lx, ly) = r.local(49.0, 100.0);
        assert!(!r.contains_local(lx, ly, 50.0));
        let (lx, ly) = r.local(350.0, 250.0);
        assert!(r.contains_local(lx, ly, 50.0));
    }

    #[test]
    fn zero_area_is_empty() {
        assert!(Rect::new(10.0, 10.0, 0.0, 40.0).is_empty());
        assert!(Rect::default().is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn pointer_kind_from_dom() {
        assert_eq!(PointerKind::from_dom("touch"), PointerKind::Touch);
        assert_eq!(PointerKind::from_dom("pen"), PointerKind::Pen);
        assert_eq!(PointerKind::from_dom("mouse"), PointerKind::Mouse);
        assert_eq!(PointerKind::from_dom(""), PointerKind::Mouse);
    }
}
