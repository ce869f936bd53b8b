//! Custom cursor bound to the tracker's latest sample.

use crate::mappers::{css_number, hover_scale};
use crate::outputs::{StyleProperty, StyleWrite};
use crate::pointer::PointerTracker;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorStyle {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub visible: bool,
}

impl CursorStyle {
    pub fn transform_css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            css_number(self.x),
            css_number(self.y),
            css_number(self.scale)
        )
    }
}

#[derive(Clone, Debug)]
pub struct CustomCursor {
    host: String,
    hover_scale: f32,
}

impl CustomCursor {
    pub fn new(host: impl Into<String>, hover_scale: f32) -> Self {
        Self {
            host: host.into(),
            hover_scale,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Hidden until the first sample arrives and while the pointer is outside
    /// the document; otherwise parked on the latest sample.
    pub fn style(&self, tracker: &PointerTracker) -> CursorStyle {
        match tracker.latest() {
            Some(sample) => CursorStyle {
                x: sample.x,
                y: sample.y,
                scale: hover_scale(tracker.hovering(), self.hover_scale),
                visible: tracker.is_present(),
            },
            None => CursorStyle {
                x: 0.0,
                y: 0.0,
                scale: 1.0,
                visible: false,
            },
        }
    }

    pub(crate) fn stage(&self, tracker: &PointerTracker, out: &mut Vec<StyleWrite>) {
        let style = self.style(tracker);
        out.push(StyleWrite {
            host: self.host.clone(),
            property: StyleProperty::Transform,
            value: style.transform_css(),
        });
        out.push(StyleWrite {
            host: self.host.clone(),
            property: StyleProperty::Opacity,
            value: if style.visible { "1" } else { "0" }.to_string(),
        });
    }
}
