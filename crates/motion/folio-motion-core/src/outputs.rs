//! Output contracts from the engine.
//!
//! Outputs carry only the style values that changed this frame, keyed by the
//! host element key, plus a separate list of semantic events. Adapters apply
//! the writes to the DOM and forward the events.

use serde::{Deserialize, Serialize};

use crate::ids::{ScrollId, SubscriptionId};

/// Style properties the engine writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleProperty {
    Opacity,
    Filter,
    Transform,
    Background,
}

impl StyleProperty {
    pub fn css_name(self) -> &'static str {
        match self {
            StyleProperty::Opacity => "opacity",
            StyleProperty::Filter => "filter",
            StyleProperty::Transform => "transform",
            StyleProperty::Background => "background",
        }
    }
}

/// One changed style value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleWrite {
    pub host: String,
    pub property: StyleProperty,
    pub value: String,
}

/// Discrete signals emitted between or during frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum MotionEvent {
    /// A pointer listener failed for the first time. Dispatch continued.
    SubscriberFaulted { subscription: SubscriptionId },
    /// A smoothed scroll observation came to rest.
    SpringSettled { scroll: ScrollId },
    /// Every binding of a host was cancelled.
    HostUnmounted { host: String },
}

/// Outputs returned by `Engine::frame()`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub writes: Vec<StyleWrite>,
    #[serde(default)]
    pub events: Vec<MotionEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.writes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_write(&mut self, write: StyleWrite) {
        self.writes.push(write);
    }

    #[inline]
    pub fn push_event(&mut self, event: MotionEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.events.is_empty()
    }

    /// Latest value written to `host.property` this frame, if any.
    pub fn value_of(&self, host: &str, property: StyleProperty) -> Option<&str> {
        self.writes
            .iter()
            .rev()
            .find(|w| w.host == host && w.property == property)
            .map(|w| w.value.as_str())
    }
}
