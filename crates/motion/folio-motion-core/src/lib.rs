//! Folio motion core (host-agnostic)
//!
//! The effect engine behind the portfolio site: a shared pointer tracker with
//! padded-region subscriptions, scroll progress with spring smoothing, pure
//! keyframe/gradient mappers, a typewriter state machine, and a frame driver
//! that turns all of it into minimal style writes. Nothing here touches the
//! DOM; adapters feed events and a clock in and apply the writes.

mod bindings;
pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod mappers;
pub mod outputs;
pub mod pointer;
pub mod scroll;
pub mod spring;
pub mod typewriter;

// Re-exports for consumers (adapters)
pub use config::{Config, PaddingDefaults, ResolvedTheme, Theme};
pub use cursor::{CursorStyle, CustomCursor};
pub use engine::Engine;
pub use error::{MotionError, SubscriberFault};
pub use geometry::{FixedRegion, Point, PointerKind, PointerSample, Rect, RegionProvider, Viewport};
pub use ids::{ListenerId, ScrollId, SubscriptionId, TypewriterId};
pub use mappers::{
    lerp, radial_gradient_css, CardCascade, CardPose, GlowVariant, Keyframe, Keyframes, Rgba,
    SectionFade,
};
pub use outputs::{MotionEvent, Outputs, StyleProperty, StyleWrite};
pub use pointer::{PointerTracker, ProximityListener, ProximityState, Subscription};
pub use scroll::{Anchor, Edge, ObserveOptions, OffsetWindow, ScrollHandle, ScrollProgressTracker};
pub use spring::{Spring, SpringConfig};
pub use typewriter::{Phase, TextListener, Typewriter, TypewriterFrame, TypewriterState, TypewriterTimings};
