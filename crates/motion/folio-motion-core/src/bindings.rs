//! Bindings from tracker outputs to host element styles.
//!
//! A binding owns the subscriptions it needs and stages style values when the
//! engine evaluates a frame. Staged values are diffed by the engine, so
//! bindings may restage identical values every frame.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::ResolvedTheme;
use crate::mappers::{blur_css, css_number, CardCascade, GlowVariant, SectionFade};
use crate::outputs::{StyleProperty, StyleWrite};
use crate::pointer::{ProximityState, Subscription};
use crate::scroll::ScrollHandle;

#[derive(Debug)]
pub(crate) enum Binding {
    Section {
        host: String,
        scroll: ScrollHandle,
        fade: SectionFade,
    },
    Cascade {
        hosts: Vec<String>,
        scroll: ScrollHandle,
        cascade: CardCascade,
    },
    Glow {
        host: String,
        variant: GlowVariant,
        state: Rc<Cell<ProximityState>>,
        subscription: Subscription,
    },
}

fn staged(host: &str, property: StyleProperty, value: String) -> StyleWrite {
    StyleWrite {
        host: host.to_string(),
        property,
        value,
    }
}

impl Binding {
    pub(crate) fn owned_by(&self, key: &str) -> bool {
        match self {
            Binding::Section { host, .. } | Binding::Glow { host, .. } => host == key,
            Binding::Cascade { hosts, .. } => hosts.iter().any(|h| h == key),
        }
    }

    pub(crate) fn hosts(&self) -> Vec<&str> {
        match self {
            Binding::Section { host, .. } | Binding::Glow { host, .. } => vec![host.as_str()],
            Binding::Cascade { hosts, .. } => hosts.iter().map(String::as_str).collect(),
        }
    }

    pub(crate) fn cancel(&self) {
        match self {
            Binding::Section { scroll, .. } | Binding::Cascade { scroll, .. } => scroll.cancel(),
            Binding::Glow { subscription, .. } => subscription.cancel(),
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        match self {
            Binding::Section { scroll, .. } | Binding::Cascade { scroll, .. } => {
                scroll.is_cancelled()
            }
            Binding::Glow { subscription, .. } => subscription.is_cancelled(),
        }
    }

    /// Scroll mappers run before glow mappers, so the engine evaluates in two passes.
    pub(crate) fn is_scroll_driven(&self) -> bool {
        !matches!(self, Binding::Glow { .. })
    }

    pub(crate) fn stage(&self, theme: ResolvedTheme, out: &mut Vec<StyleWrite>) {
        match self {
            Binding::Section { host, scroll, fade } => {
                let p = if fade.smoothed {
                    scroll.read()
                } else {
                    scroll.raw()
                };
                let style = fade.evaluate(p);
                out.push(staged(host, StyleProperty::Opacity, css_number(style.opacity)));
                out.push(staged(host, StyleProperty::Filter, blur_css(style.blur_px)));
            }
            Binding::Cascade {
                hosts,
                scroll,
                cascade,
            } => {
                let poses = cascade.evaluate(scroll.raw());
                for (host, pose) in hosts.iter().zip(poses) {
                    out.push(staged(host, StyleProperty::Transform, pose.transform_css()));
                }
            }
            Binding::Glow {
                host,
                variant,
                state,
                ..
            } => {
                let glow = variant.evaluate(&state.get(), theme);
                out.push(staged(host, StyleProperty::Opacity, css_number(glow.opacity)));
                out.push(staged(host, StyleProperty::Background, glow.background));
            }
        }
    }
}
