//! Engine: owns the trackers, bindings, cursor and typewriters, and turns them
//! into style writes one frame at a time.
//!
//! Cadences:
//! - event: `pointer_move`, `pointer_left`, `scrolled`, `resized`
//! - frame: `frame(now)` samples scroll, steps springs, evaluates bindings
//!   (scroll-driven first, then glows) and the cursor, and emits only the
//!   values that changed since the last write
//! - timer: `advance_timers(now)` fires due typewriter transitions

use std::cell::Cell;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::bindings::Binding;
use crate::config::{Config, ResolvedTheme, Theme};
use crate::cursor::CustomCursor;
use crate::error::{MotionError, SubscriberFault};
use crate::geometry::{PointerSample, RegionProvider, Viewport};
use crate::ids::{IdAllocator, TypewriterId};
use crate::mappers::{CardCascade, GlowVariant, SectionFade};
use crate::outputs::{MotionEvent, Outputs, StyleProperty, StyleWrite};
use crate::pointer::{PointerTracker, ProximityListener, ProximityState, Subscription};
use crate::scroll::{ObserveOptions, OffsetWindow, ScrollHandle, ScrollProgressTracker};
use crate::typewriter::{Typewriter, TypewriterTimings};

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    theme: ResolvedTheme,
    ids: IdAllocator,

    // Trackers
    pointer: PointerTracker,
    scroll: ScrollProgressTracker,

    // Hosts
    bindings: Vec<Binding>,
    cursor: Option<CustomCursor>,
    typewriters: Vec<(TypewriterId, Typewriter)>,

    // Frame state
    last_frame_ms: Option<f64>,
    written: HashMap<(String, StyleProperty), String>,
    staging: Vec<StyleWrite>,
    pending_events: Vec<MotionEvent>,
    wake: bool,
    outputs: Outputs,
}

impl Engine {
    /// Create an engine. The config is validated up front.
    pub fn new(cfg: Config) -> Result<Self, MotionError> {
        cfg.validate()?;
        Ok(Self {
            theme: cfg.resolved_theme(),
            ids: IdAllocator::new(),
            pointer: PointerTracker::new(),
            scroll: ScrollProgressTracker::new(cfg.spring, Viewport::default()),
            bindings: Vec::new(),
            cursor: None,
            typewriters: Vec::new(),
            last_frame_ms: None,
            written: HashMap::new(),
            staging: Vec::new(),
            pending_events: Vec::new(),
            wake: true,
            outputs: Outputs::default(),
            cfg,
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn theme(&self) -> ResolvedTheme {
        self.theme
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn scroll(&self) -> &ScrollProgressTracker {
        &self.scroll
    }

    /// Swap the injected theme. Colour-producing bindings restage next frame.
    pub fn set_theme(&mut self, theme: Theme, system_prefers_dark: bool) {
        self.cfg.theme = theme;
        self.cfg.system_prefers_dark = system_prefers_dark;
        self.theme = self.cfg.resolved_theme();
        self.wake = true;
    }

    // ---- event cadence -------------------------------------------------

    pub fn pointer_move(&mut self, sample: PointerSample) {
        self.pointer.handle_sample(sample);
        self.wake = true;
    }

    pub fn pointer_left(&mut self) {
        self.pointer.pointer_left();
        self.wake = true;
    }

    /// The document scrolled: cached rectangles and raw progress are stale.
    pub fn scrolled(&mut self) {
        self.pointer.invalidate_layout();
        self.scroll.mark_dirty();
    }

    pub fn resized(&mut self, viewport: Viewport) {
        self.pointer.invalidate_layout();
        self.scroll.set_viewport(viewport);
    }

    // ---- raw primitives ------------------------------------------------

    pub fn subscribe_pointer(
        &mut self,
        region: impl RegionProvider + 'static,
        padding: f32,
        listener: impl ProximityListener + 'static,
    ) -> Result<Subscription, MotionError> {
        self.pointer.subscribe(region, padding, listener)
    }

    /// Observe scroll progress, smoothed with the configured spring.
    pub fn observe_scroll(
        &mut self,
        region: impl RegionProvider + 'static,
        window: Option<OffsetWindow>,
    ) -> Result<ScrollHandle, MotionError> {
        self.scroll.observe(region, window)
    }

    pub fn observe_scroll_with(
        &mut self,
        region: impl RegionProvider + 'static,
        options: ObserveOptions,
    ) -> Result<ScrollHandle, MotionError> {
        self.scroll.observe_with(region, options)
    }

    // ---- bindings ------------------------------------------------------

    pub fn bind_section_fade(
        &mut self,
        host: impl Into<String>,
        region: impl RegionProvider + 'static,
        fade: SectionFade,
    ) -> Result<ScrollHandle, MotionError> {
        let smoothing = fade.smoothed.then_some(self.cfg.spring);
        let scroll = self.scroll.observe_with(
            region,
            ObserveOptions {
                window: None,
                smoothing,
            },
        )?;
        let host = host.into();
        log::debug!("section fade bound to `{host}`");
        self.bindings.push(Binding::Section {
            host,
            scroll: scroll.clone(),
            fade,
        });
        self.wake = true;
        Ok(scroll)
    }

    /// Bind one host per cascade card, in card order.
    pub fn bind_card_cascade<I, S>(
        &mut self,
        hosts: I,
        region: impl RegionProvider + 'static,
        cascade: CardCascade,
    ) -> Result<ScrollHandle, MotionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hosts: Vec<String> = hosts.into_iter().map(Into::into).collect();
        if hosts.len() != cascade.len() {
            return Err(MotionError::CascadeHosts {
                cards: cascade.len(),
                hosts: hosts.len(),
            });
        }
        let scroll = self.scroll.observe_with(
            region,
            ObserveOptions {
                window: None,
                smoothing: None,
            },
        )?;
        log::debug!("card cascade bound to {hosts:?}");
        self.bindings.push(Binding::Cascade {
            hosts,
            scroll: scroll.clone(),
            cascade,
        });
        self.wake = true;
        Ok(scroll)
    }

    /// Bind a pointer glow. `padding` defaults per variant from the config.
    pub fn bind_glow(
        &mut self,
        host: impl Into<String>,
        region: impl RegionProvider + 'static,
        variant: GlowVariant,
        padding: Option<f32>,
    ) -> Result<Subscription, MotionError> {
        let padding = padding.unwrap_or(match variant {
            GlowVariant::Card => self.cfg.padding.card,
            GlowVariant::Button => self.cfg.padding.button,
            GlowVariant::ProjectCard => 0.0,
        });
        let state = Rc::new(Cell::new(ProximityState::default()));
        let sink = Rc::clone(&state);
        let subscription = self.pointer.subscribe(
            region,
            padding,
            move |s: &ProximityState| -> Result<(), SubscriberFault> {
                sink.set(*s);
                Ok(())
            },
        )?;
        let host = host.into();
        log::debug!("{variant:?} glow bound to `{host}` (padding {padding}px)");
        self.bindings.push(Binding::Glow {
            host,
            variant,
            state,
            subscription: subscription.clone(),
        });
        self.wake = true;
        Ok(subscription)
    }

    pub fn enable_cursor(&mut self, host: impl Into<String>) {
        self.cursor = Some(CustomCursor::new(host, self.cfg.cursor_hover_scale));
        self.wake = true;
    }

    /// Cancel everything bound to `host`. Returns how many bindings went away;
    /// a second call for the same host returns 0.
    pub fn unmount(&mut self, host: &str) -> usize {
        let mut released: Vec<String> = Vec::new();
        let mut removed = 0;
        self.bindings.retain(|b| {
            if b.owned_by(host) {
                b.cancel();
                released.extend(b.hosts().into_iter().map(str::to_string));
                removed += 1;
                false
            } else {
                true
            }
        });
        if self.cursor.as_ref().is_some_and(|c| c.host() == host) {
            self.cursor = None;
            released.push(host.to_string());
            removed += 1;
        }
        if removed == 0 {
            return 0;
        }
        let mut seen = hashbrown::HashSet::new();
        released.retain(|h| seen.insert(h.clone()));
        self.written.retain(|(h, _), _| !released.contains(h));
        log::debug!("unmounted `{host}` ({removed} bindings, hosts {released:?})");
        self.pending_events.extend(
            released
                .into_iter()
                .map(|host| MotionEvent::HostUnmounted { host }),
        );
        removed
    }

    // ---- timer cadence -------------------------------------------------

    /// Create and start a typewriter. Uses the configured timings when `timings` is `None`.
    pub fn add_typewriter<I, S>(
        &mut self,
        words: I,
        timings: Option<TypewriterTimings>,
        now_ms: f64,
    ) -> Result<TypewriterId, MotionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tw = Typewriter::new(words, timings.unwrap_or(self.cfg.typewriter))?;
        tw.start(now_ms);
        let id = self.ids.alloc_typewriter();
        self.typewriters.push((id, tw));
        Ok(id)
    }

    pub fn typewriter(&self, id: TypewriterId) -> Option<&Typewriter> {
        self.typewriters
            .iter()
            .find_map(|(tid, tw)| (*tid == id).then_some(tw))
    }

    pub fn typewriter_mut(&mut self, id: TypewriterId) -> Result<&mut Typewriter, MotionError> {
        self.typewriters
            .iter_mut()
            .find_map(|(tid, tw)| (*tid == id).then_some(tw))
            .ok_or(MotionError::UnknownTypewriter(id.0))
    }

    /// Stop and drop a typewriter. Returns false if it was already gone.
    pub fn remove_typewriter(&mut self, id: TypewriterId) -> bool {
        let before = self.typewriters.len();
        self.typewriters.retain_mut(|(tid, tw)| {
            if *tid == id {
                tw.stop();
                false
            } else {
                true
            }
        });
        before != self.typewriters.len()
    }

    /// Fire every due typewriter transition. Returns how many fired.
    pub fn advance_timers(&mut self, now_ms: f64) -> usize {
        self.typewriters
            .iter_mut()
            .map(|(_, tw)| tw.advance_to(now_ms))
            .sum()
    }

    /// Earliest pending typewriter deadline.
    pub fn next_timer(&self) -> Option<f64> {
        self.typewriters
            .iter()
            .filter_map(|(_, tw)| tw.next_deadline())
            .reduce(f64::min)
    }

    // ---- frame cadence -------------------------------------------------

    /// Whether the host should schedule another animation frame.
    pub fn needs_frame(&self) -> bool {
        self.wake || self.scroll.needs_frame() || !self.pending_events.is_empty()
    }

    /// Evaluate one frame at `now_ms` and return the style changes.
    pub fn frame(&mut self, now_ms: f64) -> &Outputs {
        self.outputs.clear();

        let dt_ms = match self.last_frame_ms {
            Some(prev) => (now_ms - prev).clamp(0.0, self.cfg.max_frame_dt_ms),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        self.pointer.begin_frame();
        self.scroll.sample();
        for scroll in self.scroll.advance((dt_ms / 1000.0) as f32) {
            self.pending_events.push(MotionEvent::SpringSettled { scroll });
        }
        for subscription in self.pointer.drain_faults() {
            self.pending_events
                .push(MotionEvent::SubscriberFaulted { subscription });
        }

        self.bindings.retain(|b| !b.is_cancelled());
        self.staging.clear();
        for binding in self.bindings.iter().filter(|b| b.is_scroll_driven()) {
            binding.stage(self.theme, &mut self.staging);
        }
        for binding in self.bindings.iter().filter(|b| !b.is_scroll_driven()) {
            binding.stage(self.theme, &mut self.staging);
        }
        if let Some(cursor) = &self.cursor {
            cursor.stage(&self.pointer, &mut self.staging);
        }

        for write in self.staging.drain(..) {
            let key = (write.host.clone(), write.property);
            if self.written.get(&key) == Some(&write.value) {
                continue;
            }
            self.written.insert(key, write.value.clone());
            self.outputs.push_write(write);
        }
        for event in self.pending_events.drain(..) {
            self.outputs.push_event(event);
        }
        self.wake = false;
        // Idle until the next input; the next frame restarts the clock at dt 0.
        if !self.needs_frame() {
            self.last_frame_ms = None;
        }
        &self.outputs
    }
}
