mod adapters;
mod logging;

use js_sys::Function;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use folio_motion_core::{
    CardCascade, Config, Engine, GlowVariant, MotionError, ObserveOptions, OffsetWindow,
    PointerKind, PointerSample, ScrollHandle, SectionFade, Subscription, Theme, TypewriterId,
    TypewriterTimings, Viewport,
};

use adapters::{JsProximityListener, JsRegion, JsTextListener};
pub use logging::init_logging;

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn js_err(e: MotionError) -> JsError {
    JsError::new(&e.to_string())
}

fn parse_optional<T>(value: JsValue, what: &str) -> Result<Option<T>, JsError>
where
    T: serde::de::DeserializeOwned,
{
    if jsvalue_is_undefined_or_null(&value) {
        return Ok(None);
    }
    swb::from_value(value)
        .map(Some)
        .map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

fn parse_glow_variant(variant: &str) -> Result<GlowVariant, JsError> {
    match variant {
        "card" => Ok(GlowVariant::Card),
        "button" => Ok(GlowVariant::Button),
        "project_card" | "project-card" => Ok(GlowVariant::ProjectCard),
        other => Err(JsError::new(&format!("unknown glow variant `{other}`"))),
    }
}

fn parse_theme(theme: &str) -> Result<Theme, JsError> {
    match theme {
        "light" => Ok(Theme::Light),
        "dark" => Ok(Theme::Dark),
        "system" => Ok(Theme::System),
        other => Err(JsError::new(&format!("unknown theme `{other}`"))),
    }
}

/// A preset name ("skills", "projects", "contact") or a full fade object.
fn parse_section_fade(fade: JsValue) -> Result<SectionFade, JsError> {
    if let Some(name) = fade.as_string() {
        return match name.as_str() {
            "skills" => Ok(SectionFade::skills()),
            "projects" => Ok(SectionFade::projects()),
            "contact" => Ok(SectionFade::contact()),
            other => Err(JsError::new(&format!("unknown section preset `{other}`"))),
        };
    }
    swb::from_value(fade).map_err(|e| JsError::new(&format!("section fade error: {e}")))
}

/// Handle for a pointer subscription or glow binding.
#[wasm_bindgen]
pub struct PointerSubscription {
    inner: Subscription,
}

#[wasm_bindgen]
impl PointerSubscription {
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> u32 {
        self.inner.id().0
    }

    /// Idempotent; safe to call from inside the subscription's own callback.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    #[wasm_bindgen(getter, js_name = cancelled)]
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

/// Handle for a scroll observation.
#[wasm_bindgen]
pub struct ScrollObservation {
    inner: ScrollHandle,
}

#[wasm_bindgen]
impl ScrollObservation {
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> u32 {
        self.inner.id().0
    }

    /// Smoothed progress in [0, 1].
    pub fn read(&self) -> f32 {
        self.inner.read()
    }

    pub fn raw(&self) -> f32 {
        self.inner.raw()
    }

    #[wasm_bindgen(getter)]
    pub fn settled(&self) -> bool {
        self.inner.is_settled()
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }
}

#[wasm_bindgen]
pub struct FolioMotion {
    core: Engine,
}

#[wasm_bindgen]
impl FolioMotion {
    /// Create an engine. Pass a (partial) config object or undefined/null for defaults.
    /// Example:
    ///   new FolioMotion({ theme: "dark", padding: { card: 80 } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<FolioMotion, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = parse_optional(config, "config")?.unwrap_or_default();
        Ok(FolioMotion {
            core: Engine::new(cfg).map_err(js_err)?,
        })
    }

    /// Feed a `pointermove`. `pointer_type` is the DOM `pointerType`; touch is ignored.
    pub fn pointer_move(&mut self, x: f32, y: f32, timestamp_ms: f64, pointer_type: &str) {
        self.core.pointer_move(PointerSample {
            x,
            y,
            timestamp_ms,
            kind: PointerKind::from_dom(pointer_type),
        });
    }

    pub fn pointer_leave(&mut self) {
        self.core.pointer_left();
    }

    pub fn scrolled(&mut self) {
        self.core.scrolled();
    }

    pub fn resized(&mut self, width: f32, height: f32) {
        self.core.resized(Viewport::new(width, height));
    }

    /// Low-level proximity subscription. `region` returns the element's
    /// bounding rect (or null when detached); `listener` receives
    /// `{ isNear, inside, localX, localY }`.
    pub fn subscribe_pointer(
        &mut self,
        region: Function,
        padding: f32,
        listener: Function,
    ) -> Result<PointerSubscription, JsError> {
        let inner = self
            .core
            .subscribe_pointer(
                JsRegion { f: region },
                padding,
                JsProximityListener { f: listener },
            )
            .map_err(js_err)?;
        Ok(PointerSubscription { inner })
    }

    /// Low-level scroll observation. `window` is an optional `{ enter, exit }`
    /// anchor pair; `smoothed` selects the configured spring.
    pub fn observe_scroll(
        &mut self,
        region: Function,
        window: JsValue,
        smoothed: bool,
    ) -> Result<ScrollObservation, JsError> {
        let window: Option<OffsetWindow> = parse_optional(window, "window")?;
        let smoothing = smoothed.then_some(self.core.config().spring);
        let inner = self
            .core
            .observe_scroll_with(JsRegion { f: region }, ObserveOptions { window, smoothing })
            .map_err(js_err)?;
        Ok(ScrollObservation { inner })
    }

    /// Fade `host` in and out with scroll. `fade` is a preset name or a fade object.
    pub fn bind_section(
        &mut self,
        host: String,
        region: Function,
        fade: JsValue,
    ) -> Result<ScrollObservation, JsError> {
        let fade = parse_section_fade(fade)?;
        let inner = self
            .core
            .bind_section_fade(host, JsRegion { f: region }, fade)
            .map_err(js_err)?;
        Ok(ScrollObservation { inner })
    }

    /// Drive one host per card from the container's scroll progress.
    /// `cascade` defaults to the stacked project cards.
    pub fn bind_cascade(
        &mut self,
        hosts: Vec<String>,
        region: Function,
        cascade: JsValue,
    ) -> Result<ScrollObservation, JsError> {
        let cascade: CardCascade =
            parse_optional(cascade, "cascade")?.unwrap_or_else(CardCascade::stacked_projects);
        let inner = self
            .core
            .bind_card_cascade(hosts, JsRegion { f: region }, cascade)
            .map_err(js_err)?;
        Ok(ScrollObservation { inner })
    }

    /// `variant`: "card", "button" or "project_card". `padding` overrides the
    /// variant's default radius.
    pub fn bind_glow(
        &mut self,
        host: String,
        region: Function,
        variant: &str,
        padding: Option<f32>,
    ) -> Result<PointerSubscription, JsError> {
        let variant = parse_glow_variant(variant)?;
        let inner = self
            .core
            .bind_glow(host, JsRegion { f: region }, variant, padding)
            .map_err(js_err)?;
        Ok(PointerSubscription { inner })
    }

    pub fn enable_cursor(&mut self, host: String) {
        self.core.enable_cursor(host);
    }

    /// Cancel every binding of `host`. Returns how many went away.
    pub fn unmount(&mut self, host: &str) -> u32 {
        self.core.unmount(host) as u32
    }

    /// `theme`: "light", "dark" or "system".
    pub fn set_theme(&mut self, theme: &str, system_prefers_dark: bool) -> Result<(), JsError> {
        self.core.set_theme(parse_theme(theme)?, system_prefers_dark);
        Ok(())
    }

    /// Evaluate one animation frame. Returns `{ writes, events }`.
    pub fn frame(&mut self, now_ms: f64) -> Result<JsValue, JsError> {
        let out = self.core.frame(now_ms);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    pub fn needs_frame(&self) -> bool {
        self.core.needs_frame()
    }

    // ---- typewriters ---------------------------------------------------

    /// Start a typewriter at `now_ms`. `timings` is optional (partial) JSON.
    pub fn add_typewriter(
        &mut self,
        words: Vec<String>,
        timings: JsValue,
        now_ms: f64,
    ) -> Result<u32, JsError> {
        let timings: Option<TypewriterTimings> = parse_optional(timings, "timings")?;
        let id = self
            .core
            .add_typewriter(words, timings, now_ms)
            .map_err(js_err)?;
        Ok(id.0)
    }

    /// Call `listener(text)` whenever the typewriter's text changes.
    pub fn typewriter_subscribe(&mut self, id: u32, listener: Function) -> Result<u32, JsError> {
        let tw = self
            .core
            .typewriter_mut(TypewriterId(id))
            .map_err(js_err)?;
        Ok(tw.subscribe(JsTextListener { f: listener }).0)
    }

    /// Current `{ text, cursor_visible }` for a typewriter.
    pub fn typewriter_frame(&self, id: u32, now_ms: f64) -> Result<JsValue, JsError> {
        let tw = self
            .core
            .typewriter(TypewriterId(id))
            .ok_or_else(|| js_err(MotionError::UnknownTypewriter(id)))?;
        swb::to_value(&tw.render(now_ms)).map_err(|e| JsError::new(&format!("frame error: {e}")))
    }

    pub fn set_typewriter_words(
        &mut self,
        id: u32,
        words: Vec<String>,
        now_ms: f64,
    ) -> Result<(), JsError> {
        self.core
            .typewriter_mut(TypewriterId(id))
            .map_err(js_err)?
            .set_words(words, now_ms);
        Ok(())
    }

    pub fn stop_typewriter(&mut self, id: u32) -> Result<(), JsError> {
        self.core
            .typewriter_mut(TypewriterId(id))
            .map_err(js_err)?
            .stop();
        Ok(())
    }

    pub fn remove_typewriter(&mut self, id: u32) -> bool {
        self.core.remove_typewriter(TypewriterId(id))
    }

    /// Fire due typewriter transitions. Returns how many fired.
    pub fn advance_timers(&mut self, now_ms: f64) -> u32 {
        self.core.advance_timers(now_ms) as u32
    }

    /// When the host should next call `advance_timers`, if ever.
    pub fn next_timer(&self) -> Option<f64> {
        self.core.next_timer()
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
