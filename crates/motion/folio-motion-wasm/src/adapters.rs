//! JS callbacks adapted to the core's region and listener traits.

use js_sys::{Function, Reflect};
use serde_wasm_bindgen as swb;
use wasm_bindgen::JsValue;

use folio_motion_core::{
    ProximityListener, ProximityState, Rect, RegionProvider, SubscriberFault, TextListener,
};

/// `() => DOMRect | {left, top, width, height} | null`
///
/// A throwing callback or a missing field reads as a detached region.
pub(crate) struct JsRegion {
    pub(crate) f: Function,
}

fn number_field(obj: &JsValue, name: &str) -> Option<f32> {
    Reflect::get(obj, &JsValue::from_str(name))
        .ok()?
        .as_f64()
        .map(|v| v as f32)
}

impl RegionProvider for JsRegion {
    fn rect(&self) -> Option<Rect> {
        let val = self.f.call0(&JsValue::UNDEFINED).ok()?;
        if val.is_undefined() || val.is_null() {
            return None;
        }
        Some(Rect::new(
            number_field(&val, "left")?,
            number_field(&val, "top")?,
            number_field(&val, "width")?,
            number_field(&val, "height")?,
        ))
    }
}

fn fault(err: JsValue) -> SubscriberFault {
    SubscriberFault::new(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// `(state: { isNear, inside, localX, localY }) => void`
pub(crate) struct JsProximityListener {
    pub(crate) f: Function,
}

impl ProximityListener for JsProximityListener {
    fn on_change(&mut self, state: &ProximityState) -> Result<(), SubscriberFault> {
        let arg = swb::to_value(state).map_err(|e| SubscriberFault::new(e.to_string()))?;
        self.f.call1(&JsValue::UNDEFINED, &arg).map(|_| ()).map_err(fault)
    }
}

/// `(text: string) => void`
pub(crate) struct JsTextListener {
    pub(crate) f: Function,
}

impl TextListener for JsTextListener {
    fn on_text(&mut self, text: &str) -> Result<(), SubscriberFault> {
        self.f
            .call1(&JsValue::UNDEFINED, &JsValue::from_str(text))
            .map(|_| ())
            .map_err(fault)
    }
}
