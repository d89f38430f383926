//! Bridge to the extension runtime: `chrome.storage` and `chrome.runtime`.

use crossbeam_channel::Sender;
use glint_core::{EffectInput, ExtensionMessage};
use tracing::{debug, trace};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::Element;

use crate::error::WebError;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = get)]
    fn storage_sync_get(defaults: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "onChanged"], js_name = addListener)]
    fn storage_on_changed(callback: &Closure<dyn FnMut(JsValue, JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn runtime_on_message(callback: &Closure<dyn FnMut(JsValue)>);
}

/// Reads the persisted effects toggle, falling back to `default` when unset.
pub async fn load_effects_enabled(key: &str, default: bool) -> Result<bool, WebError> {
    let defaults = js_sys::Object::new();
    js_sys::Reflect::set(&defaults, &JsValue::from_str(key), &JsValue::from_bool(default))?;
    let items = JsFuture::from(storage_sync_get(&defaults)?).await?;
    let value = js_sys::Reflect::get(&items, &JsValue::from_str(key))?;
    Ok(value.as_bool().unwrap_or(default))
}

/// Forwards changes of the persisted toggle for the lifetime of the page.
pub fn watch_effects(key: String, sender: Sender<EffectInput<Element>>) {
    let callback = Closure::wrap(Box::new(move |changes: JsValue, area: JsValue| {
        if area.as_string().as_deref() != Some("sync") {
            return;
        }
        let enabled = js_sys::Reflect::get(&changes, &JsValue::from_str(&key))
            .ok()
            .filter(|change| !change.is_undefined())
            .and_then(|change| js_sys::Reflect::get(&change, &JsValue::from_str("newValue")).ok())
            .and_then(|value| value.as_bool());
        if let Some(enabled) = enabled {
            debug!(enabled, "effects toggle changed");
            let _ = sender.send(EffectInput::EffectsEnabled(enabled));
            crate::runtime::wake();
        }
    }) as Box<dyn FnMut(JsValue, JsValue)>);
    storage_on_changed(&callback);
    callback.forget();
}

/// Forwards recognized runtime messages; everything else is left to other listeners.
pub fn listen_messages(sender: Sender<EffectInput<Element>>) {
    let callback = Closure::wrap(Box::new(move |message: JsValue| {
        let Some(json) = js_sys::JSON::stringify(&message)
            .ok()
            .and_then(|s| s.as_string())
        else {
            return;
        };
        match ExtensionMessage::parse(&json) {
            Some(parsed) => {
                debug!(kind = ?parsed, "extension message");
                let _ = sender.send(EffectInput::from(parsed));
                crate::runtime::wake();
            }
            None => trace!(%json, "message ignored"),
        }
    }) as Box<dyn FnMut(JsValue)>);
    runtime_on_message(&callback);
    callback.forget();
}
