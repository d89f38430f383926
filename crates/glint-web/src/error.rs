use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("no global `window`")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("document has no body")]
    NoBody,
    #[error("canvas has no 2d context")]
    NoContext,
    #[error("unexpected DOM node: expected {0}")]
    NodeType(&'static str),
    #[error("javascript error: {0}")]
    Js(String),
    #[error(transparent)]
    Config(#[from] glint_core::ConfigError),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for WebError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| js_sys::JSON::stringify(&value).ok().and_then(|s| s.as_string()))
            .unwrap_or_else(|| format!("{value:?}"));
        WebError::Js(message)
    }
}

#[cfg(target_arch = "wasm32")]
impl From<WebError> for wasm_bindgen::JsValue {
    fn from(err: WebError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
