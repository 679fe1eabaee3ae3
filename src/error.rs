//! Error type shared by the widget modules.
//!
//! DOM plumbing keeps returning `Result<_, JsValue>` like every other
//! web-sys call; `WidgetError` covers the failures the widget itself decides
//! on (bad payload, missing engine, rejected import) and converts into a JS
//! `Error` at the `#[wasm_bindgen]` boundary.

use std::fmt;

use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetError {
    /// A DOM global or node the widget needs (window, document, body) is
    /// absent.
    MissingDom(String),
    /// The base64 payload could not be decoded.
    Decode(String),
    /// The `BpmnJS` global is missing or its constructor threw.
    EngineUnavailable(String),
    /// `importXML` rejected the document.
    Import(String),
    /// Host-supplied options were rejected.
    InvalidConfig(String),
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetError::MissingDom(what) => write!(f, "Missing DOM node: {}", what),
            WidgetError::Decode(msg) => write!(f, "Invalid diagram payload: {}", msg),
            WidgetError::EngineUnavailable(msg) => write!(f, "Diagram engine unavailable: {}", msg),
            WidgetError::Import(msg) => write!(f, "Diagram import failed: {}", msg),
            WidgetError::InvalidConfig(msg) => write!(f, "Invalid widget options: {}", msg),
        }
    }
}

impl std::error::Error for WidgetError {}

impl From<WidgetError> for JsValue {
    fn from(err: WidgetError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Best-effort message extraction from a thrown JS value.
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Ok(message) = js_sys::Reflect::get(value, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{:?}", value)
}
