//! Diagram payload injected by the host page.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::error::WidgetError;

/// Matches `atob`: standard alphabet, padding optional.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Completion state a task name is colored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Completed,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramPayload {
    pub xml_b64: String,
    #[serde(default)]
    pub completed_tasks: Vec<String>,
    #[serde(default)]
    pub pending_tasks: Vec<String>,
}

impl DiagramPayload {
    pub fn from_js(value: &JsValue) -> Result<Self, WidgetError> {
        serde_wasm_bindgen::from_value(value.clone()).map_err(|e| WidgetError::Decode(e.to_string()))
    }

    /// An empty document string means "no diagram", same as an absent payload.
    pub fn has_document(&self) -> bool {
        !self.xml_b64.trim().is_empty()
    }

    /// base64 -> bytes -> UTF-8 text. Invalid UTF-8 is replaced rather than
    /// rejected and a leading BOM is dropped, as `TextDecoder('utf-8')` does.
    pub fn decode_xml(&self) -> Result<String, WidgetError> {
        let compact: String = self
            .xml_b64
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = LENIENT_STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| WidgetError::Decode(e.to_string()))?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(text.strip_prefix('\u{feff}').unwrap_or(&*text).to_string())
    }

    /// Completed names first, then pending ones, in payload order.
    pub fn tasks(&self) -> impl Iterator<Item = (&str, TaskState)> + '_ {
        self.completed_tasks
            .iter()
            .map(|name| (name.as_str(), TaskState::Completed))
            .chain(
                self.pending_tasks
                    .iter()
                    .map(|name| (name.as_str(), TaskState::Pending)),
            )
    }
}
