//! Widget configuration.
//!
//! Every field has a default that reproduces the dashboard's historical
//! behaviour, so the host only passes the keys it wants to override:
//!
//! ```js
//! mountWidget({ config: { poll: { intervalMs: 30000 } }, diagram: bpmnData });
//! ```

use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::constants::*;
use crate::error::WidgetError;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
    pub popup: PopupConfig,
    pub poll: PollConfig,
    pub viewer: ViewerConfig,
}

impl WidgetConfig {
    /// Read a config object handed over from JS. `undefined`/`null` yield
    /// the defaults.
    pub fn from_js(value: &JsValue) -> Result<Self, WidgetError> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        let config: WidgetConfig = serde_wasm_bindgen::from_value(value.clone())
            .map_err(|e| WidgetError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WidgetError> {
        if self.popup.width == 0 || self.popup.height == 0 {
            return Err(WidgetError::InvalidConfig(
                "popup width and height must be non-zero".into(),
            ));
        }
        if self.poll.enabled && self.poll.interval_ms == 0 {
            return Err(WidgetError::InvalidConfig(
                "poll interval must be non-zero".into(),
            ));
        }
        // setInterval takes a signed 32-bit delay.
        if i32::try_from(self.poll.interval_ms).is_err() {
            return Err(WidgetError::InvalidConfig(format!(
                "poll interval must be at most {} ms",
                i32::MAX
            )));
        }
        if self.viewer.zoom_step <= 0.0 || self.viewer.min_zoom <= 0.0 {
            return Err(WidgetError::InvalidConfig(
                "zoom step and minimum zoom must be positive".into(),
            ));
        }
        if self.viewer.retry.initial_delay_ms == 0 {
            return Err(WidgetError::InvalidConfig(
                "layout retry delay must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Task-card popup launcher.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PopupConfig {
    pub enabled: bool,
    /// CSS selector matched with `Element.closest()` from the click target.
    pub card_selector: String,
    pub url_attribute: String,
    pub window_name: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            card_selector: DEFAULT_CARD_SELECTOR.to_string(),
            url_attribute: DEFAULT_CARD_URL_ATTRIBUTE.to_string(),
            window_name: DEFAULT_POPUP_WINDOW_NAME.to_string(),
            width: DEFAULT_POPUP_WIDTH,
            height: DEFAULT_POPUP_HEIGHT,
        }
    }
}

/// Periodic refresh of the host dashboard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PollConfig {
    pub enabled: bool,
    pub interval_ms: u32,
    pub strategy: RefreshStrategy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            strategy: RefreshStrategy::default(),
        }
    }
}

/// How the embedded widget asks its host to refresh.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RefreshStrategy {
    /// Click the first `<button>` in the parent document whose text contains
    /// `glyph`.
    ParentButton { glyph: String },
    /// `parent.postMessage({ type: message }, "*")` for hosts that listen
    /// instead of exposing their DOM.
    PostMessage {
        #[serde(default = "default_refresh_message")]
        message: String,
    },
}

impl Default for RefreshStrategy {
    fn default() -> Self {
        RefreshStrategy::ParentButton {
            glyph: DEFAULT_REFRESH_GLYPH.to_string(),
        }
    }
}

fn default_refresh_message() -> String {
    DEFAULT_REFRESH_MESSAGE.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeStyle {
    pub fill: String,
    pub stroke: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Palette {
    pub completed: NodeStyle,
    pub pending: NodeStyle,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Palette::default().completed
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            completed: NodeStyle {
                fill: COMPLETED_FILL.to_string(),
                stroke: COMPLETED_STROKE.to_string(),
            },
            pending: NodeStyle {
                fill: PENDING_FILL.to_string(),
                stroke: PENDING_STROKE.to_string(),
            },
        }
    }
}

/// Diagram viewer: DOM ids, user-facing texts, colors and zoom behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub container_id: String,
    pub loading_id: String,
    pub controls_id: String,
    pub legend_id: String,
    pub loading_text: String,
    pub error_text: String,
    pub palette: Palette,
    pub retry: RetryPolicy,
    pub zoom_step: f64,
    pub min_zoom: f64,
    /// Element types (`bpmn:SequenceFlow`, `label`, ...) never colored even
    /// when their name matches.
    pub excluded_element_types: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            loading_id: DEFAULT_LOADING_ID.to_string(),
            controls_id: DEFAULT_CONTROLS_ID.to_string(),
            legend_id: DEFAULT_LEGEND_ID.to_string(),
            loading_text: DEFAULT_LOADING_TEXT.to_string(),
            error_text: DEFAULT_ERROR_TEXT.to_string(),
            palette: Palette::default(),
            retry: RetryPolicy::default(),
            zoom_step: ZOOM_STEP,
            min_zoom: MIN_ZOOM,
            excluded_element_types: Vec::new(),
        }
    }
}
