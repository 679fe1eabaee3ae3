//! Task-card popup launcher.
//!
//! A single delegated `click` listener on `<body>` serves every task card,
//! including cards the dashboard renders after the widget was mounted.

use std::fmt;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, Window};

use crate::config::PopupConfig;
use crate::dom_utils::EventListener;
use crate::error::WidgetError;

/// Size and screen position of the popup window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupGeometry {
    pub width: u32,
    pub height: u32,
    pub left: f64,
    pub top: f64,
}

impl PopupGeometry {
    /// Center a `width` x `height` window on a screen of the given size.
    pub fn centered(screen_width: f64, screen_height: f64, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            left: screen_width / 2.0 - f64::from(width) / 2.0,
            top: screen_height / 2.0 - f64::from(height) / 2.0,
        }
    }

    /// `window.open` feature string.
    pub fn features(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PopupGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scrollbars=yes, width={}, height={}, top={}, left={}",
            self.width, self.height, self.top, self.left
        )
    }
}

/// Nearest task card at or above the click target.
pub fn find_task_card(target: &Element, selector: &str) -> Option<Element> {
    target.closest(selector).ok().flatten()
}

/// URL stored on a card; empty attributes count as missing.
pub fn card_url(card: &Element, attribute: &str) -> Option<String> {
    card.get_attribute(attribute).filter(|url| !url.is_empty())
}

/// Open `url` in a centered popup and try to focus it. Returns `false` when
/// the browser blocked the window.
pub fn open_centered_popup(window: &Window, url: &str, config: &PopupConfig) -> bool {
    let (screen_width, screen_height) = match window.screen() {
        Ok(screen) => (
            screen.width().unwrap_or(0) as f64,
            screen.height().unwrap_or(0) as f64,
        ),
        Err(_) => (0.0, 0.0),
    };
    let geometry = PopupGeometry::centered(screen_width, screen_height, config.width, config.height);

    match window.open_with_url_and_target_and_features(url, &config.window_name, &geometry.features()) {
        Ok(Some(popup)) => {
            if let Err(e) = popup.focus() {
                web_sys::console::warn_1(&format!("Could not focus popup: {:?}", e).into());
            }
            true
        }
        Ok(None) => {
            web_sys::console::warn_1(&format!("Popup for {} was blocked", url).into());
            false
        }
        Err(e) => {
            web_sys::console::error_1(&format!("Failed to open popup: {:?}", e).into());
            false
        }
    }
}

/// Owns the body click listener; dropping it detaches the launcher.
pub struct PopupLauncher {
    _listener: EventListener,
}

impl PopupLauncher {
    pub fn install(window: &Window, document: &Document, config: PopupConfig) -> Result<Self, wasm_bindgen::JsValue> {
        let body = document
            .body()
            .ok_or_else(|| WidgetError::MissingDom("document.body".into()))?;

        let window = window.clone();
        let listener = EventListener::new(&body, "click", move |event: Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let Some(card) = find_task_card(&target, &config.card_selector) else {
                return;
            };
            event.prevent_default();
            if let Some(url) = card_url(&card, &config.url_attribute) {
                open_centered_popup(&window, &url, &config);
            }
        })?;

        Ok(Self { _listener: listener })
    }
}
