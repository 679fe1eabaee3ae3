//! Poll trigger: periodically asks the host dashboard to refresh.
//!
//! The widget runs inside the dashboard's iframe and owns no data-fetch
//! logic of its own; it reuses the host's refresh control instead.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

use crate::config::{PollConfig, RefreshStrategy};

/// What a single poll tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Clicked,
    Posted,
    ButtonNotFound,
    /// Not embedded in a frame, or the parent is cross-origin.
    NoParentDocument,
}

/// First `<button>` in `document` whose text contains `glyph`.
///
/// The document usually belongs to the parent frame, whose nodes fail an
/// `instanceof` check against this frame's constructors, so the casts are
/// unchecked.
pub fn find_refresh_button(document: &Document, glyph: &str) -> Option<HtmlElement> {
    let buttons = document.query_selector_all("button").ok()?;
    (0..buttons.length())
        .filter_map(|i| buttons.item(i))
        .map(|node| node.unchecked_into::<HtmlElement>())
        .find(|button| {
            button
                .text_content()
                .map_or(false, |text| text.contains(glyph))
        })
}

/// Click the refresh button of `document`, if it has one.
pub fn click_refresh_button(document: &Document, glyph: &str) -> RefreshOutcome {
    match find_refresh_button(document, glyph) {
        Some(button) => {
            button.click();
            RefreshOutcome::Clicked
        }
        None => {
            web_sys::console::log_1(&format!("Refresh button '{}' not found", glyph).into());
            RefreshOutcome::ButtonNotFound
        }
    }
}

fn parent_window(window: &Window) -> Option<Window> {
    let parent = window.parent().ok().flatten()?;
    if Object::is(parent.as_ref(), window.as_ref()) {
        return None;
    }
    Some(parent)
}

/// Reading `parent.document` throws for cross-origin hosts, so go through
/// `Reflect` instead of the infallible web-sys getter. The value comes from
/// another realm, hence no `dyn_into`.
fn parent_document(window: &Window) -> Option<Document> {
    let parent = parent_window(window)?;
    let document = Reflect::get(parent.as_ref(), &JsValue::from_str("document")).ok()?;
    if document.is_undefined() || document.is_null() {
        return None;
    }
    Some(document.unchecked_into::<Document>())
}

/// Run one refresh attempt against the host.
pub fn trigger_refresh(window: &Window, strategy: &RefreshStrategy) -> RefreshOutcome {
    match strategy {
        RefreshStrategy::ParentButton { glyph } => {
            let Some(document) = parent_document(window) else {
                web_sys::console::log_1(&"Refresh skipped: parent document not accessible".into());
                return RefreshOutcome::NoParentDocument;
            };
            click_refresh_button(&document, glyph)
        }
        RefreshStrategy::PostMessage { message } => {
            let Some(parent) = parent_window(window) else {
                web_sys::console::log_1(&"Refresh skipped: widget is not embedded".into());
                return RefreshOutcome::NoParentDocument;
            };
            let body = Object::new();
            let _ = Reflect::set(&body, &"type".into(), &JsValue::from_str(message));
            match parent.post_message(&body, "*") {
                Ok(()) => RefreshOutcome::Posted,
                Err(e) => {
                    web_sys::console::warn_1(&format!("Failed to post refresh message: {:?}", e).into());
                    RefreshOutcome::NoParentDocument
                }
            }
        }
    }
}

/// Interval timer driving [`trigger_refresh`]; dropping it stops polling.
pub struct PollTrigger {
    window: Window,
    interval_id: i32,
    _tick: Closure<dyn FnMut()>,
}

impl PollTrigger {
    pub fn start(window: &Window, config: &PollConfig) -> Result<Self, JsValue> {
        let tick_window = window.clone();
        let strategy = config.strategy.clone();
        let tick = Closure::wrap(Box::new(move || {
            trigger_refresh(&tick_window, &strategy);
        }) as Box<dyn FnMut()>);

        let timeout = i32::try_from(config.interval_ms)
            .map_err(|_| JsValue::from_str("poll interval out of range"))?;
        let interval_id = window.set_interval_with_callback_and_timeout_and_arguments(
            tick.as_ref().unchecked_ref(),
            timeout,
            &Array::new(),
        )?;

        Ok(Self {
            window: window.clone(),
            interval_id,
            _tick: tick,
        })
    }
}

impl Drop for PollTrigger {
    fn drop(&mut self) {
        self.window.clear_interval_with_handle(self.interval_id);
    }
}
