//! dom_utils.rs – thin helper layer for repetitive DOM operations.
//!
//! Small wrappers for the show / hide / relabel patterns of the widget's
//! fixed DOM fragments, plus an owned event-listener guard.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, SvgElement};

/// Set the inline `display` of an element (`"flex"`, `"block"`, ...).
pub fn show(el: &Element, display: &str) {
    if let Some(style) = inline_style(el) {
        let _ = style.set_property("display", display);
    }
}

pub fn hide(el: &Element) {
    show(el, "none");
}

/// Inline `display` value, empty when unset.
pub fn display_of(el: &Element) -> String {
    inline_style(el)
        .and_then(|style| style.get_property_value("display").ok())
        .unwrap_or_default()
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

/// Inline style of either an HTML or an SVG element.
pub fn inline_style(el: &Element) -> Option<web_sys::CssStyleDeclaration> {
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        return Some(html.style());
    }
    el.dyn_ref::<SvgElement>().map(|svg| svg.style())
}

/// Look up an element by id, `None` when absent.
pub fn element(document: &Document, id: &str) -> Option<Element> {
    document.get_element_by_id(id)
}

/// An event listener that is removed again when dropped.
pub struct EventListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new<F>(target: &EventTarget, event: &'static str, handler: F) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

// ---------------------------------------------------------------------------
// wasm-bindgen tests
// ---------------------------------------------------------------------------
