use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Window};

pub mod bpmn;
pub mod coloring;
pub mod config;
pub mod constants; // Module for constants and default values
pub mod dom_utils;
pub mod error;
pub mod normalize;
pub mod payload;
pub mod poller;
pub mod popup;
pub mod retry;
pub mod viewer;

use config::WidgetConfig;
use error::WidgetError;
use payload::DiagramPayload;
use poller::PollTrigger;
use popup::PopupLauncher;
use viewer::MountedViewer;

// Main entry point for the WASM module
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Initialize better panic messages
    console_error_panic_hook::set_once();
    Ok(())
}

struct WidgetInner {
    popup: RefCell<Option<PopupLauncher>>,
    poller: RefCell<Option<PollTrigger>>,
    viewer: RefCell<Option<MountedViewer>>,
}

/// Handle returned to the host page. Zoom calls are ignored until the
/// diagram has rendered; `destroy()` detaches every listener and timer.
#[wasm_bindgen]
#[derive(Clone)]
pub struct WidgetHandle {
    inner: Rc<WidgetInner>,
}

impl WidgetHandle {
    fn with_viewer(&self, f: impl FnOnce(&viewer::DiagramViewer)) {
        if let Some(mounted) = self.inner.viewer.borrow().as_ref() {
            f(&mounted.viewer);
        }
    }

    pub fn viewer(&self) -> Option<viewer::DiagramViewer> {
        self.inner.viewer.borrow().as_ref().map(|m| m.viewer.clone())
    }
}

#[wasm_bindgen]
impl WidgetHandle {
    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&self) {
        self.with_viewer(|v| v.zoom_in());
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&self) {
        self.with_viewer(|v| v.zoom_out());
    }

    #[wasm_bindgen(js_name = zoomFit)]
    pub fn zoom_fit(&self) {
        self.with_viewer(|v| v.zoom_fit());
    }

    #[wasm_bindgen(js_name = resetZoom)]
    pub fn reset_zoom(&self) {
        self.with_viewer(|v| v.reset_zoom());
    }

    #[wasm_bindgen(js_name = zoomLevel)]
    pub fn zoom_level(&self) -> Option<f64> {
        self.viewer().and_then(|v| v.zoom_level())
    }

    #[wasm_bindgen(getter, js_name = hasDiagram)]
    pub fn has_diagram(&self) -> bool {
        self.inner.viewer.borrow().is_some()
    }

    /// `"idle"`, `"loading"`, `"rendered"`, `"failed"` or `"none"` without
    /// a diagram.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.viewer()
            .map(|v| v.state().to_string())
            .unwrap_or_else(|| "none".to_string())
    }

    pub fn destroy(&self) {
        self.inner.popup.borrow_mut().take();
        self.inner.poller.borrow_mut().take();
        if let Some(mounted) = self.inner.viewer.borrow_mut().take() {
            mounted.viewer.destroy();
        }
    }
}

/// Wire the three behaviours into `document`.
pub fn mount(
    window: &Window,
    document: &Document,
    config: WidgetConfig,
    diagram: Option<DiagramPayload>,
) -> Result<WidgetHandle, JsValue> {
    config.validate()?;

    let popup = if config.popup.enabled {
        Some(PopupLauncher::install(window, document, config.popup.clone())?)
    } else {
        None
    };
    let poller = if config.poll.enabled {
        Some(PollTrigger::start(window, &config.poll)?)
    } else {
        None
    };
    let viewer = match diagram {
        Some(payload) => viewer::mount(window, document, config.viewer.clone(), payload)?,
        None => None,
    };

    Ok(WidgetHandle {
        inner: Rc::new(WidgetInner {
            popup: RefCell::new(popup),
            poller: RefCell::new(poller),
            viewer: RefCell::new(viewer),
        }),
    })
}

/// `mountWidget({ config?, diagram? })`
#[wasm_bindgen(js_name = mountWidget)]
pub fn mount_widget(options: JsValue) -> Result<WidgetHandle, JsValue> {
    let (window, document) = page_globals()?;

    let (config, diagram) = read_mount_options(&options)?;
    mount(&window, &document, config, diagram)
}

fn page_globals() -> Result<(Window, Document), WidgetError> {
    let window = web_sys::window().ok_or_else(|| WidgetError::MissingDom("window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| WidgetError::MissingDom("window.document".into()))?;
    Ok((window, document))
}

fn is_absent(value: &JsValue) -> bool {
    value.is_undefined() || value.is_null()
}

/// Split `{ config?, diagram? }` into its parsed halves.
pub fn read_mount_options(
    options: &JsValue,
) -> Result<(WidgetConfig, Option<DiagramPayload>), WidgetError> {
    if is_absent(options) {
        return Ok((WidgetConfig::default(), None));
    }
    if !options.is_object() {
        return Err(WidgetError::InvalidConfig(
            "mountWidget expects an options object".into(),
        ));
    }
    let field = |name: &str| {
        js_sys::Reflect::get(options, &JsValue::from_str(name))
            .map_err(|e| WidgetError::InvalidConfig(error::js_error_message(&e)))
    };

    let config = WidgetConfig::from_js(&field("config")?)?;
    let diagram = field("diagram")?;
    let diagram = if is_absent(&diagram) {
        None
    } else {
        Some(DiagramPayload::from_js(&diagram)?)
    };
    Ok((config, diagram))
}

thread_local! {
    static PAGE_WIDGET: RefCell<Option<WidgetHandle>> = RefCell::new(None);
}

/// Legacy page bootstrap: reads `window.bpmnData` once the page has loaded,
/// mounts with default options and publishes the handle as
/// `window.bpmnViewer` when a diagram is present.
#[wasm_bindgen(js_name = bootstrapFromPage)]
pub fn bootstrap_from_page() -> Result<(), JsValue> {
    let (window, document) = page_globals()?;

    if document.ready_state() == "complete" {
        return mount_from_page(&window, &document);
    }

    let load_window = window.clone();
    let on_load = Closure::once_into_js(move || {
        let Some(document) = load_window.document() else {
            return;
        };
        if let Err(e) = mount_from_page(&load_window, &document) {
            web_sys::console::error_1(&format!("Widget bootstrap failed: {:?}", e).into());
        }
    });
    window.add_event_listener_with_callback("load", on_load.unchecked_ref())?;
    Ok(())
}

fn page_diagram(window: &Window) -> Option<DiagramPayload> {
    let data = js_sys::Reflect::get(window.as_ref(), &JsValue::from_str("bpmnData")).ok()?;
    if is_absent(&data) {
        return None;
    }
    match DiagramPayload::from_js(&data) {
        Ok(payload) if payload.has_document() => Some(payload),
        Ok(_) => None,
        Err(e) => {
            web_sys::console::warn_1(&format!("Ignoring window.bpmnData: {}", e).into());
            None
        }
    }
}

fn mount_from_page(window: &Window, document: &Document) -> Result<(), JsValue> {
    let handle = mount(window, document, WidgetConfig::default(), page_diagram(window))?;

    if handle.has_diagram() {
        js_sys::Reflect::set(
            window.as_ref(),
            &JsValue::from_str("bpmnViewer"),
            &JsValue::from(handle.clone()),
        )?;
    }

    let previous = PAGE_WIDGET.with(|slot| slot.borrow_mut().replace(handle));
    if let Some(previous) = previous {
        previous.destroy();
    }
    Ok(())
}
