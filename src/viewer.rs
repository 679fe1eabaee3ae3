//! Diagram viewer: decode → render → wait for layout → fit and recolor.
//!
//! State machine: `Idle → Loading → {Rendered, Failed}`. Only a failed
//! import is terminal and user-visible; problems while fitting or coloring
//! are logged and the diagram stays rendered.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Window};

use crate::bpmn::{BpmnViewer, Canvas};
use crate::coloring::{color_elements, ColoringReport};
use crate::config::ViewerConfig;
use crate::dom_utils::{self, EventListener};
use crate::error::{js_error_message, WidgetError};
use crate::payload::DiagramPayload;
use crate::retry;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerState {
    Idle,
    Loading,
    Rendered,
    Failed(String),
}

impl fmt::Display for ViewerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerState::Idle => write!(f, "idle"),
            ViewerState::Loading => write!(f, "loading"),
            ViewerState::Rendered => write!(f, "rendered"),
            ViewerState::Failed(_) => write!(f, "failed"),
        }
    }
}

/// The page fragments the viewer reads and writes. Only the container is
/// required; the rest degrade to no-ops when absent.
pub struct ViewerDom {
    pub container: Element,
    pub loading: Option<Element>,
    pub controls: Option<Element>,
    pub legend: Option<Element>,
}

impl ViewerDom {
    pub fn locate(document: &Document, config: &ViewerConfig) -> Option<Self> {
        Some(Self {
            container: dom_utils::element(document, &config.container_id)?,
            loading: dom_utils::element(document, &config.loading_id),
            controls: dom_utils::element(document, &config.controls_id),
            legend: dom_utils::element(document, &config.legend_id),
        })
    }
}

struct ViewerInner {
    state: ViewerState,
    engine: Option<BpmnViewer>,
    destroyed: bool,
}

/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct DiagramViewer {
    dom: Rc<ViewerDom>,
    config: Rc<ViewerConfig>,
    payload: Rc<DiagramPayload>,
    inner: Rc<RefCell<ViewerInner>>,
}

impl DiagramViewer {
    pub fn new(dom: ViewerDom, config: ViewerConfig, payload: DiagramPayload) -> Self {
        Self {
            dom: Rc::new(dom),
            config: Rc::new(config),
            payload: Rc::new(payload),
            inner: Rc::new(RefCell::new(ViewerInner {
                state: ViewerState::Idle,
                engine: None,
                destroyed: false,
            })),
        }
    }

    pub fn state(&self) -> ViewerState {
        self.inner.borrow().state.clone()
    }

    pub fn is_rendered(&self) -> bool {
        let inner = self.inner.borrow();
        inner.state == ViewerState::Rendered && !inner.destroyed
    }

    fn set_state(&self, state: ViewerState) {
        self.inner.borrow_mut().state = state;
    }

    fn is_destroyed(&self) -> bool {
        self.inner.borrow().destroyed
    }

    /// Idle → Loading: show the loading message.
    pub fn begin_loading(&self) {
        if self.state() != ViewerState::Idle {
            return;
        }
        if let Some(loading) = &self.dom.loading {
            dom_utils::set_text(loading, &self.config.loading_text);
        }
        self.set_state(ViewerState::Loading);
    }

    /// Run the whole pipeline. Resolves once the view is initialized (or
    /// gave up waiting for layout); the error is also surfaced in the page.
    pub async fn load(&self) -> Result<(), WidgetError> {
        self.begin_loading();

        let engine = match self.import().await {
            Ok(engine) => engine,
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };

        let destroyed = self.is_destroyed();
        if destroyed {
            engine.dispose();
            return Ok(());
        }
        {
            let mut inner = self.inner.borrow_mut();
            inner.engine = Some(engine);
            inner.state = ViewerState::Rendered;
        }
        web_sys::console::log_1(&"Diagram imported".into());

        self.reveal();
        self.initialize_view().await;
        Ok(())
    }

    async fn import(&self) -> Result<BpmnViewer, WidgetError> {
        let xml = self.payload.decode_xml()?;
        let engine = BpmnViewer::new(&self.dom.container)
            .map_err(|e| WidgetError::EngineUnavailable(js_error_message(&e)))?;

        match engine.import_xml(&xml).await {
            Ok(warnings) => {
                if !warnings.is_empty() {
                    web_sys::console::warn_1(&format!("Diagram import warnings: {:?}", warnings).into());
                }
                Ok(engine)
            }
            Err(e) => {
                engine.dispose();
                Err(WidgetError::Import(js_error_message(&e)))
            }
        }
    }

    fn fail(&self, err: &WidgetError) {
        web_sys::console::error_1(&format!("Error importing diagram: {}", err).into());
        if let Some(loading) = &self.dom.loading {
            dom_utils::set_text(loading, &self.config.error_text);
        }
        self.set_state(ViewerState::Failed(err.to_string()));
    }

    /// Loading → Rendered: controls and legend appear, the indicator goes.
    fn reveal(&self) {
        if let Some(controls) = &self.dom.controls {
            dom_utils::show(controls, "flex");
        }
        if let Some(legend) = &self.dom.legend {
            dom_utils::show(legend, "block");
        }
        if let Some(loading) = &self.dom.loading {
            dom_utils::hide(loading);
        }
    }

    async fn initialize_view(&self) {
        let container = self.dom.container.clone();
        let laid_out = retry::wait_until(&self.config.retry, || container.client_width() > 0).await;
        if !laid_out {
            web_sys::console::warn_1(
                &"Diagram container never received a width; view left unfitted".into(),
            );
            return;
        }
        if self.is_destroyed() {
            return;
        }
        match self.fit_and_color() {
            Ok(report) => web_sys::console::log_1(&report.summary().into()),
            Err(e) => web_sys::console::error_1(
                &format!("Error fitting or coloring diagram: {}", js_error_message(&e)).into(),
            ),
        }
    }

    fn fit_and_color(&self) -> Result<ColoringReport, JsValue> {
        let engine = self
            .engine()
            .ok_or_else(|| JsValue::from_str("diagram is not rendered"))?;
        engine.canvas()?.fit_viewport()?;
        let registry = engine.element_registry()?;
        color_elements(
            &registry,
            &self.payload,
            &self.config.palette,
            &self.config.excluded_element_types,
        )
    }

    fn engine(&self) -> Option<BpmnViewer> {
        self.inner.borrow().engine.clone()
    }

    fn with_canvas<F>(&self, action: &str, op: F)
    where
        F: FnOnce(&Canvas) -> Result<(), JsValue>,
    {
        let engine = if self.is_rendered() { self.engine() } else { None };
        let Some(engine) = engine else {
            web_sys::console::warn_1(&format!("{} ignored: diagram is not rendered", action).into());
            return;
        };
        if let Err(e) = engine.canvas().and_then(|canvas| op(&canvas)) {
            web_sys::console::error_1(&format!("{} failed: {}", action, js_error_message(&e)).into());
        }
    }

    pub fn zoom_in(&self) {
        let step = self.config.zoom_step;
        self.with_canvas("Zoom in", |canvas| {
            let level = canvas.current_zoom()?;
            canvas.set_zoom(level + step).map(|_| ())
        });
    }

    pub fn zoom_out(&self) {
        let step = self.config.zoom_step;
        let floor = self.config.min_zoom;
        self.with_canvas("Zoom out", |canvas| {
            let level = canvas.current_zoom()?;
            canvas.set_zoom((level - step).max(floor)).map(|_| ())
        });
    }

    pub fn zoom_fit(&self) {
        self.with_canvas("Zoom to fit", |canvas| canvas.fit_viewport());
    }

    pub fn reset_zoom(&self) {
        self.with_canvas("Reset zoom", |canvas| canvas.set_zoom(1.0).map(|_| ()));
    }

    /// Current zoom factor, `None` until rendered.
    pub fn zoom_level(&self) -> Option<f64> {
        if !self.is_rendered() {
            return None;
        }
        self.engine()?.canvas().ok()?.current_zoom().ok()
    }

    /// Window resize: re-measure and refit. Silent before render.
    pub fn handle_resize(&self) {
        if !self.is_rendered() {
            return;
        }
        self.with_canvas("Resize", |canvas| {
            canvas.resized()?;
            canvas.fit_viewport()
        });
    }

    pub fn destroy(&self) {
        let engine = {
            let mut inner = self.inner.borrow_mut();
            inner.destroyed = true;
            inner.engine.take()
        };
        if let Some(engine) = engine {
            engine.dispose();
        }
    }
}

/// A viewer wired to the page: loading in flight and resize listener
/// attached. Dropping it detaches the listener.
pub struct MountedViewer {
    pub viewer: DiagramViewer,
    _resize: EventListener,
}

/// Start the viewer when the payload carries a document and the container
/// exists; `Ok(None)` otherwise.
pub fn mount(
    window: &Window,
    document: &Document,
    config: ViewerConfig,
    payload: DiagramPayload,
) -> Result<Option<MountedViewer>, JsValue> {
    if !payload.has_document() {
        return Ok(None);
    }
    let Some(dom) = ViewerDom::locate(document, &config) else {
        web_sys::console::warn_1(
            &format!("Diagram container #{} not found; viewer disabled", config.container_id).into(),
        );
        return Ok(None);
    };

    let viewer = DiagramViewer::new(dom, config, payload);
    viewer.begin_loading();

    let task = viewer.clone();
    spawn_local(async move {
        // Failures are already logged and shown in the loading indicator.
        let _ = task.load().await;
    });

    let resize_target = viewer.clone();
    let resize = EventListener::new(window.as_ref(), "resize", move |_| resize_target.handle_resize())?;

    Ok(Some(MountedViewer {
        viewer,
        _resize: resize,
    }))
}
