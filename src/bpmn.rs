//! Bindings to the bpmn-js navigated viewer.
//!
//! The dashboard loads `bpmn-navigated-viewer.production.min.js`, which
//! defines the `BpmnJS` global. Only the handful of services the widget
//! touches are declared: the viewer itself, `canvas` for zoom and
//! `elementRegistry` for looking up shapes.

use js_sys::{Array, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

use crate::coloring::{ElementSource, NamedElement};
use crate::config::NodeStyle;
use crate::constants::FIT_VIEWPORT;
use crate::dom_utils::inline_style;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = BpmnJS)]
    #[derive(Clone, Debug)]
    pub type BpmnViewer;

    #[wasm_bindgen(constructor, catch, js_class = "BpmnJS")]
    fn construct(options: &JsValue) -> Result<BpmnViewer, JsValue>;

    #[wasm_bindgen(method, catch, js_class = "BpmnJS", js_name = importXML)]
    fn import_xml_promise(this: &BpmnViewer, xml: &str) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_class = "BpmnJS", js_name = get)]
    fn service(this: &BpmnViewer, name: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_class = "BpmnJS")]
    fn destroy(this: &BpmnViewer) -> Result<(), JsValue>;

    #[derive(Clone, Debug)]
    pub type Canvas;

    #[wasm_bindgen(method, catch, js_name = zoom)]
    pub fn current_zoom(this: &Canvas) -> Result<f64, JsValue>;

    #[wasm_bindgen(method, catch, js_name = zoom)]
    pub fn set_zoom(this: &Canvas, level: f64) -> Result<f64, JsValue>;

    #[wasm_bindgen(method, catch, js_name = zoom)]
    fn zoom_mode(this: &Canvas, mode: &str) -> Result<f64, JsValue>;

    /// Tell the canvas its container changed size.
    #[wasm_bindgen(method, catch)]
    pub fn resized(this: &Canvas) -> Result<(), JsValue>;

    #[derive(Clone, Debug)]
    pub type ElementRegistry;

    #[wasm_bindgen(method, js_name = getAll)]
    fn get_all(this: &ElementRegistry) -> Array;

    #[wasm_bindgen(method, js_name = getGraphics)]
    fn get_graphics(this: &ElementRegistry, element: &DiagramShape) -> Option<Element>;

    /// Shape or connection held by the registry.
    #[derive(Clone, Debug)]
    pub type DiagramShape;

    #[wasm_bindgen(method, getter, js_name = "type")]
    fn element_type(this: &DiagramShape) -> Option<String>;

    #[wasm_bindgen(method, getter, js_name = businessObject)]
    fn business_object(this: &DiagramShape) -> Option<BusinessObject>;

    #[derive(Clone, Debug)]
    pub type BusinessObject;

    #[wasm_bindgen(method, getter)]
    fn name(this: &BusinessObject) -> Option<String>;
}

impl BpmnViewer {
    /// `new BpmnJS({ container })`. Fails when the bundle is not loaded.
    pub fn new(container: &Element) -> Result<BpmnViewer, JsValue> {
        let options = Object::new();
        Reflect::set(&options, &"container".into(), container)?;
        Self::construct(&options)
    }

    /// Import a BPMN XML document. Resolves with the warnings bpmn-js
    /// collected while parsing.
    pub async fn import_xml(&self, xml: &str) -> Result<Vec<String>, JsValue> {
        let promise = self.import_xml_promise(xml)?;
        let result = wasm_bindgen_futures::JsFuture::from(promise).await?;
        Ok(import_warnings(&result))
    }

    pub fn canvas(&self) -> Result<Canvas, JsValue> {
        Ok(self.service("canvas")?.unchecked_into())
    }

    pub fn element_registry(&self) -> Result<ElementRegistry, JsValue> {
        Ok(self.service("elementRegistry")?.unchecked_into())
    }

    pub fn dispose(&self) {
        if let Err(e) = self.destroy() {
            web_sys::console::warn_1(&format!("Failed to destroy diagram viewer: {:?}", e).into());
        }
    }
}

impl Canvas {
    pub fn fit_viewport(&self) -> Result<(), JsValue> {
        self.zoom_mode(FIT_VIEWPORT).map(|_| ())
    }
}

fn import_warnings(result: &JsValue) -> Vec<String> {
    let Ok(warnings) = Reflect::get(result, &"warnings".into()) else {
        return Vec::new();
    };
    if !Array::is_array(&warnings) {
        return Vec::new();
    }
    Array::from(&warnings)
        .iter()
        .map(|w| crate::error::js_error_message(&w))
        .collect()
}

/// Paint the visual of a shape's graphics group (`.djs-visual > *`).
/// Returns `false` when the group has no visual child.
pub fn paint_graphics(gfx: &Element, style: &NodeStyle) -> Result<bool, JsValue> {
    let Some(visual) = gfx.query_selector(".djs-visual > *")? else {
        return Ok(false);
    };
    let Some(inline) = inline_style(&visual) else {
        return Ok(false);
    };
    inline.set_property("fill", &style.fill)?;
    inline.set_property("stroke", &style.stroke)?;
    Ok(true)
}

impl ElementSource for ElementRegistry {
    type Handle = DiagramShape;

    fn named_elements(&self) -> Vec<NamedElement<DiagramShape>> {
        self.get_all()
            .iter()
            .map(|value| value.unchecked_into::<DiagramShape>())
            .filter_map(|shape| {
                let name = shape.business_object()?.name().filter(|n| !n.is_empty())?;
                Some(NamedElement {
                    name,
                    kind: shape.element_type().unwrap_or_default(),
                    handle: shape,
                })
            })
            .collect()
    }

    fn paint(&self, handle: &DiagramShape, style: &NodeStyle) -> Result<bool, JsValue> {
        match self.get_graphics(handle) {
            Some(gfx) => paint_graphics(&gfx, style),
            None => Ok(false),
        }
    }
}
