//! Viewer pipeline against an in-page stand-in for the `BpmnJS` global.
//!
//! The stand-in mirrors the slice of bpmn-js the widget uses: `importXML`,
//! `get('canvas')` with `zoom`/`resized`, and `get('elementRegistry')` with
//! `getAll`/`getGraphics`. Every canvas call is appended to
//! `container.engineLog` so tests can assert on fit and zoom traffic.

use base64::Engine;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::{Document, Element, Event};

use process_tracker_frontend::config::{PopupConfig, PollConfig, ViewerConfig, WidgetConfig};
use process_tracker_frontend::constants::DEFAULT_ERROR_TEXT;
use process_tracker_frontend::dom_utils;
use process_tracker_frontend::error::WidgetError;
use process_tracker_frontend::payload::DiagramPayload;
use process_tracker_frontend::retry::RetryPolicy;
use process_tracker_frontend::viewer::{self, DiagramViewer, ViewerDom, ViewerState};

wasm_bindgen_test_configure!(run_in_browser);

const ENGINE_STANDIN: &str = r#"
if (window.BpmnJS) { return; }
const SVG = 'http://www.w3.org/2000/svg';
window.BpmnJS = class {
  constructor(options) {
    const container = options.container;
    const log = [];
    container.engineLog = log;
    const svg = document.createElementNS(SVG, 'svg');
    container.appendChild(svg);
    const shape = (type, name) => {
      const gfx = document.createElementNS(SVG, 'g');
      const visual = document.createElementNS(SVG, 'g');
      visual.setAttribute('class', 'djs-visual');
      visual.appendChild(document.createElementNS(SVG, 'rect'));
      gfx.appendChild(visual);
      svg.appendChild(gfx);
      return { type, businessObject: { name }, gfx };
    };
    const shapes = [
      shape('bpmn:UserTask', 'Review'),
      shape('bpmn:Task', 'Ship'),
      shape('bpmn:Task', 'Archive'),
    ];
    let level = 1;
    this.log = log;
    this.canvas = {
      zoom(arg) {
        if (arg === undefined) { return level; }
        if (arg === 'fit-viewport') { log.push('fit'); level = 0.5; return level; }
        log.push('zoom:' + arg);
        level = arg;
        return level;
      },
      resized() { log.push('resized'); },
    };
    this.registry = {
      getAll() { return shapes; },
      getGraphics(el) { return el.gfx; },
    };
  }
  importXML(xml) {
    this.log.push('import');
    if (xml.startsWith('<broken')) {
      return Promise.reject(new Error('unparsable content'));
    }
    return Promise.resolve({ warnings: [] });
  }
  get(name) { return name === 'canvas' ? this.canvas : this.registry; }
  destroy() { this.log.push('destroy'); }
};
"#;

fn install_engine_standin() {
    Function::new_no_args(ENGINE_STANDIN)
        .call0(&JsValue::NULL)
        .unwrap();
}

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

/// `#<prefix>-canvas` and friends; controls and legend start hidden.
fn fixture(prefix: &str) -> ViewerConfig {
    let document = document();
    let body = document.body().unwrap();
    let config = ViewerConfig {
        container_id: format!("{}-canvas", prefix),
        loading_id: format!("{}-loading", prefix),
        controls_id: format!("{}-controls", prefix),
        legend_id: format!("{}-legend", prefix),
        ..ViewerConfig::default()
    };
    for id in [&config.container_id, &config.loading_id, &config.controls_id, &config.legend_id] {
        let el = document.create_element("div").unwrap();
        el.set_id(id);
        body.append_child(&el).unwrap();
    }
    for id in [&config.controls_id, &config.legend_id] {
        dom_utils::hide(&document.get_element_by_id(id).unwrap());
    }
    config
}

fn by_id(id: &str) -> Element {
    document().get_element_by_id(id).unwrap()
}

fn payload(xml: &str, completed: &[&str], pending: &[&str]) -> DiagramPayload {
    DiagramPayload {
        xml_b64: base64::engine::general_purpose::STANDARD.encode(xml),
        completed_tasks: completed.iter().map(|s| s.to_string()).collect(),
        pending_tasks: pending.iter().map(|s| s.to_string()).collect(),
    }
}

fn engine_log(config: &ViewerConfig) -> Vec<String> {
    let log = Reflect::get(&by_id(&config.container_id), &"engineLog".into()).unwrap();
    Array::from(&log).iter().filter_map(|v| v.as_string()).collect()
}

fn fit_count(config: &ViewerConfig) -> usize {
    engine_log(config).iter().filter(|entry| *entry == "fit").count()
}

/// Inline fill of the n-th shape's visual.
fn fill_of(config: &ViewerConfig, index: u32) -> String {
    let rects = by_id(&config.container_id).query_selector_all("rect").unwrap();
    let rect: Element = rects.item(index).unwrap().unchecked_into();
    dom_utils::inline_style(&rect)
        .unwrap()
        .get_property_value("fill")
        .unwrap()
}

/// The browser's serialization of `color` as an inline fill.
fn serialized_fill(color: &str) -> String {
    let document = document();
    let reference = document
        .create_element_ns(Some("http://www.w3.org/2000/svg"), "rect")
        .unwrap();
    let style = dom_utils::inline_style(&reference).unwrap();
    style.set_property("fill", color).unwrap();
    style.get_property_value("fill").unwrap()
}

fn assert_zoom(viewer: &DiagramViewer, expected: f64) {
    let level = viewer.zoom_level().expect("rendered viewer has a zoom level");
    assert!((level - expected).abs() < 1e-9, "zoom {} != {}", level, expected);
}

#[wasm_bindgen_test]
async fn rendered_diagram_is_colored_and_controls_shown() {
    install_engine_standin();
    let config = fixture("rendered");
    let dom = ViewerDom::locate(&document(), &config).unwrap();
    let viewer = DiagramViewer::new(dom, config.clone(), payload("<definitions/>", &["Review"], &["Ship"]));

    viewer.load().await.unwrap();

    assert_eq!(viewer.state(), ViewerState::Rendered);
    assert_eq!(dom_utils::display_of(&by_id(&config.controls_id)), "flex");
    assert_eq!(dom_utils::display_of(&by_id(&config.legend_id)), "block");
    assert_eq!(dom_utils::display_of(&by_id(&config.loading_id)), "none");

    assert_eq!(fill_of(&config, 0), serialized_fill("#d4edda"));
    assert_eq!(fill_of(&config, 1), serialized_fill("#fff3cd"));
    assert_eq!(fill_of(&config, 2), "");

    assert_eq!(engine_log(&config), vec!["import", "fit"]);
    viewer.destroy();
}

#[wasm_bindgen_test]
async fn zoom_controls_step_clamp_and_reset() {
    install_engine_standin();
    let config = fixture("zoom");
    let dom = ViewerDom::locate(&document(), &config).unwrap();
    let viewer = DiagramViewer::new(dom, config.clone(), payload("<definitions/>", &[], &[]));
    viewer.load().await.unwrap();

    // Fitting leaves the stand-in at 0.5.
    assert_zoom(&viewer, 0.5);
    viewer.zoom_in();
    assert_zoom(&viewer, 0.6);
    viewer.zoom_out();
    assert_zoom(&viewer, 0.5);

    viewer.reset_zoom();
    assert_zoom(&viewer, 1.0);

    for _ in 0..20 {
        viewer.zoom_out();
    }
    assert_zoom(&viewer, 0.1);

    viewer.zoom_fit();
    assert_zoom(&viewer, 0.5);

    viewer.handle_resize();
    let log = engine_log(&config);
    assert_eq!(&log[log.len() - 2..], ["resized", "fit"]);

    viewer.destroy();
    assert_eq!(viewer.zoom_level(), None);
    assert_eq!(engine_log(&config).last().map(String::as_str), Some("destroy"));
}

#[wasm_bindgen_test]
async fn view_initializes_once_after_container_gets_a_width() {
    install_engine_standin();
    let window = web_sys::window().unwrap();
    let mut config = fixture("hidden");
    config.retry = RetryPolicy {
        initial_delay_ms: 5,
        max_delay_ms: 20,
        max_attempts: None,
    };
    let container = by_id(&config.container_id);
    dom_utils::hide(&container);
    assert_eq!(container.client_width(), 0);

    let mounted = viewer::mount(&window, &document(), config.clone(), payload("<definitions/>", &["Review"], &[]))
        .unwrap()
        .expect("viewer mounted");

    TimeoutFuture::new(100).await;
    assert_eq!(mounted.viewer.state(), ViewerState::Rendered);
    assert_eq!(engine_log(&config), vec!["import"]);
    assert_eq!(fill_of(&config, 0), "");

    dom_utils::show(&container, "block");
    TimeoutFuture::new(100).await;
    assert_eq!(fit_count(&config), 1);
    assert_eq!(fill_of(&config, 0), serialized_fill("#d4edda"));

    TimeoutFuture::new(100).await;
    assert_eq!(fit_count(&config), 1);

    window.dispatch_event(&Event::new("resize").unwrap()).unwrap();
    let log = engine_log(&config);
    assert_eq!(&log[log.len() - 2..], ["resized", "fit"]);

    // Dropping the mount detaches the resize listener.
    let viewer = mounted.viewer.clone();
    drop(mounted);
    window.dispatch_event(&Event::new("resize").unwrap()).unwrap();
    assert_eq!(fit_count(&config), 2);
    viewer.destroy();
}

#[wasm_bindgen_test]
async fn rejected_import_shows_error_text() {
    install_engine_standin();
    let config = fixture("rejected");
    let dom = ViewerDom::locate(&document(), &config).unwrap();
    let viewer = DiagramViewer::new(dom, config.clone(), payload("<broken/>", &["Review"], &[]));

    let err = viewer.load().await.unwrap_err();

    assert!(matches!(err, WidgetError::Import(ref msg) if msg.contains("unparsable content")));
    assert!(matches!(viewer.state(), ViewerState::Failed(_)));
    assert_eq!(by_id(&config.loading_id).text_content().unwrap(), DEFAULT_ERROR_TEXT);
    assert_eq!(dom_utils::display_of(&by_id(&config.controls_id)), "none");
    assert_eq!(engine_log(&config), vec!["import", "destroy"]);
    viewer.zoom_in();
    assert_eq!(viewer.zoom_level(), None);
}

#[wasm_bindgen_test]
async fn widget_handle_drives_rendered_viewer() {
    install_engine_standin();
    let window = web_sys::window().unwrap();
    let viewer_config = fixture("handle");
    let config = WidgetConfig {
        popup: PopupConfig { enabled: false, ..PopupConfig::default() },
        poll: PollConfig { enabled: false, ..PollConfig::default() },
        viewer: viewer_config.clone(),
    };

    let handle = process_tracker_frontend::mount(
        &window,
        &document(),
        config,
        Some(payload("<definitions/>", &[], &["Archive"])),
    )
    .unwrap();
    TimeoutFuture::new(50).await;

    assert_eq!(handle.state(), "rendered");
    assert_eq!(fill_of(&viewer_config, 2), serialized_fill("#fff3cd"));
    handle.reset_zoom();
    handle.zoom_in();
    let level = handle.zoom_level().unwrap();
    assert!((level - 1.1).abs() < 1e-9);

    handle.destroy();
    assert_eq!(handle.state(), "none");
    assert_eq!(handle.zoom_level(), None);
}
