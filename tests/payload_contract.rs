//! Host → widget payload contract. The dashboard serializes the diagram
//! payload with camelCase keys; these tests pin that shape.

use wasm_bindgen_test::*;

use process_tracker_frontend::payload::{DiagramPayload, TaskState};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn camel_case_payload_deserializes() {
    let payload: DiagramPayload = serde_json::from_str(
        r#"{"xmlB64":"PHZhbGlkLWRvYy8+","completedTasks":["Review"],"pendingTasks":["Aprovação"]}"#,
    )
    .unwrap();

    assert_eq!(payload.decode_xml().unwrap(), "<valid-doc/>");
    let tasks: Vec<_> = payload.tasks().collect();
    assert_eq!(tasks, vec![("Review", TaskState::Completed), ("Aprovação", TaskState::Pending)]);
}

#[wasm_bindgen_test]
fn task_lists_default_to_empty() {
    let payload: DiagramPayload = serde_json::from_str(r#"{"xmlB64":"PHZhbGlkLWRvYy8+"}"#).unwrap();
    assert!(payload.completed_tasks.is_empty());
    assert!(payload.pending_tasks.is_empty());
    assert!(payload.has_document());
}

#[wasm_bindgen_test]
fn payload_without_document_is_rejected() {
    assert!(serde_json::from_str::<DiagramPayload>(r#"{"completedTasks":[]}"#).is_err());
}

#[wasm_bindgen_test]
fn js_object_payload_deserializes() {
    let value = js_sys::JSON::parse(r#"{"xmlB64":"","completedTasks":["A"]}"#).unwrap();
    let payload = DiagramPayload::from_js(&value).unwrap();
    assert!(!payload.has_document());
    assert_eq!(payload.completed_tasks, vec!["A".to_string()]);
}
