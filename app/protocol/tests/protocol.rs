//! Wire type tests.

use compact_str::CompactString;
use manta_protocol::{Frame, PathError, command_url, unbox};
use serde_json::json;

#[test]
fn value_frame_serializes_with_tag() {
    let frame = Frame::Value {
        payload: json!("hello"),
    };
    let json = serde_json::to_string(&frame).unwrap();
    assert!(json.contains("\"type\":\"value\""));
    assert!(json.contains("\"payload\":\"hello\""));
}

#[test]
fn error_frame_serializes_with_tag() {
    let frame = Frame::Error {
        message: "boom".to_string(),
    };
    let json = serde_json::to_string(&frame).unwrap();
    assert!(json.contains("\"type\":\"error\""));
    assert!(json.contains("\"message\":\"boom\""));
}

#[test]
fn unbox_dereferences_single_level() {
    assert_eq!(unbox(json!({"boxed": "some value"})), json!("some value"));
    // One level only.
    assert_eq!(
        unbox(json!({"boxed": {"boxed": 1}})),
        json!({"boxed": 1})
    );
}

#[test]
fn unbox_passes_other_shapes_through() {
    assert_eq!(unbox(json!("plain")), json!("plain"));
    assert_eq!(unbox(json!([1, 2])), json!([1, 2]));
    // Not a box: extra keys alongside "boxed".
    assert_eq!(
        unbox(json!({"boxed": 1, "other": 2})),
        json!({"boxed": 1, "other": 2})
    );
}

#[test]
fn boxed_and_direct_scalars_decode_equal() {
    let direct = unbox(json!("some value"));
    let boxed = unbox(json!({"boxed": "some value"}));
    assert_eq!(direct, boxed);
}

#[test]
fn command_url_joins_segments() {
    let path: Vec<CompactString> = vec!["repo".into(), "stat".into()];
    assert_eq!(
        command_url("http://127.0.0.1:5001", &path),
        "http://127.0.0.1:5001/api/v0/repo/stat"
    );
    // Trailing slash on the base is tolerated.
    assert_eq!(
        command_url("http://127.0.0.1:5001/", &path),
        "http://127.0.0.1:5001/api/v0/repo/stat"
    );
}

#[test]
fn path_error_messages() {
    assert_eq!(PathError::Empty.to_string(), "empty command path");
    assert_eq!(
        PathError::Unknown {
            segment: "nope".into()
        }
        .to_string(),
        "unknown command: nope"
    );
}
