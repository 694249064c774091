//! Integration tests for library exports.

use abstracta_assist::flows::channels::CHANNEL_COUNT;
use abstracta_assist::flows::FlowKind;
use abstracta_assist::prompts::examples_for;
use abstracta_assist::{AssistError, Result};

#[test]
fn error_types_are_exported() {
    let err: Result<()> = Err(AssistError::ConfigValidationError {
        message: "test".to_string(),
    });
    assert!(err.is_err());
}

#[test]
fn modules_are_accessible() {
    let _ = abstracta_assist::config::AssistConfig::default();
    let _ = abstracta_assist::progress::HtmlProgressRenderer::new();
    let _ = abstracta_assist::display::AssistTheme::plain();
    let _ = abstracta_assist::ui::RecordingView::<()>::new();
    let _ = abstracta_assist::agent::catalog_json();
}

#[test]
fn every_flow_has_an_example() {
    for kind in FlowKind::ALL {
        assert!(examples_for(kind).next().is_some(), "no example for {}", kind);
    }
    assert_eq!(CHANNEL_COUNT, 4);
}
