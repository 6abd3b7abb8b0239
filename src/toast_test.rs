use super::*;
use crate::memory::{MemoryDocument, MemoryElement, RecordingToolkit};

fn containers(doc: &MemoryDocument) -> usize {
    doc.query_all("#toast-container").len()
}

#[test]
fn first_toast_creates_the_container_in_body() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::new();

    let toast = show_toast(&doc, &toolkit, &KitConfig::default(), "Saved", &Severity::Success);

    assert!(toast.is_ok());
    let Some(container) = doc.element_by_id("toast-container") else {
        panic!("container should exist");
    };
    assert_eq!(container.class_name(), "toast-container position-fixed bottom-0 end-0 p-3");
    assert_eq!(container.parent(), doc.body());
}

#[test]
fn container_is_created_once_and_reused() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::new();
    let config = KitConfig::default();

    for i in 0..3 {
        assert!(show_toast(&doc, &toolkit, &config, &format!("toast {i}"), &Severity::Info).is_ok());
    }

    assert_eq!(containers(&doc), 1);
    let container = ensure_container(&doc, &config).ok();
    assert_eq!(container.map(|c| c.children().len()), Some(3));
}

#[test]
fn existing_page_container_is_reused() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::new();
    let existing = doc.append_new("section").ok();
    if let Some(existing) = &existing {
        existing.set_id("toast-container");
    }

    assert!(show_toast(&doc, &toolkit, &KitConfig::default(), "hi", &Severity::Success).is_ok());

    assert_eq!(containers(&doc), 1);
    assert_eq!(existing.map(|e| e.children().len()), Some(1));
}

#[test]
fn toast_markup_matches_bootstrap_structure() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::new();

    let Ok(toast) = show_toast(&doc, &toolkit, &KitConfig::default(), "Room deleted", &Severity::Danger) else {
        panic!("toast should be shown");
    };

    assert_eq!(toast.class_name(), "toast align-items-center text-white bg-danger border-0");
    assert_eq!(toast.attribute("role").as_deref(), Some("alert"));
    assert_eq!(toast.attribute("aria-live").as_deref(), Some("assertive"));
    assert_eq!(toast.attribute("aria-atomic").as_deref(), Some("true"));

    let body = toast.find(".toast-body");
    assert_eq!(body.map(|b| b.text()).as_deref(), Some("Room deleted"));

    let close = toast.find("[data-bs-dismiss=\"toast\"]");
    assert_eq!(close.as_ref().map(|c| c.tag().to_owned()).as_deref(), Some("button"));
    assert_eq!(close.and_then(|c| c.attribute("aria-label")).as_deref(), Some("Close"));
}

#[test]
fn message_is_inserted_as_text() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::new();
    let message = "<b>bold</b> & <script>x()</script>";

    let toast = show_toast(&doc, &toolkit, &KitConfig::default(), message, &Severity::Success).ok();
    let body = toast.and_then(|t| t.find(".toast-body"));

    assert_eq!(body.as_ref().map(MemoryElement::text).as_deref(), Some(message));
    assert_eq!(body.map(|b| b.children().len()), Some(0));
}

#[test]
fn toast_is_shown_by_the_toolkit() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::new();

    let toast = show_toast(&doc, &toolkit, &KitConfig::default(), "hi", &Severity::Success).ok();

    assert_eq!(toolkit.shown_toasts().first(), toast.as_ref());
}

#[test]
fn hidden_event_removes_the_toast_but_keeps_the_container() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::new();
    let config = KitConfig::default();

    let Ok(toast) = show_toast(&doc, &toolkit, &config, "bye", &Severity::Warning) else {
        panic!("toast should be shown");
    };
    assert!(toast.is_connected());

    toast.dispatch("hidden.bs.toast");

    assert!(!toast.is_connected());
    assert_eq!(containers(&doc), 1);
}

#[test]
fn missing_toolkit_detaches_the_toast_and_reports() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::unavailable();
    let config = KitConfig::default();

    let result = show_toast(&doc, &toolkit, &config, "hi", &Severity::Success);

    assert!(matches!(result, Err(DomError::Toolkit(_))));
    let container = ensure_container(&doc, &config).ok();
    assert_eq!(container.map(|c| c.children().len()), Some(0));
}

#[test]
fn missing_body_is_an_error() {
    let doc = MemoryDocument::without_body();
    let toolkit = RecordingToolkit::new();

    let result = show_toast(&doc, &toolkit, &KitConfig::default(), "hi", &Severity::Success);

    assert_eq!(result.err(), Some(DomError::NoBody));
}

#[test]
fn severity_parses_known_and_custom_tags() {
    assert_eq!(Severity::from("danger"), Severity::Danger);
    assert_eq!("info".parse::<Severity>(), Ok(Severity::Info));
    assert_eq!(Severity::from("brand"), Severity::Custom("brand".to_owned()));
    assert_eq!(Severity::Custom("brand".to_owned()).to_string(), "brand");
    assert_eq!(Severity::default(), Severity::Success);
}

#[test]
fn custom_severity_is_rendered_verbatim() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::new();

    let toast = show_toast(&doc, &toolkit, &KitConfig::default(), "hi", &Severity::from("brand")).ok();

    assert!(toast.is_some_and(|t| t.has_class("bg-brand")));
}

#[test]
fn hidden_toast_is_freed() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::new();
    let Ok(toast) = show_toast(&doc, &toolkit, &KitConfig::default(), "Saved", &Severity::Success) else {
        panic!("toast should be shown");
    };
    let node = toast.downgrade();

    toast.dispatch(TOAST_HIDDEN_EVENT);
    assert_eq!(toast.listener_count(TOAST_HIDDEN_EVENT), 0);
    drop(toast);
    drop(toolkit);

    assert!(node.upgrade().is_none());
    assert!(doc.element_by_id("toast-container").is_some_and(|c| c.children().is_empty()));
}

#[test]
fn refused_hide_listener_detaches_the_toast() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::new();
    doc.reject_listeners(TOAST_HIDDEN_EVENT);

    let result = show_toast(&doc, &toolkit, &KitConfig::default(), "Saved", &Severity::Success);

    assert!(matches!(result, Err(DomError::Host(_))));
    assert!(toolkit.shown_toasts().is_empty());
    assert!(doc.element_by_id("toast-container").is_some_and(|c| c.children().is_empty()));
}
