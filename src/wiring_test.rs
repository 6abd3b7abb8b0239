use super::*;
use crate::dom::Element;
use crate::memory::{MemoryDocument, MemoryElement, RecordingToolkit};

fn form(doc: &MemoryDocument, class: &str) -> MemoryElement {
    let Ok(form) = doc.append_new("form") else {
        panic!("form should be created");
    };
    form.set_class_name(class);
    form
}

fn tooltip_trigger(doc: &MemoryDocument) -> MemoryElement {
    let Ok(el) = doc.append_new("button") else {
        panic!("button should be created");
    };
    assert!(el.set_attribute("data-bs-toggle", "tooltip").is_ok());
    el
}

// =============================================================
// Validation
// =============================================================

#[test]
fn invalid_submit_is_cancelled_and_marked() {
    let doc = MemoryDocument::new();
    let signup = form(&doc, "needs-validation");
    signup.set_valid(false);

    assert_eq!(wire_validation(&doc, &KitConfig::default()), 1);
    let event = signup.submit();

    assert!(event.default_prevented());
    assert!(event.propagation_stopped());
    assert!(signup.has_class("was-validated"));
}

#[test]
fn valid_submit_proceeds_and_is_still_marked() {
    let doc = MemoryDocument::new();
    let signup = form(&doc, "needs-validation");

    wire_validation(&doc, &KitConfig::default());
    let event = signup.submit();

    assert!(!event.default_prevented());
    assert!(!event.propagation_stopped());
    assert!(signup.has_class("was-validated"));
}

#[test]
fn only_marked_forms_are_wired() {
    let doc = MemoryDocument::new();
    let marked = form(&doc, "needs-validation row g-3");
    let plain = form(&doc, "row");
    plain.set_valid(false);

    assert_eq!(wire_validation(&doc, &KitConfig::default()), 1);

    assert_eq!(marked.listener_count("submit"), 1);
    assert_eq!(plain.listener_count("submit"), 0);
    assert!(!plain.submit().default_prevented());
    assert!(!plain.has_class("was-validated"));
}

#[test]
fn validity_is_checked_on_every_submit() {
    let doc = MemoryDocument::new();
    let signup = form(&doc, "needs-validation");
    wire_validation(&doc, &KitConfig::default());

    signup.set_valid(false);
    assert!(signup.submit().default_prevented());
    signup.set_valid(true);
    assert!(!signup.submit().default_prevented());
    assert_eq!(signup.class_name(), "needs-validation was-validated");
}

#[test]
fn custom_selectors_are_honoured() {
    let doc = MemoryDocument::new();
    let custom = form(&doc, "js-validate");
    custom.set_valid(false);
    let config = KitConfig {
        validation_selector: ".js-validate".to_owned(),
        validated_class: "checked".to_owned(),
        ..KitConfig::default()
    };

    assert_eq!(wire_validation(&doc, &config), 1);
    custom.submit();

    assert!(custom.has_class("checked"));
}

// =============================================================
// Tooltips
// =============================================================

#[test]
fn tooltips_attach_immediately_on_a_ready_document() {
    let doc = Rc::new(MemoryDocument::new());
    let a = tooltip_trigger(&doc);
    let b = tooltip_trigger(&doc);
    let _other = doc.append_new("span");
    let toolkit = Rc::new(RecordingToolkit::new());

    wire_tooltips(&doc, &toolkit, &KitConfig::default());

    assert_eq!(toolkit.tooltips(), vec![a, b]);
}

#[test]
fn tooltips_wait_for_the_document_to_finish_loading() {
    let doc = Rc::new(MemoryDocument::loading());
    let toolkit = Rc::new(RecordingToolkit::new());
    wire_tooltips(&doc, &toolkit, &KitConfig::default());

    // Triggers parsed after wiring are still picked up.
    let late = tooltip_trigger(&doc);
    assert!(toolkit.tooltips().is_empty());

    doc.finish_loading();

    assert_eq!(toolkit.tooltips(), vec![late]);
}

#[test]
fn missing_toolkit_is_logged_not_raised() {
    let doc = Rc::new(MemoryDocument::new());
    tooltip_trigger(&doc);
    let toolkit = Rc::new(RecordingToolkit::unavailable());

    wire_tooltips(&doc, &toolkit, &KitConfig::default());

    assert!(toolkit.tooltips().is_empty());
}
