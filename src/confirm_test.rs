use futures::FutureExt;

use super::*;
use crate::memory::{MemoryDocument, MemoryElement, MemoryModal, RecordingToolkit};

struct Fixture {
    doc: MemoryDocument,
    toolkit: RecordingToolkit,
    config: KitConfig,
}

impl Fixture {
    fn new() -> Self {
        Self { doc: MemoryDocument::new(), toolkit: RecordingToolkit::new(), config: KitConfig::default() }
    }

    fn ask(&self, message: &str) -> (Confirmation, MemoryModal) {
        let confirmation = confirm_action(&self.doc, &self.toolkit, &self.config, message);
        let Some(modal) = self.toolkit.last_modal() else {
            panic!("dialog should have been created");
        };
        (confirmation, modal)
    }

    fn button(modal: &MemoryModal, selector: &str) -> MemoryElement {
        let Some(button) = modal.element().find(selector) else {
            panic!("dialog should contain {selector}");
        };
        button
    }
}

#[test]
fn confirm_button_resolves_true_and_removes_the_dialog() {
    let fx = Fixture::new();
    let (mut confirmation, modal) = fx.ask("Delete room 1.01?");
    assert!(modal.element().is_connected());
    assert_eq!((&mut confirmation).now_or_never(), None);

    Fixture::button(&modal, "#confirmButton").click();

    assert_eq!(confirmation.now_or_never(), Some(true));
    assert!(!modal.element().is_connected());
    assert!(!modal.is_shown());
}

#[test]
fn cancel_button_resolves_false_and_removes_the_dialog() {
    let fx = Fixture::new();
    let (confirmation, modal) = fx.ask("Leave without saving?");

    let Some(cancel) = modal.element().find_all("[data-bs-dismiss=\"modal\"]").into_iter().find(|b| b.has_class("btn-secondary"))
    else {
        panic!("cancel button missing");
    };
    cancel.click();

    assert_eq!(confirmation.now_or_never(), Some(false));
    assert!(!modal.element().is_connected());
}

#[test]
fn close_control_resolves_false() {
    let fx = Fixture::new();
    let (confirmation, modal) = fx.ask("Sure?");

    Fixture::button(&modal, ".btn-close").click();

    assert_eq!(confirmation.now_or_never(), Some(false));
    assert!(!modal.element().is_connected());
}

#[test]
fn backdrop_or_escape_dismissal_resolves_false() {
    let fx = Fixture::new();
    let (confirmation, modal) = fx.ask("Sure?");

    modal.dismiss();

    assert_eq!(confirmation.now_or_never(), Some(false));
    assert!(!modal.element().is_connected());
}

#[test]
fn resolves_exactly_once() {
    let fx = Fixture::new();
    let (confirmation, modal) = fx.ask("Sure?");
    let confirm = Fixture::button(&modal, "#confirmButton");

    confirm.click();
    // Late events after resolution change nothing.
    confirm.click();
    modal.element().dispatch("hidden.bs.modal");

    assert_eq!(confirmation.now_or_never(), Some(true));
}

#[test]
fn dialog_is_shown_once_and_structured_like_a_bootstrap_modal() {
    let fx = Fixture::new();
    let (_confirmation, modal) = fx.ask("Remove this event?");
    let root = modal.element();

    assert!(modal.is_shown());
    assert_eq!(modal.show_count(), 1);
    assert_eq!(root.class_name(), "modal fade");
    assert_eq!(root.attribute("tabindex").as_deref(), Some("-1"));
    assert_eq!(root.attribute("aria-hidden").as_deref(), Some("true"));
    assert_eq!(root.parent(), fx.doc.body());

    assert_eq!(root.find(".modal-title").map(|t| t.text()).as_deref(), Some("Confirm Action"));
    assert_eq!(root.find("p").map(|p| p.text()).as_deref(), Some("Remove this event?"));
    assert_eq!(Fixture::button(&modal, "#confirmButton").text(), "Confirm");
    assert_eq!(Fixture::button(&modal, ".btn-secondary").text(), "Cancel");
}

#[test]
fn labels_come_from_config() {
    let mut fx = Fixture::new();
    fx.config.confirm_title = "Bevestigen".to_owned();
    fx.config.confirm_label = "Ja".to_owned();
    fx.config.cancel_label = "Nee".to_owned();
    let (_confirmation, modal) = fx.ask("Doorgaan?");

    assert_eq!(modal.element().find(".modal-title").map(|t| t.text()).as_deref(), Some("Bevestigen"));
    assert_eq!(Fixture::button(&modal, "#confirmButton").text(), "Ja");
    assert_eq!(Fixture::button(&modal, ".btn-secondary").text(), "Nee");
}

#[test]
fn message_is_text_not_markup() {
    let fx = Fixture::new();
    let (_confirmation, modal) = fx.ask("<img src=x onerror=alert(1)>");
    let Some(paragraph) = modal.element().find("p") else {
        panic!("message paragraph missing");
    };

    assert_eq!(paragraph.text(), "<img src=x onerror=alert(1)>");
    assert!(paragraph.children().is_empty());
}

#[test]
fn concurrent_dialogs_resolve_independently() {
    let fx = Fixture::new();
    let (first, first_modal) = fx.ask("first");
    let (second, second_modal) = fx.ask("second");

    second_modal.dismiss();
    Fixture::button(&first_modal, "#confirmButton").click();

    assert_eq!(first.now_or_never(), Some(true));
    assert_eq!(second.now_or_never(), Some(false));
    assert!(fx.doc.body().is_some_and(|b| b.children().is_empty()));
}

#[test]
fn missing_body_resolves_false_without_touching_the_toolkit() {
    let doc = MemoryDocument::without_body();
    let toolkit = RecordingToolkit::new();

    let confirmation = confirm_action(&doc, &toolkit, &KitConfig::default(), "Sure?");

    assert_eq!(confirmation.now_or_never(), Some(false));
    assert!(toolkit.modals().is_empty());
}

#[test]
fn missing_toolkit_resolves_false_and_leaves_no_dialog() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::unavailable();

    let confirmation = confirm_action(&doc, &toolkit, &KitConfig::default(), "Sure?");

    assert_eq!(confirmation.now_or_never(), Some(false));
    assert!(doc.query_all(".modal").is_empty());
}

#[test]
fn open_dialog_reports_setup_errors() {
    let doc = MemoryDocument::without_body();
    let toolkit = RecordingToolkit::new();

    let result = open_dialog(&doc, &toolkit, &KitConfig::default(), "Sure?");

    assert_eq!(result.err().map(|e| e.to_string()), Some("document has no body".to_owned()));
}

#[test]
fn answered_dialogs_are_freed() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::new();
    let config = KitConfig::default();

    let confirmed = confirm_action(&doc, &toolkit, &config, "first");
    let cancelled = confirm_action(&doc, &toolkit, &config, "second");
    let modals = toolkit.modals();
    let nodes: Vec<_> = modals.iter().map(|m| m.element().downgrade()).collect();

    Fixture::button(&modals[0], "#confirmButton").click();
    Fixture::button(&modals[1], ".btn-secondary").click();
    assert_eq!(confirmed.now_or_never(), Some(true));
    assert_eq!(cancelled.now_or_never(), Some(false));

    drop(modals);
    drop(toolkit);
    assert!(nodes.iter().all(|node| node.upgrade().is_none()));
}

#[test]
fn hidden_dialog_releases_its_confirm_listener() {
    let fx = Fixture::new();
    let (confirmation, modal) = fx.ask("Sure?");
    let confirm = Fixture::button(&modal, "#confirmButton");
    assert_eq!(confirm.listener_count("click"), 1);

    modal.dismiss();

    assert_eq!(confirmation.now_or_never(), Some(false));
    assert_eq!(confirm.listener_count("click"), 0);
    assert_eq!(modal.element().listener_count(MODAL_HIDDEN_EVENT), 0);
}

#[test]
fn failed_setup_releases_the_confirm_listener() {
    let doc = MemoryDocument::new();
    let toolkit = RecordingToolkit::new();
    doc.reject_listeners(MODAL_HIDDEN_EVENT);

    let result = open_dialog(&doc, &toolkit, &KitConfig::default(), "Sure?");

    assert!(matches!(result, Err(DomError::Host(_))));
    assert!(doc.query_all(".modal").is_empty());
    let Some(modal) = toolkit.last_modal() else {
        panic!("modal should have been created before the failure");
    };
    assert_eq!(Fixture::button(&modal, "#confirmButton").listener_count("click"), 0);
}
