//! Default markup hooks shared by the wiring, toast, and dialog modules.

// ── Validation ──────────────────────────────────────────────────

/// Forms opting into Bootstrap client-side validation.
pub const VALIDATION_SELECTOR: &str = ".needs-validation";

/// Class added on submit so Bootstrap shows validation feedback.
pub const VALIDATED_CLASS: &str = "was-validated";

// ── Tooltips ────────────────────────────────────────────────────

/// Elements that get a Bootstrap tooltip once the document is ready.
pub const TOOLTIP_SELECTOR: &str = "[data-bs-toggle=\"tooltip\"]";

// ── Toasts ──────────────────────────────────────────────────────

/// Element id of the single per-page toast container.
pub const TOAST_CONTAINER_ID: &str = "toast-container";

/// Classes of a freshly created toast container (bottom-right, fixed).
pub const TOAST_CONTAINER_CLASS: &str = "toast-container position-fixed bottom-0 end-0 p-3";

/// Fired by Bootstrap once a toast finished its hide transition.
pub const TOAST_HIDDEN_EVENT: &str = "hidden.bs.toast";

// ── Confirmation dialog ─────────────────────────────────────────

/// Id of the confirm button inside the dialog footer.
pub const CONFIRM_BUTTON_ID: &str = "confirmButton";

/// Fired by Bootstrap once a modal finished its hide transition.
pub const MODAL_HIDDEN_EVENT: &str = "hidden.bs.modal";

// ── Formatting ──────────────────────────────────────────────────

pub const DEFAULT_CURRENCY: &str = "EUR";

pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd";
