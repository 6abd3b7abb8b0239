//! Bootstrap toast notifications.
//!
//! All toasts live in one fixed-position container, created on first use
//! and reused afterwards. Each toast removes itself from the document once
//! the toolkit reports its hide transition finished.

#[cfg(test)]
#[path = "toast_test.rs"]
mod toast_test;

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::config::KitConfig;
use crate::consts::TOAST_HIDDEN_EVENT;
use crate::dom::{Document, DomError, Element, Toolkit, element_with_class, set_attributes};

/// Bootstrap contextual color of a toast, rendered as `bg-<tag>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Severity {
    Primary,
    Secondary,
    #[default]
    Success,
    Danger,
    Warning,
    Info,
    Light,
    Dark,
    /// Any other tag, passed through verbatim.
    Custom(String),
}

impl Severity {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Custom(tag) => tag,
        }
    }
}

impl From<&str> for Severity {
    fn from(value: &str) -> Self {
        match value {
            "primary" => Self::Primary,
            "secondary" => Self::Secondary,
            "success" => Self::Success,
            "danger" => Self::Danger,
            "warning" => Self::Warning,
            "info" => Self::Info,
            "light" => Self::Light,
            "dark" => Self::Dark,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl FromStr for Severity {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return the page's toast container, creating and attaching it to `<body>`
/// if no element with the configured id exists.
///
/// # Errors
///
/// Returns [`DomError::NoBody`] when a container must be created but the
/// document has no body, or any DOM error from building it.
pub fn ensure_container<D: Document>(doc: &D, config: &KitConfig) -> Result<D::Element, DomError> {
    if let Some(existing) = doc.element_by_id(&config.toast_container_id) {
        return Ok(existing);
    }
    let body = doc.body().ok_or(DomError::NoBody)?;
    let container = element_with_class(doc, "div", &config.toast_container_class)?;
    container.set_id(&config.toast_container_id);
    body.append_child(&container)?;
    log::debug!("created toast container #{}", config.toast_container_id);
    Ok(container)
}

/// Build, attach, and show one toast. Returns the toast element.
///
/// The message is inserted as text. If the hide listener cannot be attached
/// or the toolkit cannot show the toast, it is detached again before the
/// error is returned.
///
/// # Errors
///
/// Propagates container, DOM, and toolkit failures.
pub fn show_toast<D, T>(
    doc: &D,
    toolkit: &T,
    config: &KitConfig,
    message: &str,
    severity: &Severity,
) -> Result<D::Element, DomError>
where
    D: Document,
    T: Toolkit<D::Element>,
{
    let container = ensure_container(doc, config)?;
    let toast = build_toast(doc, message, severity)?;
    container.append_child(&toast)?;

    if let Err(e) = arm_toast(toolkit, &toast) {
        toast.remove();
        return Err(e);
    }
    Ok(toast)
}

/// Remove the toast once hidden, then hand it to the toolkit.
fn arm_toast<E, T>(toolkit: &T, toast: &E) -> Result<(), DomError>
where
    E: Element,
    T: Toolkit<E>,
{
    toast.listen_once(TOAST_HIDDEN_EVENT, Box::new(|hidden: &E| hidden.remove()))?;
    toolkit.show_toast(toast)
}

fn build_toast<D: Document>(doc: &D, message: &str, severity: &Severity) -> Result<D::Element, DomError> {
    let toast = element_with_class(doc, "div", &format!("toast align-items-center text-white bg-{severity} border-0"))?;
    set_attributes(&toast, &[("role", "alert"), ("aria-live", "assertive"), ("aria-atomic", "true")])?;

    let row = element_with_class(doc, "div", "d-flex")?;
    let body = element_with_class(doc, "div", "toast-body")?;
    body.set_text(message);

    let close = element_with_class(doc, "button", "btn-close btn-close-white me-2 m-auto")?;
    set_attributes(&close, &[("type", "button"), ("data-bs-dismiss", "toast"), ("aria-label", "Close")])?;

    row.append_child(&body)?;
    row.append_child(&close)?;
    toast.append_child(&row)?;
    Ok(toast)
}
