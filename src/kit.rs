//! One namespaced handle over every page helper.
//!
//! SYSTEM CONTEXT
//! ==============
//! Inline page scripts reach the helpers through a single object
//! (`window.app` in the browser build). [`PageKit`] is that object on the Rust
//! side: it owns the injected document, toolkit, scheduler, and storage, plus
//! the page configuration, and forwards to the per-concern modules.

#[cfg(test)]
#[path = "kit_test.rs"]
mod kit_test;

use std::rc::Rc;

use crate::config::KitConfig;
use crate::confirm::{Confirmation, confirm_action};
use crate::dom::{Document, Toolkit};
use crate::format::{DateInput, FormatError, format_currency, format_date};
use crate::store::{StorageBackend, Store};
use crate::timing::{Debounced, Scheduler, Throttled, debounce, throttle};
use crate::toast::{Severity, show_toast};
use crate::wiring::{wire_tooltips, wire_validation};

pub struct PageKit<D, T, S, B> {
    doc: Rc<D>,
    toolkit: Rc<T>,
    scheduler: S,
    store: Store<B>,
    config: KitConfig,
}

impl<D, T, S, B> PageKit<D, T, S, B>
where
    D: Document + 'static,
    T: Toolkit<D::Element> + 'static,
    S: Scheduler,
    B: StorageBackend,
{
    pub fn new(doc: D, toolkit: T, scheduler: S, storage: B, config: KitConfig) -> Self {
        Self { doc: Rc::new(doc), toolkit: Rc::new(toolkit), scheduler, store: Store::new(storage), config }
    }

    /// Wire form validation now and tooltips once the document is ready.
    /// Returns the number of forms wired.
    pub fn init(&self) -> usize {
        let forms = wire_validation(self.doc.as_ref(), &self.config);
        wire_tooltips(&self.doc, &self.toolkit, &self.config);
        forms
    }

    /// Show a toast; `None` uses the configured default severity. Failures
    /// are logged.
    pub fn show_toast(&self, message: &str, severity: Option<&Severity>) {
        let severity = severity.unwrap_or(&self.config.default_severity);
        if let Err(e) = show_toast(self.doc.as_ref(), self.toolkit.as_ref(), &self.config, message, severity) {
            log::warn!("failed to show toast: {e}");
        }
    }

    pub fn confirm_action(&self, message: &str) -> Confirmation {
        confirm_action(self.doc.as_ref(), self.toolkit.as_ref(), &self.config, message)
    }

    /// Format `date`; `None` uses the configured default pattern.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidDate`] for unresolvable input.
    pub fn format_date<'a>(&self, date: impl Into<DateInput<'a>>, format: Option<&str>) -> Result<String, FormatError> {
        format_date(date, format.unwrap_or(&self.config.default_date_format))
    }

    /// Format `amount`; `None` uses the configured default currency.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidCurrency`] for malformed codes.
    pub fn format_currency(&self, amount: f64, currency: Option<&str>) -> Result<String, FormatError> {
        format_currency(amount, currency.unwrap_or(&self.config.default_currency))
    }

    pub fn debounce<A, F>(&self, wait_ms: u32, func: F) -> Debounced<A, S>
    where
        A: 'static,
        F: Fn(A) + 'static,
    {
        debounce(&self.scheduler, wait_ms, func)
    }

    pub fn throttle<A, F>(&self, limit_ms: u32, func: F) -> Throttled<A, S>
    where
        A: 'static,
        F: Fn(A) + 'static,
    {
        throttle(&self.scheduler, limit_ms, func)
    }

    pub fn storage(&self) -> &Store<B> {
        &self.store
    }

    pub fn config(&self) -> &KitConfig {
        &self.config
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}
