//! Markup-driven hookup: Bootstrap form validation and tooltips.

#[cfg(test)]
#[path = "wiring_test.rs"]
mod wiring_test;

use std::rc::Rc;

use crate::config::KitConfig;
use crate::dom::{Document, DomEvent, Element, Toolkit};

/// Intercept `submit` on every form matching the validation selector.
///
/// Invalid forms have submission cancelled and propagation stopped; every
/// submit marks the form with the validated class so feedback styles apply.
/// Returns the number of forms wired.
pub fn wire_validation<D: Document>(doc: &D, config: &KitConfig) -> usize {
    let mut wired = 0;
    for form in doc.query_all(&config.validation_selector) {
        let target = form.clone();
        let validated_class = config.validated_class.clone();
        let listener = Box::new(move |event: &dyn DomEvent| {
            if !target.check_validity() {
                event.prevent_default();
                event.stop_propagation();
            }
            if let Err(e) = target.add_class(&validated_class) {
                log::warn!("failed to mark form as validated: {e}");
            }
        });
        match form.listen("submit", listener) {
            Ok(()) => wired += 1,
            Err(e) => log::warn!("failed to wire form validation: {e}"),
        }
    }
    log::debug!("wired validation on {wired} form(s)");
    wired
}

/// Attach a tooltip to every element matching the tooltip selector once the
/// document is ready. Elements the toolkit rejects are logged and skipped.
pub fn wire_tooltips<D, T>(doc: &Rc<D>, toolkit: &Rc<T>, config: &KitConfig)
where
    D: Document + 'static,
    T: Toolkit<D::Element> + 'static,
{
    let doc_on_ready = Rc::clone(doc);
    let toolkit = Rc::clone(toolkit);
    let selector = config.tooltip_selector.clone();
    doc.when_ready(Box::new(move || {
        let mut attached = 0_usize;
        for el in doc_on_ready.query_all(&selector) {
            match toolkit.tooltip(&el) {
                Ok(()) => attached += 1,
                Err(e) => log::warn!("failed to attach tooltip: {e}"),
            }
        }
        log::debug!("attached {attached} tooltip(s)");
    }));
}
