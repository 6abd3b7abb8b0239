//! Confirmation dialog resolving to a single boolean.
//!
//! The dialog is a Bootstrap modal appended to `<body>`. Clicking Confirm
//! resolves `true` and hides it; every hide (Cancel, close button, backdrop,
//! escape, and the hide that follows Confirm) removes the element and
//! resolves `false` unless the dialog already resolved. There is no timeout.

#[cfg(test)]
#[path = "confirm_test.rs"]
mod confirm_test;

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::config::KitConfig;
use crate::consts::{CONFIRM_BUTTON_ID, MODAL_HIDDEN_EVENT};
use crate::dom::{Document, DomError, DomEvent, Element, ModalHandle, Toolkit, element_with_class, set_attributes};

type ResolveSlot = Rc<RefCell<Option<oneshot::Sender<bool>>>>;

/// Pending outcome of [`confirm_action`].
///
/// Resolves `false` if the dialog's listeners are dropped before the user
/// answers.
#[derive(Debug)]
#[must_use = "the dialog outcome is only observable by awaiting the confirmation"]
pub struct Confirmation {
    receiver: oneshot::Receiver<bool>,
}

impl Confirmation {
    fn resolved(value: bool) -> Self {
        let (sender, receiver) = oneshot::channel();
        if sender.send(value).is_err() {
            log::debug!("confirmation receiver gone before resolution");
        }
        Self { receiver }
    }
}

impl Future for Confirmation {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(value)) => Poll::Ready(value),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(false),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Show a confirmation dialog for `message`.
///
/// Never fails: if the dialog cannot be built or shown the problem is logged
/// and the returned future resolves `false`.
pub fn confirm_action<D, T>(doc: &D, toolkit: &T, config: &KitConfig, message: &str) -> Confirmation
where
    D: Document,
    T: Toolkit<D::Element>,
{
    match open_dialog(doc, toolkit, config, message) {
        Ok(confirmation) => confirmation,
        Err(e) => {
            log::warn!("failed to open confirmation dialog: {e}");
            Confirmation::resolved(false)
        }
    }
}

/// Like [`confirm_action`], but reports setup failures. On error nothing is
/// left attached to the document.
///
/// # Errors
///
/// Returns [`DomError::NoBody`], DOM errors from building the dialog, or
/// toolkit errors from creating the modal.
pub fn open_dialog<D, T>(doc: &D, toolkit: &T, config: &KitConfig, message: &str) -> Result<Confirmation, DomError>
where
    D: Document,
    T: Toolkit<D::Element>,
{
    let body = doc.body().ok_or(DomError::NoBody)?;
    let dialog = build_dialog(doc, config, message)?;
    body.append_child(&dialog.root)?;

    let (sender, receiver) = oneshot::channel();
    let slot: ResolveSlot = Rc::new(RefCell::new(Some(sender)));
    match attach(toolkit, &dialog, &slot) {
        Ok(modal) => {
            modal.show();
            Ok(Confirmation { receiver })
        }
        Err(e) => {
            dialog.root.remove();
            Err(e)
        }
    }
}

struct Dialog<E> {
    root: E,
    confirm: E,
}

fn attach<E, T>(toolkit: &T, dialog: &Dialog<E>, slot: &ResolveSlot) -> Result<Rc<T::Modal>, DomError>
where
    E: Element,
    T: Toolkit<E>,
{
    let modal = Rc::new(toolkit.modal(&dialog.root)?);

    let on_confirm = Rc::clone(slot);
    let modal_on_confirm = Rc::downgrade(&modal);
    let confirm_click = dialog.confirm.subscribe(
        "click",
        Box::new(move |_: &dyn DomEvent| {
            resolve(&on_confirm, true);
            if let Some(modal) = modal_on_confirm.upgrade() {
                modal.hide();
            }
        }),
    )?;

    // The hidden handler owns the modal and the confirm listener while the
    // dialog is open and releases both when it fires.
    let on_hidden = Rc::clone(slot);
    let open_modal = Rc::clone(&modal);
    dialog.root.listen_once(
        MODAL_HIDDEN_EVENT,
        Box::new(move |root: &E| {
            drop(confirm_click);
            drop(open_modal);
            root.remove();
            resolve(&on_hidden, false);
        }),
    )?;

    Ok(modal)
}

fn resolve(slot: &ResolveSlot, value: bool) {
    let Some(sender) = slot.borrow_mut().take() else {
        return;
    };
    if sender.send(value).is_err() {
        log::debug!("confirmation dropped before resolving {value}");
    } else {
        log::debug!("confirmation resolved {value}");
    }
}

fn build_dialog<D: Document>(doc: &D, config: &KitConfig, message: &str) -> Result<Dialog<D::Element>, DomError> {
    let root = element_with_class(doc, "div", "modal fade")?;
    set_attributes(&root, &[("tabindex", "-1"), ("aria-hidden", "true")])?;

    let frame = element_with_class(doc, "div", "modal-dialog")?;
    let content = element_with_class(doc, "div", "modal-content")?;

    let header = element_with_class(doc, "div", "modal-header")?;
    let title = element_with_class(doc, "h5", "modal-title")?;
    title.set_text(&config.confirm_title);
    let close = element_with_class(doc, "button", "btn-close")?;
    set_attributes(&close, &[("type", "button"), ("data-bs-dismiss", "modal"), ("aria-label", "Close")])?;
    header.append_child(&title)?;
    header.append_child(&close)?;

    let body = element_with_class(doc, "div", "modal-body")?;
    let text = doc.create_element("p")?;
    text.set_text(message);
    body.append_child(&text)?;

    let footer = element_with_class(doc, "div", "modal-footer")?;
    let cancel = element_with_class(doc, "button", "btn btn-secondary")?;
    set_attributes(&cancel, &[("type", "button"), ("data-bs-dismiss", "modal")])?;
    cancel.set_text(&config.cancel_label);
    let confirm = element_with_class(doc, "button", "btn btn-primary")?;
    confirm.set_attribute("type", "button")?;
    confirm.set_id(CONFIRM_BUTTON_ID);
    confirm.set_text(&config.confirm_label);
    footer.append_child(&cancel)?;
    footer.append_child(&confirm)?;

    content.append_child(&header)?;
    content.append_child(&body)?;
    content.append_child(&footer)?;
    frame.append_child(&content)?;
    root.append_child(&frame)?;

    Ok(Dialog { root, confirm })
}
