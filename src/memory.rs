//! In-memory document and Bootstrap stand-in.
//!
//! Used by the crate's own tests and usable by downstream crates that want to
//! exercise page helpers without a browser. Events are dispatched
//! synchronously and only to the target element (no bubbling). Selector
//! support covers what the page helpers use: `#id`, `.class`, `tag`,
//! `[attr]` and `[attr="value"]`.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::consts::MODAL_HIDDEN_EVENT;
use crate::dom::{Document, DomError, DomEvent, Element, Listener, ModalHandle, OnceListener, Toolkit};

const DOCUMENT_TAG: &str = "#document";

// =============================================================
// Elements
// =============================================================

type SharedListener = Rc<RefCell<Listener>>;

struct Node {
    tag: String,
    id: RefCell<String>,
    class: RefCell<String>,
    attributes: RefCell<BTreeMap<String, String>>,
    text: RefCell<String>,
    children: RefCell<Vec<MemoryElement>>,
    parent: RefCell<Weak<Node>>,
    listeners: RefCell<Vec<(u64, String, SharedListener)>>,
    once_listeners: RefCell<Vec<(String, OnceListener<MemoryElement>)>>,
    next_listener: Cell<u64>,
    rejected_event: Option<String>,
    valid: Cell<bool>,
}

/// A node in a [`MemoryDocument`]. Clones share the same node.
#[derive(Clone)]
pub struct MemoryElement(Rc<Node>);

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryElement")
            .field("tag", &self.0.tag)
            .field("id", &*self.0.id.borrow())
            .field("class", &*self.0.class.borrow())
            .finish_non_exhaustive()
    }
}

impl PartialEq for MemoryElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl MemoryElement {
    fn new(tag: &str) -> Self {
        Self::refusing(tag, None)
    }

    fn refusing(tag: &str, rejected_event: Option<String>) -> Self {
        Self(Rc::new(Node {
            tag: tag.to_owned(),
            id: RefCell::new(String::new()),
            class: RefCell::new(String::new()),
            attributes: RefCell::new(BTreeMap::new()),
            text: RefCell::new(String::new()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            listeners: RefCell::new(Vec::new()),
            once_listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            rejected_event,
            valid: Cell::new(true),
        }))
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    #[must_use]
    pub fn id(&self) -> String {
        self.0.id.borrow().clone()
    }

    #[must_use]
    pub fn class_name(&self) -> String {
        self.0.class.borrow().clone()
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.0.class.borrow().split_whitespace().any(|c| c == class)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(name).cloned()
    }

    /// Text set through [`Element::set_text`].
    #[must_use]
    pub fn text(&self) -> String {
        self.0.text.borrow().clone()
    }

    #[must_use]
    pub fn children(&self) -> Vec<MemoryElement> {
        self.0.children.borrow().clone()
    }

    #[must_use]
    pub fn parent(&self) -> Option<MemoryElement> {
        self.0.parent.borrow().upgrade().map(MemoryElement)
    }

    /// Whether the element is reachable from its document root.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.tag() == DOCUMENT_TAG {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Override the result of [`Element::check_validity`].
    pub fn set_valid(&self, valid: bool) {
        self.0.valid.set(valid);
    }

    /// Number of listeners, one-shot included, registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        let lasting = self.0.listeners.borrow().iter().filter(|(_, name, _)| name == event).count();
        let once = self.0.once_listeners.borrow().iter().filter(|(name, _)| name == event).count();
        lasting + once
    }

    /// A handle that does not keep the node alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakMemoryElement {
        WeakMemoryElement(Rc::downgrade(&self.0))
    }

    /// All descendants in document order, excluding `self`.
    #[must_use]
    pub fn descendants(&self) -> Vec<MemoryElement> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<MemoryElement>) {
        for child in self.children() {
            out.push(child.clone());
            child.collect_descendants(out);
        }
    }

    /// Descendants matching `selector`.
    #[must_use]
    pub fn find_all(&self, selector: &str) -> Vec<MemoryElement> {
        self.descendants().into_iter().filter(|el| el.matches(selector)).collect()
    }

    /// First descendant matching `selector`.
    #[must_use]
    pub fn find(&self, selector: &str) -> Option<MemoryElement> {
        self.descendants().into_iter().find(|el| el.matches(selector))
    }

    #[must_use]
    pub fn matches(&self, selector: &str) -> bool {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            return *self.0.id.borrow() == id;
        }
        if let Some(class) = selector.strip_prefix('.') {
            return self.has_class(class);
        }
        if let Some(inner) = selector.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return match inner.split_once('=') {
                Some((name, value)) => {
                    let value = value.trim_matches(|c| c == '"' || c == '\'');
                    self.attribute(name).as_deref() == Some(value)
                }
                None => self.attribute(inner).is_some(),
            };
        }
        self.0.tag == selector
    }

    /// Dispatch `event` to this element's listeners and report what they did.
    pub fn dispatch(&self, event: &str) -> MemoryEvent {
        let fired = MemoryEvent::new(event);
        let handlers: Vec<SharedListener> = self
            .0
            .listeners
            .borrow()
            .iter()
            .filter(|(_, name, _)| name == event)
            .map(|(_, _, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            // A handler re-dispatching the same event to itself is skipped.
            if let Ok(mut handler) = handler.try_borrow_mut() {
                let callback = &mut *handler;
                callback(&fired);
            }
        }

        let once: Vec<_> = {
            let mut pending = self.0.once_listeners.borrow_mut();
            let (due, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut *pending).into_iter().partition(|(name, _)| name == event);
            *pending = keep;
            due
        };
        for (_, handler) in once {
            handler(self);
        }
        fired
    }

    pub fn click(&self) -> MemoryEvent {
        self.dispatch("click")
    }

    pub fn submit(&self) -> MemoryEvent {
        self.dispatch("submit")
    }
}

/// Weak counterpart of [`MemoryElement`].
#[derive(Clone, Debug)]
pub struct WeakMemoryElement(Weak<Node>);

impl WeakMemoryElement {
    #[must_use]
    pub fn upgrade(&self) -> Option<MemoryElement> {
        self.0.upgrade().map(MemoryElement)
    }
}

/// Listener registration on a [`MemoryElement`]; dropping it unregisters.
#[derive(Debug)]
pub struct MemorySubscription {
    node: Weak<Node>,
    id: u64,
}

impl Drop for MemorySubscription {
    fn drop(&mut self) {
        let Some(node) = self.node.upgrade() else {
            return;
        };
        // Take the handler out first so its captures drop after the borrow ends.
        let removed = {
            let mut listeners = node.listeners.borrow_mut();
            listeners.iter().position(|(id, _, _)| *id == self.id).map(|i| listeners.remove(i))
        };
        drop(removed);
    }
}

impl Element for MemoryElement {
    type Subscription = MemorySubscription;

    fn set_id(&self, id: &str) {
        *self.0.id.borrow_mut() = id.to_owned();
    }

    fn set_class_name(&self, value: &str) {
        *self.0.class.borrow_mut() = value.to_owned();
    }

    fn add_class(&self, class: &str) -> Result<(), DomError> {
        if class.is_empty() || class.contains(char::is_whitespace) {
            return Err(DomError::Host(format!("invalid class token '{class}'")));
        }
        if self.has_class(class) {
            return Ok(());
        }
        let mut current = self.0.class.borrow_mut();
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(class);
        Ok(())
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError> {
        if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == '"' || c == '=') {
            return Err(DomError::Host(format!("invalid attribute name '{name}'")));
        }
        match name {
            "id" => self.set_id(value),
            "class" => self.set_class_name(value),
            _ => {
                self.0.attributes.borrow_mut().insert(name.to_owned(), value.to_owned());
            }
        }
        Ok(())
    }

    fn set_text(&self, text: &str) {
        for child in self.0.children.borrow_mut().drain(..) {
            *child.0.parent.borrow_mut() = Weak::new();
        }
        *self.0.text.borrow_mut() = text.to_owned();
    }

    fn append_child(&self, child: &Self) -> Result<(), DomError> {
        if child == self || self.has_ancestor(child) {
            return Err(DomError::Host("cannot append an element into itself".to_owned()));
        }
        child.remove();
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child.clone());
        Ok(())
    }

    fn remove(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent.0.children.borrow_mut().retain(|c| c != self);
        *self.0.parent.borrow_mut() = Weak::new();
    }

    fn check_validity(&self) -> bool {
        self.0.valid.get()
    }

    fn subscribe(&self, event: &str, handler: Listener) -> Result<MemorySubscription, DomError> {
        self.check_listeners(event)?;
        let id = self.0.next_listener.get();
        self.0.next_listener.set(id + 1);
        self.0.listeners.borrow_mut().push((id, event.to_owned(), Rc::new(RefCell::new(handler))));
        Ok(MemorySubscription { node: Rc::downgrade(&self.0), id })
    }

    fn listen_once(&self, event: &str, handler: OnceListener<Self>) -> Result<(), DomError> {
        self.check_listeners(event)?;
        self.0.once_listeners.borrow_mut().push((event.to_owned(), handler));
        Ok(())
    }
}

impl MemoryElement {
    fn check_listeners(&self, event: &str) -> Result<(), DomError> {
        if self.0.rejected_event.as_deref() == Some(event) {
            return Err(DomError::Host(format!("<{}> refused a '{event}' listener", self.0.tag)));
        }
        Ok(())
    }

    fn has_ancestor(&self, candidate: &MemoryElement) -> bool {
        let mut current = self.parent();
        while let Some(node) = current {
            if &node == candidate {
                return true;
            }
            current = node.parent();
        }
        false
    }
}

// =============================================================
// Events
// =============================================================

/// Record of one synchronous dispatch.
#[derive(Debug)]
pub struct MemoryEvent {
    name: String,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl MemoryEvent {
    fn new(name: &str) -> Self {
        Self { name: name.to_owned(), default_prevented: Cell::new(false), propagation_stopped: Cell::new(false) }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

impl DomEvent for MemoryEvent {
    fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }
}

// =============================================================
// Document
// =============================================================

struct DocumentInner {
    root: MemoryElement,
    body: Option<MemoryElement>,
    ready: Cell<bool>,
    on_ready: RefCell<Vec<Box<dyn FnOnce()>>>,
    rejected_event: RefCell<Option<String>>,
}

/// An in-memory document. Clones share the same tree.
#[derive(Clone)]
pub struct MemoryDocument {
    inner: Rc<DocumentInner>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// A fully parsed document with an empty `<body>`.
    #[must_use]
    pub fn new() -> Self {
        let root = MemoryElement::new(DOCUMENT_TAG);
        let body = MemoryElement::new("body");
        *body.0.parent.borrow_mut() = Rc::downgrade(&root.0);
        root.0.children.borrow_mut().push(body.clone());
        Self::from_parts(root, Some(body))
    }

    /// A document with no `<body>` element.
    #[must_use]
    pub fn without_body() -> Self {
        Self::from_parts(MemoryElement::new(DOCUMENT_TAG), None)
    }

    fn from_parts(root: MemoryElement, body: Option<MemoryElement>) -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                root,
                body,
                ready: Cell::new(true),
                on_ready: RefCell::new(Vec::new()),
                rejected_event: RefCell::new(None),
            }),
        }
    }

    /// A document still being parsed; call [`Self::finish_loading`] to fire
    /// ready callbacks.
    #[must_use]
    pub fn loading() -> Self {
        let doc = Self::new();
        doc.inner.ready.set(false);
        doc
    }

    /// Make elements created from now on refuse listeners for `event`, as a
    /// host without that event would.
    pub fn reject_listeners(&self, event: &str) {
        *self.inner.rejected_event.borrow_mut() = Some(event.to_owned());
    }

    /// Mark parsing done and run queued ready callbacks in order.
    pub fn finish_loading(&self) {
        self.inner.ready.set(true);
        let callbacks: Vec<_> = self.inner.on_ready.borrow_mut().drain(..).collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Create an element and append it to `<body>` (or the root without one).
    ///
    /// # Errors
    ///
    /// Propagates invalid tag names.
    pub fn append_new(&self, tag: &str) -> Result<MemoryElement, DomError> {
        let el = self.create_element(tag)?;
        self.inner.body.as_ref().unwrap_or(&self.inner.root).append_child(&el)?;
        Ok(el)
    }
}

impl Document for MemoryDocument {
    type Element = MemoryElement;

    fn query_all(&self, selector: &str) -> Vec<MemoryElement> {
        self.inner.root.find_all(selector)
    }

    fn element_by_id(&self, id: &str) -> Option<MemoryElement> {
        if id.is_empty() {
            return None;
        }
        self.inner.root.descendants().into_iter().find(|el| *el.0.id.borrow() == id)
    }

    fn create_element(&self, tag: &str) -> Result<MemoryElement, DomError> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DomError::Host(format!("invalid tag name '{tag}'")));
        }
        Ok(MemoryElement::refusing(&tag.to_ascii_lowercase(), self.inner.rejected_event.borrow().clone()))
    }

    fn body(&self) -> Option<MemoryElement> {
        self.inner.body.clone()
    }

    fn when_ready(&self, callback: Box<dyn FnOnce()>) {
        if self.inner.ready.get() {
            callback();
        } else {
            self.inner.on_ready.borrow_mut().push(callback);
        }
    }
}

// =============================================================
// Toolkit
// =============================================================

struct ModalInner {
    element: MemoryElement,
    shown: Cell<bool>,
    show_count: Cell<usize>,
}

/// Modal created by [`RecordingToolkit`]. Hiding a shown modal fires
/// [`MODAL_HIDDEN_EVENT`] synchronously.
#[derive(Clone)]
pub struct MemoryModal {
    inner: Rc<ModalInner>,
}

impl MemoryModal {
    #[must_use]
    pub fn element(&self) -> MemoryElement {
        self.inner.element.clone()
    }

    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.inner.shown.get()
    }

    #[must_use]
    pub fn show_count(&self) -> usize {
        self.inner.show_count.get()
    }

    /// Backdrop click or escape key.
    pub fn dismiss(&self) {
        self.hide();
    }
}

impl ModalHandle for MemoryModal {
    fn show(&self) {
        self.inner.shown.set(true);
        self.inner.show_count.set(self.inner.show_count.get() + 1);
    }

    fn hide(&self) {
        if !self.inner.shown.replace(false) {
            return;
        }
        self.inner.element.dispatch(MODAL_HIDDEN_EVENT);
    }
}

/// Records every widget it is asked to create.
///
/// Like Bootstrap, a modal's descendants carrying `data-bs-dismiss="modal"`
/// hide it when clicked.
#[derive(Default)]
pub struct RecordingToolkit {
    unavailable: bool,
    tooltips: RefCell<Vec<MemoryElement>>,
    toasts: RefCell<Vec<MemoryElement>>,
    modals: RefCell<Vec<MemoryModal>>,
}

impl RecordingToolkit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A toolkit whose every constructor fails, as when the script is missing.
    #[must_use]
    pub fn unavailable() -> Self {
        Self { unavailable: true, ..Self::default() }
    }

    #[must_use]
    pub fn tooltips(&self) -> Vec<MemoryElement> {
        self.tooltips.borrow().clone()
    }

    #[must_use]
    pub fn shown_toasts(&self) -> Vec<MemoryElement> {
        self.toasts.borrow().clone()
    }

    #[must_use]
    pub fn modals(&self) -> Vec<MemoryModal> {
        self.modals.borrow().clone()
    }

    #[must_use]
    pub fn last_modal(&self) -> Option<MemoryModal> {
        self.modals.borrow().last().cloned()
    }

    fn check(&self, widget: &str) -> Result<(), DomError> {
        if self.unavailable {
            return Err(DomError::Toolkit(format!("{widget} is not available")));
        }
        Ok(())
    }
}

impl Toolkit<MemoryElement> for RecordingToolkit {
    type Modal = MemoryModal;

    fn tooltip(&self, element: &MemoryElement) -> Result<(), DomError> {
        self.check("Tooltip")?;
        self.tooltips.borrow_mut().push(element.clone());
        Ok(())
    }

    fn show_toast(&self, element: &MemoryElement) -> Result<(), DomError> {
        self.check("Toast")?;
        self.toasts.borrow_mut().push(element.clone());
        Ok(())
    }

    fn modal(&self, element: &MemoryElement) -> Result<MemoryModal, DomError> {
        self.check("Modal")?;
        let modal = MemoryModal {
            inner: Rc::new(ModalInner { element: element.clone(), shown: Cell::new(false), show_count: Cell::new(0) }),
        };
        for dismiss in element.find_all("[data-bs-dismiss=\"modal\"]") {
            let weak = Rc::downgrade(&modal.inner);
            dismiss.listen(
                "click",
                Box::new(move |_: &dyn DomEvent| {
                    if let Some(inner) = weak.upgrade() {
                        MemoryModal { inner }.hide();
                    }
                }),
            )?;
        }
        self.modals.borrow_mut().push(modal.clone());
        Ok(modal)
    }
}
