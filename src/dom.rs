//! Document, element, and UI toolkit seams.
//!
//! SYSTEM CONTEXT
//! ==============
//! Page helpers never touch `web_sys` directly. They build and query markup
//! through [`Document`] / [`Element`] and drive Bootstrap widgets through
//! [`Toolkit`], so the same code runs against the browser (feature `browser`)
//! and against the in-memory host in [`crate::memory`].

/// Error surfaced by a host DOM or toolkit call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The document has no `<body>` to attach to.
    #[error("document has no body")]
    NoBody,
    /// The host rejected a DOM call (bad tag, bad attribute name, ...).
    #[error("dom call failed: {0}")]
    Host(String),
    /// The UI toolkit is missing or refused to construct a widget.
    #[error("toolkit call failed: {0}")]
    Toolkit(String),
}

/// Boxed event listener.
pub type Listener = Box<dyn FnMut(&dyn DomEvent)>;

/// Boxed one-shot listener; receives the element it was registered on.
pub type OnceListener<E> = Box<dyn FnOnce(&E)>;

/// The parts of a dispatched DOM event the helpers act on.
pub trait DomEvent {
    fn prevent_default(&self);
    fn stop_propagation(&self);
}

/// A handle to one element. Handles are cheap clones of the same node.
pub trait Element: Clone + 'static {
    /// Keeps a listener from [`Element::subscribe`] registered. Dropping it
    /// removes the listener and releases its handler.
    type Subscription: 'static;

    fn set_id(&self, id: &str);

    /// Replace the full `class` attribute.
    fn set_class_name(&self, value: &str);

    /// Add a single class token.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Host`] for tokens the host rejects.
    fn add_class(&self, class: &str) -> Result<(), DomError>;

    /// # Errors
    ///
    /// Returns [`DomError::Host`] for invalid attribute names.
    fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError>;

    /// Replace all children with a single text node.
    fn set_text(&self, text: &str);

    /// # Errors
    ///
    /// Returns [`DomError::Host`] if the child cannot be inserted here.
    fn append_child(&self, child: &Self) -> Result<(), DomError>;

    /// Detach this element from its parent, if any.
    fn remove(&self);

    /// Built-in constraint validation. Non-form elements are always valid.
    fn check_validity(&self) -> bool;

    /// Register `handler` for events named `event` until the returned
    /// subscription is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Host`] if the listener cannot be attached.
    fn subscribe(&self, event: &str, handler: Listener) -> Result<Self::Subscription, DomError>;

    /// Register `handler` for the rest of the page's life.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Host`] if the listener cannot be attached.
    fn listen(&self, event: &str, handler: Listener) -> Result<(), DomError> {
        std::mem::forget(self.subscribe(event, handler)?);
        Ok(())
    }

    /// Run `handler` on the next `event` only, then release it. The handler
    /// gets the element instead of capturing it, so a handler that detaches
    /// its own element leaves nothing behind.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Host`] if the listener cannot be attached.
    fn listen_once(&self, event: &str, handler: OnceListener<Self>) -> Result<(), DomError>;
}

/// Document-level access.
pub trait Document {
    type Element: Element;

    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// # Errors
    ///
    /// Returns [`DomError::Host`] for invalid tag names.
    fn create_element(&self, tag: &str) -> Result<Self::Element, DomError>;

    fn body(&self) -> Option<Self::Element>;

    /// Run `callback` once the document has finished parsing; immediately if
    /// it already has.
    fn when_ready(&self, callback: Box<dyn FnOnce()>);
}

/// A shown-or-hidden modal widget owned by the toolkit.
pub trait ModalHandle: 'static {
    fn show(&self);

    /// Start hiding. The toolkit fires [`crate::consts::MODAL_HIDDEN_EVENT`]
    /// on the modal element once the transition completes.
    fn hide(&self);
}

/// Bootstrap-style widget constructors.
pub trait Toolkit<E: Element> {
    type Modal: ModalHandle;

    /// Attach a hover/focus tooltip to `element`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Toolkit`] if the toolkit is unavailable.
    fn tooltip(&self, element: &E) -> Result<(), DomError>;

    /// Show `element` as a toast. The toolkit fires
    /// [`crate::consts::TOAST_HIDDEN_EVENT`] once it auto-hides.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Toolkit`] if the toolkit is unavailable.
    fn show_toast(&self, element: &E) -> Result<(), DomError>;

    /// Wrap `element` in a modal widget without showing it.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Toolkit`] if the toolkit is unavailable.
    fn modal(&self, element: &E) -> Result<Self::Modal, DomError>;
}

/// Create a `tag` element with `class` already set.
///
/// # Errors
///
/// Propagates [`Document::create_element`] failures.
pub fn element_with_class<D: Document>(doc: &D, tag: &str, class: &str) -> Result<D::Element, DomError> {
    let el = doc.create_element(tag)?;
    el.set_class_name(class);
    Ok(el)
}

/// Set several attributes at once, stopping at the first failure.
///
/// # Errors
///
/// Propagates [`Element::set_attribute`] failures.
pub fn set_attributes<E: Element>(el: &E, attributes: &[(&str, &str)]) -> Result<(), DomError> {
    for (name, value) in attributes {
        el.set_attribute(name, value)?;
    }
    Ok(())
}
