//! Browser host: web-sys document, Bootstrap bindings, `localStorage`, and
//! the `window.app` namespace.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything else in the crate is host-agnostic. This module supplies the
//! real implementations of the [`crate::dom`], [`crate::timing`], and
//! [`crate::store`] seams and, from the wasm start hook, builds one
//! [`PageKit`] for the page and exposes it to inline scripts.
//!
//! Bootstrap is reached through its `bootstrap` global. If the script is not
//! loaded every constructor throws, which surfaces as [`DomError::Toolkit`].

use std::rc::Rc;

use gloo_timers::callback::Timeout;
use js_sys::{Array, Function, JSON, Object, Promise, Reflect};
use time::{Date, Month, PrimitiveDateTime, Time};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{AddEventListenerOptions, DomException, HtmlFormElement};

use crate::config::{CONFIG_ELEMENT_ID, ConfigError, KitConfig};
use crate::dom::{Document, DomError, DomEvent, Element, Listener, ModalHandle, OnceListener, Toolkit};
use crate::format::FormatError;
use crate::kit::PageKit;
use crate::store::{StorageBackend, StoreError};
use crate::timing::Scheduler;
use crate::toast::Severity;

/// The kit as assembled for a real page.
pub type BrowserKit = PageKit<WebDocument, Bootstrap, TimeoutScheduler, LocalStorage>;

/// Best-effort text for a thrown JS value.
fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}

fn host_error(value: &JsValue) -> DomError {
    DomError::Host(describe(value))
}

fn toolkit_error(value: &JsValue) -> DomError {
    DomError::Toolkit(describe(value))
}

// =============================================================
// DOM
// =============================================================

struct WebEvent(web_sys::Event);

impl DomEvent for WebEvent {
    fn prevent_default(&self) {
        self.0.prevent_default();
    }

    fn stop_propagation(&self) {
        self.0.stop_propagation();
    }
}

#[derive(Clone, Debug)]
pub struct WebElement(web_sys::Element);

impl WebElement {
    #[must_use]
    pub fn raw(&self) -> &web_sys::Element {
        &self.0
    }
}

/// Registered listener; dropping it removes the listener and frees its
/// closure.
pub struct WebSubscription {
    target: web_sys::Element,
    event: String,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl Drop for WebSubscription {
    fn drop(&mut self) {
        let callback: &Function = self.callback.as_ref().unchecked_ref();
        if let Err(e) = self.target.remove_event_listener_with_callback(&self.event, callback) {
            log::debug!("failed to remove '{}' listener: {}", self.event, describe(&e));
        }
    }
}

impl Element for WebElement {
    type Subscription = WebSubscription;

    fn set_id(&self, id: &str) {
        self.0.set_id(id);
    }

    fn set_class_name(&self, value: &str) {
        self.0.set_class_name(value);
    }

    fn add_class(&self, class: &str) -> Result<(), DomError> {
        self.0.class_list().add_1(class).map_err(|e| host_error(&e))
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError> {
        self.0.set_attribute(name, value).map_err(|e| host_error(&e))
    }

    fn set_text(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn append_child(&self, child: &Self) -> Result<(), DomError> {
        self.0.append_child(&child.0).map(drop).map_err(|e| host_error(&e))
    }

    fn remove(&self) {
        self.0.remove();
    }

    fn check_validity(&self) -> bool {
        self.0.dyn_ref::<HtmlFormElement>().is_none_or(HtmlFormElement::check_validity)
    }

    fn subscribe(&self, event: &str, handler: Listener) -> Result<WebSubscription, DomError> {
        let mut handler = handler;
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            handler(&WebEvent(event));
        });
        self.0
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|e| host_error(&e))?;
        Ok(WebSubscription { target: self.0.clone(), event: event.to_owned(), callback })
    }

    fn listen_once(&self, event: &str, handler: OnceListener<Self>) -> Result<(), DomError> {
        // Freed by wasm-bindgen after its single call; the browser drops the
        // registration itself because of `once`.
        let callback = Closure::once_into_js(move |event: web_sys::Event| {
            match event.current_target().and_then(|t| t.dyn_ref::<web_sys::Element>().cloned()) {
                Some(target) => handler(&WebElement(target)),
                None => log::warn!("'{}' fired without an element target", event.type_()),
            }
        });
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        self.0
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                callback.unchecked_ref(),
                &options,
            )
            .map_err(|e| host_error(&e))
    }
}

pub struct WebDocument {
    doc: web_sys::Document,
}

impl WebDocument {
    #[must_use]
    pub fn new(doc: web_sys::Document) -> Self {
        Self { doc }
    }
}

impl Document for WebDocument {
    type Element = WebElement;

    fn query_all(&self, selector: &str) -> Vec<WebElement> {
        let list = match self.doc.query_selector_all(selector) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("invalid selector '{selector}': {}", describe(&e));
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_ref::<web_sys::Element>().cloned())
            .map(WebElement)
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<WebElement> {
        self.doc.get_element_by_id(id).map(WebElement)
    }

    fn create_element(&self, tag: &str) -> Result<WebElement, DomError> {
        self.doc.create_element(tag).map(WebElement).map_err(|e| host_error(&e))
    }

    fn body(&self) -> Option<WebElement> {
        self.doc.body().map(|body| WebElement(body.into()))
    }

    fn when_ready(&self, callback: Box<dyn FnOnce()>) {
        if self.doc.ready_state() != "loading" {
            callback();
            return;
        }
        let once = Closure::once_into_js(move || callback());
        if let Err(e) = self.doc.add_event_listener_with_callback("DOMContentLoaded", once.unchecked_ref()) {
            log::error!("failed to wait for DOMContentLoaded: {}", describe(&e));
        }
    }
}

// =============================================================
// Bootstrap
// =============================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = bootstrap)]
    type Tooltip;

    #[wasm_bindgen(constructor, catch, js_namespace = bootstrap)]
    fn new(element: &web_sys::Element) -> Result<Tooltip, JsValue>;
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = bootstrap)]
    type Toast;

    #[wasm_bindgen(constructor, catch, js_namespace = bootstrap)]
    fn new(element: &web_sys::Element) -> Result<Toast, JsValue>;

    #[wasm_bindgen(method)]
    fn show(this: &Toast);
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = bootstrap)]
    type Modal;

    #[wasm_bindgen(constructor, catch, js_namespace = bootstrap)]
    fn new(element: &web_sys::Element) -> Result<Modal, JsValue>;

    #[wasm_bindgen(method)]
    fn show(this: &Modal);

    #[wasm_bindgen(method)]
    fn hide(this: &Modal);
}

/// Bootstrap 5 widgets from the page's `bootstrap` global.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bootstrap;

pub struct BootstrapModal(Modal);

impl ModalHandle for BootstrapModal {
    fn show(&self) {
        self.0.show();
    }

    fn hide(&self) {
        self.0.hide();
    }
}

impl Toolkit<WebElement> for Bootstrap {
    type Modal = BootstrapModal;

    fn tooltip(&self, element: &WebElement) -> Result<(), DomError> {
        Tooltip::new(&element.0).map(drop).map_err(|e| toolkit_error(&e))
    }

    fn show_toast(&self, element: &WebElement) -> Result<(), DomError> {
        let toast = Toast::new(&element.0).map_err(|e| toolkit_error(&e))?;
        toast.show();
        Ok(())
    }

    fn modal(&self, element: &WebElement) -> Result<BootstrapModal, DomError> {
        Modal::new(&element.0).map(BootstrapModal).map_err(|e| toolkit_error(&e))
    }
}

// =============================================================
// Timers and storage
// =============================================================

/// Browser event-loop timers. Dropping a task clears its timeout.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    type Task = Timeout;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, task)
    }
}

/// `window.localStorage`, looked up on every call so a page that disables
/// storage mid-session degrades to [`StoreError::Unavailable`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        let window = web_sys::window().ok_or(StoreError::Unavailable)?;
        window.local_storage().map_err(|_| StoreError::Unavailable)?.ok_or(StoreError::Unavailable)
    }
}

fn is_quota_error(value: &JsValue) -> bool {
    value
        .dyn_ref::<DomException>()
        .is_some_and(|e| matches!(e.name().as_str(), "QuotaExceededError" | "NS_ERROR_DOM_QUOTA_REACHED"))
}

impl StorageBackend for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::storage()?.get_item(key).map_err(|e| StoreError::Backend(describe(&e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::storage()?.set_item(key, value).map_err(|e| {
            if is_quota_error(&e) {
                StoreError::QuotaExceeded { key: key.to_owned() }
            } else {
                StoreError::Backend(describe(&e))
            }
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        Self::storage()?.remove_item(key).map_err(|e| StoreError::Backend(describe(&e)))
    }

    fn clear(&self) -> Result<(), StoreError> {
        Self::storage()?.clear().map_err(|e| StoreError::Backend(describe(&e)))
    }
}

// =============================================================
// Start hook and `window.app`
// =============================================================

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let (config, config_error) = match read_config(&doc) {
        Ok(config) => (config, None),
        Err(e) => (KitConfig::default(), Some(e)),
    };
    let level = config.log_level().unwrap_or(log::Level::Info);
    if let Err(e) = console_log::init_with_level(level) {
        log::debug!("keeping existing logger: {e}");
    }
    if let Some(e) = config_error {
        log::warn!("ignoring page config: {e}");
    }

    let kit = Rc::new(PageKit::new(WebDocument::new(doc), Bootstrap, TimeoutScheduler, LocalStorage, config));
    let forms = kit.init();
    log::debug!("page kit ready ({forms} forms wired)");

    if let Err(e) = install(&kit) {
        log::error!("failed to install window.app: {}", describe(&e));
    }
}

fn read_config(doc: &web_sys::Document) -> Result<KitConfig, ConfigError> {
    match doc.get_element_by_id(CONFIG_ELEMENT_ID).and_then(|el| el.text_content()) {
        Some(raw) => KitConfig::from_json(&raw),
        None => Ok(KitConfig::default()),
    }
}

fn to_js(error: &impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&error.to_string()).into()
}

/// Set `name` on `target` to `closure` and leak the closure for the page's
/// lifetime.
fn export<T>(target: &Object, name: &str, closure: Closure<T>) -> Result<(), JsValue>
where
    T: ?Sized + WasmClosure,
{
    Reflect::set(target, &JsValue::from_str(name), closure.as_ref())?;
    closure.forget();
    Ok(())
}

/// Turn a single-array callback into a JS function taking any number of
/// arguments.
fn variadic(inner: Closure<dyn Fn(Array)>) -> Result<Function, JsValue> {
    let factory = Function::new_with_args("inner", "return function (...args) { inner(args); };");
    let wrapped = factory.call1(&JsValue::NULL, inner.as_ref())?;
    inner.forget();
    wrapped.dyn_into::<Function>()
}

fn apply_logged(func: &Function, args: &Array) {
    if let Err(e) = func.apply(&JsValue::NULL, args) {
        log::error!("callback threw: {}", describe(&e));
    }
}

/// Local calendar fields of anything `new Date(value)` accepts.
fn local_date_time(value: &JsValue) -> Result<PrimitiveDateTime, FormatError> {
    let invalid = || FormatError::InvalidDate(describe(value));
    let date = match value.dyn_ref::<js_sys::Date>() {
        Some(date) => date.clone(),
        None => js_sys::Date::new(value),
    };
    if date.get_time().is_nan() {
        return Err(invalid());
    }
    let year = i32::try_from(date.get_full_year()).map_err(|_| invalid())?;
    let month = u8::try_from(date.get_month() + 1).map_err(|_| invalid()).and_then(|m| Month::try_from(m).map_err(|_| invalid()))?;
    let day = u8::try_from(date.get_date()).map_err(|_| invalid())?;
    let hour = u8::try_from(date.get_hours()).map_err(|_| invalid())?;
    let minute = u8::try_from(date.get_minutes()).map_err(|_| invalid())?;
    let date = Date::from_calendar_date(year, month, day).map_err(|_| invalid())?;
    let time = Time::from_hms(hour, minute, 0).map_err(|_| invalid())?;
    Ok(PrimitiveDateTime::new(date, time))
}

fn js_to_json(value: &JsValue) -> Result<serde_json::Value, String> {
    if value.is_undefined() {
        return Ok(serde_json::Value::Null);
    }
    let text = JSON::stringify(value)
        .map_err(|e| describe(&e))?
        .as_string()
        .ok_or_else(|| "value has no JSON form".to_owned())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

fn json_to_js(value: &serde_json::Value) -> JsValue {
    match JSON::parse(&value.to_string()) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::error!("error reading storage value: {}", describe(&e));
            JsValue::NULL
        }
    }
}

fn install(kit: &Rc<BrowserKit>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let app = Object::new();

    let k = Rc::clone(kit);
    export(
        &app,
        "showToast",
        Closure::<dyn Fn(String, Option<String>)>::new(move |message: String, severity: Option<String>| {
            let severity = severity.map(Severity::from);
            k.show_toast(&message, severity.as_ref());
        }),
    )?;

    let k = Rc::clone(kit);
    export(
        &app,
        "confirmAction",
        Closure::<dyn Fn(String) -> Promise>::new(move |message: String| {
            let confirmation = k.confirm_action(&message);
            future_to_promise(async move { Ok(JsValue::from_bool(confirmation.await)) })
        }),
    )?;

    let k = Rc::clone(kit);
    export(
        &app,
        "formatDate",
        Closure::<dyn Fn(JsValue, Option<String>) -> Result<String, JsValue>>::new(
            move |date: JsValue, format: Option<String>| {
                let local = local_date_time(&date).map_err(|e| to_js(&e))?;
                k.format_date(local, format.as_deref()).map_err(|e| to_js(&e))
            },
        ),
    )?;

    let k = Rc::clone(kit);
    export(
        &app,
        "formatCurrency",
        Closure::<dyn Fn(f64, Option<String>) -> Result<String, JsValue>>::new(
            move |amount: f64, currency: Option<String>| {
                k.format_currency(amount, currency.as_deref()).map_err(|e| to_js(&e))
            },
        ),
    )?;

    let k = Rc::clone(kit);
    export(
        &app,
        "debounce",
        Closure::<dyn Fn(Function, u32) -> Result<Function, JsValue>>::new(move |func: Function, wait: u32| {
            let debounced = k.debounce(wait, move |args: Array| apply_logged(&func, &args));
            variadic(Closure::<dyn Fn(Array)>::new(move |args: Array| debounced.call(args)))
        }),
    )?;

    let k = Rc::clone(kit);
    export(
        &app,
        "throttle",
        Closure::<dyn Fn(Function, u32) -> Result<Function, JsValue>>::new(move |func: Function, limit: u32| {
            let throttled = k.throttle(limit, move |args: Array| apply_logged(&func, &args));
            variadic(Closure::<dyn Fn(Array)>::new(move |args: Array| {
                if !throttled.call(args) {
                    log::trace!("throttled call dropped");
                }
            }))
        }),
    )?;

    let storage = storage_object(kit)?;
    Reflect::set(&app, &JsValue::from_str("storage"), &storage)?;
    Reflect::set(&window, &JsValue::from_str("app"), &app)?;
    Ok(())
}

fn storage_object(kit: &Rc<BrowserKit>) -> Result<Object, JsValue> {
    let storage = Object::new();

    let k = Rc::clone(kit);
    export(
        &storage,
        "set",
        Closure::<dyn Fn(String, JsValue)>::new(move |key: String, value: JsValue| match js_to_json(&value) {
            Ok(json) => k.storage().set(&key, &json),
            Err(e) => log::error!("error saving to storage (key={key}): {e}"),
        }),
    )?;

    let k = Rc::clone(kit);
    export(
        &storage,
        "get",
        Closure::<dyn Fn(String) -> JsValue>::new(move |key: String| {
            k.storage().get::<serde_json::Value>(&key).map_or(JsValue::NULL, |value| json_to_js(&value))
        }),
    )?;

    let k = Rc::clone(kit);
    export(&storage, "remove", Closure::<dyn Fn(String)>::new(move |key: String| k.storage().remove(&key)))?;

    let k = Rc::clone(kit);
    export(&storage, "clear", Closure::<dyn Fn()>::new(move || k.storage().clear()))?;

    Ok(storage)
}
