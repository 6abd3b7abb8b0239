//! Client-side page helpers for the server-rendered conference site.
//!
//! This crate is compiled to WebAssembly and loaded by every page. It wires
//! Bootstrap form validation and tooltips, shows toasts and confirmation
//! dialogs, formats dates and amounts, rate-limits callbacks, and wraps
//! `localStorage`. Browser and toolkit access goes through small traits in
//! [`dom`], [`timing`] and [`store`], so all behavior runs natively in tests
//! against the in-memory host in [`memory`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`kit`] | [`kit::PageKit`] facade bundling one host, the `window.app` surface |
//! | [`config`] | Typed page configuration with defaults |
//! | [`consts`] | Default selectors, class names, and toolkit event names |
//! | [`dom`] | Document, element, and UI toolkit seams |
//! | [`wiring`] | Form validation and tooltip hookup |
//! | [`toast`] | Toast notifications |
//! | [`confirm`] | Confirmation dialog resolving to a boolean |
//! | [`format`] | Date and currency formatting |
//! | [`timing`] | Scheduler seam, debounce, throttle |
//! | [`store`] | Fail-soft JSON key-value store |
//! | [`memory`] | In-memory document and Bootstrap stand-in for tests |
//! | `browser` | web-sys / Bootstrap / `localStorage` host (feature `browser`) |

pub mod config;
pub mod confirm;
pub mod consts;
pub mod dom;
pub mod format;
pub mod kit;
pub mod memory;
pub mod store;
pub mod timing;
pub mod toast;
pub mod wiring;

#[cfg(feature = "browser")]
pub mod browser;

pub use config::KitConfig;
pub use kit::PageKit;
