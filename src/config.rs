//! Page configuration with built-in defaults.
//!
//! Every field is optional in the JSON form; missing fields keep the
//! defaults from [`crate::consts`]. In the browser the start hook reads the
//! text of `<script id="pagekit-config" type="application/json">` if present.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::consts::{
    DEFAULT_CURRENCY, DEFAULT_DATE_FORMAT, TOAST_CONTAINER_CLASS, TOAST_CONTAINER_ID, TOOLTIP_SELECTOR,
    VALIDATED_CLASS, VALIDATION_SELECTOR,
};
use crate::format::{FormatError, format_currency};
use crate::toast::Severity;

/// Id of the optional inline JSON config element.
pub const CONFIG_ELEMENT_ID: &str = "pagekit-config";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config field '{field}' must not be empty")]
    Empty { field: &'static str },
    #[error("unknown log level '{0}'")]
    LogLevel(String),
    #[error(transparent)]
    Currency(#[from] FormatError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct KitConfig {
    pub validation_selector: String,
    pub validated_class: String,
    pub tooltip_selector: String,
    pub toast_container_id: String,
    pub toast_container_class: String,
    pub default_severity: Severity,
    pub confirm_title: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub default_currency: String,
    pub default_date_format: String,
    /// `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            validation_selector: VALIDATION_SELECTOR.to_owned(),
            validated_class: VALIDATED_CLASS.to_owned(),
            tooltip_selector: TOOLTIP_SELECTOR.to_owned(),
            toast_container_id: TOAST_CONTAINER_ID.to_owned(),
            toast_container_class: TOAST_CONTAINER_CLASS.to_owned(),
            default_severity: Severity::Success,
            confirm_title: "Confirm Action".to_owned(),
            confirm_label: "Confirm".to_owned(),
            cancel_label: "Cancel".to_owned(),
            default_currency: DEFAULT_CURRENCY.to_owned(),
            default_date_format: DEFAULT_DATE_FORMAT.to_owned(),
            log_level: "info".to_owned(),
        }
    }
}

impl KitConfig {
    /// Parse partial JSON over the defaults and validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed JSON, unknown fields, empty
    /// selectors or ids, an unknown log level, or an invalid currency code.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// See [`KitConfig::from_json`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("validationSelector", &self.validation_selector),
            ("validatedClass", &self.validated_class),
            ("tooltipSelector", &self.tooltip_selector),
            ("toastContainerId", &self.toast_container_id),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty { field });
            }
        }
        self.log_level()?;
        format_currency(0.0, &self.default_currency)?;
        Ok(())
    }

    /// The configured level as a `log` filter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LogLevel`] for unknown names.
    pub fn log_level(&self) -> Result<log::Level, ConfigError> {
        self.log_level.parse().map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }
}
