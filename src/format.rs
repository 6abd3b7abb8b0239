//! Date and currency formatting for page templates.
//!
//! Dates use a small token language (`yyyy`, `MM`, `dd`, `HH`, `mm`).
//! Amounts are always rendered in the `nl-NL` locale: symbol, non-breaking
//! space, optional minus, `.` thousands groups, `,` decimals.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::consts::{DEFAULT_CURRENCY, DEFAULT_DATE_FORMAT};

/// Error returned by the formatters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid currency code: '{0}'")]
    InvalidCurrency(String),
}

// =============================================================
// Dates
// =============================================================

/// Anything [`format_date`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput<'a> {
    /// Wall-clock date and time.
    Local(PrimitiveDateTime),
    /// Date and time with an offset; formatted in that offset.
    Zoned(OffsetDateTime),
    /// Milliseconds since the Unix epoch, formatted in UTC.
    EpochMillis(i64),
    /// RFC 3339, `YYYY-MM-DDTHH:MM[:SS[.fff]]`, `YYYY-MM-DD HH:MM[:SS]`, or
    /// `YYYY-MM-DD` (midnight).
    Text(&'a str),
}

impl From<PrimitiveDateTime> for DateInput<'_> {
    fn from(value: PrimitiveDateTime) -> Self {
        Self::Local(value)
    }
}

impl From<OffsetDateTime> for DateInput<'_> {
    fn from(value: OffsetDateTime) -> Self {
        Self::Zoned(value)
    }
}

impl From<Date> for DateInput<'_> {
    fn from(value: Date) -> Self {
        Self::Local(PrimitiveDateTime::new(value, Time::MIDNIGHT))
    }
}

impl From<i64> for DateInput<'_> {
    fn from(value: i64) -> Self {
        Self::EpochMillis(value)
    }
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl DateInput<'_> {
    /// Resolve to a wall-clock date and time.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidDate`] for unparseable text or
    /// out-of-range timestamps.
    pub fn resolve(self) -> Result<PrimitiveDateTime, FormatError> {
        match self {
            Self::Local(value) => Ok(value),
            Self::Zoned(value) => Ok(PrimitiveDateTime::new(value.date(), value.time())),
            Self::EpochMillis(ms) => OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
                .map(|value| PrimitiveDateTime::new(value.date(), value.time()))
                .map_err(|e| FormatError::InvalidDate(format!("{ms}: {e}"))),
            Self::Text(text) => parse_date_text(text),
        }
    }
}

fn parse_date_text(text: &str) -> Result<PrimitiveDateTime, FormatError> {
    let text = text.trim();
    if let Ok(value) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(PrimitiveDateTime::new(value.date(), value.time()));
    }
    let date_time_formats = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    ];
    for description in date_time_formats {
        if let Ok(value) = PrimitiveDateTime::parse(text, description) {
            return Ok(value);
        }
    }
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT))
        .map_err(|_| FormatError::InvalidDate(text.to_owned()))
}

/// Substitute date tokens in `format` with the components of `date`.
///
/// Tokens are replaced in the order `yyyy`, `MM`, `dd`, `HH`, `mm`, and only
/// the first occurrence of each is substituted: `"dd/dd"` becomes `"05/dd"`.
/// Month, day, hour and minute are zero-padded to two digits.
///
/// # Errors
///
/// Returns [`FormatError::InvalidDate`] if `date` cannot be resolved.
pub fn format_date<'a>(date: impl Into<DateInput<'a>>, format: &str) -> Result<String, FormatError> {
    let value = date.into().resolve()?;
    let year = value.year().to_string();
    let month = format!("{:02}", u8::from(value.month()));
    let day = format!("{:02}", value.day());
    let hours = format!("{:02}", value.hour());
    let minutes = format!("{:02}", value.minute());

    Ok(format
        .replacen("yyyy", &year, 1)
        .replacen("MM", &month, 1)
        .replacen("dd", &day, 1)
        .replacen("HH", &hours, 1)
        .replacen("mm", &minutes, 1))
}

/// [`format_date`] with the default `yyyy-MM-dd` pattern.
///
/// # Errors
///
/// Returns [`FormatError::InvalidDate`] if `date` cannot be resolved.
pub fn format_date_default<'a>(date: impl Into<DateInput<'a>>) -> Result<String, FormatError> {
    format_date(date, DEFAULT_DATE_FORMAT)
}

// =============================================================
// Currency
// =============================================================

const NBSP: char = '\u{a0}';

/// Display symbol and minor digits for currencies the `nl-NL` locale names
/// specially. Everything else renders its ISO code with two decimals.
fn currency_style(code: &str) -> (&str, u8) {
    match code {
        "EUR" => ("€", 2),
        "USD" => ("US$", 2),
        "GBP" => ("£", 2),
        "JPY" => ("JP¥", 0),
        "CNY" => ("CN¥", 2),
        "AUD" => ("AU$", 2),
        "CAD" => ("C$", 2),
        "NZD" => ("NZ$", 2),
        "HKD" => ("HK$", 2),
        "INR" => ("₹", 2),
        "ILS" => ("₪", 2),
        "KRW" => ("₩", 0),
        "VND" => ("₫", 0),
        "ISK" | "CLP" | "UGX" => (code, 0),
        "BHD" | "KWD" | "OMR" | "JOD" | "TND" => (code, 3),
        _ => (code, 2),
    }
}

/// Render `amount` as a currency string in the `nl-NL` locale.
///
/// Rounding works on the shortest decimal form of `amount` (what `{}`
/// prints), half away from zero, so `1.005` renders `1,01` and large values
/// keep every digit. NaN and infinities render as `NaN` and `∞`. Negative
/// zero keeps its sign.
///
/// # Errors
///
/// Returns [`FormatError::InvalidCurrency`] unless `currency` is three ASCII
/// letters (any case).
pub fn format_currency(amount: f64, currency: &str) -> Result<String, FormatError> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FormatError::InvalidCurrency(currency.to_owned()));
    }
    let code = currency.to_ascii_uppercase();
    let (symbol, digits) = currency_style(&code);

    if amount.is_nan() {
        return Ok(format!("{symbol}{NBSP}NaN"));
    }
    let sign = if amount.is_sign_negative() { "-" } else { "" };
    if amount.is_infinite() {
        return Ok(format!("{symbol}{NBSP}{sign}∞"));
    }

    let (whole, fraction) = round_decimal(&amount.abs().to_string(), usize::from(digits));
    let whole = group_thousands(&whole);

    if fraction.is_empty() {
        Ok(format!("{symbol}{NBSP}{sign}{whole}"))
    } else {
        Ok(format!("{symbol}{NBSP}{sign}{whole},{fraction}"))
    }
}

/// [`format_currency`] in euros.
///
/// # Errors
///
/// Same as [`format_currency`].
pub fn format_currency_default(amount: f64) -> Result<String, FormatError> {
    format_currency(amount, DEFAULT_CURRENCY)
}

/// Round a plain non-negative decimal (`"1.005"`) half away from zero to
/// `minor` fraction digits. Returns the whole and fraction digit strings.
fn round_decimal(text: &str, minor: usize) -> (String, String) {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let round_up = fraction.as_bytes().get(minor).is_some_and(|&d| d >= b'5');

    let mut units: Vec<u8> = whole.bytes().collect();
    units.extend(fraction.bytes().take(minor));
    units.resize(whole.len() + minor, b'0');

    if round_up {
        let mut carry = true;
        for digit in units.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            units.insert(0, b'1');
        }
    }

    let split = units.len() - minor;
    let to_string = |bytes: &[u8]| bytes.iter().map(|&b| char::from(b)).collect::<String>();
    (to_string(&units[..split]), to_string(&units[split..]))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}
