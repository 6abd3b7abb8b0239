use time::macros::{date, datetime};

use super::*;

fn eur(amount: f64) -> String {
    format_currency(amount, "EUR").unwrap_or_default()
}

// =============================================================
// format_date
// =============================================================

#[test]
fn formats_default_pattern() {
    assert_eq!(format_date(datetime!(2024-01-05 9:03), "yyyy-MM-dd"), Ok("2024-01-05".to_owned()));
    assert_eq!(format_date_default(datetime!(2024-01-05 9:03)), Ok("2024-01-05".to_owned()));
}

#[test]
fn formats_time_tokens_zero_padded() {
    assert_eq!(format_date(datetime!(2024-01-05 9:03), "dd-MM-yyyy HH:mm"), Ok("05-01-2024 09:03".to_owned()));
    assert_eq!(format_date(datetime!(2025-12-31 23:59), "HH:mm"), Ok("23:59".to_owned()));
}

#[test]
fn only_first_occurrence_of_each_token_is_replaced() {
    assert_eq!(format_date(datetime!(2024-01-05 9:03), "dd/dd"), Ok("05/dd".to_owned()));
    assert_eq!(format_date(datetime!(2024-01-05 9:03), "yyyy yyyy"), Ok("2024 yyyy".to_owned()));
}

#[test]
fn literal_text_without_tokens_is_kept() {
    assert_eq!(format_date(datetime!(2024-01-05 9:03), "Day dd"), Ok("Day 05".to_owned()));
    assert_eq!(format_date(datetime!(2024-01-05 9:03), ""), Ok(String::new()));
}

#[test]
fn year_is_not_padded() {
    assert_eq!(format_date(date!(0999-03-04), "yyyy-MM-dd"), Ok("999-03-04".to_owned()));
}

#[test]
fn calendar_dates_format_as_midnight() {
    assert_eq!(format_date(date!(2025-05-18), "yyyy-MM-dd HH:mm"), Ok("2025-05-18 00:00".to_owned()));
}

#[test]
fn parses_text_inputs() {
    let cases = [
        ("2024-01-05", "2024-01-05 00:00"),
        ("2024-01-05T09:03", "2024-01-05 09:03"),
        ("2024-01-05T09:03:27", "2024-01-05 09:03"),
        ("2024-01-05T09:03:27.123", "2024-01-05 09:03"),
        ("2024-01-05 09:03", "2024-01-05 09:03"),
        ("2024-01-05 09:03:59", "2024-01-05 09:03"),
        ("2024-01-05T09:03:00Z", "2024-01-05 09:03"),
        ("  2024-01-05  ", "2024-01-05 00:00"),
    ];
    for (input, expected) in cases {
        assert_eq!(format_date(input, "yyyy-MM-dd HH:mm"), Ok(expected.to_owned()), "input {input:?}");
    }
}

#[test]
fn offset_text_keeps_its_own_wall_clock() {
    assert_eq!(format_date("2024-01-05T23:30:00+02:00", "yyyy-MM-dd HH:mm"), Ok("2024-01-05 23:30".to_owned()));
    assert_eq!(
        format_date(datetime!(2024-01-05 23:30 +02:00), "yyyy-MM-dd HH:mm"),
        Ok("2024-01-05 23:30".to_owned())
    );
}

#[test]
fn epoch_millis_are_formatted_in_utc() {
    assert_eq!(format_date(0_i64, "yyyy-MM-dd HH:mm"), Ok("1970-01-01 00:00".to_owned()));
    assert_eq!(format_date(1_704_445_380_000_i64, "yyyy-MM-dd HH:mm"), Ok("2024-01-05 09:03".to_owned()));
}

#[test]
fn rejects_unparseable_text() {
    assert!(matches!(format_date("not a date", "yyyy"), Err(FormatError::InvalidDate(_))));
    assert!(matches!(format_date("2024-13-01", "yyyy"), Err(FormatError::InvalidDate(_))));
    assert!(matches!(format_date("", "yyyy"), Err(FormatError::InvalidDate(_))));
}

#[test]
fn rejects_out_of_range_epoch() {
    assert!(matches!(format_date(i64::MAX, "yyyy"), Err(FormatError::InvalidDate(_))));
}

// =============================================================
// format_currency
// =============================================================

#[test]
fn euro_uses_dutch_separators() {
    assert_eq!(eur(1234.56), "€\u{a0}1.234,56");
    assert_eq!(eur(12.5), "€\u{a0}12,50");
    assert_eq!(eur(0.0), "€\u{a0}0,00");
    assert_eq!(format_currency_default(1234.56), Ok("€\u{a0}1.234,56".to_owned()));
}

#[test]
fn groups_every_three_digits() {
    assert_eq!(eur(999.0), "€\u{a0}999,00");
    assert_eq!(eur(1000.0), "€\u{a0}1.000,00");
    assert_eq!(eur(1_234_567.891), "€\u{a0}1.234.567,89");
}

#[test]
fn negative_amounts_put_the_sign_after_the_symbol() {
    assert_eq!(eur(-1234.5), "€\u{a0}-1.234,50");
}

#[test]
fn rounds_half_away_from_zero() {
    assert_eq!(eur(0.125), "€\u{a0}0,13");
    assert_eq!(eur(-0.125), "€\u{a0}-0,13");
    assert_eq!(eur(999.999), "€\u{a0}1.000,00");
    assert_eq!(eur(0.004), "€\u{a0}0,00");
}

#[test]
fn rounds_the_decimal_value_not_its_binary_approximation() {
    assert_eq!(eur(1.005), "€\u{a0}1,01");
    assert_eq!(eur(1.255), "€\u{a0}1,26");
    assert_eq!(eur(-2.675), "€\u{a0}-2,68");
    assert_eq!(format_currency(0.0005, "KWD"), Ok("KWD\u{a0}0,001".to_owned()));
}

#[test]
fn large_amounts_keep_every_digit() {
    assert_eq!(eur(1e21), "€\u{a0}1.000.000.000.000.000.000.000,00");

    let expected = format!("€\u{a0}10{},00", ".000".repeat(102));
    assert_eq!(eur(1e307), expected);
    assert_eq!(eur(f64::MAX).split(',').nth(1), Some("00"));
}

#[test]
fn negative_zero_keeps_its_sign() {
    assert_eq!(eur(-0.0), "€\u{a0}-0,00");
    assert_eq!(eur(0.0), "€\u{a0}0,00");
}

#[test]
fn other_currencies_use_their_symbol_and_digits() {
    assert_eq!(format_currency(1_000_000.0, "USD"), Ok("US$\u{a0}1.000.000,00".to_owned()));
    assert_eq!(format_currency(19.99, "GBP"), Ok("£\u{a0}19,99".to_owned()));
    assert_eq!(format_currency(1234.5, "JPY"), Ok("JP¥\u{a0}1.235".to_owned()));
    assert_eq!(format_currency(1.5, "KWD"), Ok("KWD\u{a0}1,500".to_owned()));
}

#[test]
fn unknown_codes_render_the_code() {
    assert_eq!(format_currency(12.0, "XYZ"), Ok("XYZ\u{a0}12,00".to_owned()));
    assert_eq!(format_currency(3.0, "CHF"), Ok("CHF\u{a0}3,00".to_owned()));
}

#[test]
fn codes_are_case_insensitive() {
    assert_eq!(format_currency(5.0, "usd"), Ok("US$\u{a0}5,00".to_owned()));
}

#[test]
fn rejects_malformed_codes() {
    for code in ["", "EU", "EURO", "E1R", "€€€"] {
        assert!(matches!(format_currency(1.0, code), Err(FormatError::InvalidCurrency(_))), "code {code:?}");
    }
}

#[test]
fn non_finite_amounts() {
    assert_eq!(eur(f64::NAN), "€\u{a0}NaN");
    assert_eq!(eur(f64::INFINITY), "€\u{a0}∞");
    assert_eq!(eur(f64::NEG_INFINITY), "€\u{a0}-∞");
}
