//! Field normalization for loosely structured source records.
//!
//! Every parser here degrades to a sentinel value on malformed input; a bad
//! field never fails the batch.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Month/year parts extracted from an expected-close-date field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDate {
    pub month_name: String,
    pub year: String,
    pub month_num: u8,
}

/// Probability in both display ("75%") and numeric form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probability {
    pub display: String,
    pub numeric: u32,
}

/// Trimmed string form of a raw field; missing, null, and non-scalar values
/// degrade to the empty string.
pub fn clean(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.trim().to_owned(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

/// Parses day/month/year text. Returns the sentinel when the month is outside
/// 1..=12, the year is not exactly four digits, or the year falls outside
/// 2000..=2100.
pub fn parse_close_date(raw: &str) -> ParsedDate {
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() < 3 {
        return ParsedDate::default();
    }

    let month: u8 = digits(parts[1]).parse().unwrap_or(0);
    let year = digits(parts[2]);
    let year_num: u32 = year.parse().unwrap_or(0);

    if (1..=12).contains(&month) && year.len() == 4 && (2000..=2100).contains(&year_num) {
        ParsedDate { month_name: MONTH_NAMES[usize::from(month) - 1].to_owned(), year, month_num: month }
    } else {
        ParsedDate::default()
    }
}

/// Strips everything but digits and parses the remainder as a whole-percent
/// probability.
pub fn parse_probability(raw: &str) -> Probability {
    match digits(raw).parse::<u32>() {
        Ok(numeric) => Probability { display: format!("{numeric}%"), numeric },
        Err(_) => Probability::default(),
    }
}

/// Parses a Brazilian-format currency string: `.` is the thousands separator
/// and `,` the decimal separator. Returns zero on failure.
pub fn parse_currency(raw: &str) -> Decimal {
    let normalized = raw.trim().replace('.', "").replace(',', ".");
    Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO)
}

/// Integer formed by concatenating the digit characters of an opportunity
/// identifier. Identifiers with no digits map to 0. Used as a recency proxy
/// by the coverage-gap detector.
pub fn sequence_number(identifier: &str) -> u64 {
    digits(identifier).parse().unwrap_or(0)
}

fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{
        clean, parse_close_date, parse_currency, parse_probability, sequence_number, ParsedDate,
    };

    #[test]
    fn clean_degrades_missing_and_null_to_empty() {
        assert_eq!(clean(None), "");
        assert_eq!(clean(Some(&json!(null))), "");
        assert_eq!(clean(Some(&json!("  padded  "))), "padded");
        assert_eq!(clean(Some(&json!(42))), "42");
    }

    #[test]
    fn close_date_extracts_month_and_year() {
        let parsed = parse_close_date("15/03/2025");
        assert_eq!(parsed.month_name, "March");
        assert_eq!(parsed.year, "2025");
        assert_eq!(parsed.month_num, 3);
    }

    #[test]
    fn close_date_rejects_out_of_range_inputs() {
        assert_eq!(parse_close_date("15/13/2025"), ParsedDate::default());
        assert_eq!(parse_close_date("15/03/999"), ParsedDate::default());
        assert_eq!(parse_close_date("15/03/2101"), ParsedDate::default());
        assert_eq!(parse_close_date("2025-03-15"), ParsedDate::default());
        assert_eq!(parse_close_date(""), ParsedDate::default());
    }

    #[test]
    fn probability_strips_non_digits() {
        let parsed = parse_probability(" 75 % ");
        assert_eq!(parsed.display, "75%");
        assert_eq!(parsed.numeric, 75);
    }

    #[test]
    fn probability_sentinel_when_nothing_parses() {
        assert_eq!(parse_probability("n/a").display, "");
        assert_eq!(parse_probability("").numeric, 0);
    }

    #[test]
    fn currency_handles_brazilian_separators() {
        assert_eq!(parse_currency("1.234.567,89"), Decimal::new(123_456_789, 2));
        assert_eq!(parse_currency("950,00"), Decimal::new(95_000, 2));
        assert_eq!(parse_currency("not a number"), Decimal::ZERO);
    }

    #[test]
    fn sequence_number_concatenates_digits() {
        assert_eq!(sequence_number("OPP-2024-15"), 202_415);
        assert_eq!(sequence_number("OPP101"), 101);
        assert_eq!(sequence_number("no digits"), 0);
    }

    #[test]
    fn sequence_number_overflow_degrades_to_zero() {
        assert_eq!(sequence_number("99999999999999999999999999"), 0);
    }
}
