//! Plain-text formatting of stored values.
//!
//! All locale-like choices live in [`DisplaySettings`], which callers pass in
//! explicitly.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::schema::{DatePrecision, FieldType};

/// Number and date formatting choices.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub decimal_mark: String,
    pub digit_grouping: String,
    /// 24-hour clock instead of AM/PM.
    pub hour_24: bool,
    /// "March 5, 1994" instead of "1994-03-05".
    pub american_dates: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            decimal_mark: ".".to_string(),
            digit_grouping: ",".to_string(),
            hour_24: false,
            american_dates: true,
        }
    }
}

const MONTH_NAMES: [&str; 12] = [
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

/// English name of month `month` (1-12).
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

/// Insert the grouping mark every three digits of an unsigned digit string.
fn group_digits(digits: &str, grouping: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * grouping.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(grouping);
        }
        out.push(c);
    }
    out
}

/// `1234567` → `"1,234,567"`.
pub fn format_integer(n: i64, settings: &DisplaySettings) -> String {
    let grouped = group_digits(&n.unsigned_abs().to_string(), &settings.digit_grouping);
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format a stored float, keeping the number of decimals it was stored with.
///
/// A value without a fractional part shows one decimal (`"3.0"`).
/// Unparseable input is returned unchanged.
pub fn format_float(raw: &str, settings: &DisplaySettings) -> String {
    let raw = raw.trim();
    if !matches!(raw.parse::<f64>(), Ok(f) if f.is_finite()) {
        return raw.to_string();
    }

    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) if !fraction.is_empty() => (whole, fraction),
        Some((whole, _)) => (whole, "0"),
        None => (unsigned, "0"),
    };
    let whole = if whole.is_empty() { "0" } else { whole };

    format!(
        "{sign}{}{}{fraction}",
        group_digits(whole, &settings.digit_grouping),
        settings.decimal_mark
    )
}

fn format_time(time: NaiveTime, settings: &DisplaySettings) -> String {
    if settings.hour_24 {
        time.format("%H:%M:%S").to_string()
    } else {
        let (pm, hour) = time.hour12();
        format!(
            "{}:{:02}:{:02} {}",
            hour,
            time.minute(),
            time.second(),
            if pm { "PM" } else { "AM" }
        )
    }
}

fn format_date(date: NaiveDate, settings: &DisplaySettings) -> String {
    if settings.american_dates {
        let month = month_name(date.month()).unwrap_or_default();
        format!("{} {}, {}", month, date.day(), date.year())
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}

/// Format a stored date or datetime according to its precision.
///
/// Returns the input unchanged when it cannot be parsed.
pub fn format_date_value(
    raw: &str,
    precision: DatePrecision,
    field_type: FieldType,
    settings: &DisplaySettings,
) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let date_part = raw.get(..10).unwrap_or(raw);
    let year_part = raw.get(..4).unwrap_or(raw);

    match precision {
        DatePrecision::YearOnly => year_part.to_string(),
        DatePrecision::MonthOnly => {
            let month_start = format!("{}-01", raw.get(..7).unwrap_or(raw));
            match NaiveDate::parse_from_str(&month_start, "%Y-%m-%d") {
                Ok(date) => format!(
                    "{} {}",
                    month_name(date.month()).unwrap_or_default(),
                    date.year()
                ),
                Err(_) => raw.to_string(),
            }
        }
        DatePrecision::DateOnly | DatePrecision::DateAndTime => {
            let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") else {
                return raw.to_string();
            };
            let mut out = format_date(date, settings);

            let with_time = precision == DatePrecision::DateAndTime && field_type == FieldType::Datetime;
            if with_time {
                let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"));
                if let Ok(datetime) = parsed {
                    out.push(' ');
                    out.push_str(&format_time(datetime.time(), settings));
                }
            }
            out
        }
    }
}
