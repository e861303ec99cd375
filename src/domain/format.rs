use std::fmt::Write;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde_json::{Number, Value};

use crate::models::Settings;

pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";
pub const DEFAULT_CURRENCY: &str = "₹";

/// Presentation rules shared by tables, charts and KPIs.
#[derive(Debug, Clone)]
pub struct DisplayFormat {
  pub currency_symbol: String,
  pub date_format: String,
  pub offset: FixedOffset,
}

impl Default for DisplayFormat {
  fn default() -> Self {
    Self {
      currency_symbol: DEFAULT_CURRENCY.to_string(),
      date_format: DEFAULT_DATE_FORMAT.to_string(),
      offset: utc(),
    }
  }
}

impl DisplayFormat {
  pub fn from_settings(settings: &Settings) -> Self {
    Self {
      currency_symbol: settings.currency_symbol.clone(),
      date_format: settings.date_format.clone(),
      offset: settings
        .utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(utc),
    }
  }

  pub fn date(&self, timestamp: &DateTime<FixedOffset>) -> String {
    let local = timestamp.with_timezone(&self.offset);
    let mut out = String::new();
    if write!(out, "{}", local.format(&self.date_format)).is_err() {
      out.clear();
      let _ = write!(out, "{}", local.format(DEFAULT_DATE_FORMAT));
    }
    out
  }

  pub fn money(&self, value: f64) -> String {
    format!("{}{:.2}", self.currency_symbol, value)
  }
}

fn utc() -> FixedOffset {
  Utc.fix()
}

/// Accepts RFC 3339 (`2024-01-01T00:00:00.000Z`) and `Date#toString` output
/// (`Mon Jan 01 2024 00:00:00 GMT+0530 (India Standard Time)`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
  let trimmed = raw.trim();
  if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
    return Some(value);
  }
  let without_zone_name = trimmed.split(" (").next().unwrap_or(trimmed);
  DateTime::parse_from_str(without_zone_name, "%a %b %d %Y %H:%M:%S GMT%z").ok()
}

pub fn is_valid_date_format(format: &str) -> bool {
  let sample = Utc::now();
  let mut out = String::new();
  !format.trim().is_empty() && write!(out, "{}", sample.format(format)).is_ok()
}

/// Integral values print without a fractional part, the way the sheet shows them.
pub fn display_number(number: &Number) -> String {
  if let Some(value) = number.as_i64() {
    return value.to_string();
  }
  if let Some(value) = number.as_u64() {
    return value.to_string();
  }
  let value = number.as_f64().unwrap_or(f64::NAN);
  if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
    format!("{}", value as i64)
  } else {
    format!("{value}")
  }
}

pub fn display_value(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(text) => text.clone(),
    Value::Number(number) => display_number(number),
    Value::Bool(flag) => flag.to_string(),
    other => other.to_string(),
  }
}
