use rusqlite::{params, Connection};

use crate::domain::format::{is_valid_date_format, DEFAULT_CURRENCY, DEFAULT_DATE_FORMAT};
use crate::error::AppError;
use crate::models::Settings;

const KEY_ENDPOINT: &str = "endpoint_url";
const KEY_CURRENCY: &str = "currency_symbol";
const KEY_DATE_FORMAT: &str = "date_format";
const KEY_UTC_OFFSET: &str = "utc_offset_minutes";
const KEY_EXPORT_DIR: &str = "export_dir";

pub const ENDPOINT_ENV: &str = "SHOP_DASHBOARD_ENDPOINT";

pub fn ensure_defaults(conn: &Connection) -> Result<(), AppError> {
  let endpoint = std::env::var(ENDPOINT_ENV).unwrap_or_default();
  let defaults = [
    (KEY_ENDPOINT, endpoint.as_str()),
    (KEY_CURRENCY, DEFAULT_CURRENCY),
    (KEY_DATE_FORMAT, DEFAULT_DATE_FORMAT),
    (KEY_UTC_OFFSET, "0"),
    (KEY_EXPORT_DIR, ""),
  ];
  for (key, value) in defaults {
    conn.execute(
      "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
      params![key, value],
    )?;
  }
  Ok(())
}

pub fn get_settings(conn: &Connection) -> Result<Settings, AppError> {
  let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
  let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

  let mut endpoint_url = String::new();
  let mut currency_symbol = DEFAULT_CURRENCY.to_string();
  let mut date_format = DEFAULT_DATE_FORMAT.to_string();
  let mut utc_offset_minutes = 0;
  let mut export_dir = String::new();

  for row in rows {
    let (key, value) = row?;
    match key.as_str() {
      KEY_ENDPOINT => endpoint_url = value,
      KEY_CURRENCY => currency_symbol = value,
      KEY_DATE_FORMAT => date_format = value,
      KEY_UTC_OFFSET => {
        utc_offset_minutes = value.parse().unwrap_or(utc_offset_minutes);
      }
      KEY_EXPORT_DIR => export_dir = value,
      _ => {}
    }
  }

  // The environment wins so a deployment can repoint the app without touching the database.
  if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
    if !endpoint.trim().is_empty() {
      endpoint_url = endpoint;
    }
  }

  Ok(Settings {
    endpoint_url,
    currency_symbol,
    date_format,
    utc_offset_minutes,
    export_dir,
  })
}

pub fn validate(settings: &Settings) -> Result<(), AppError> {
  if !is_valid_date_format(&settings.date_format) {
    return Err(AppError::new("INVALID_SETTINGS", "Date format is not a valid strftime pattern"));
  }
  if !(-14 * 60..=14 * 60).contains(&settings.utc_offset_minutes) {
    return Err(AppError::new("INVALID_SETTINGS", "UTC offset must be within +/- 14 hours"));
  }
  Ok(())
}

pub fn update_settings(conn: &Connection, settings: &Settings) -> Result<(), AppError> {
  validate(settings)?;
  let offset = settings.utc_offset_minutes.to_string();
  let values = [
    (KEY_ENDPOINT, settings.endpoint_url.trim()),
    (KEY_CURRENCY, settings.currency_symbol.as_str()),
    (KEY_DATE_FORMAT, settings.date_format.as_str()),
    (KEY_UTC_OFFSET, offset.as_str()),
    (KEY_EXPORT_DIR, settings.export_dir.trim()),
  ];
  for (key, value) in values {
    conn.execute(
      "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
      params![key, value],
    )?;
  }
  Ok(())
}
