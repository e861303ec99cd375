use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::format::{display_value, parse_timestamp};
use crate::error::ApiError;

/// A record exactly as the sheet backend ships it: an ordered list of cells.
pub type Row = Vec<Value>;

/// Positional access into one row, failing with a decode error that names the record and index.
pub struct RowReader<'a> {
  record: &'static str,
  row: &'a [Value],
}

impl<'a> RowReader<'a> {
  pub fn new(record: &'static str, row: &'a [Value]) -> Self {
    Self { record, row }
  }

  fn field(&self, index: usize) -> Result<&'a Value, ApiError> {
    self.row.get(index).ok_or_else(|| {
      ApiError::decode(format!(
        "{} row has {} fields, field {} is missing",
        self.record,
        self.row.len(),
        index
      ))
    })
  }

  pub fn text(&self, index: usize) -> Result<String, ApiError> {
    Ok(display_value(self.field(index)?))
  }

  pub fn number(&self, index: usize) -> Result<f64, ApiError> {
    let value = self.field(index)?;
    let parsed = match value {
      Value::Number(number) => number.as_f64(),
      Value::String(text) => text.trim().parse::<f64>().ok(),
      _ => None,
    };
    parsed.ok_or_else(|| ApiError::decode(format!("{} field {} is not a number: {}", self.record, index, value)))
  }

  /// `None` when the field is present but is not a recognizable date.
  pub fn timestamp(&self, index: usize) -> Result<Option<DateTime<FixedOffset>>, ApiError> {
    Ok(self.field(index)?.as_str().and_then(parse_timestamp))
  }
}

/// The two sale fields the dashboard charts: revenue and when it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
  pub amount: f64,
  pub sold_at: Option<DateTime<FixedOffset>>,
}

impl Sale {
  pub fn from_row(row: &[Value]) -> Result<Self, ApiError> {
    let reader = RowReader::new("sale", row);
    Ok(Self {
      amount: reader.number(5)?,
      sold_at: reader.timestamp(7)?,
    })
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
  pub category: String,
  pub amount: f64,
}

impl Expense {
  pub fn from_row(row: &[Value]) -> Result<Self, ApiError> {
    let reader = RowReader::new("expense", row);
    Ok(Self {
      category: reader.text(1)?,
      amount: reader.number(2)?,
    })
  }
}

/// Keeps every row that decodes; the rest are logged and left out of the charts.
fn decode_rows<T>(record: &str, rows: &[Row], decode: fn(&[Value]) -> Result<T, ApiError>) -> Vec<T> {
  rows
    .iter()
    .enumerate()
    .filter_map(|(index, row)| match decode(row) {
      Ok(decoded) => Some(decoded),
      Err(err) => {
        tracing::warn!(record, index, error = %err, "skipping undecodable row");
        None
      }
    })
    .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryWire {
  total_sales_value: f64,
  total_purchase_value: f64,
  total_expenses: f64,
  total_profit: f64,
  sales_data: Vec<Row>,
  expenses_data: Vec<Row>,
}

/// Server-side totals plus the raw sales and expenses behind the two charts.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
  pub total_sales_value: f64,
  pub total_purchase_value: f64,
  pub total_expenses: f64,
  pub total_profit: f64,
  pub sales: Vec<Sale>,
  pub expenses: Vec<Expense>,
}

impl DashboardSummary {
  pub fn decode(value: Value) -> Result<Self, ApiError> {
    let wire: SummaryWire = serde_json::from_value(value).map_err(|err| ApiError::decode(err.to_string()))?;
    let sales = decode_rows("sale", &wire.sales_data, Sale::from_row);
    let expenses = decode_rows("expense", &wire.expenses_data, Expense::from_row);
    Ok(Self {
      total_sales_value: wire.total_sales_value,
      total_purchase_value: wire.total_purchase_value,
      total_expenses: wire.total_expenses,
      total_profit: wire.total_profit,
      sales,
      expenses,
    })
  }
}
