use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
  pub endpoint_url: String,
  pub currency_symbol: String,
  pub date_format: String,
  pub utc_offset_minutes: i32,
  pub export_dir: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProductOption {
  #[serde(deserialize_with = "id_string")]
  pub id: String,
  pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewProductInput {
  #[serde(rename = "productName")]
  pub product_name: String,
  #[serde(rename = "costPrice")]
  pub cost_price: f64,
  #[serde(rename = "salePrice")]
  pub sale_price: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewPurchaseInput {
  #[serde(rename = "productId")]
  pub product_id: String,
  pub quantity: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewSaleInput {
  #[serde(rename = "productId")]
  pub product_id: String,
  pub quantity: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewExpenseInput {
  #[serde(rename = "expenseCategory")]
  pub expense_category: String,
  pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CategorySplit {
  pub category: String,
  pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DateSeries {
  pub labels: Vec<String>,
  pub values: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KpiSummary {
  pub total_sales: String,
  pub total_purchases: String,
  pub total_expenses: String,
  pub total_profit: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionStatus {
  pub logged_in: bool,
  pub username: Option<String>,
  pub started_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportedFile {
  pub file_name: String,
  pub path: String,
  pub data_base64: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityEntry {
  pub id: i64,
  pub ts: String,
  pub actor: Option<String>,
  pub action: String,
  pub outcome: String,
  pub payload_json: String,
  pub details: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
  pub total: i64,
  pub items: Vec<T>,
}

/// Sheet ids come back as numbers or strings depending on how the cell was typed.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  let value = serde_json::Value::deserialize(deserializer)?;
  match value {
    serde_json::Value::String(text) => Ok(text),
    serde_json::Value::Number(number) => Ok(crate::domain::format::display_number(&number)),
    other => Err(serde::de::Error::custom(format!("invalid product id: {other}"))),
  }
}
