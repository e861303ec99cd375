use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::client::ApiClient;
use crate::domain::records::{DashboardSummary, Row};
use crate::domain::schema::Collection;
use crate::error::ApiError;
use crate::models::ProductOption;
use crate::session::Session;

/// `{status, message?}` returned by login and every mutation.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StatusResponse {
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub token: Option<String>,
}

impl StatusResponse {
  pub fn is_success(&self) -> bool {
    self.status == "success"
  }
}

fn decode<T: for<'de> Deserialize<'de>>(action: &str, value: Value) -> Result<T, ApiError> {
  serde_json::from_value(value).map_err(|err| ApiError::decode(format!("{action}: {err}")))
}

pub async fn login(api: &ApiClient, username: &str, password: &str) -> Result<StatusResponse, ApiError> {
  let value = api
    .call("login", &json!({ "username": username, "password": password }))
    .await?;
  decode("login", value)
}

pub async fn fetch_summary(api: &ApiClient, session: &Session) -> Result<DashboardSummary, ApiError> {
  let value = api.call("getDashboardData", &session.attach(json!({}))).await?;
  DashboardSummary::decode(value)
}

pub async fn fetch_product_options(api: &ApiClient, session: &Session) -> Result<Vec<ProductOption>, ApiError> {
  let value = api.call("getProductsList", &session.attach(json!({}))).await?;
  if value.is_null() {
    return Ok(Vec::new());
  }
  decode("getProductsList", value)
}

/// Rows of one sheet. A `null` body is an empty sheet.
pub async fn fetch_rows(api: &ApiClient, session: &Session, collection: Collection) -> Result<Vec<Row>, ApiError> {
  let value = api
    .call("getData", &session.attach(json!({ "sheetName": collection.sheet_name() })))
    .await?;
  match value {
    Value::Null => Ok(Vec::new()),
    Value::Array(_) => decode("getData", value),
    Value::Object(_) => {
      let response: StatusResponse = decode("getData", value)?;
      Err(ApiError::Application {
        message: response
          .message
          .unwrap_or_else(|| format!("{} could not be loaded", collection.sheet_name())),
      })
    }
    other => Err(ApiError::decode(format!("getData: expected a list of rows, got {other}"))),
  }
}

pub async fn submit(api: &ApiClient, session: &Session, action: &str, payload: Value) -> Result<StatusResponse, ApiError> {
  let value = api.call(action, &session.attach(payload)).await?;
  decode(action, value)
}
