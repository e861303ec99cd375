use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde_json::Value;

use crate::error::ApiError;

/// Loading indicator toggled around every backend call.
pub trait BusyIndicator: Send + Sync {
  fn show(&self);
  fn hide(&self);
}

pub struct NoBusyIndicator;

impl BusyIndicator for NoBusyIndicator {
  fn show(&self) {}
  fn hide(&self) {}
}

/// Collapses overlapping calls into one visible/hidden transition.
pub struct BusyCounter<F>
where
  F: Fn(bool) + Send + Sync,
{
  in_flight: AtomicUsize,
  notify: F,
}

impl<F> BusyCounter<F>
where
  F: Fn(bool) + Send + Sync,
{
  pub fn new(notify: F) -> Self {
    Self {
      in_flight: AtomicUsize::new(0),
      notify,
    }
  }

  pub fn in_flight(&self) -> usize {
    self.in_flight.load(Ordering::SeqCst)
  }
}

impl<F> BusyIndicator for BusyCounter<F>
where
  F: Fn(bool) + Send + Sync,
{
  fn show(&self) {
    if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
      (self.notify)(true);
    }
  }

  fn hide(&self) {
    if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
      (self.notify)(false);
    }
  }
}

struct BusyGuard<'a> {
  indicator: &'a dyn BusyIndicator,
}

impl<'a> BusyGuard<'a> {
  fn new(indicator: &'a dyn BusyIndicator) -> Self {
    indicator.show();
    Self { indicator }
  }
}

impl Drop for BusyGuard<'_> {
  fn drop(&mut self) {
    self.indicator.hide();
  }
}

/// Client for the single spreadsheet endpoint. One POST per call, no retries, no timeout.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  endpoint: Url,
  busy: Arc<dyn BusyIndicator>,
}

impl ApiClient {
  pub fn new(endpoint: &str, busy: Arc<dyn BusyIndicator>) -> Result<Self, ApiError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
      return Err(ApiError::Configuration("backend endpoint is not configured".to_string()));
    }
    let endpoint = Url::parse(endpoint)
      .map_err(|err| ApiError::Configuration(format!("invalid endpoint {endpoint}: {err}")))?;
    Ok(Self {
      http: reqwest::Client::new(),
      endpoint,
      busy,
    })
  }

  pub fn endpoint(&self) -> &Url {
    &self.endpoint
  }

  pub async fn call(&self, action: &str, payload: &Value) -> Result<Value, ApiError> {
    let _busy = BusyGuard::new(self.busy.as_ref());

    let mut url = self.endpoint.clone();
    url.query_pairs_mut().append_pair("action", action);
    tracing::debug!(action, "dispatching backend call");

    // Plain-text body keeps the request "simple" for script-hosted endpoints.
    let response = self
      .http
      .post(url)
      .header(CONTENT_TYPE, "text/plain;charset=utf-8")
      .body(payload.to_string())
      .send()
      .await
      .map_err(|err| {
        tracing::error!(action, error = %err, "backend call failed");
        ApiError::Transport(err.to_string())
      })?;

    let status = response.status();
    let body = response.text().await.map_err(|err| {
      tracing::error!(action, error = %err, "reading backend response failed");
      ApiError::Transport(err.to_string())
    })?;

    serde_json::from_str(&body).map_err(|err| {
      tracing::error!(action, %status, error = %err, "backend response is not JSON");
      ApiError::Parse(err.to_string())
    })
  }
}
