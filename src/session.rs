use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::api::actions::{self, StatusResponse};
use crate::api::client::ApiClient;
use crate::dashboard::Dashboard;
use crate::error::{ApiError, AppError};
use crate::models::SessionStatus;

pub const LOGIN_FALLBACK_MESSAGE: &str = "An error occurred. Please try again.";

/// Proof of a completed login, passed to everything that talks to the backend on the user's behalf.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
  pub username: String,
  pub token: Option<String>,
  pub started_at: DateTime<Utc>,
}

impl Session {
  pub fn new(username: &str, token: Option<String>) -> Self {
    Self {
      username: username.to_string(),
      token: token.filter(|token| !token.trim().is_empty()),
      started_at: Utc::now(),
    }
  }

  /// Adds `sessionToken` to an object payload when the backend issued one.
  pub fn attach(&self, mut payload: Value) -> Value {
    if let (Some(token), Some(object)) = (self.token.as_ref(), payload.as_object_mut()) {
      object.insert("sessionToken".to_string(), Value::String(token.clone()));
    }
    payload
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
  Accepted(Session),
  Rejected { message: String },
}

/// Never fails: every failure turns into an inline message for the login form.
pub async fn login(api: &ApiClient, username: &str, password: &str) -> LoginOutcome {
  match actions::login(api, username, password).await {
    Ok(StatusResponse { status, token, .. }) if status == "success" => {
      tracing::info!(username, "login accepted");
      LoginOutcome::Accepted(Session::new(username, token))
    }
    Ok(response) => {
      let message = response.message.unwrap_or_default();
      tracing::warn!(username, %message, "login rejected");
      LoginOutcome::Rejected { message }
    }
    Err(err @ (ApiError::Transport(_) | ApiError::Parse(_) | ApiError::Decode(_))) => {
      tracing::error!(username, error = %err, "login error");
      LoginOutcome::Rejected {
        message: LOGIN_FALLBACK_MESSAGE.to_string(),
      }
    }
    Err(err) => LoginOutcome::Rejected {
      message: err.to_string(),
    },
  }
}

/// Holds the dashboard of the logged-in user; empty means the login screen is showing.
#[derive(Default)]
pub struct SessionGate {
  current: Mutex<Option<Arc<Dashboard>>>,
}

impl SessionGate {
  pub fn enter(&self, dashboard: Arc<Dashboard>) -> Result<(), AppError> {
    *self.current.lock()? = Some(dashboard);
    Ok(())
  }

  pub fn leave(&self) -> Result<Option<Session>, AppError> {
    let previous = self.current.lock()?.take();
    Ok(previous.map(|dashboard| dashboard.session().clone()))
  }

  pub fn require(&self) -> Result<Arc<Dashboard>, AppError> {
    self.current.lock()?.clone().ok_or_else(AppError::not_authenticated)
  }

  pub fn status(&self) -> Result<SessionStatus, AppError> {
    let guard = self.current.lock()?;
    let session = guard.as_ref().map(|dashboard| dashboard.session());
    Ok(SessionStatus {
      logged_in: session.is_some(),
      username: session.map(|session| session.username.clone()),
      started_at: session.map(|session| session.started_at.to_rfc3339()),
    })
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn token_is_attached_only_when_present() {
    let anonymous = Session::new("ana", None);
    assert_eq!(anonymous.attach(json!({ "sheetName": "Sales" })), json!({ "sheetName": "Sales" }));

    let blank = Session::new("ana", Some("  ".to_string()));
    assert!(blank.token.is_none());

    let tokened = Session::new("ana", Some("t-1".to_string()));
    assert_eq!(
      tokened.attach(json!({})),
      json!({ "sessionToken": "t-1" })
    );
  }

  #[test]
  fn empty_gate_requires_login() {
    let gate = SessionGate::default();
    let err = gate.require().err().unwrap();
    assert_eq!(err.code, "NOT_AUTHENTICATED");
    assert!(!gate.status().unwrap().logged_in);
    assert!(gate.leave().unwrap().is_none());
  }
}
