use rust_xlsxwriter::XlsxError;
use serde::Serialize;

/// Failures of a single backend call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("transport error: {0}")]
  Transport(String),
  #[error("response is not valid JSON: {0}")]
  Parse(String),
  #[error("unexpected response shape: {0}")]
  Decode(String),
  #[error("{message}")]
  Application { message: String },
  #[error("configuration error: {0}")]
  Configuration(String),
}

impl ApiError {
  pub fn decode(message: impl Into<String>) -> Self {
    ApiError::Decode(message.into())
  }

  pub fn code(&self) -> &'static str {
    match self {
      ApiError::Transport(_) => "TRANSPORT",
      ApiError::Parse(_) => "PARSE",
      ApiError::Decode(_) => "DECODE",
      ApiError::Application { .. } => "APPLICATION",
      ApiError::Configuration(_) => "CONFIG",
    }
  }
}

#[derive(Debug, Serialize)]
pub struct AppError {
  pub code: String,
  pub message: String,
}

impl AppError {
  pub fn new(code: &str, message: impl Into<String>) -> Self {
    Self {
      code: code.to_string(),
      message: message.into(),
    }
  }

  pub fn not_authenticated() -> Self {
    AppError::new("NOT_AUTHENTICATED", "Please log in first")
  }
}

impl std::fmt::Display for AppError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: {}", self.code, self.message)
  }
}

impl std::error::Error for AppError {}

impl From<ApiError> for AppError {
  fn from(err: ApiError) -> Self {
    AppError::new(err.code(), err.to_string())
  }
}

impl From<rusqlite::Error> for AppError {
  fn from(err: rusqlite::Error) -> Self {
    AppError::new("DB_ERROR", err.to_string())
  }
}

impl From<std::io::Error> for AppError {
  fn from(err: std::io::Error) -> Self {
    AppError::new("IO_ERROR", err.to_string())
  }
}

impl From<XlsxError> for AppError {
  fn from(err: XlsxError) -> Self {
    AppError::new("EXPORT", err.to_string())
  }
}

impl<T> From<std::sync::PoisonError<T>> for AppError {
  fn from(_: std::sync::PoisonError<T>) -> Self {
    AppError::new("LOCK_ERROR", "State lock failed")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn application_error_keeps_backend_message_verbatim() {
    let err: AppError = ApiError::Application {
      message: "Duplicate name".to_string(),
    }
    .into();
    assert_eq!(err.code, "APPLICATION");
    assert_eq!(err.message, "Duplicate name");
  }

  #[test]
  fn transport_error_maps_to_transport_code() {
    let err: AppError = ApiError::Transport("connection refused".to_string()).into();
    assert_eq!(err.code, "TRANSPORT");
    assert!(err.message.contains("connection refused"));
  }
}
