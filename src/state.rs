use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine;
use serde::Serialize;
use serde_json::json;

use crate::api::client::{ApiClient, BusyIndicator};
use crate::audit::log::{append_activity, list_activity};
use crate::dashboard::{Dashboard, DashboardLoad, DashboardSnapshot, Mutation, MutationOutcome, ViewHeader};
use crate::db::{self, Db};
use crate::domain::format::DisplayFormat;
use crate::domain::schema::Collection;
use crate::error::AppError;
use crate::export::excel;
use crate::models::{ActivityEntry, ExportedFile, Paginated, SessionStatus, Settings};
use crate::session::{self, LoginOutcome, SessionGate};
use crate::settings;

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoginResult {
  Accepted { session: SessionStatus },
  Rejected { message: String },
}

pub struct AppState {
  pub db: Db,
  pub app_dir: PathBuf,
  pub session: SessionGate,
}

impl AppState {
  pub fn new(db: Db, app_dir: PathBuf) -> Self {
    Self {
      db,
      app_dir,
      session: SessionGate::default(),
    }
  }

  pub fn settings(&self) -> Result<Settings, AppError> {
    db::with_conn(&self.db, |conn| settings::get_settings(conn))
  }

  pub fn update_settings(&self, input: Settings, actor: Option<&str>) -> Result<Settings, AppError> {
    db::with_conn(&self.db, |conn| {
      settings::update_settings(conn, &input)?;
      append_activity(
        conn,
        actor,
        "updateSettings",
        "accepted",
        serde_json::to_string(&input).unwrap_or_else(|_| "{}".to_string()),
        None,
      )?;
      settings::get_settings(conn)
    })
  }

  pub async fn login(&self, username: &str, password: &str, busy: Arc<dyn BusyIndicator>) -> Result<LoginResult, AppError> {
    let settings = self.settings()?;
    let api = ApiClient::new(&settings.endpoint_url, busy)?;
    let outcome = session::login(&api, username, password).await;
    let payload = json!({ "username": username }).to_string();

    match outcome {
      LoginOutcome::Accepted(session) => {
        let dashboard = Dashboard::new(api, session, DisplayFormat::from_settings(&settings));
        self.session.enter(Arc::new(dashboard))?;
        db::with_conn(&self.db, |conn| append_activity(conn, Some(username), "login", "accepted", payload, None))?;
        Ok(LoginResult::Accepted {
          session: self.session.status()?,
        })
      }
      LoginOutcome::Rejected { message } => {
        db::with_conn(&self.db, |conn| {
          append_activity(conn, Some(username), "login", "rejected", payload, Some(message.clone()))
        })?;
        Ok(LoginResult::Rejected { message })
      }
    }
  }

  pub fn logout(&self) -> Result<SessionStatus, AppError> {
    if let Some(session) = self.session.leave()? {
      tracing::info!(username = %session.username, "logged out");
      db::with_conn(&self.db, |conn| {
        append_activity(conn, Some(session.username.as_str()), "logout", "accepted", "{}".to_string(), None)
      })?;
    }
    self.session.status()
  }

  pub async fn open_dashboard(&self) -> Result<DashboardLoad, AppError> {
    let dashboard = self.session.require()?;
    dashboard.open().await
  }

  pub fn snapshot(&self) -> Result<DashboardSnapshot, AppError> {
    self.session.require()?.snapshot()
  }

  pub async fn refresh_collection(&self, collection: Collection) -> Result<DashboardSnapshot, AppError> {
    let dashboard = self.session.require()?;
    dashboard.refresh_table(collection).await?;
    dashboard.snapshot()
  }

  pub fn switch_view(&self, view: Collection) -> Result<ViewHeader, AppError> {
    self.session.require()?.switch_view(view)
  }

  pub async fn submit(&self, mutation: Mutation) -> Result<MutationOutcome, AppError> {
    let dashboard = self.session.require()?;
    let actor = dashboard.session().username.clone();
    let action = mutation.action();
    let payload = mutation
      .payload()
      .map(|value| value.to_string())
      .unwrap_or_else(|_| "{}".to_string());

    let result = dashboard.submit(mutation).await;
    let (outcome, details) = match &result {
      Ok(MutationOutcome::Accepted { failures, .. }) if failures.is_empty() => ("accepted", None),
      Ok(MutationOutcome::Accepted { failures, .. }) => (
        "accepted",
        Some(failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")),
      ),
      Ok(MutationOutcome::Rejected { message, .. }) => ("rejected", Some(message.clone())),
      Err(err) => ("failed", Some(err.to_string())),
    };
    db::with_conn(&self.db, |conn| append_activity(conn, Some(actor.as_str()), action, outcome, payload, details))?;

    result
  }

  /// Exports the table as currently displayed. Falls back to `<app_dir>/Exports`.
  pub fn export_table(&self, collection: Collection, output_dir: Option<String>, open_after: bool) -> Result<ExportedFile, AppError> {
    let dashboard = self.session.require()?;
    let table = dashboard.displayed_table(collection)?;
    let settings = self.settings()?;

    let dir = output_dir
      .filter(|dir| !dir.trim().is_empty())
      .or_else(|| Some(settings.export_dir.clone()).filter(|dir| !dir.trim().is_empty()))
      .map(PathBuf::from)
      .unwrap_or_else(|| self.app_dir.join("Exports"));

    let path = excel::export_table(&table, &dir)?;
    let bytes = fs::read(&path)?;
    let exported = ExportedFile {
      file_name: excel::file_name(&table),
      path: path.to_string_lossy().to_string(),
      data_base64: base64::engine::general_purpose::STANDARD.encode(bytes),
    };

    db::with_conn(&self.db, |conn| {
      append_activity(
        conn,
        Some(dashboard.session().username.as_str()),
        "export",
        "accepted",
        json!({ "table": table.table_id, "path": exported.path }).to_string(),
        None,
      )
    })?;

    if open_after {
      open::that(&path).map_err(|err| AppError::new("EXPORT_OPEN", err.to_string()))?;
    }

    Ok(exported)
  }

  pub fn list_activity(&self, page: i64, page_size: i64) -> Result<Paginated<ActivityEntry>, AppError> {
    db::with_conn(&self.db, |conn| list_activity(conn, page, page_size))
  }
}
