use std::sync::Arc;

use tauri::{AppHandle, Emitter, State};

use crate::api::client::{BusyCounter, BusyIndicator};
use crate::dashboard::{DashboardLoad, DashboardSnapshot, Mutation, MutationOutcome, ViewHeader};
use crate::domain::schema::Collection;
use crate::error::AppError;
use crate::models::*;
use crate::state::{AppState, LoginResult};

pub const BUSY_EVENT: &str = "busy";

/// Emits `busy` to the webview on the first call in flight and after the last one finishes.
fn busy_events(app: &AppHandle) -> Arc<dyn BusyIndicator> {
  let app = app.clone();
  Arc::new(BusyCounter::new(move |busy| {
    if let Err(err) = app.emit(BUSY_EVENT, busy) {
      tracing::warn!(error = %err, "could not emit busy event");
    }
  }))
}

#[tauri::command]
pub async fn login(
  app: AppHandle,
  state: State<'_, AppState>,
  username: String,
  password: String,
) -> Result<LoginResult, AppError> {
  state.login(&username, &password, busy_events(&app)).await
}

#[tauri::command]
pub fn logout(state: State<AppState>) -> Result<SessionStatus, AppError> {
  state.logout()
}

#[tauri::command]
pub fn session_status(state: State<AppState>) -> Result<SessionStatus, AppError> {
  state.session.status()
}

#[tauri::command]
pub async fn open_dashboard(state: State<'_, AppState>) -> Result<DashboardLoad, AppError> {
  state.open_dashboard().await
}

#[tauri::command]
pub fn dashboard_snapshot(state: State<AppState>) -> Result<DashboardSnapshot, AppError> {
  state.snapshot()
}

#[tauri::command]
pub fn switch_view(state: State<AppState>, view: Collection) -> Result<ViewHeader, AppError> {
  state.switch_view(view)
}

#[tauri::command]
pub async fn refresh_collection(state: State<'_, AppState>, collection: Collection) -> Result<DashboardSnapshot, AppError> {
  state.refresh_collection(collection).await
}

#[tauri::command]
pub async fn add_product(state: State<'_, AppState>, input: NewProductInput) -> Result<MutationOutcome, AppError> {
  state.submit(Mutation::Product(input)).await
}

#[tauri::command]
pub async fn add_purchase(state: State<'_, AppState>, input: NewPurchaseInput) -> Result<MutationOutcome, AppError> {
  state.submit(Mutation::Purchase(input)).await
}

#[tauri::command]
pub async fn add_sale(state: State<'_, AppState>, input: NewSaleInput) -> Result<MutationOutcome, AppError> {
  state.submit(Mutation::Sale(input)).await
}

#[tauri::command]
pub async fn add_expense(state: State<'_, AppState>, input: NewExpenseInput) -> Result<MutationOutcome, AppError> {
  state.submit(Mutation::Expense(input)).await
}

#[tauri::command]
pub fn export_table(
  state: State<AppState>,
  collection: Collection,
  output_dir: Option<String>,
  open_after: Option<bool>,
) -> Result<ExportedFile, AppError> {
  state.export_table(collection, output_dir, open_after.unwrap_or(false))
}

#[tauri::command]
pub fn get_settings(state: State<AppState>) -> Result<Settings, AppError> {
  state.settings()
}

#[tauri::command]
pub fn update_settings(state: State<AppState>, settings_input: Settings) -> Result<Settings, AppError> {
  let actor = state.session.status()?.username;
  state.update_settings(settings_input, actor.as_deref())
}

#[tauri::command]
pub fn list_activity(state: State<AppState>, page: i64, page_size: i64) -> Result<Paginated<ActivityEntry>, AppError> {
  state.list_activity(page, page_size)
}
