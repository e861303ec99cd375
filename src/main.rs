#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use shop_dashboard::{commands, db, AppState};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let app_dir = db::resolve_app_dir().expect("Failed to resolve app data directory");
  let db = db::init_db(&app_dir).expect("Failed to initialize database");
  tracing::info!(path = %db.db_path.display(), "database ready");

  tauri::Builder::default()
    .plugin(tauri_plugin_dialog::init())
    .manage(AppState::new(db, app_dir))
    .invoke_handler(tauri::generate_handler![
      commands::login,
      commands::logout,
      commands::session_status,
      commands::open_dashboard,
      commands::dashboard_snapshot,
      commands::switch_view,
      commands::refresh_collection,
      commands::add_product,
      commands::add_purchase,
      commands::add_sale,
      commands::add_expense,
      commands::export_table,
      commands::get_settings,
      commands::update_settings,
      commands::list_activity,
    ])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}
