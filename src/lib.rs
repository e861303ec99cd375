pub mod api;
pub mod audit;
#[cfg(feature = "desktop")]
pub mod commands;
pub mod dashboard;
pub mod db;
pub mod domain;
pub mod error;
pub mod export;
pub mod models;
pub mod session;
pub mod settings;
pub mod state;
pub mod view;

pub use state::AppState;
