pub mod actions;
pub mod client;

pub use client::{ApiClient, BusyCounter, BusyIndicator, NoBusyIndicator};
