pub mod aggregate;
pub mod format;
pub mod records;
pub mod schema;
pub mod validation;
