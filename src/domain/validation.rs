use crate::error::AppError;

pub fn ensure_required(field: &str, value: &str) -> Result<(), AppError> {
  if value.trim().is_empty() {
    Err(AppError::new("VALIDATION", format!("{field} is required")))
  } else {
    Ok(())
  }
}

pub fn ensure_amount(field: &str, amount: f64) -> Result<(), AppError> {
  if !amount.is_finite() || amount < 0.0 {
    Err(AppError::new("VALIDATION", format!("{field} must be a number >= 0")))
  } else {
    Ok(())
  }
}

pub fn ensure_quantity(quantity: i64) -> Result<(), AppError> {
  if quantity < 1 {
    Err(AppError::new("VALIDATION", "Quantity must be at least 1"))
  } else {
    Ok(())
  }
}
