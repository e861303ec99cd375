use std::collections::HashMap;

use crate::domain::format::DisplayFormat;
use crate::domain::records::{Expense, Sale};
use crate::models::{CategorySplit, DateSeries};

/// Bucket for sales whose date could not be read.
pub const UNDATED_LABEL: &str = "Invalid Date";

/// Sums sale amounts per display date. Labels keep first-seen order and stay index-aligned with values.
pub fn sales_by_date(sales: &[Sale], format: &DisplayFormat) -> DateSeries {
  let mut series = DateSeries::default();
  let mut slots: HashMap<String, usize> = HashMap::new();

  for sale in sales {
    let label = match &sale.sold_at {
      Some(sold_at) => format.date(sold_at),
      None => UNDATED_LABEL.to_string(),
    };
    match slots.get(&label) {
      Some(&slot) => series.values[slot] += sale.amount,
      None => {
        slots.insert(label.clone(), series.labels.len());
        series.labels.push(label);
        series.values.push(sale.amount);
      }
    }
  }

  series
}

/// Running total per expense category, ordered by first occurrence.
pub fn expenses_by_category(expenses: &[Expense]) -> Vec<CategorySplit> {
  let mut totals: Vec<CategorySplit> = Vec::new();
  let mut slots: HashMap<&str, usize> = HashMap::new();

  for expense in expenses {
    match slots.get(expense.category.as_str()) {
      Some(&slot) => totals[slot].amount += expense.amount,
      None => {
        slots.insert(expense.category.as_str(), totals.len());
        totals.push(CategorySplit {
          category: expense.category.clone(),
          amount: expense.amount,
        });
      }
    }
  }

  totals
}
