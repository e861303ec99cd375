use serde::{Deserialize, Serialize};

/// How a column's cells are read and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
  Text,
  Number,
  Money,
  Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
  pub title: &'static str,
  pub kind: ColumnKind,
}

const fn col(title: &'static str, kind: ColumnKind) -> Column {
  Column { title, kind }
}

const PRODUCT_COLUMNS: [Column; 6] = [
  col("ID", ColumnKind::Text),
  col("Name", ColumnKind::Text),
  col("Cost Price", ColumnKind::Money),
  col("Sale Price", ColumnKind::Money),
  col("Stock", ColumnKind::Number),
  col("Created", ColumnKind::Date),
];

const PURCHASE_COLUMNS: [Column; 7] = [
  col("ID", ColumnKind::Text),
  col("Product ID", ColumnKind::Text),
  col("Product", ColumnKind::Text),
  col("Quantity", ColumnKind::Number),
  col("Cost Price", ColumnKind::Money),
  col("Total Cost", ColumnKind::Money),
  col("Date", ColumnKind::Date),
];

const SALE_COLUMNS: [Column; 8] = [
  col("ID", ColumnKind::Text),
  col("Product ID", ColumnKind::Text),
  col("Product", ColumnKind::Text),
  col("Quantity", ColumnKind::Number),
  col("Sale Price", ColumnKind::Money),
  col("Amount", ColumnKind::Money),
  col("Profit", ColumnKind::Money),
  col("Date", ColumnKind::Date),
];

const EXPENSE_COLUMNS: [Column; 4] = [
  col("ID", ColumnKind::Text),
  col("Category", ColumnKind::Text),
  col("Amount", ColumnKind::Money),
  col("Date", ColumnKind::Date),
];

/// One of the four backend record sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
  Products,
  Purchases,
  Sales,
  Expenses,
}

impl Collection {
  pub const ALL: [Collection; 4] = [
    Collection::Products,
    Collection::Purchases,
    Collection::Sales,
    Collection::Expenses,
  ];

  pub fn key(self) -> &'static str {
    match self {
      Collection::Products => "products",
      Collection::Purchases => "purchases",
      Collection::Sales => "sales",
      Collection::Expenses => "expenses",
    }
  }

  /// Sheet name the backend expects in `getData`.
  pub fn sheet_name(self) -> &'static str {
    match self {
      Collection::Products => "Products",
      Collection::Purchases => "Purchases",
      Collection::Sales => "Sales",
      Collection::Expenses => "Expenses",
    }
  }

  pub fn table_id(self) -> &'static str {
    match self {
      Collection::Products => "productsTable",
      Collection::Purchases => "purchasesTable",
      Collection::Sales => "salesTable",
      Collection::Expenses => "expensesTable",
    }
  }

  pub fn columns(self) -> &'static [Column] {
    match self {
      Collection::Products => &PRODUCT_COLUMNS,
      Collection::Purchases => &PURCHASE_COLUMNS,
      Collection::Sales => &SALE_COLUMNS,
      Collection::Expenses => &EXPENSE_COLUMNS,
    }
  }

  pub fn column_count(self) -> usize {
    self.columns().len()
  }

  pub fn parse(value: &str) -> Option<Collection> {
    Collection::ALL
      .into_iter()
      .find(|collection| collection.key().eq_ignore_ascii_case(value.trim()) || collection.table_id() == value.trim())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn column_counts_match_sheet_layout() {
    assert_eq!(Collection::Products.column_count(), 6);
    assert_eq!(Collection::Purchases.column_count(), 7);
    assert_eq!(Collection::Sales.column_count(), 8);
    assert_eq!(Collection::Expenses.column_count(), 4);
  }

  #[test]
  fn date_columns_sit_where_the_backend_puts_timestamps() {
    assert_eq!(Collection::Purchases.columns()[6].kind, ColumnKind::Date);
    assert_eq!(Collection::Sales.columns()[7].kind, ColumnKind::Date);
    assert_eq!(Collection::Sales.columns()[5].title, "Amount");
    assert_eq!(Collection::Expenses.columns()[1].title, "Category");
  }

  #[test]
  fn parses_keys_and_table_ids() {
    assert_eq!(Collection::parse("Sales"), Some(Collection::Sales));
    assert_eq!(Collection::parse("expensesTable"), Some(Collection::Expenses));
    assert_eq!(Collection::parse("inventory"), None);
  }
}
