use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::format::{display_value, parse_timestamp, DisplayFormat};
use crate::domain::records::Row;
use crate::domain::schema::{Collection, ColumnKind};

/// A display-ready grid. Every row holds exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
  pub table_id: String,
  pub collection: Collection,
  pub headers: Vec<String>,
  pub kinds: Vec<ColumnKind>,
  pub rows: Vec<Vec<String>>,
}

impl TableView {
  pub fn empty(collection: Collection) -> Self {
    render(collection, &[], &DisplayFormat::default())
  }
}

/// Builds a fresh table from raw rows. Excess fields are dropped, missing ones become empty cells.
pub fn render(collection: Collection, rows: &[Row], format: &DisplayFormat) -> TableView {
  let columns = collection.columns();
  let grid = rows
    .iter()
    .map(|row| {
      columns
        .iter()
        .enumerate()
        .map(|(index, column)| match row.get(index) {
          Some(value) => render_cell(value, column.kind, format),
          None => String::new(),
        })
        .collect()
    })
    .collect();

  TableView {
    table_id: collection.table_id().to_string(),
    collection,
    headers: columns.iter().map(|column| column.title.to_string()).collect(),
    kinds: columns.iter().map(|column| column.kind).collect(),
    rows: grid,
  }
}

fn render_cell(value: &Value, kind: ColumnKind, format: &DisplayFormat) -> String {
  match kind {
    ColumnKind::Date => match value.as_str().and_then(parse_timestamp) {
      Some(timestamp) => format.date(&timestamp),
      None => display_value(value),
    },
    ColumnKind::Text | ColumnKind::Number | ColumnKind::Money => display_value(value),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn rows(value: Value) -> Vec<Row> {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn every_row_has_exactly_the_column_count() {
    let data = rows(json!([
      ["E1", "Rent"],
      ["E2", "Food", 200, "2024-02-03T10:00:00Z", "extra", "more"],
      []
    ]));
    let table = render(Collection::Expenses, &data, &DisplayFormat::default());
    assert_eq!(table.headers.len(), 4);
    assert!(table.rows.iter().all(|row| row.len() == 4));
    assert_eq!(table.rows[0], vec!["E1", "Rent", "", ""]);
    assert_eq!(table.rows[1], vec!["E2", "Food", "200", "2/3/2024"]);
    assert_eq!(table.rows[2], vec!["", "", "", ""]);
  }

  #[test]
  fn only_date_columns_are_reformatted() {
    let data = rows(json!([[
      "P1",
      "GMT Adapter",
      10,
      15.5,
      3,
      "Mon Jan 01 2024 10:00:00 GMT+0530 (India Standard Time)"
    ]]));
    let table = render(Collection::Products, &data, &DisplayFormat::default());
    assert_eq!(table.rows[0][1], "GMT Adapter");
    assert_eq!(table.rows[0][3], "15.5");
    assert_eq!(table.rows[0][5], "1/1/2024");
  }

  #[test]
  fn unparseable_dates_render_verbatim() {
    let data = rows(json!([["E1", "Rent", 1000, "date"]]));
    let table = render(Collection::Expenses, &data, &DisplayFormat::default());
    assert_eq!(table.rows[0][3], "date");
  }

  #[test]
  fn rendering_twice_gives_identical_tables() {
    let data = rows(json!([["S1", 1, "Tea", 2, 50, 100, 20, "2024-01-01T00:00:00.000Z"]]));
    let format = DisplayFormat::default();
    assert_eq!(
      render(Collection::Sales, &data, &format),
      render(Collection::Sales, &data, &format)
    );
  }

  #[test]
  fn empty_table_keeps_headers() {
    let table = TableView::empty(Collection::Purchases);
    assert_eq!(table.table_id, "purchasesTable");
    assert_eq!(table.headers.len(), 7);
    assert!(table.rows.is_empty());
  }
}
