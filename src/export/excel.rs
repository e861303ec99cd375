use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};

use crate::domain::schema::ColumnKind;
use crate::error::AppError;
use crate::view::table::TableView;

const SHEET_NAME: &str = "Sheet1";

pub fn file_name(table: &TableView) -> String {
  format!("{}.xlsx", table.table_id)
}

/// Writes the table exactly as displayed to `<dir>/<table_id>.xlsx`.
pub fn export_table(table: &TableView, dir: &Path) -> Result<PathBuf, AppError> {
  fs::create_dir_all(dir)?;
  let path = dir.join(file_name(table));

  let mut workbook = Workbook::new();
  let sheet = workbook.add_worksheet();
  sheet.set_name(SHEET_NAME)?;
  write_table(sheet, table)?;
  workbook.save(&path)?;

  tracing::info!(table = %table.table_id, path = %path.display(), rows = table.rows.len(), "table exported");
  Ok(path)
}

fn write_table(sheet: &mut Worksheet, table: &TableView) -> Result<(), AppError> {
  let header = Format::new()
    .set_bold()
    .set_font_color(Color::White)
    .set_background_color(Color::RGB(0x1A2433));

  for (col, title) in table.headers.iter().enumerate() {
    let col = col as u16;
    sheet.write_string_with_format(0, col, title, &header)?;
    sheet.set_column_width(col, 16)?;
  }

  for (index, row) in table.rows.iter().enumerate() {
    let row_num = index as u32 + 1;
    for (col, cell) in row.iter().enumerate() {
      let kind = table.kinds.get(col).copied().unwrap_or(ColumnKind::Text);
      let col = col as u16;
      match (kind, cell.trim().parse::<f64>()) {
        (ColumnKind::Number | ColumnKind::Money, Ok(value)) if value.is_finite() => {
          sheet.write_number(row_num, col, value)?;
        }
        _ if cell.is_empty() => {}
        _ => {
          sheet.write_string(row_num, col, cell)?;
        }
      }
    }
  }

  sheet.set_freeze_panes(1, 0)?;
  Ok(())
}
