use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::AppError;
use crate::models::{ActivityEntry, Paginated};

pub fn append_activity(
  conn: &Connection,
  actor: Option<&str>,
  action: &str,
  outcome: &str,
  payload_json: String,
  details: Option<String>,
) -> Result<(), AppError> {
  let ts = Utc::now().to_rfc3339();
  conn.execute(
    "INSERT INTO activity_log (ts, actor, action, outcome, payload_json, details) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![ts, actor, action, outcome, payload_json, details],
  )?;
  Ok(())
}

/// Newest first. `page` starts at 1.
pub fn list_activity(conn: &Connection, page: i64, page_size: i64) -> Result<Paginated<ActivityEntry>, AppError> {
  let page_size = page_size.clamp(1, 500);
  let offset = (page.max(1) - 1) * page_size;
  let total: i64 = conn.query_row("SELECT COUNT(*) FROM activity_log", [], |row| row.get(0))?;

  let mut stmt = conn.prepare(
    "SELECT id, ts, actor, action, outcome, payload_json, details
     FROM activity_log ORDER BY id DESC LIMIT ?1 OFFSET ?2",
  )?;
  let rows = stmt.query_map(params![page_size, offset], |row| {
    Ok(ActivityEntry {
      id: row.get(0)?,
      ts: row.get(1)?,
      actor: row.get(2)?,
      action: row.get(3)?,
      outcome: row.get(4)?,
      payload_json: row.get(5)?,
      details: row.get(6)?,
    })
  })?;

  let mut items = Vec::new();
  for row in rows {
    items.push(row?);
  }

  Ok(Paginated { total, items })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db;

  #[test]
  fn lists_newest_first_with_paging() {
    let mut conn = Connection::open_in_memory().unwrap();
    db::prepare(&mut conn).unwrap();
    for action in ["login", "addProduct", "addSale"] {
      append_activity(&conn, Some("ana"), action, "accepted", "{}".to_string(), None).unwrap();
    }
    append_activity(&conn, Some("ana"), "addExpense", "rejected", "{}".to_string(), Some("Bad amount".to_string()))
      .unwrap();

    let first = list_activity(&conn, 1, 2).unwrap();
    assert_eq!(first.total, 4);
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].action, "addExpense");
    assert_eq!(first.items[0].details.as_deref(), Some("Bad amount"));

    let second = list_activity(&conn, 2, 2).unwrap();
    assert_eq!(second.items[1].action, "login");
  }
}
