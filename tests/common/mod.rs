#![allow(dead_code)]

use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use serde_json::{json, Value};
use tiny_http::{Header, Response, Server};

use shop_dashboard::db;
use shop_dashboard::models::Settings;
use shop_dashboard::AppState;

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
  pub method: String,
  pub action: String,
  pub content_type: Option<String>,
  pub body: Value,
}

pub enum Reply {
  Json(Value),
  Raw(String),
}

type Handler = dyn Fn(&str, &Value) -> Reply + Send + Sync;

/// Spreadsheet backend stand-in listening on an ephemeral local port.
pub struct MockBackend {
  pub url: String,
  server: Arc<Server>,
  requests: Arc<Mutex<Vec<Recorded>>>,
  worker: Option<JoinHandle<()>>,
}

impl MockBackend {
  pub fn start(handler: impl Fn(&str, &Value) -> Reply + Send + Sync + 'static) -> Self {
    let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
    let port = server.server_addr().to_ip().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let handler: Arc<Handler> = Arc::new(handler);

    let worker = {
      let server = server.clone();
      let requests = requests.clone();
      std::thread::spawn(move || {
        for mut request in server.incoming_requests() {
          let mut raw = String::new();
          let _ = request.as_reader().read_to_string(&mut raw);
          let body = serde_json::from_str(&raw).unwrap_or(Value::Null);
          let action = query_action(request.url());
          let content_type = request
            .headers()
            .iter()
            .find(|header| header.field.equiv("Content-Type"))
            .map(|header| header.value.as_str().to_string());

          requests.lock().unwrap().push(Recorded {
            method: request.method().to_string(),
            action: action.clone(),
            content_type,
            body: body.clone(),
          });

          let response = match handler(&action, &body) {
            Reply::Json(value) => Response::from_string(value.to_string())
              .with_header(Header::from_bytes("Content-Type", "application/json").unwrap()),
            Reply::Raw(text) => Response::from_string(text),
          };
          let _ = request.respond(response);
        }
      })
    };

    Self {
      url: format!("http://127.0.0.1:{port}/exec"),
      server,
      requests,
      worker: Some(worker),
    }
  }

  pub fn requests(&self) -> Vec<Recorded> {
    self.requests.lock().unwrap().clone()
  }

  pub fn actions(&self) -> Vec<String> {
    self.requests().into_iter().map(|request| request.action).collect()
  }

  pub fn clear(&self) {
    self.requests.lock().unwrap().clear();
  }
}

impl Drop for MockBackend {
  fn drop(&mut self) {
    self.server.unblock();
    if let Some(worker) = self.worker.take() {
      let _ = worker.join();
    }
  }
}

fn query_action(url: &str) -> String {
  url
    .split_once('?')
    .map(|(_, query)| query)
    .unwrap_or_default()
    .split('&')
    .find_map(|pair| pair.strip_prefix("action="))
    .unwrap_or_default()
    .to_string()
}

/// A small shop: two products, one purchase, three sales on 1 Jan 2024, two expense categories.
pub fn shop_backend() -> MockBackend {
  MockBackend::start(shop_reply)
}

pub fn shop_reply(action: &str, body: &Value) -> Reply {
  match action {
    "login" => {
      if body["username"] == "alice" && body["password"] == "secret" {
        Reply::Json(json!({ "status": "success", "token": "tok-1" }))
      } else {
        Reply::Json(json!({ "status": "error", "message": "Invalid username or password" }))
      }
    }
    "getDashboardData" => Reply::Json(json!({
      "totalSalesValue": 150,
      "totalPurchaseValue": 80,
      "totalExpenses": 1700,
      "totalProfit": 70,
      "salesData": [
        ["S1", "P1", "Tea", 2, 50, 100, 40, "2024-01-01T10:00:00.000Z"],
        ["S2", "P2", "Coffee", 1, 50, 50, 30, "2024-01-01T15:00:00.000Z"]
      ],
      "expensesData": [
        ["E1", "Rent", 1000, "2024-01-02T00:00:00.000Z"],
        ["E2", "Food", 200, "2024-01-03T00:00:00.000Z"],
        ["E3", "Rent", 500, "2024-01-04T00:00:00.000Z"]
      ]
    })),
    "getProductsList" => Reply::Json(json!([{ "id": 1, "name": "Tea" }, { "id": "P2", "name": "Coffee" }])),
    "getData" => match body["sheetName"].as_str() {
      Some("Products") => Reply::Json(json!([
        ["P1", "Tea", 20, 50, 8, "2023-12-30T09:00:00.000Z"],
        ["P2", "Coffee", 20, 50, 4, "2023-12-30T09:00:00.000Z"]
      ])),
      Some("Purchases") => Reply::Json(json!([["U1", "P1", "Tea", 4, 20, 80, "2023-12-31T09:00:00.000Z"]])),
      Some("Sales") => Reply::Json(json!([
        ["S1", "P1", "Tea", 2, 50, 100, 40, "2024-01-01T10:00:00.000Z"],
        ["S2", "P2", "Coffee", 1, 50, 50, 30, "2024-01-01T15:00:00.000Z"]
      ])),
      Some("Expenses") => Reply::Json(Value::Null),
      _ => Reply::Json(json!({ "status": "error", "message": "Unknown sheet" })),
    },
    "addProduct" if body["productName"] == "Tea" => {
      Reply::Json(json!({ "status": "error", "message": "Duplicate name" }))
    }
    "addProduct" | "addPurchase" | "addSale" | "addExpense" => Reply::Json(json!({ "status": "success" })),
    _ => Reply::Json(json!({ "status": "error", "message": "Unknown action" })),
  }
}

pub fn temp_dir(label: &str) -> PathBuf {
  let dir = std::env::temp_dir().join(format!("shop-dashboard-{label}-{}", std::process::id()));
  let _ = std::fs::remove_dir_all(&dir);
  dir
}

/// Application state backed by a fresh database and pointed at `endpoint`.
pub fn app_state(label: &str, endpoint: &str) -> AppState {
  let dir = temp_dir(label);
  let db = db::init_db(&dir).unwrap();
  let state = AppState::new(db, dir);
  let current = state.settings().unwrap();
  state
    .update_settings(
      Settings {
        endpoint_url: endpoint.to_string(),
        ..current
      },
      None,
    )
    .unwrap();
  state
}
