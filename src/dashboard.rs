use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::actions;
use crate::api::client::ApiClient;
use crate::domain::aggregate::{expenses_by_category, sales_by_date};
use crate::domain::format::DisplayFormat;
use crate::domain::records::DashboardSummary;
use crate::domain::schema::Collection;
use crate::domain::validation;
use crate::error::AppError;
use crate::models::{KpiSummary, NewExpenseInput, NewProductInput, NewPurchaseInput, NewSaleInput, ProductOption};
use crate::session::Session;
use crate::view::chart::{ChartPanel, ChartSpec};
use crate::view::table::{self, TableView};

pub const PRODUCT_PLACEHOLDER: &str = "Select a product...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", content = "collection", rename_all = "snake_case")]
pub enum RefreshTarget {
  Summary,
  ProductOptions,
  Table(Collection),
}

const PRODUCT_REFRESH: [RefreshTarget; 2] = [RefreshTarget::ProductOptions, RefreshTarget::Table(Collection::Products)];
const PURCHASE_REFRESH: [RefreshTarget; 3] = [
  RefreshTarget::Table(Collection::Purchases),
  RefreshTarget::Table(Collection::Products),
  RefreshTarget::Summary,
];
const SALE_REFRESH: [RefreshTarget; 3] = [
  RefreshTarget::Table(Collection::Sales),
  RefreshTarget::Table(Collection::Products),
  RefreshTarget::Summary,
];
const EXPENSE_REFRESH: [RefreshTarget; 2] = [RefreshTarget::Table(Collection::Expenses), RefreshTarget::Summary];

/// A create-operation submitted from one of the four forms.
#[derive(Debug, Clone)]
pub enum Mutation {
  Product(NewProductInput),
  Purchase(NewPurchaseInput),
  Sale(NewSaleInput),
  Expense(NewExpenseInput),
}

impl Mutation {
  pub fn action(&self) -> &'static str {
    match self {
      Mutation::Product(_) => "addProduct",
      Mutation::Purchase(_) => "addPurchase",
      Mutation::Sale(_) => "addSale",
      Mutation::Expense(_) => "addExpense",
    }
  }

  pub fn refreshes(&self) -> &'static [RefreshTarget] {
    match self {
      Mutation::Product(_) => &PRODUCT_REFRESH,
      Mutation::Purchase(_) => &PURCHASE_REFRESH,
      Mutation::Sale(_) => &SALE_REFRESH,
      Mutation::Expense(_) => &EXPENSE_REFRESH,
    }
  }

  pub fn success_notice(&self) -> &'static str {
    match self {
      Mutation::Product(_) => "Product added!",
      Mutation::Purchase(_) => "Purchase added!",
      Mutation::Sale(_) => "Sale added!",
      Mutation::Expense(_) => "Expense added!",
    }
  }

  /// Only what the form controls themselves would enforce.
  pub fn validate(&self) -> Result<(), AppError> {
    match self {
      Mutation::Product(input) => {
        validation::ensure_required("Product name", &input.product_name)?;
        validation::ensure_amount("Cost price", input.cost_price)?;
        validation::ensure_amount("Sale price", input.sale_price)
      }
      Mutation::Purchase(NewPurchaseInput { product_id, quantity }) | Mutation::Sale(NewSaleInput { product_id, quantity }) => {
        validation::ensure_required("Product", product_id)?;
        validation::ensure_quantity(*quantity)
      }
      Mutation::Expense(input) => {
        validation::ensure_required("Category", &input.expense_category)?;
        validation::ensure_amount("Amount", input.amount)
      }
    }
  }

  pub fn payload(&self) -> Result<Value, AppError> {
    let value = match self {
      Mutation::Product(input) => serde_json::to_value(input),
      Mutation::Purchase(input) => serde_json::to_value(input),
      Mutation::Sale(input) => serde_json::to_value(input),
      Mutation::Expense(input) => serde_json::to_value(input),
    };
    value.map_err(|err| AppError::new("PAYLOAD", err.to_string()))
  }
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
  /// Backend stored the record; the form is reset and the listed views were re-fetched.
  Accepted {
    notice: String,
    reset_form: bool,
    refreshed: Vec<RefreshTarget>,
    failures: Vec<AppError>,
    snapshot: DashboardSnapshot,
  },
  /// Backend refused; the form keeps its input.
  Rejected {
    message: String,
    notice: String,
    reset_form: bool,
  },
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewHeader {
  pub active: Collection,
  pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
  pub username: String,
  pub header: ViewHeader,
  pub kpis: Option<KpiSummary>,
  pub sales_chart: ChartPanel,
  pub expense_chart: ChartPanel,
  pub purchase_products: Vec<ProductOption>,
  pub sale_products: Vec<ProductOption>,
  pub tables: Vec<TableView>,
}

#[derive(Debug, Serialize)]
pub struct DashboardLoad {
  pub snapshot: DashboardSnapshot,
  pub failures: Vec<AppError>,
}

/// Latest applied value of one view plus the sequence number it came from.
#[derive(Debug)]
struct Slot<T> {
  seq: u64,
  value: T,
}

impl<T> Slot<T> {
  fn new(value: T) -> Self {
    Self { seq: 0, value }
  }

  fn apply(&mut self, seq: u64, value: T) -> bool {
    if seq <= self.seq {
      return false;
    }
    self.seq = seq;
    self.value = value;
    true
  }
}

struct DashboardState {
  active_view: Collection,
  summary_seq: u64,
  kpis: Option<KpiSummary>,
  sales_chart: ChartPanel,
  expense_chart: ChartPanel,
  product_options: Slot<Vec<ProductOption>>,
  tables: HashMap<Collection, Slot<TableView>>,
}

impl DashboardState {
  fn new() -> Self {
    Self {
      active_view: Collection::Products,
      summary_seq: 0,
      kpis: None,
      sales_chart: ChartPanel::new("salesChart"),
      expense_chart: ChartPanel::new("expenseChart"),
      product_options: Slot::new(Vec::new()),
      tables: Collection::ALL
        .into_iter()
        .map(|collection| (collection, Slot::new(TableView::empty(collection))))
        .collect(),
    }
  }
}

pub fn view_title(view: Collection) -> String {
  let key = view.key();
  let mut chars = key.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Drives one logged-in dashboard: fetches, aggregates, renders and keeps the latest view state.
pub struct Dashboard {
  api: ApiClient,
  session: Session,
  format: DisplayFormat,
  next_seq: AtomicU64,
  state: Mutex<DashboardState>,
}

impl Dashboard {
  pub fn new(api: ApiClient, session: Session, format: DisplayFormat) -> Self {
    Self {
      api,
      session,
      format,
      next_seq: AtomicU64::new(1),
      state: Mutex::new(DashboardState::new()),
    }
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  pub fn format(&self) -> &DisplayFormat {
    &self.format
  }

  fn issue(&self) -> u64 {
    self.next_seq.fetch_add(1, Ordering::SeqCst)
  }

  /// Summary, then product lists, then all four tables at once.
  pub async fn open(&self) -> Result<DashboardLoad, AppError> {
    tracing::info!(username = %self.session.username, "opening dashboard");
    let mut failures = Vec::new();

    if let Err(err) = self.refresh_summary().await {
      failures.push(err);
    }
    if let Err(err) = self.refresh_product_options().await {
      failures.push(err);
    }

    let (products, purchases, sales, expenses) = tokio::join!(
      self.refresh_table(Collection::Products),
      self.refresh_table(Collection::Purchases),
      self.refresh_table(Collection::Sales),
      self.refresh_table(Collection::Expenses),
    );
    for result in [products, purchases, sales, expenses] {
      if let Err(err) = result {
        failures.push(err);
      }
    }

    Ok(DashboardLoad {
      snapshot: self.snapshot()?,
      failures,
    })
  }

  pub async fn refresh(&self, target: RefreshTarget) -> Result<bool, AppError> {
    match target {
      RefreshTarget::Summary => self.refresh_summary().await,
      RefreshTarget::ProductOptions => self.refresh_product_options().await,
      RefreshTarget::Table(collection) => self.refresh_table(collection).await,
    }
  }

  pub async fn refresh_summary(&self) -> Result<bool, AppError> {
    let seq = self.issue();
    let summary = actions::fetch_summary(&self.api, &self.session).await?;
    self.apply_summary(seq, &summary)
  }

  pub async fn refresh_product_options(&self) -> Result<bool, AppError> {
    let seq = self.issue();
    let options = actions::fetch_product_options(&self.api, &self.session).await?;
    let mut state = self.state.lock()?;
    Ok(log_discard("product options", seq, state.product_options.apply(seq, options)))
  }

  pub async fn refresh_table(&self, collection: Collection) -> Result<bool, AppError> {
    let seq = self.issue();
    let rows = actions::fetch_rows(&self.api, &self.session, collection).await?;
    let rendered = table::render(collection, &rows, &self.format);
    let mut state = self.state.lock()?;
    let applied = match state.tables.get_mut(&collection) {
      Some(slot) => slot.apply(seq, rendered),
      None => false,
    };
    Ok(log_discard(collection.table_id(), seq, applied))
  }

  fn apply_summary(&self, seq: u64, summary: &DashboardSummary) -> Result<bool, AppError> {
    let kpis = KpiSummary {
      total_sales: self.format.money(summary.total_sales_value),
      total_purchases: self.format.money(summary.total_purchase_value),
      total_expenses: self.format.money(summary.total_expenses),
      total_profit: self.format.money(summary.total_profit),
    };
    let sales_series = sales_by_date(&summary.sales, &self.format);
    let categories = expenses_by_category(&summary.expenses);

    let mut state = self.state.lock()?;
    if seq <= state.summary_seq {
      return Ok(log_discard("summary", seq, false));
    }
    state.summary_seq = seq;
    state.kpis = Some(kpis);
    state.sales_chart.set_data(ChartSpec::sales_line(&sales_series));
    state.expense_chart.set_data(ChartSpec::expense_doughnut(&categories));
    Ok(true)
  }

  pub async fn submit(&self, mutation: Mutation) -> Result<MutationOutcome, AppError> {
    mutation.validate()?;
    let action = mutation.action();
    let response = actions::submit(&self.api, &self.session, action, mutation.payload()?).await?;

    if !response.is_success() {
      let message = response.message.unwrap_or_else(|| "Unknown error".to_string());
      tracing::warn!(action, %message, "backend rejected submission");
      return Ok(MutationOutcome::Rejected {
        notice: format!("Error: {message}"),
        message,
        reset_form: false,
      });
    }

    tracing::info!(action, "submission accepted");
    let mut failures = Vec::new();
    for target in mutation.refreshes() {
      if let Err(err) = self.refresh(*target).await {
        failures.push(err);
      }
    }

    Ok(MutationOutcome::Accepted {
      notice: mutation.success_notice().to_string(),
      reset_form: true,
      refreshed: mutation.refreshes().to_vec(),
      failures,
      snapshot: self.snapshot()?,
    })
  }

  /// Activates a sub-view. Nothing is re-fetched.
  pub fn switch_view(&self, view: Collection) -> Result<ViewHeader, AppError> {
    let mut state = self.state.lock()?;
    state.active_view = view;
    Ok(ViewHeader {
      active: view,
      title: view_title(view),
    })
  }

  pub fn displayed_table(&self, collection: Collection) -> Result<TableView, AppError> {
    let state = self.state.lock()?;
    state
      .tables
      .get(&collection)
      .map(|slot| slot.value.clone())
      .ok_or_else(|| AppError::new("TABLE_MISSING", format!("{} is not loaded", collection.table_id())))
  }

  pub fn snapshot(&self) -> Result<DashboardSnapshot, AppError> {
    let state = self.state.lock()?;
    let product_select = with_placeholder(&state.product_options.value);
    Ok(DashboardSnapshot {
      username: self.session.username.clone(),
      header: ViewHeader {
        active: state.active_view,
        title: view_title(state.active_view),
      },
      kpis: state.kpis.clone(),
      sales_chart: state.sales_chart.clone(),
      expense_chart: state.expense_chart.clone(),
      purchase_products: product_select.clone(),
      sale_products: product_select,
      tables: Collection::ALL
        .into_iter()
        .filter_map(|collection| state.tables.get(&collection).map(|slot| slot.value.clone()))
        .collect(),
    })
  }
}

fn with_placeholder(options: &[ProductOption]) -> Vec<ProductOption> {
  std::iter::once(ProductOption {
    id: String::new(),
    name: PRODUCT_PLACEHOLDER.to_string(),
  })
  .chain(options.iter().cloned())
  .collect()
}

fn log_discard(view: &str, seq: u64, applied: bool) -> bool {
  if !applied {
    tracing::debug!(view, seq, "discarding stale response");
  }
  applied
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::api::client::NoBusyIndicator;
  use crate::domain::format::parse_timestamp;
  use crate::domain::records::Sale;

  #[test]
  fn refresh_plan_per_action() {
    let product = Mutation::Product(NewProductInput {
      product_name: "Tea".to_string(),
      cost_price: 1.0,
      sale_price: 2.0,
    });
    assert_eq!(product.refreshes(), &PRODUCT_REFRESH);

    let expense = Mutation::Expense(NewExpenseInput {
      expense_category: "Rent".to_string(),
      amount: 10.0,
    });
    assert_eq!(
      expense.refreshes(),
      &[RefreshTarget::Table(Collection::Expenses), RefreshTarget::Summary]
    );
    assert_eq!(expense.action(), "addExpense");
    assert_eq!(expense.success_notice(), "Expense added!");

    let sale = Mutation::Sale(NewSaleInput {
      product_id: "1".to_string(),
      quantity: 1,
    });
    assert!(sale.refreshes().contains(&RefreshTarget::Table(Collection::Products)));
    assert!(sale.refreshes().contains(&RefreshTarget::Summary));
  }

  #[test]
  fn validation_mirrors_form_constraints() {
    let purchase = Mutation::Purchase(NewPurchaseInput {
      product_id: String::new(),
      quantity: 2,
    });
    assert_eq!(purchase.validate().unwrap_err().code, "VALIDATION");

    let sale = Mutation::Sale(NewSaleInput {
      product_id: "4".to_string(),
      quantity: 0,
    });
    assert!(sale.validate().is_err());
  }

  #[test]
  fn slot_ignores_older_sequence_numbers() {
    let mut slot = Slot::new("initial");
    assert!(slot.apply(3, "newer"));
    assert!(!slot.apply(2, "stale"));
    assert!(!slot.apply(3, "duplicate"));
    assert_eq!(slot.value, "newer");
  }

  fn summary(day: &str, amount: f64) -> DashboardSummary {
    DashboardSummary {
      total_sales_value: amount,
      total_purchase_value: 0.0,
      total_expenses: 0.0,
      total_profit: amount,
      sales: vec![Sale {
        amount,
        sold_at: parse_timestamp(day),
      }],
      expenses: Vec::new(),
    }
  }

  #[test]
  fn older_summary_never_replaces_a_newer_one() {
    let api = ApiClient::new("http://127.0.0.1:9/exec", Arc::new(NoBusyIndicator)).unwrap();
    let dashboard = Dashboard::new(api, Session::new("ana", None), DisplayFormat::default());

    assert!(dashboard.apply_summary(2, &summary("2024-01-02T00:00:00Z", 20.0)).unwrap());
    assert!(!dashboard.apply_summary(1, &summary("2024-01-01T00:00:00Z", 10.0)).unwrap());

    let snapshot = dashboard.snapshot().unwrap();
    assert_eq!(snapshot.sales_chart.generation, 1);
    assert_eq!(snapshot.expense_chart.generation, 1);
    assert_eq!(snapshot.sales_chart.spec.unwrap().labels, vec!["1/2/2024"]);
    assert_eq!(snapshot.kpis.unwrap().total_sales, "₹20.00");
  }

  #[test]
  fn titles_are_capitalized_view_keys() {
    assert_eq!(view_title(Collection::Purchases), "Purchases");
    assert_eq!(view_title(Collection::Expenses), "Expenses");
  }

  #[test]
  fn product_lists_start_with_placeholder() {
    let options = with_placeholder(&[ProductOption {
      id: "1".to_string(),
      name: "Tea".to_string(),
    }]);
    assert_eq!(options[0].name, PRODUCT_PLACEHOLDER);
    assert_eq!(options[0].id, "");
    assert_eq!(options[1].name, "Tea");
  }
}
