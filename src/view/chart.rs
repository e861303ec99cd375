use serde::{Deserialize, Serialize};

use crate::models::{CategorySplit, DateSeries};

pub const CATEGORY_PALETTE: [&str; 5] = ["#4A90E2", "#F5A623", "#BD10E0", "#7ED321", "#E01050"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
  Line,
  Doughnut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
  pub label: Option<String>,
  pub data: Vec<f64>,
  pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
  pub kind: ChartKind,
  pub labels: Vec<String>,
  pub datasets: Vec<Dataset>,
}

impl ChartSpec {
  pub fn sales_line(series: &DateSeries) -> Self {
    Self {
      kind: ChartKind::Line,
      labels: series.labels.clone(),
      datasets: vec![Dataset {
        label: Some("Sales".to_string()),
        data: series.values.clone(),
        colors: Vec::new(),
      }],
    }
  }

  pub fn expense_doughnut(categories: &[CategorySplit]) -> Self {
    Self {
      kind: ChartKind::Doughnut,
      labels: categories.iter().map(|split| split.category.clone()).collect(),
      datasets: vec![Dataset {
        label: None,
        data: categories.iter().map(|split| split.amount).collect(),
        colors: CATEGORY_PALETTE.iter().map(|color| color.to_string()).collect(),
      }],
    }
  }
}

/// One chart owned by the dashboard. The webview tears down its chart
/// instance and builds a new one whenever `generation` changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPanel {
  pub canvas_id: String,
  pub generation: u64,
  pub spec: Option<ChartSpec>,
}

impl ChartPanel {
  pub fn new(canvas_id: &str) -> Self {
    Self {
      canvas_id: canvas_id.to_string(),
      generation: 0,
      spec: None,
    }
  }

  pub fn set_data(&mut self, spec: ChartSpec) {
    self.spec = Some(spec);
    self.generation += 1;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn set_data_replaces_the_whole_chart() {
    let mut panel = ChartPanel::new("salesChart");
    panel.set_data(ChartSpec::sales_line(&DateSeries {
      labels: vec!["1/1/2024".to_string()],
      values: vec![150.0],
    }));
    panel.set_data(ChartSpec::sales_line(&DateSeries::default()));

    assert_eq!(panel.generation, 2);
    let spec = panel.spec.unwrap();
    assert!(spec.labels.is_empty());
    assert_eq!(spec.datasets[0].label.as_deref(), Some("Sales"));
  }

  #[test]
  fn doughnut_keeps_category_order() {
    let spec = ChartSpec::expense_doughnut(&[
      CategorySplit {
        category: "Rent".to_string(),
        amount: 1500.0,
      },
      CategorySplit {
        category: "Food".to_string(),
        amount: 200.0,
      },
    ]);
    assert_eq!(spec.kind, ChartKind::Doughnut);
    assert_eq!(spec.labels, vec!["Rent", "Food"]);
    assert_eq!(spec.datasets[0].data, vec![1500.0, 200.0]);
  }
}
