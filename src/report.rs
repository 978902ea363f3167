//! Aggregation of converted amounts into the top-spending-category report.

use crate::model::{Amount, NormalizedTransaction};
use crate::{utils, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Places kept for `pct` in the JSON report.
const PCT_PLACES: u32 = 4;

/// The USD total of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total_usd: Decimal,
    /// Share of the report total; zero when the report total is zero.
    pub pct: Decimal,
}

/// Per-category totals, ordered by total descending and then by category name.
///
/// `by_category` never holds a zero total and its totals always add up to `total_usd`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryReport {
    pub by_category: Vec<CategoryTotal>,
    pub top_category: Option<String>,
    pub top_amount: Decimal,
    pub total_usd: Decimal,
}

/// Groups the rows that have an `amount_usd` by category and ranks the categories.
///
/// Rows without `amount_usd` are left out, as is any row whose amount would overflow its category
/// total or the report total. With nothing to sum the report is empty and `top_category` is
/// `None`.
pub fn aggregate(rows: &[NormalizedTransaction]) -> CategoryReport {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    let mut total_usd = Decimal::ZERO;
    let mut summed = 0usize;
    for (ix, row) in rows.iter().enumerate() {
        let Some(usd) = row.amount_usd else {
            continue;
        };
        let category = totals.get(row.category.as_str()).copied().unwrap_or_default();
        match (category.checked_add(usd), total_usd.checked_add(usd)) {
            (Some(category_total), Some(report_total)) => {
                totals.insert(row.category.as_str(), category_total);
                total_usd = report_total;
                summed += 1;
            }
            _ => warn!(
                "Row {} ({usd} USD in {}) overflows the totals and is left out of the report",
                ix + 1,
                row.category
            ),
        }
    }
    debug!("Aggregating {summed} of {} rows", rows.len());

    let mut ranked: Vec<(&str, Decimal)> = totals
        .into_iter()
        .filter(|(_, total)| !total.is_zero())
        .collect();
    // stable sort over name-ordered input keeps the alphabetical tie-break
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let by_category: Vec<CategoryTotal> = ranked
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total_usd: total,
            pct: if total_usd.is_zero() {
                Decimal::ZERO
            } else {
                total.checked_div(total_usd).unwrap_or_default()
            },
        })
        .collect();

    let (top_category, top_amount) = match by_category.first() {
        Some(top) => (Some(top.category.clone()), top.total_usd),
        None => (None, Decimal::ZERO),
    };

    CategoryReport {
        by_category,
        top_category,
        top_amount,
        total_usd,
    }
}

impl CategoryReport {
    /// The JSON document written to the report file.
    pub fn to_json(&self) -> ReportJson {
        ReportJson {
            top_category: self.top_category.clone(),
            amount: Amount::new(self.top_amount),
            top_amount: to_number(self.top_amount, 2),
            by_category: self
                .by_category
                .iter()
                .map(|c| CategoryJson {
                    category: c.category.clone(),
                    amount: Amount::new(c.total_usd),
                    pct: to_number(c.pct, PCT_PLACES),
                })
                .collect(),
            total_usd: Amount::new(self.total_usd),
        }
    }

    /// Writes the report as pretty JSON to `path`.
    pub async fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.to_json())?;
        utils::write(path, json).await?;
        debug!("Wrote report to {}", path.display());
        Ok(())
    }
}

/// The report file layout. Money is shown formatted (`$1,234.56`); `top_amount` and `pct` are
/// plain JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportJson {
    pub top_category: Option<String>,
    pub amount: Amount,
    pub top_amount: f64,
    pub by_category: Vec<CategoryJson>,
    pub total_usd: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryJson {
    pub category: String,
    pub amount: Amount,
    pub pct: f64,
}

/// Rounds before leaving `Decimal` so that the JSON number is the rounded value.
fn to_number(value: Decimal, places: u32) -> f64 {
    value
        .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(category: &str, usd: Option<&str>) -> NormalizedTransaction {
        NormalizedTransaction {
            category: category.to_string(),
            amount_usd: usd.map(dec),
            ..NormalizedTransaction::default()
        }
    }

    #[test]
    fn test_empty_input() {
        let report = aggregate(&[]);
        assert!(report.by_category.is_empty());
        assert_eq!(report.top_category, None);
        assert_eq!(report.top_amount, Decimal::ZERO);
        assert_eq!(report.total_usd, Decimal::ZERO);
    }

    #[test]
    fn test_rows_without_usd_are_excluded() {
        let report = aggregate(&[row("Food", None), row("Fuel", None)]);
        assert!(report.by_category.is_empty());
        assert_eq!(report.top_category, None);
    }

    #[test]
    fn test_totals_and_ranking() {
        let rows = [
            row("Food", Some("5.40")),
            row("Transport", Some("100.00")),
            row("Food", Some("4.60")),
            row("Transport", Some("108.00")),
            row("Fuel", Some("45.000")),
            row("Fuel", None),
        ];
        let report = aggregate(&rows);
        let names: Vec<&str> = report
            .by_category
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(names, ["Transport", "Fuel", "Food"]);
        assert_eq!(report.top_category.as_deref(), Some("Transport"));
        assert_eq!(report.top_amount, dec("208.00"));
        assert_eq!(report.total_usd, dec("263.00"));
        let sum: Decimal = report.by_category.iter().map(|c| c.total_usd).sum();
        assert_eq!(sum, report.total_usd);
        let pct: Decimal = report.by_category.iter().map(|c| c.pct).sum();
        assert!((pct - Decimal::ONE).abs() < dec("0.000000001"));
    }

    #[test]
    fn test_tie_break_is_alphabetical() {
        for _ in 0..3 {
            let report = aggregate(&[row("Beta", Some("10.00")), row("Alpha", Some("10.00"))]);
            assert_eq!(report.top_category.as_deref(), Some("Alpha"));
            assert_eq!(report.by_category[1].category, "Beta");
            assert_eq!(report.by_category[0].pct, dec("0.5"));
        }
    }

    #[test]
    fn test_zero_total_categories_are_dropped() {
        let rows = [
            row("Shopping", Some("20.00")),
            row("Shopping", Some("-20.00")),
            row("Food", Some("3.00")),
        ];
        let report = aggregate(&rows);
        assert_eq!(report.by_category.len(), 1);
        assert_eq!(report.top_category.as_deref(), Some("Food"));
        assert_eq!(report.total_usd, dec("3.00"));
    }

    #[test]
    fn test_overflowing_rows_are_left_out() {
        let huge = "50000000000000000000000000000";
        let rows = [
            row("Transport", Some(huge)),
            row("Transport", Some(huge)),
            row("Shopping", Some(huge)),
            row("Food", Some("3")),
        ];
        let report = aggregate(&rows);
        assert_eq!(report.top_category.as_deref(), Some("Transport"));
        assert_eq!(report.top_amount, dec(huge));
        // the second Transport row and the Shopping row would overflow
        assert_eq!(report.by_category.len(), 2);
        assert_eq!(report.total_usd, dec("50000000000000000000000000003"));
        let sum: Decimal = report.by_category.iter().map(|c| c.total_usd).sum();
        assert_eq!(sum, report.total_usd);
    }

    #[test]
    fn test_zero_total_report() {
        let report = aggregate(&[row("Food", Some("0.00"))]);
        assert!(report.by_category.is_empty());
        assert_eq!(report.top_category, None);
    }

    #[test]
    fn test_json_layout() {
        let rows = [row("Transport", Some("1234.5")), row("Food", Some("765.5"))];
        let json = serde_json::to_value(aggregate(&rows).to_json()).unwrap();
        assert_eq!(json["top_category"], "Transport");
        assert_eq!(json["amount"], "$1,234.50");
        assert_eq!(json["top_amount"], 1234.5);
        assert_eq!(json["total_usd"], "$2,000.00");
        assert_eq!(json["by_category"][0]["category"], "Transport");
        assert_eq!(json["by_category"][0]["amount"], "$1,234.50");
        assert_eq!(json["by_category"][0]["pct"], 0.6173);
        assert_eq!(json["by_category"][1]["pct"], 0.3828);
    }

    #[test]
    fn test_json_for_empty_report() {
        let json = serde_json::to_value(aggregate(&[]).to_json()).unwrap();
        assert!(json["top_category"].is_null());
        assert_eq!(json["amount"], "$0.00");
        assert_eq!(json["total_usd"], "$0.00");
        assert_eq!(json["by_category"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        aggregate(&[row("Food", Some("5.00"))])
            .write(&path)
            .await
            .unwrap();
        let text = tokio::fs::read_to_string(&path).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["top_category"], "Food");
        assert_eq!(json["by_category"][0]["pct"], 1.0);
    }
}
