//! Row-by-row normalization followed by aggregation.
//!
//! Every row is normalized on its own with read-only components, and every `RawTransaction`
//! produces exactly one `NormalizedTransaction`. Aggregation only starts once all rows are done.

use crate::categorize::Categorizer;
use crate::fx::CurrencyConverter;
use crate::model::{NormalizedTransaction, RawTransaction};
use crate::normalize::{AmountNormalizer, DateNormalizer, MerchantCanonicalizer, Rescore};
use crate::report::{aggregate, CategoryReport};
use crate::{utils, Config, Result};
use anyhow::Context;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// The normalizers, categorizer and converter, built once from `Config`.
#[derive(Debug, Clone)]
pub struct Pipeline {
    dates: DateNormalizer,
    amounts: AmountNormalizer,
    merchants: MerchantCanonicalizer,
    categorizer: Categorizer,
    converter: CurrencyConverter,
}

/// The output of `Pipeline::run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Processed {
    pub rows: Vec<NormalizedTransaction>,
    pub report: CategoryReport,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            dates: DateNormalizer::new(config.two_digit_year_pivot())?,
            amounts: AmountNormalizer::new(),
            merchants: MerchantCanonicalizer::new(config.merchants(), config.fuzzy()),
            categorizer: Categorizer::new(config.categories()),
            converter: CurrencyConverter::new(config.fx_rates().clone(), config.null_currency()),
        })
    }

    /// Installs a secondary merchant scorer for rows that do not match well on their own.
    pub fn with_rescorer(mut self, rescorer: Arc<dyn Rescore>) -> Self {
        self.merchants = self.merchants.with_rescorer(rescorer);
        self
    }

    /// Normalizes one row. Never fails: anything that could not be normalized is `None` and is
    /// explained by an entry in `issues`.
    pub fn normalize(&self, raw: &RawTransaction) -> NormalizedTransaction {
        let mut issues = BTreeSet::new();

        let date = match self.dates.normalize(&raw.date) {
            Ok(date) => Some(date),
            Err(issue) => {
                issues.insert(issue);
                None
            }
        };

        let parsed = self.amounts.normalize(&raw.amount);
        issues.extend(parsed.issues.iter().copied());
        if !parsed.repairs.is_empty() {
            debug!("Amount '{}' needed repairs {:?}", raw.amount, parsed.repairs);
        }

        let matched = self.merchants.canonicalize(&raw.merchant);
        issues.extend(matched.issues.iter().copied());
        let category = self.categorizer.categorize(&matched.canonical);

        let amount_usd = parsed.value.and_then(|value| {
            match self.converter.to_usd(value, parsed.currency.as_ref()) {
                Ok(usd) => Some(usd),
                Err(issue) => {
                    issues.insert(issue);
                    None
                }
            }
        });

        NormalizedTransaction {
            date,
            amount: parsed.value,
            currency: parsed.currency,
            merchant_canonical: matched.canonical,
            merchant_confidence: matched.confidence,
            category,
            amount_usd,
            issues,
        }
    }

    /// Normalizes every row, then aggregates.
    pub fn run(&self, rows: &[RawTransaction]) -> Processed {
        let normalized: Vec<NormalizedTransaction> =
            rows.iter().map(|raw| self.normalize(raw)).collect();
        log_issues(&normalized);
        let report = aggregate(&normalized);
        Processed {
            rows: normalized,
            report,
        }
    }
}

/// Issue counts and the affected rows, at debug level only.
fn log_issues(rows: &[NormalizedTransaction]) {
    let mut counts: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (ix, row) in rows.iter().enumerate() {
        for issue in &row.issues {
            counts.entry(issue.to_string()).or_default().push(ix + 1);
        }
    }
    for (issue, affected) in counts {
        debug!("{issue}: {} rows {affected:?}", affected.len());
    }
}

/// Columns appended after the original ones in the cleaned CSV.
const DERIVED_COLUMNS: [&str; 8] = [
    "date_iso",
    "amount_decimal",
    "currency",
    "merchant_canonical",
    "merchant_confidence",
    "category",
    "amount_usd",
    "issues",
];

fn derived_fields(row: &NormalizedTransaction) -> [String; 8] {
    [
        row.date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        row.amount.map(|a| a.to_string()).unwrap_or_default(),
        row.currency
            .as_ref()
            .map(|c| c.as_str().to_string())
            .unwrap_or_default(),
        row.merchant_canonical.clone(),
        row.merchant_confidence.to_string(),
        row.category.clone(),
        row.amount_usd.map(|a| a.to_string()).unwrap_or_default(),
        row.issues_text(),
    ]
}

/// Renders the cleaned dataset as CSV: every original column under its original header, then the
/// normalized columns. `raw` and `rows` must be index-aligned.
pub fn cleaned_csv(
    headers: &[String],
    raw: &[RawTransaction],
    rows: &[NormalizedTransaction],
) -> Result<Vec<u8>> {
    anyhow::ensure!(
        raw.len() == rows.len(),
        "Expected one normalized row per input row, got {} and {}",
        raw.len(),
        rows.len()
    );
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(headers.iter().map(String::as_str).chain(DERIVED_COLUMNS))
        .context("Unable to write the cleaned CSV header")?;
    for (raw, row) in raw.iter().zip(rows) {
        let original = (0..headers.len()).map(|ix| raw.fields.get(ix).map_or("", String::as_str));
        let derived = derived_fields(row);
        writer
            .write_record(original.chain(derived.iter().map(String::as_str)))
            .context("Unable to write a cleaned row")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish the cleaned CSV: {e}"))
}

/// Writes the cleaned dataset to `path`.
pub async fn write_cleaned(
    path: &Path,
    headers: &[String],
    raw: &[RawTransaction],
    rows: &[NormalizedTransaction],
) -> Result<()> {
    let data = cleaned_csv(headers, raw, rows)?;
    utils::write(path, data).await?;
    debug!("Wrote {} cleaned rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::NullCurrencyPolicy;
    use crate::model::{Confidence, Currency, Field, Issue};
    use crate::normalize::Candidate;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(&Config::default()).unwrap()
    }

    fn raw(date: &str, amount: &str, merchant: &str) -> RawTransaction {
        RawTransaction::new(date, amount, merchant, None)
    }

    #[test]
    fn test_end_to_end_five_rows() {
        let rows = [
            raw("2023-01-01", "$100.00", "UBER *TRIP"),
            raw("Jan 1st 23", "100", "Uber Technologies"),
            raw("01/01/2023", "€100", "Starbucks"),
            raw("2023-01-01", "$5.40", "STARBUCKS #4421"),
            raw("2023-01-01", "USD 12.00", "Shell Oil Co."),
        ];
        let processed = pipeline().run(&rows);
        assert_eq!(processed.rows.len(), rows.len());

        let jan_first = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        for row in &processed.rows[..3] {
            assert_eq!(row.date, Some(jan_first));
        }
        assert_eq!(processed.rows[0].merchant_canonical, "Uber");
        assert_eq!(processed.rows[1].merchant_canonical, "Uber");
        assert_eq!(processed.rows[0].category, "Transport");

        assert_eq!(processed.rows[1].currency, None);
        assert!(processed.rows[1].issues.contains(&Issue::AmbiguousCurrency));
        assert_eq!(processed.rows[1].amount_usd, Some(dec("100")));
        assert_eq!(processed.rows[2].amount_usd, Some(dec("108.00")));

        let report = &processed.report;
        let sum: Decimal = report.by_category.iter().map(|c| c.total_usd).sum();
        assert_eq!(sum, report.total_usd);
        assert_eq!(report.total_usd, dec("325.40"));
        assert_eq!(report.top_category.as_deref(), Some("Transport"));
        assert_eq!(report.top_amount, dec("200.00"));
    }

    #[test]
    fn test_bad_row_still_yields_a_row() {
        let p = pipeline();
        let row = p.normalize(&raw("", "abc", ""));
        assert_eq!(row.date, None);
        assert_eq!(row.amount, None);
        assert_eq!(row.amount_usd, None);
        assert_eq!(row.merchant_canonical, "");
        assert_eq!(row.merchant_confidence, Confidence::Unmatched);
        assert_eq!(row.category, "Uncategorized");
        assert_eq!(
            row.issues,
            BTreeSet::from([
                Issue::EmptyInput(Field::Date),
                Issue::EmptyInput(Field::Merchant),
                Issue::UnparseableAmount,
            ])
        );
    }

    #[test]
    fn test_unsupported_currency_is_kept_but_not_summed() {
        let processed = pipeline().run(&[
            raw("2023-02-01", "50 XYZ", "Target"),
            raw("2023-02-01", "$10", "Target"),
        ]);
        let row = &processed.rows[0];
        assert_eq!(row.amount, Some(dec("50")));
        assert_eq!(row.currency, Currency::new("XYZ"));
        assert_eq!(row.amount_usd, None);
        assert!(row.issues.contains(&Issue::UnsupportedCurrency));
        assert_eq!(processed.report.total_usd, dec("10"));
    }

    #[test]
    fn test_exclude_policy_leaves_bare_amounts_out() {
        let mut config = Config::default();
        config.config_file_mut().null_currency = NullCurrencyPolicy::Exclude;
        let p = Pipeline::new(&config).unwrap();
        let processed = p.run(&[raw("2023-02-01", "100", "Target"), raw("2023-02-01", "$7", "Uber")]);
        assert_eq!(processed.rows[0].amount_usd, None);
        assert_eq!(processed.report.top_category.as_deref(), Some("Transport"));
        assert_eq!(processed.report.total_usd, dec("7"));
    }

    #[test]
    fn test_pivot_comes_from_config() {
        let mut config = Config::default();
        config.config_file_mut().two_digit_year_pivot = 30;
        let p = Pipeline::new(&config).unwrap();
        let row = p.normalize(&raw("01/02/28", "$1", "Uber"));
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2028, 1, 2));
    }

    #[derive(Debug)]
    struct AlwaysLyft;

    impl Rescore for AlwaysLyft {
        fn rescore(&self, _cleaned: &str, _canonicals: &[&str]) -> Option<Candidate> {
            Some(Candidate {
                canonical: "Lyft".to_string(),
                similarity: 99,
            })
        }
    }

    #[test]
    fn test_rescorer_feeds_category() {
        let p = pipeline().with_rescorer(Arc::new(AlwaysLyft));
        let row = p.normalize(&raw("2023-01-01", "$3", "Rideshare 42"));
        assert_eq!(row.merchant_canonical, "Lyft");
        assert_eq!(row.merchant_confidence, Confidence::FuzzyHigh);
        assert_eq!(row.category, "Transport");
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_cleaned_csv() {
        let rows = [
            RawTransaction::new("Jan 1st 23", "€9,99", "UBER *TRIP", Some("airport".to_string())),
            raw("bogus", "", "Some Random Vendor 999"),
        ];
        let p = pipeline();
        let normalized: Vec<_> = rows.iter().map(|r| p.normalize(r)).collect();
        let headers = headers(&["date", "amount", "merchant", "notes"]);
        let text = String::from_utf8(cleaned_csv(&headers, &rows, &normalized).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "date,amount,merchant,notes,date_iso,amount_decimal,currency,merchant_canonical,\
             merchant_confidence,category,amount_usd,issues"
        );
        assert_eq!(
            lines[1],
            "Jan 1st 23,\"€9,99\",UBER *TRIP,airport,2023-01-01,9.99,EUR,Uber,exact,Transport,10.79,"
        );
        assert_eq!(
            lines[2],
            "bogus,,Some Random Vendor 999,,,,,Some Random Vendor,unmatched,Uncategorized,,\
             empty_input:amount;unparseable_date;unmatched_merchant"
        );
    }

    #[test]
    fn test_cleaned_csv_keeps_original_columns() {
        let headers = headers(&["id", "Payee", "Amount", "Date", "account"]);
        let rows = [RawTransaction::new("2023-01-01", "$5", "Starbucks", None).with_fields(vec![
            "7".to_string(),
            "Starbucks".to_string(),
            "$5".to_string(),
            "2023-01-01".to_string(),
            "checking".to_string(),
        ])];
        let p = pipeline();
        let normalized: Vec<_> = rows.iter().map(|r| p.normalize(r)).collect();
        let text = String::from_utf8(cleaned_csv(&headers, &rows, &normalized).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "id,Payee,Amount,Date,account,date_iso,amount_decimal,currency,merchant_canonical,\
             merchant_confidence,category,amount_usd,issues"
        );
        assert_eq!(
            lines[1],
            "7,Starbucks,$5,2023-01-01,checking,2023-01-01,5,USD,Starbucks,exact,Food,5,"
        );
    }

    #[test]
    fn test_cleaned_csv_requires_aligned_rows() {
        let rows = [raw("2023-01-01", "$1", "Uber")];
        let headers = headers(&["date", "amount", "merchant"]);
        assert!(cleaned_csv(&headers, &rows, &[]).is_err());
    }

    #[test]
    fn test_overflowing_amounts_do_not_abort_the_run() {
        let huge = "$50000000000000000000000000000";
        let processed = pipeline().run(&[
            raw("2023-01-01", huge, "Uber"),
            raw("2023-01-01", huge, "Uber"),
            raw("2023-01-01", "$5", "Starbucks"),
        ]);
        assert_eq!(processed.rows.len(), 3);
        assert_eq!(processed.rows[1].amount_usd, Some(dec("50000000000000000000000000000")));
        let report = &processed.report;
        assert_eq!(report.top_category.as_deref(), Some("Transport"));
        assert_eq!(report.top_amount, dec("50000000000000000000000000000"));
        assert_eq!(report.total_usd, dec("50000000000000000000000000005"));
    }
}
