use crate::model::{Currency, Issue};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One row as it was read from the input CSV. This is the source of truth and is never mutated.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub date: String,
    pub amount: String,
    pub merchant: String,
    pub notes: Option<String>,
    /// Every field of the record, one per input header, in file order.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl RawTransaction {
    /// A row whose record is just `date, amount, merchant, notes`.
    pub fn new(
        date: impl Into<String>,
        amount: impl Into<String>,
        merchant: impl Into<String>,
        notes: Option<String>,
    ) -> Self {
        let date = date.into();
        let amount = amount.into();
        let merchant = merchant.into();
        let fields = vec![
            date.clone(),
            amount.clone(),
            merchant.clone(),
            notes.clone().unwrap_or_default(),
        ];
        Self {
            date,
            amount,
            merchant,
            notes,
            fields,
        }
    }

    /// Replaces the full record, for rows read from a file with other columns.
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }
}

/// How certain a merchant match is.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// The cleaned merchant is a known alias (or the canonical name itself).
    Exact,
    /// Fuzzy match at or above the high threshold.
    FuzzyHigh,
    /// Fuzzy match at or above the low threshold only.
    FuzzyLow,
    /// Nothing matched well enough.
    #[default]
    Unmatched,
}

serde_plain::derive_display_from_serialize!(Confidence);
serde_plain::derive_fromstr_from_deserialize!(Confidence);

/// The normalized form of exactly one `RawTransaction`.
///
/// Fields that could not be normalized are `None` and the reason is in `issues`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct NormalizedTransaction {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
    pub merchant_canonical: String,
    pub merchant_confidence: Confidence,
    pub category: String,
    /// `None` when the amount is missing or could not be converted. Such rows are excluded from
    /// report totals.
    pub amount_usd: Option<Decimal>,
    pub issues: BTreeSet<Issue>,
}

impl NormalizedTransaction {
    /// The `issues` set rendered for a single CSV cell, e.g. `ambiguous_currency;unmatched_merchant`.
    pub fn issues_text(&self) -> String {
        self.issues
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(";")
    }
}
