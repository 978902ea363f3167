//! Conversion of normalized amounts to USD with a fixed rate table.

use crate::model::{Currency, Issue};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// What to do with an amount that carried no currency marker.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullCurrencyPolicy {
    /// Treat the amount as USD at conversion time. The row keeps its `ambiguous_currency` issue.
    #[default]
    AssumeUsd,
    /// Leave `amount_usd` empty so the row stays out of the report.
    Exclude,
}

serde_plain::derive_display_from_serialize!(NullCurrencyPolicy);
serde_plain::derive_fromstr_from_deserialize!(NullCurrencyPolicy);

/// Units of USD per one unit of each currency. USD itself is implicit.
///
/// Rates serialize as strings (`"1.08"`) so that they stay exact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FxRateTable(BTreeMap<Currency, Decimal>);

impl FxRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, currency: Currency, rate: Decimal) {
        self.0.insert(currency, rate);
    }

    pub fn rate(&self, currency: &Currency) -> Option<Decimal> {
        if currency.is_usd() {
            return Some(Decimal::ONE);
        }
        self.0.get(currency).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The fixed rates used when no configuration overrides them.
    pub fn builtin() -> Self {
        let rates = [
            ("EUR", "1.08"),
            ("GBP", "1.25"),
            ("JPY", "0.007"),
            ("INR", "0.012"),
            ("CAD", "0.74"),
            ("AUD", "0.66"),
            ("CHF", "1.12"),
            ("CNY", "0.14"),
            ("ETH", "1800"),
        ];
        Self(
            rates
                .into_iter()
                .filter_map(|(code, rate)| {
                    Some((Currency::new(code)?, Decimal::from_str(rate).ok()?))
                })
                .collect(),
        )
    }
}

/// Converts amounts to USD.
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    rates: FxRateTable,
    policy: NullCurrencyPolicy,
}

impl CurrencyConverter {
    pub fn new(rates: FxRateTable, policy: NullCurrencyPolicy) -> Self {
        Self { rates, policy }
    }

    /// Converts `amount` to USD.
    ///
    /// USD amounts (and, under `AssumeUsd`, amounts with no currency) come back unchanged. Other
    /// known currencies are multiplied by their rate and rounded to cents, half away from zero.
    /// Unknown currencies give `Issue::UnsupportedCurrency`; a missing currency under `Exclude`
    /// gives `Issue::AmbiguousCurrency`.
    pub fn to_usd(&self, amount: Decimal, currency: Option<&Currency>) -> Result<Decimal, Issue> {
        let Some(currency) = currency else {
            return match self.policy {
                NullCurrencyPolicy::AssumeUsd => Ok(amount),
                NullCurrencyPolicy::Exclude => Err(Issue::AmbiguousCurrency),
            };
        };
        if currency.is_usd() {
            return Ok(amount);
        }
        let rate = self.rates.rate(currency).ok_or(Issue::UnsupportedCurrency)?;
        amount
            .checked_mul(rate)
            .map(|usd| usd.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
            .ok_or(Issue::UnsupportedCurrency)
    }
}
