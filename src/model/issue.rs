use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// The input column that an `Issue::EmptyInput` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Date,
    Amount,
    Merchant,
}

serde_plain::derive_display_from_serialize!(Field);
serde_plain::derive_fromstr_from_deserialize!(Field);

/// A non-fatal annotation on a row indicating that a field could not be fully normalized.
///
/// Issues never abort the batch. The affected field degrades to `None` (or to a fallback value)
/// and the issue is recorded in the row's issue set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Issue {
    /// The field was missing, empty or whitespace-only.
    EmptyInput(Field),
    UnparseableDate,
    UnparseableAmount,
    /// A magnitude was parsed but the text carried no currency symbol, code or word.
    AmbiguousCurrency,
    /// The merchant only matched a known alias above the low fuzzy threshold.
    LowConfidenceMerchant,
    /// The merchant matched nothing, the canonical name is the cleaned raw text.
    UnmatchedMerchant,
    /// The currency has no entry in the rate table, so the row is excluded from totals.
    UnsupportedCurrency,
    /// The CSV record could not be read as a row.
    MalformedRow,
}

impl Issue {
    fn name(&self) -> &'static str {
        match self {
            Issue::EmptyInput(_) => "empty_input",
            Issue::UnparseableDate => "unparseable_date",
            Issue::UnparseableAmount => "unparseable_amount",
            Issue::AmbiguousCurrency => "ambiguous_currency",
            Issue::LowConfidenceMerchant => "low_confidence_merchant",
            Issue::UnmatchedMerchant => "unmatched_merchant",
            Issue::UnsupportedCurrency => "unsupported_currency",
            Issue::MalformedRow => "malformed_row",
        }
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Issue::EmptyInput(field) => write!(f, "{}:{field}", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

impl Serialize for Issue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Issue::EmptyInput(Field::Amount).to_string(), "empty_input:amount");
        assert_eq!(Issue::UnsupportedCurrency.to_string(), "unsupported_currency");
    }

    #[test]
    fn test_serialize_as_string() {
        let json = serde_json::to_string(&vec![
            Issue::AmbiguousCurrency,
            Issue::EmptyInput(Field::Date),
        ])
        .unwrap();
        assert_eq!(json, r#"["ambiguous_currency","empty_input:date"]"#);
    }
}
