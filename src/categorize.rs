//! Maps canonical merchant names to spending categories.
//!
//! An exact lookup by canonical name wins. Otherwise the ordered keyword rules are tried against
//! the merchant text, and the first rule with a matching keyword decides the category.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// The category of any merchant that no table entry or rule recognizes.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Keywords of this many characters or fewer only match a whole word (`ATM`, `CVS`, `BP`).
const SHORT_KEYWORD: usize = 3;

/// A category and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub category: String,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new<S, I>(category: impl Into<String>, keywords: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Self {
            category: category.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// Reference data for the `Categorizer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    /// Canonical merchant name (case-sensitive) -> category.
    pub exact: BTreeMap<String, String>,
    /// Tried in order when `exact` has no entry.
    pub keyword_rules: Vec<KeywordRule>,
}

impl CategoryTable {
    /// Categories for the built-in merchants, plus keyword rules for everything else. Brand
    /// specific rules come before generic ones, and the generic `MARKET` / `GROCERY` come last.
    pub fn builtin() -> Self {
        let exact = [
            ("Uber", "Transport"),
            ("Lyft", "Transport"),
            ("Uber Eats", "Food"),
            ("Starbucks", "Food"),
            ("Chipotle", "Food"),
            ("McDonald's", "Food"),
            ("Netflix", "Entertainment"),
            ("Spotify", "Subscription"),
            ("Shell", "Fuel"),
            ("ExxonMobil", "Fuel"),
            ("CVS", "Healthcare"),
            ("Staples", "Office"),
            ("Amazon", "Shopping"),
            ("Target", "Shopping"),
            ("Walmart", "Groceries"),
            ("Whole Foods", "Groceries"),
            ("Neighborhood Grocery", "Groceries"),
            ("Corner Store", "Groceries"),
        ]
        .into_iter()
        .map(|(merchant, category)| (merchant.to_string(), category.to_string()))
        .collect();

        let keyword_rules = vec![
            KeywordRule::new(
                "Transport",
                ["UBER", "LYFT", "TAXI", "CAB", "TRANSIT", "METRO", "AMTRAK", "AIRLINES", "PARKING"],
            ),
            KeywordRule::new(
                "Food",
                [
                    "STARBUCKS",
                    "COFFEE",
                    "CAFE",
                    "BAKERY",
                    "BOULANGERIE",
                    "RESTAURANT",
                    "CHIPOTLE",
                    "MCDONALD",
                    "PIZZA",
                    "BURGER",
                    "DOORDASH",
                    "GRUBHUB",
                ],
            ),
            KeywordRule::new("Entertainment", ["NETFLIX", "HULU", "CINEMA", "THEATER", "THEATRE"]),
            KeywordRule::new("Subscription", ["SPOTIFY", "SUBSCRIPTION", "MEMBERSHIP"]),
            KeywordRule::new(
                "Fuel",
                ["SHELL", "EXXON", "CHEVRON", "TEXACO", "CITGO", "GAS STATION", "FUEL", "BP"],
            ),
            KeywordRule::new(
                "Healthcare",
                ["CVS", "PHARMACY", "WALGREENS", "CLINIC", "HOSPITAL", "DENTAL", "MEDICAL"],
            ),
            KeywordRule::new("Office", ["STAPLES", "OFFICE DEPOT", "OFFICE SUPPLIES"]),
            KeywordRule::new("Housing", ["LANDLORD", "MONTHLY RENT", "APARTMENT", "MORTGAGE", "LEASE"]),
            KeywordRule::new("Cash", ["ATM", "WITHDRAWAL"]),
            KeywordRule::new(
                "Shopping",
                ["AMAZON", "AMZN", "TARGET", "EBAY", "ETSY", "BEST BUY", "IKEA", "MARKETPLACE"],
            ),
            KeywordRule::new(
                "Groceries",
                [
                    "WALMART",
                    "WAL MART",
                    "WHOLE FOODS",
                    "KROGER",
                    "SAFEWAY",
                    "TRADER JOE",
                    "COSTCO",
                    "SUPERMARKET",
                    "GROCERY",
                    "MARKET",
                ],
            ),
        ];

        Self {
            exact,
            keyword_rules,
        }
    }
}

/// A keyword prepared for matching.
#[derive(Debug, Clone)]
struct Keyword {
    text: String,
    whole_word: bool,
}

/// Assigns a category to a canonical merchant name.
#[derive(Debug, Clone)]
pub struct Categorizer {
    exact: BTreeMap<String, String>,
    rules: Vec<(String, Vec<Keyword>)>,
}

impl Categorizer {
    pub fn new(table: &CategoryTable) -> Self {
        let rules = table
            .keyword_rules
            .iter()
            .map(|rule| {
                let keywords = rule
                    .keywords
                    .iter()
                    .map(|k| words(k))
                    .filter(|k| !k.is_empty())
                    .map(|text| Keyword {
                        whole_word: text.len() <= SHORT_KEYWORD,
                        text,
                    })
                    .collect();
                (rule.category.clone(), keywords)
            })
            .collect();
        Self {
            exact: table.exact.clone(),
            rules,
        }
    }

    /// The category for `merchant`, or `UNCATEGORIZED`.
    pub fn categorize(&self, merchant: &str) -> String {
        if let Some(category) = self.exact.get(merchant.trim()) {
            return category.clone();
        }
        let text = words(merchant);
        if text.is_empty() {
            return UNCATEGORIZED.to_string();
        }
        let tokens: Vec<&str> = text.split(' ').collect();
        for (category, keywords) in &self.rules {
            let hit = keywords.iter().find(|k| {
                if k.whole_word {
                    tokens.contains(&k.text.as_str())
                } else {
                    text.contains(&k.text)
                }
            });
            if let Some(keyword) = hit {
                trace!("'{merchant}' is {category} by keyword {}", keyword.text);
                return category.clone();
            }
        }
        UNCATEGORIZED.to_string()
    }
}

/// Uppercases `s` and reduces every run of non-alphanumeric characters to one space.
fn words(s: &str) -> String {
    s.to_uppercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
