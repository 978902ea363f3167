//! Merchant-name canonicalization by exact and fuzzy alias matching.
//!
//! Raw merchant strings are cleaned into a comparison key, looked up exactly in the alias table,
//! and otherwise scored against every known alias. An optional `Rescore` capability may promote
//! rows that only reached `fuzzy_low` or `unmatched`.

use crate::model::{Confidence, Field, Issue};
use crate::normalize::fold;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, trace};

/// Characters that separate words in a merchant string.
const SEPARATORS: &[char] = &[
    '*', '.', '-', '/', '\\', '_', ',', ':', ';', '|', '#', '(', ')', '[', ']', '"', '+', '=', '~',
    '!', '?',
];

/// Corporate suffixes dropped from the comparison key (never from the first word).
const SUFFIXES: &[&str] = &["INC", "LLC", "LTD", "CORP", "CORPORATION", "CO", "COMPANY", "COM"];

/// Token ratios only count when the shared words add up to at least this many characters.
const MIN_SHARED_CHARS: usize = 4;

/// A mapping from canonical merchant name to the set of known alias strings.
///
/// The canonical name is always treated as an alias of itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable(BTreeMap<String, BTreeSet<String>>);

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `aliases` to `canonical`, creating the entry if needed.
    pub fn insert<S, I>(&mut self, canonical: impl Into<String>, aliases: I)
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        self.0
            .entry(canonical.into())
            .or_default()
            .extend(aliases.into_iter().map(Into::into));
    }

    /// Builder-style `insert`.
    pub fn with<S, I>(mut self, canonical: impl Into<String>, aliases: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        self.insert(canonical, aliases);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The merchants known out of the box.
    pub fn builtin() -> Self {
        Self::new()
            .with(
                "Uber",
                [
                    "UBER",
                    "UBER *TRIP",
                    "UBER TRIP",
                    "UBER TECHNOLOGIES",
                    "UBER BV",
                    "UBER RIDES",
                ],
            )
            .with("Uber Eats", ["UBER EATS", "UBER*EATS", "UBEREATS"])
            .with("Lyft", ["LYFT", "LYFT RIDE"])
            .with(
                "Amazon",
                [
                    "AMAZON",
                    "AMAZON.COM",
                    "AMZN",
                    "AMZN MKTP US",
                    "AMAZON MKTP US",
                    "AMAZON MKTPLACE PMTS",
                    "AMAZON MARKETPLACE",
                    "AMZN PRIME",
                    "AMAZON PRIME",
                ],
            )
            .with(
                "Walmart",
                [
                    "WALMART",
                    "WAL-MART",
                    "WALMART SUPERCENTER",
                    "WAL-MART SUPERCENTER",
                    "WALMART SUPER CTR",
                    "WM SUPERCENTER",
                ],
            )
            .with("Target", ["TARGET", "TGT", "TARGET STORE", "TARGET.COM"])
            .with("Starbucks", ["STARBUCKS", "STARBUCKS COFFEE", "SBUX"])
            .with(
                "Shell",
                ["SHELL", "SHELL OIL", "SHELL OIL CO", "SHELL SERVICE STATION"],
            )
            .with("ExxonMobil", ["EXXON", "EXXONMOBIL", "EXXON MOBIL"])
            .with(
                "Whole Foods",
                [
                    "WHOLE FOODS",
                    "WHOLE FOODS MARKET",
                    "WHOLEFDS",
                    "WHOLEFDS MKT",
                    "WHOLEFDS MRKT",
                ],
            )
            .with("Spotify", ["SPOTIFY", "SPOTIFY USA", "SPOTIFY PREMIUM"])
            .with("Netflix", ["NETFLIX", "NETFLIX.COM"])
            .with("Chipotle", ["CHIPOTLE", "CHIPOTLE MEXICAN GRILL"])
            .with("McDonald's", ["MCDONALDS", "MCDONALD'S"])
            .with("CVS", ["CVS", "CVS PHARMACY", "CVS/PHARMACY"])
            .with("Staples", ["STAPLES"])
            .with("Corner Store", ["CORNER STORE"])
            .with("Neighborhood Grocery", ["NEIGHBORHOOD GROCERY"])
    }
}

/// Score thresholds (0..=100) for the fuzzy confidence tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyThresholds {
    /// At or above this a fuzzy match is `fuzzy_high`.
    pub high: u8,
    /// At or above this (and below `high`) a fuzzy match is `fuzzy_low`.
    pub low: u8,
}

impl Default for FuzzyThresholds {
    fn default() -> Self {
        Self { high: 85, low: 70 }
    }
}

/// A proposal from a `Rescore` implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub canonical: String,
    /// Similarity on the same 0..=100 scale as the fuzzy thresholds.
    pub similarity: u8,
}

/// A secondary scorer (for example embedding similarity) consulted only for rows that did not
/// reach `fuzzy_high` on their own.
pub trait Rescore: Debug + Send + Sync {
    /// Proposes one of `canonicals` for the cleaned merchant text, or `None`.
    fn rescore(&self, cleaned: &str, canonicals: &[&str]) -> Option<Candidate>;
}

/// The default `Rescore`: never proposes anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRescore;

impl Rescore for NoRescore {
    fn rescore(&self, _cleaned: &str, _canonicals: &[&str]) -> Option<Candidate> {
        None
    }
}

/// The result of canonicalizing one merchant string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantMatch {
    pub canonical: String,
    pub confidence: Confidence,
    /// 100 for exact matches, the best fuzzy score otherwise.
    pub score: u8,
    pub issues: BTreeSet<Issue>,
}

/// A cleaned merchant string.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Cleaned {
    /// Human readable: separators and store numbers removed, original case kept.
    display: String,
    /// Uppercase words without corporate suffixes, joined by single spaces.
    key: String,
    /// `key` without spaces.
    compact: String,
}

/// Maps raw merchant strings to canonical merchant names.
#[derive(Debug, Clone)]
pub struct MerchantCanonicalizer {
    /// comparison key -> canonical name
    keys: BTreeMap<String, String>,
    /// compact comparison key -> canonical name
    compact: BTreeMap<String, String>,
    canonicals: Vec<String>,
    thresholds: FuzzyThresholds,
    rescorer: Arc<dyn Rescore>,
}

impl MerchantCanonicalizer {
    pub fn new(table: &AliasTable, thresholds: FuzzyThresholds) -> Self {
        let mut keys = BTreeMap::new();
        let mut compact = BTreeMap::new();
        for (canonical, aliases) in table.iter() {
            for alias in std::iter::once(canonical).chain(aliases.iter().map(String::as_str)) {
                let cleaned = clean(alias);
                if cleaned.key.is_empty() {
                    continue;
                }
                if let Some(existing) = keys.get(&cleaned.key) {
                    if existing != canonical {
                        debug!(
                            "Alias '{alias}' of '{canonical}' is already claimed by '{existing}'"
                        );
                    }
                    continue;
                }
                keys.insert(cleaned.key, canonical.to_string());
                compact
                    .entry(cleaned.compact)
                    .or_insert_with(|| canonical.to_string());
            }
        }
        Self {
            keys,
            compact,
            canonicals: table.iter().map(|(c, _)| c.to_string()).collect(),
            thresholds,
            rescorer: Arc::new(NoRescore),
        }
    }

    /// Installs a secondary scorer for low-confidence rows.
    pub fn with_rescorer(mut self, rescorer: Arc<dyn Rescore>) -> Self {
        self.rescorer = rescorer;
        self
    }

    pub fn thresholds(&self) -> FuzzyThresholds {
        self.thresholds
    }

    pub fn canonicalize(&self, raw: &str) -> MerchantMatch {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return MerchantMatch {
                canonical: String::new(),
                confidence: Confidence::Unmatched,
                score: 0,
                issues: BTreeSet::from([Issue::EmptyInput(Field::Merchant)]),
            };
        }

        let cleaned = clean(trimmed);
        if cleaned.key.is_empty() {
            return unmatched(trimmed.to_string(), 0);
        }

        if let Some(canonical) = self
            .keys
            .get(&cleaned.key)
            .or_else(|| self.compact.get(&cleaned.compact))
        {
            trace!("'{raw}' is an exact alias of '{canonical}'");
            return MerchantMatch {
                canonical: canonical.clone(),
                confidence: Confidence::Exact,
                score: 100,
                issues: BTreeSet::new(),
            };
        }

        let best = self.best_fuzzy(&cleaned.key);
        let fuzzy = match best {
            Some((canonical, score)) if score >= self.thresholds.high => {
                debug!("'{raw}' fuzzy matched '{canonical}' with score {score}");
                return MerchantMatch {
                    canonical: canonical.to_string(),
                    confidence: Confidence::FuzzyHigh,
                    score,
                    issues: BTreeSet::new(),
                };
            }
            Some((canonical, score)) if score >= self.thresholds.low => {
                debug!("'{raw}' weakly matched '{canonical}' with score {score}");
                MerchantMatch {
                    canonical: canonical.to_string(),
                    confidence: Confidence::FuzzyLow,
                    score,
                    issues: BTreeSet::from([Issue::LowConfidenceMerchant]),
                }
            }
            Some((_, score)) => unmatched(cleaned.display.clone(), score),
            None => unmatched(cleaned.display.clone(), 0),
        };

        self.promote(&cleaned, fuzzy)
    }

    /// Gives the rescorer a chance to lift a `fuzzy_low` or `unmatched` result to `fuzzy_high`.
    fn promote(&self, cleaned: &Cleaned, current: MerchantMatch) -> MerchantMatch {
        let canonicals: Vec<&str> = self.canonicals.iter().map(String::as_str).collect();
        match self.rescorer.rescore(&cleaned.display, &canonicals) {
            Some(candidate)
                if candidate.similarity >= self.thresholds.high
                    && self.canonicals.contains(&candidate.canonical) =>
            {
                debug!(
                    "Rescoring promoted '{}' to '{}' ({})",
                    cleaned.display, candidate.canonical, candidate.similarity
                );
                MerchantMatch {
                    canonical: candidate.canonical,
                    confidence: Confidence::FuzzyHigh,
                    score: candidate.similarity,
                    issues: BTreeSet::new(),
                }
            }
            _ => current,
        }
    }

    /// The best scoring canonical name. Ties go to the higher plain ratio, then to the
    /// alphabetically first canonical name.
    fn best_fuzzy(&self, key: &str) -> Option<(&str, u8)> {
        let mut best: Option<(&str, u8, u8)> = None;
        for (alias_key, canonical) in &self.keys {
            let plain = ratio(key, alias_key);
            let score = similarity(key, alias_key);
            let better = match best {
                None => true,
                Some((best_canonical, best_score, best_plain)) => {
                    match (score, plain).cmp(&(best_score, best_plain)) {
                        Ordering::Greater => true,
                        Ordering::Equal => canonical.as_str() < best_canonical,
                        Ordering::Less => false,
                    }
                }
            };
            if better {
                best = Some((canonical.as_str(), score, plain));
            }
        }
        best.map(|(canonical, score, _)| (canonical, score))
    }
}

fn unmatched(canonical: String, score: u8) -> MerchantMatch {
    MerchantMatch {
        canonical,
        confidence: Confidence::Unmatched,
        score,
        issues: BTreeSet::from([Issue::UnmatchedMerchant]),
    }
}

/// Cleans a merchant string: folds full-width characters, drops apostrophes, splits on
/// separators and removes store numbers (numeric words after the first word).
fn clean(raw: &str) -> Cleaned {
    let folded = fold(raw).text.replace(['\'', '’'], "");
    let words: Vec<&str> = folded
        .split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .filter(|w| !w.is_empty())
        .enumerate()
        .filter(|(ix, w)| *ix == 0 || !w.chars().all(|c| c.is_ascii_digit()))
        .map(|(_, w)| w)
        .collect();

    let display = words.join(" ");
    let upper: Vec<String> = words.iter().map(|w| w.to_uppercase()).collect();
    let key_words: Vec<&str> = upper
        .iter()
        .enumerate()
        .filter(|(ix, w)| *ix == 0 || !SUFFIXES.contains(&w.as_str()))
        .map(|(_, w)| w.as_str())
        .collect();
    let key = key_words.join(" ");
    let compact = key_words.concat();
    Cleaned {
        display,
        key,
        compact,
    }
}

/// Levenshtein distance over chars, using two rows instead of the full matrix.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1) // deletion
                .min(current[j] + 1) // insertion
                .min(previous[j] + cost); // substitution
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// `100 * (1 - distance / longest)`, rounded down.
fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 100;
    }
    let distance = levenshtein(&a, &b);
    (100 * (longest - distance) / longest) as u8
}

fn sorted_words(s: &str) -> Vec<&str> {
    let mut words: Vec<&str> = s.split_whitespace().collect();
    words.sort_unstable();
    words
}

fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_words(a).join(" "), &sorted_words(b).join(" "))
}

/// Compares the shared words against each side's shared-plus-remaining words, so that
/// `STARBUCKS RESERVE` scores high against `STARBUCKS`.
fn token_set_ratio(a: &str, b: &str) -> u8 {
    let a: BTreeSet<&str> = a.split_whitespace().collect();
    let b: BTreeSet<&str> = b.split_whitespace().collect();
    let shared: Vec<&str> = a.intersection(&b).copied().collect();
    if shared.iter().map(|w| w.len()).sum::<usize>() < MIN_SHARED_CHARS {
        return 0;
    }
    let only_a: Vec<&str> = a.difference(&b).copied().collect();
    let only_b: Vec<&str> = b.difference(&a).copied().collect();

    let base = shared.join(" ");
    let with = |rest: &[&str]| {
        if rest.is_empty() {
            base.clone()
        } else {
            format!("{base} {}", rest.join(" "))
        }
    };
    let left = with(&only_a);
    let right = with(&only_b);
    ratio(&base, &left)
        .max(ratio(&base, &right))
        .max(ratio(&left, &right))
}

/// The fuzzy score: the plain ratio, or a word-order-insensitive ratio scaled by 0.95.
fn similarity(a: &str, b: &str) -> u8 {
    let plain = ratio(a, b);
    let tokens = token_sort_ratio(a, b).max(token_set_ratio(a, b));
    plain.max((u32::from(tokens) * 95 / 100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonicalizer() -> MerchantCanonicalizer {
        MerchantCanonicalizer::new(&AliasTable::builtin(), FuzzyThresholds::default())
    }

    fn canonical(raw: &str) -> String {
        canonicalizer().canonicalize(raw).canonical
    }

    #[test]
    fn test_uber_variants_converge() {
        let c = canonicalizer();
        let trip = c.canonicalize("UBER *TRIP");
        let tech = c.canonicalize("Uber Technologies");
        assert_eq!(trip.canonical, "Uber");
        assert_eq!(tech.canonical, "Uber");
        for m in [&trip, &tech] {
            assert!(matches!(
                m.confidence,
                Confidence::Exact | Confidence::FuzzyHigh
            ));
        }
    }

    #[test]
    fn test_uber_eats_is_a_different_merchant() {
        let c = canonicalizer();
        assert_eq!(c.canonicalize("UBER EATS").canonical, "Uber Eats");
        assert_eq!(c.canonicalize("Uber*Eats").canonical, "Uber Eats");
        assert_ne!(
            c.canonicalize("UBER EATS").canonical,
            c.canonicalize("UBER *TRIP").canonical
        );
    }

    #[test]
    fn test_exact_matches() {
        let cases = [
            ("Uber", "Uber"),
            ("WALMART #1234", "Walmart"),
            ("WAL-MART SUPERCENTER 3301 ", "Walmart"),
            ("Walmart Super Ctr", "Walmart"),
            ("SHELL OIL CO.", "Shell"),
            ("Corner.Store", "Corner Store"),
            ("Neighborhood Grocery #22", "Neighborhood Grocery"),
            ("TARGET #112", "Target"),
            ("TGT 445", "Target"),
            ("Target Store #112 ", "Target"),
            ("Aｍａｚｏｎ MKTPLACE PMTS", "Amazon"),
            ("Amazon.Com ", "Amazon"),
            ("AMAZON Mktp US", "Amazon"),
            ("A M A Z O N", "Amazon"),
            ("SPOTIFY  USA", "Spotify"),
            ("CHIPOTLE #221", "Chipotle"),
            ("EXXONMOBIL 44543354", "ExxonMobil"),
            ("EXXON MOBIL ", "ExxonMobil"),
            ("WHOLEFDS MRKT 10203", "Whole Foods"),
            ("STARBUCKS #4421", "Starbucks"),
            ("McDonald's", "McDonald's"),
        ];
        let c = canonicalizer();
        for (raw, expected) in cases {
            let m = c.canonicalize(raw);
            assert_eq!(m.canonical, expected, "{raw}");
            assert_eq!(m.confidence, Confidence::Exact, "{raw}");
            assert_eq!(m.score, 100, "{raw}");
            assert!(m.issues.is_empty(), "{raw}");
        }
    }

    #[test]
    fn test_fuzzy_typo_matches_amazon() {
        let m = canonicalizer().canonicalize("AMZN Mkt US");
        assert_eq!(m.canonical, "Amazon");
        assert_eq!(m.confidence, Confidence::FuzzyHigh);
        assert!(m.score >= 85);
    }

    #[test]
    fn test_fuzzy_extra_words() {
        let m = canonicalizer().canonicalize("Starbucks Reserve Roastery");
        assert_eq!(m.canonical, "Starbucks");
        assert_eq!(m.confidence, Confidence::FuzzyHigh);
    }

    #[test]
    fn test_unknown_merchant_falls_back_to_cleaned_text() {
        let m = canonicalizer().canonicalize("Some Random Vendor 999");
        assert_eq!(m.canonical, "Some Random Vendor");
        assert_eq!(m.confidence, Confidence::Unmatched);
        assert!(m.score < 70);
        assert_eq!(m.issues, BTreeSet::from([Issue::UnmatchedMerchant]));
    }

    #[test]
    fn test_low_confidence_is_flagged() {
        let table = AliasTable::new().with("Starbucks", ["STARBUCKS"]);
        let thresholds = FuzzyThresholds { high: 95, low: 70 };
        let m = MerchantCanonicalizer::new(&table, thresholds).canonicalize("STARBUKS");
        assert_eq!(m.canonical, "Starbucks");
        assert_eq!(m.confidence, Confidence::FuzzyLow);
        assert_eq!(m.score, 88);
        assert_eq!(m.issues, BTreeSet::from([Issue::LowConfidenceMerchant]));
    }

    #[test]
    fn test_empty_merchant() {
        let m = canonicalizer().canonicalize("   ");
        assert_eq!(m.canonical, "");
        assert_eq!(m.confidence, Confidence::Unmatched);
        assert_eq!(m.issues, BTreeSet::from([Issue::EmptyInput(Field::Merchant)]));
    }

    #[test]
    fn test_punctuation_only_merchant_keeps_raw_text() {
        let m = canonicalizer().canonicalize("***");
        assert_eq!(m.canonical, "***");
        assert_eq!(m.confidence, Confidence::Unmatched);
    }

    #[test]
    fn test_idempotent() {
        let c = canonicalizer();
        for raw in ["UBER *TRIP", "AMZN Mkt US", "Some Random Vendor 999"] {
            let first = c.canonicalize(raw).canonical;
            let second = c.canonicalize(&first).canonical;
            assert_eq!(first, second, "{raw}");
        }
    }

    #[derive(Debug)]
    struct FixedRescore(&'static str, u8);

    impl Rescore for FixedRescore {
        fn rescore(&self, _cleaned: &str, canonicals: &[&str]) -> Option<Candidate> {
            canonicals.contains(&self.0).then(|| Candidate {
                canonical: self.0.to_string(),
                similarity: self.1,
            })
        }
    }

    #[test]
    fn test_rescore_promotes_unmatched() {
        let c = canonicalizer().with_rescorer(Arc::new(FixedRescore("Lyft", 90)));
        let m = c.canonicalize("Rideshare Co Ride 42");
        assert_eq!(m.canonical, "Lyft");
        assert_eq!(m.confidence, Confidence::FuzzyHigh);
        assert!(m.issues.is_empty());
    }

    #[test]
    fn test_rescore_never_touches_exact_or_high() {
        let c = canonicalizer().with_rescorer(Arc::new(FixedRescore("Lyft", 100)));
        assert_eq!(c.canonicalize("UBER *TRIP").canonical, "Uber");
        assert_eq!(c.canonicalize("AMZN Mkt US").canonical, "Amazon");
    }

    #[test]
    fn test_rescore_below_threshold_is_ignored() {
        let c = canonicalizer().with_rescorer(Arc::new(FixedRescore("Lyft", 50)));
        let m = c.canonicalize("Some Random Vendor");
        assert_eq!(m.confidence, Confidence::Unmatched);
        assert_eq!(m.canonical, "Some Random Vendor");
    }

    #[test]
    fn test_clean() {
        let cleaned = clean("UBER   *TRIP 12345");
        assert_eq!(cleaned.display, "UBER TRIP");
        assert_eq!(cleaned.key, "UBER TRIP");
        assert_eq!(cleaned.compact, "UBERTRIP");

        let cleaned = clean("Shell Oil Co.");
        assert_eq!(cleaned.display, "Shell Oil Co");
        assert_eq!(cleaned.key, "SHELL OIL");

        let cleaned = clean("7-Eleven #3321");
        assert_eq!(cleaned.key, "7 ELEVEN");
    }

    #[test]
    fn test_levenshtein() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(levenshtein(&chars(""), &chars("")), 0);
        assert_eq!(levenshtein(&chars("abc"), &chars("")), 3);
        assert_eq!(levenshtein(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(levenshtein(&chars("starbucks"), &chars("starbuck")), 1);
    }

    #[test]
    fn test_ratios() {
        assert_eq!(ratio("AMAZON", "AMAZON"), 100);
        assert_eq!(ratio("AMZN MKT US", "AMZN MKTP US"), 91);
        assert_eq!(token_sort_ratio("MARKET WHOLE FOODS", "WHOLE FOODS MARKET"), 100);
        assert_eq!(token_set_ratio("STARBUCKS RESERVE", "STARBUCKS"), 100);
        // too little shared text to count
        assert_eq!(token_set_ratio("US", "AMZN MKTP US"), 0);
        assert_eq!(similarity("STARBUCKS RESERVE", "STARBUCKS"), 95);
    }

    #[test]
    fn test_canonical_examples_helper() {
        assert_eq!(canonical("Chipotle Mexican Grill "), "Chipotle");
    }
}
