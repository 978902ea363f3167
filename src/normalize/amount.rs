//! Currency-aware parsing of free-form amount text into exact `Decimal` values.
//!
//! No floating point is involved at any stage: the text is reduced to a plain ASCII decimal
//! literal and handed to `Decimal::from_str`.

use crate::model::{Currency, Field, Issue};
use crate::normalize::fold;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::trace;

/// Currency symbols, longest first so that `US$` wins over `$`.
const SYMBOLS: &[(&str, &str)] = &[
    ("US$", "USD"),
    ("CA$", "CAD"),
    ("AU$", "AUD"),
    ("NZ$", "NZD"),
    ("HK$", "HKD"),
    ("MX$", "MXN"),
    ("C$", "CAD"),
    ("A$", "AUD"),
    ("S$", "SGD"),
    ("R$", "BRL"),
    ("zł", "PLN"),
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("₹", "INR"),
    ("₽", "RUB"),
    ("₩", "KRW"),
    ("₺", "TRY"),
    ("฿", "THB"),
    ("₦", "NGN"),
    ("₫", "VND"),
    ("₴", "UAH"),
    ("₪", "ILS"),
    ("₱", "PHP"),
    ("₡", "CRC"),
    ("₲", "PYG"),
    ("₵", "GHS"),
    ("₸", "KZT"),
    ("₭", "LAK"),
    ("₮", "MNT"),
    ("₼", "AZN"),
    ("₾", "GEL"),
    ("₿", "BTC"),
];

/// Currency words, checked before treating a three letter word as a code (`rmb` is a word).
const WORDS: &[(&str, &str)] = &[
    ("dollars", "USD"),
    ("dollar", "USD"),
    ("bucks", "USD"),
    ("euros", "EUR"),
    ("euro", "EUR"),
    ("pounds", "GBP"),
    ("pound", "GBP"),
    ("sterling", "GBP"),
    ("quid", "GBP"),
    ("yen", "JPY"),
    ("rupees", "INR"),
    ("rupee", "INR"),
    ("yuan", "CNY"),
    ("renminbi", "CNY"),
    ("rmb", "CNY"),
    ("francs", "CHF"),
    ("franc", "CHF"),
    ("rubles", "RUB"),
    ("ruble", "RUB"),
    ("roubles", "RUB"),
    ("rouble", "RUB"),
    ("won", "KRW"),
    ("lira", "TRY"),
    ("pesos", "MXN"),
    ("peso", "MXN"),
    ("baht", "THB"),
    ("naira", "NGN"),
    ("shekels", "ILS"),
    ("shekel", "ILS"),
];

/// Minus-like characters that are folded to `-`.
const MINUS_VARIANTS: &[char] = &['\u{2212}', '\u{2013}', '\u{2014}', '\u{FE63}'];

/// Space characters commonly used as thousands separators.
const GROUPING_SPACES: &[char] = &['\u{00A0}', '\u{2007}', '\u{2009}', '\u{202F}'];

/// A non-fatal repair that was needed to read the number. These are diagnostic detail only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountRepair {
    UnicodeDigitsConverted,
    NormalizedDecimalSeparators,
    NormalizedSpace,
    RemovedApostropheGrouping,
    RepairedMultipleDots,
}

serde_plain::derive_display_from_serialize!(AmountRepair);

/// The outcome of parsing one amount string.
///
/// When the text does not reduce to a number, both `value` and `currency` are `None`. A number
/// without any currency marker has `currency: None` and carries `Issue::AmbiguousCurrency`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAmount {
    pub value: Option<Decimal>,
    pub currency: Option<Currency>,
    pub issues: BTreeSet<Issue>,
    pub repairs: BTreeSet<AmountRepair>,
}

impl ParsedAmount {
    fn failed(issue: Issue) -> Self {
        Self {
            issues: BTreeSet::from([issue]),
            ..Self::default()
        }
    }
}

/// Parses amount text such as `$1,234.56`, `(50.00)`, `1.234,56 €` or `12 dollars`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountNormalizer;

impl AmountNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, raw: &str) -> ParsedAmount {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return ParsedAmount::failed(Issue::EmptyInput(Field::Amount));
        }

        let mut repairs = BTreeSet::new();
        let folded = fold(trimmed);
        if folded.digits {
            repairs.insert(AmountRepair::UnicodeDigitsConverted);
        }
        if folded.separators {
            repairs.insert(AmountRepair::NormalizedDecimalSeparators);
        }
        let mut text = folded.text.replace(MINUS_VARIANTS, "-").replace('’', "'");
        if text.contains(GROUPING_SPACES) {
            repairs.insert(AmountRepair::NormalizedSpace);
            text = text.replace(GROUPING_SPACES, " ");
        }

        let Some((negative, currency, core)) = peel(text.trim()) else {
            trace!("No number could be isolated in amount '{raw}'");
            return ParsedAmount::failed(Issue::UnparseableAmount);
        };
        let Some(magnitude) = parse_number(core, &mut repairs) else {
            trace!("Amount core '{core}' of '{raw}' is not a decimal number");
            return ParsedAmount::failed(Issue::UnparseableAmount);
        };

        let value = if negative { -magnitude } else { magnitude };
        let mut issues = BTreeSet::new();
        if currency.is_none() {
            issues.insert(Issue::AmbiguousCurrency);
        }
        ParsedAmount {
            value: Some(value),
            currency,
            issues,
            repairs,
        }
    }
}

/// Strips signs, parentheses and currency markers from both ends of `s` until only the numeric
/// core is left. Returns `None` when two different currencies are present.
fn peel(mut s: &str) -> Option<(bool, Option<Currency>, &str)> {
    let mut negative = false;
    let mut currency: Option<Currency> = None;
    let mut set_currency = |found: Currency| -> Option<()> {
        match &currency {
            Some(existing) if *existing != found => None,
            _ => {
                currency = Some(found);
                Some(())
            }
        }
    };

    loop {
        let before = s.len();
        if s.len() >= 2 && s.starts_with('(') && s.ends_with(')') {
            negative = true;
            s = s[1..s.len() - 1].trim();
        }
        if let Some(rest) = s.strip_prefix('-') {
            negative = true;
            s = rest.trim_start();
        } else if let Some(rest) = s.strip_prefix('+') {
            s = rest.trim_start();
        }
        if let Some(rest) = s.strip_suffix('-') {
            negative = true;
            s = rest.trim_end();
        }
        if let Some((found, rest)) = leading_currency(s) {
            set_currency(found)?;
            s = rest.trim_start();
        }
        if let Some((found, rest)) = trailing_currency(s) {
            set_currency(found)?;
            s = rest.trim_end();
        }
        if s.len() == before {
            break;
        }
    }
    Some((negative, currency, s))
}

fn leading_currency(s: &str) -> Option<(Currency, &str)> {
    for (symbol, code) in SYMBOLS {
        if let Some(rest) = strip_prefix_ignore_case(s, symbol) {
            return Some((Currency::new(code)?, rest));
        }
    }
    let letters = s.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    let (word, rest) = s.split_at(letters);
    Some((currency_word(word)?, rest))
}

fn trailing_currency(s: &str) -> Option<(Currency, &str)> {
    for (symbol, code) in SYMBOLS {
        if let Some(rest) = strip_suffix_ignore_case(s, symbol) {
            return Some((Currency::new(code)?, rest));
        }
    }
    let letters = s.chars().rev().take_while(|c| c.is_ascii_alphabetic()).count();
    let (rest, word) = s.split_at(s.len() - letters);
    Some((currency_word(word)?, rest))
}

/// Resolves a currency word (`dollars`) or a bare three letter code (`jpy`).
fn currency_word(word: &str) -> Option<Currency> {
    if word.is_empty() {
        return None;
    }
    let lower = word.to_ascii_lowercase();
    if let Some((_, code)) = WORDS.iter().find(|(w, _)| *w == lower) {
        return Currency::new(code);
    }
    Currency::new(word)
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let n = prefix.len();
    if s.len() >= n && s.is_char_boundary(n) && s[..n].eq_ignore_ascii_case(prefix) {
        Some(&s[n..])
    } else {
        None
    }
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let n = suffix.len();
    if s.len() >= n && s.is_char_boundary(s.len() - n) && s[s.len() - n..].eq_ignore_ascii_case(suffix)
    {
        Some(&s[..s.len() - n])
    } else {
        None
    }
}

/// Reduces the numeric core (digits plus `.`, `,`, `'` and space) to a decimal literal.
fn parse_number(core: &str, repairs: &mut BTreeSet<AmountRepair>) -> Option<Decimal> {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '.' | ',' | '\'' | ' ');
    if !core.chars().all(allowed) || !core.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut digits = core.to_string();
    if digits.contains(' ') {
        if !is_thousands_grouped(&digits, ' ') {
            return None;
        }
        digits.retain(|c| c != ' ');
    }
    if digits.contains('\'') {
        if !is_thousands_grouped(&digits, '\'') {
            return None;
        }
        repairs.insert(AmountRepair::RemovedApostropheGrouping);
        digits.retain(|c| c != '\'');
    }

    let dots = digits.matches('.').count();
    let commas = digits.matches(',').count();
    let literal = match (dots, commas) {
        (0, 0) | (1, 0) => digits,
        (_, 0) => {
            let groups: Vec<&str> = digits.split('.').collect();
            if groups.iter().any(|g| g.is_empty()) {
                return None;
            }
            if groups[1..].iter().all(|g| g.len() == 3) {
                groups.concat()
            } else {
                repairs.insert(AmountRepair::RepairedMultipleDots);
                let (last, init) = groups.split_last()?;
                format!("{}.{last}", init.concat())
            }
        }
        (0, 1) => {
            let (int_part, frac_part) = digits.split_once(',')?;
            if int_part.is_empty() || frac_part.is_empty() {
                return None;
            }
            if frac_part.len() == 3 {
                format!("{int_part}{frac_part}")
            } else {
                repairs.insert(AmountRepair::NormalizedDecimalSeparators);
                format!("{int_part}.{frac_part}")
            }
        }
        (0, _) => {
            let groups: Vec<&str> = digits.split(',').collect();
            let last_len = groups.last().map(|g| g.len()).unwrap_or_default();
            if groups.iter().any(|g| g.is_empty()) || last_len != 3 {
                return None;
            }
            groups.concat()
        }
        _ => {
            // whichever separator comes last is the decimal point
            let last_dot = digits.rfind('.')?;
            let last_comma = digits.rfind(',')?;
            let (decimal, separator, decimal_count) = if last_comma > last_dot {
                (',', '.', commas)
            } else {
                ('.', ',', dots)
            };
            if decimal_count != 1 {
                return None;
            }
            let (int_part, frac_part) = digits.split_once(decimal)?;
            if frac_part.is_empty() || !groups_are_filled(int_part, separator) {
                return None;
            }
            if decimal == ',' {
                repairs.insert(AmountRepair::NormalizedDecimalSeparators);
            }
            digits
                .chars()
                .filter(|c| *c != separator)
                .map(|c| if c == decimal { '.' } else { c })
                .collect()
        }
    };

    Decimal::from_str(&literal).ok()
}

/// True when `separator` splits the integer part of `s` into thousands: one to three leading
/// digits, then groups of exactly three. The decimal part may follow the last group.
fn is_thousands_grouped(s: &str, separator: char) -> bool {
    let mut groups = s.split(separator);
    let first_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.chars().all(|c| c.is_ascii_digit()));
    let mut rest = groups.peekable();
    if !first_ok || rest.peek().is_none() {
        return false;
    }
    while let Some(group) = rest.next() {
        let lead = group.chars().take_while(|c| c.is_ascii_digit()).count();
        let ok = if rest.peek().is_some() {
            group.len() == 3 && lead == 3
        } else {
            lead == 3
        };
        if !ok {
            return false;
        }
    }
    true
}

/// True when every group between `separator`s contains at least one character.
fn groups_are_filled(s: &str, separator: char) -> bool {
    s.split(separator).all(|g| !g.is_empty())
}
