//! Free-form date parsing with a fixed month-first policy.
//!
//! Ambiguous numeric dates such as `01/03/89` always resolve month-first, and two-digit years are
//! expanded with a fixed pivot rather than relative to today, so the same input yields the same
//! date on every run.

use crate::model::{Field, Issue};
use crate::Result;
use chrono::{DateTime, Datelike, NaiveDate};
use regex::Regex;

/// Two-digit years `00..=25` become `2000..=2025`, `26..=99` become `1926..=1999`.
pub const DEFAULT_PIVOT: u32 = 25;

/// Years the strict parser accepts start here; anything lower was not written with four digits.
const MIN_FOUR_DIGIT_YEAR: i32 = 1000;

/// Formats tried by the strict fallback parser, after ordinals and time-of-day were removed.
const STRICT_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y%m%d",
];

const MONTHS: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Words that may appear in a date without carrying any information.
const FILLER: &[&str] = &["of", "the", "on"];

/// Converts date strings into calendar dates.
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    pivot: u32,
    ordinal: Regex,
    time: Regex,
    token: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// A run of digits and how many digits were written.
    Num(u32, usize),
    /// An apostrophe year such as `'99`.
    ShortYear(u32),
    Month(u32),
}

impl DateNormalizer {
    /// Creates a normalizer with the given two-digit-year pivot (values above 99 are clamped).
    pub fn new(pivot: u32) -> Result<Self> {
        Ok(Self {
            pivot: pivot.min(99),
            ordinal: Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b")?,
            time: Regex::new(concat!(
                r"(?i)(?:t|\s+|,\s*)\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?\s*",
                r"(?:[ap]\.?m\.?)?\s*(?:z|utc|gmt|[+-]\d{2}(?::?\d{2})?)?\s*$"
            ))?,
            token: Regex::new(r"(?P<short>['’]\d{2}\b)|(?P<word>[A-Za-z]+)|(?P<num>\d+)")?,
        })
    }

    pub fn pivot(&self) -> u32 {
        self.pivot
    }

    /// Parses `raw` into a calendar date.
    ///
    /// Returns `Issue::EmptyInput` for blank input and `Issue::UnparseableDate` when neither the
    /// tolerant nor the strict parser can make sense of it. Any time of day or UTC offset is
    /// discarded without converting between zones.
    pub fn normalize(&self, raw: &str) -> std::result::Result<NaiveDate, Issue> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Issue::EmptyInput(Field::Date));
        }
        let without_ordinals = self.ordinal.replace_all(trimmed, "$1");
        let cleaned = self.time.replace(&without_ordinals, "");
        let cleaned = cleaned.trim();

        self.parse_tolerant(cleaned)
            .or_else(|| parse_strict(trimmed, cleaned))
            .ok_or(Issue::UnparseableDate)
    }

    /// Expands a two-digit year with the pivot rule.
    pub fn expand_year(&self, two_digit: u32) -> i32 {
        let yy = (two_digit % 100) as i32;
        if two_digit % 100 <= self.pivot {
            2000 + yy
        } else {
            1900 + yy
        }
    }

    fn tokenize(&self, s: &str) -> Option<Vec<Token>> {
        let mut tokens = Vec::new();
        for caps in self.token.captures_iter(s) {
            if let Some(short) = caps.name("short") {
                let digits: String = short.as_str().chars().skip(1).collect();
                tokens.push(Token::ShortYear(digits.parse().ok()?));
            } else if let Some(word) = caps.name("word") {
                let word = word.as_str().to_ascii_lowercase();
                if let Some(month) = month_number(&word) {
                    tokens.push(Token::Month(month));
                } else if !is_weekday(&word) && !FILLER.contains(&word.as_str()) {
                    return None;
                }
            } else if let Some(num) = caps.name("num") {
                let digits = num.as_str();
                if digits.len() > 8 {
                    return None;
                }
                tokens.push(Token::Num(digits.parse().ok()?, digits.len()));
            }
        }
        Some(tokens)
    }

    /// The tolerant parser: understands month names, ordinals, apostrophe years and any
    /// separator between the parts.
    fn parse_tolerant(&self, s: &str) -> Option<NaiveDate> {
        let tokens = self.tokenize(s)?;
        let mut month = None;
        let mut nums = Vec::new();
        let mut short_year = None;
        for token in tokens {
            match token {
                Token::Month(m) => {
                    if month.replace(m).is_some() {
                        return None;
                    }
                }
                Token::ShortYear(y) => {
                    if short_year.replace(y).is_some() {
                        return None;
                    }
                }
                Token::Num(value, width) => nums.push((value, width)),
            }
        }

        let (year, month, day) = match month {
            Some(month) => self.resolve_named_month(month, &nums, short_year)?,
            None if short_year.is_some() => return None,
            None => self.resolve_numeric(&nums)?,
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn resolve_named_month(
        &self,
        month: u32,
        nums: &[(u32, usize)],
        short_year: Option<u32>,
    ) -> Option<(i32, u32, u32)> {
        match (nums, short_year) {
            ([(day, day_width)], Some(yy)) if *day_width <= 2 => {
                Some((self.expand_year(yy), month, *day))
            }
            ([(a, a_width), (b, b_width)], None) => {
                if *b_width == 4 && *a_width <= 2 {
                    Some((*b as i32, month, *a))
                } else if *a_width == 4 && *b_width <= 2 {
                    Some((*a as i32, month, *b))
                } else if *a_width <= 2 && *b_width == 2 {
                    Some((self.expand_year(*b), month, *a))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn resolve_numeric(&self, nums: &[(u32, usize)]) -> Option<(i32, u32, u32)> {
        match nums {
            [(compact, 8)] => Some((
                (compact / 10_000) as i32,
                (compact / 100) % 100,
                compact % 100,
            )),
            [(y, 4), (m, m_width), (d, d_width)] if *m_width <= 2 && *d_width <= 2 => {
                Some((*y as i32, *m, *d))
            }
            [(a, a_width), (b, b_width), (c, c_width)]
                if *a_width <= 2 && *b_width <= 2 && (*c_width == 4 || *c_width <= 2) =>
            {
                // month first, unless the first part can only be a day
                let (month, day) = if *a > 12 && *b <= 12 { (*b, *a) } else { (*a, *b) };
                let year = if *c_width == 4 {
                    *c as i32
                } else {
                    self.expand_year(*c)
                };
                Some((year, month, day))
            }
            _ => None,
        }
    }
}

/// The strict fallback: a fixed list of chrono formats, then RFC 3339 and RFC 2822 timestamps.
///
/// chrono's `%Y` also takes one to three digits, so a year below 1000 is rejected here instead of
/// turning `1/2/3` into the year 1.
fn parse_strict(original: &str, cleaned: &str) -> Option<NaiveDate> {
    STRICT_FORMATS
        .iter()
        .find_map(|format| {
            NaiveDate::parse_from_str(cleaned, format)
                .ok()
                .filter(|date| date.year() >= MIN_FOUR_DIGIT_YEAR)
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(original)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            DateTime::parse_from_rfc2822(original)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Accepts full month names and any prefix of at least three letters, plus `sept`.
fn month_number(word: &str) -> Option<u32> {
    if word.len() < 3 {
        return None;
    }
    if word == "sept" {
        return Some(9);
    }
    MONTHS
        .iter()
        .position(|name| name.starts_with(word))
        .map(|ix| ix as u32 + 1)
}

fn is_weekday(word: &str) -> bool {
    word.len() >= 3 && WEEKDAYS.iter().any(|name| name.starts_with(word))
        || matches!(word, "tues" | "thur" | "thurs")
}
