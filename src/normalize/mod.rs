//! The per-row normalizers: dates, amounts and merchant names.
//!
//! Each normalizer is built once from configuration and is then used read-only for every row. None
//! of them ever fails a row: problems are reported as `Issue` values.

mod amount;
mod date;
mod merchant;

pub use amount::{AmountNormalizer, AmountRepair, ParsedAmount};
pub use date::{DateNormalizer, DEFAULT_PIVOT};
pub use merchant::{
    AliasTable, Candidate, FuzzyThresholds, MerchantCanonicalizer, MerchantMatch, NoRescore,
    Rescore,
};

/// The result of folding compatibility characters to ASCII.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Folded {
    pub(crate) text: String,
    /// Non-ASCII digits (full-width, Arabic-Indic, ...) were replaced.
    pub(crate) digits: bool,
    /// Non-ASCII decimal or grouping separators were replaced.
    pub(crate) separators: bool,
}

/// Folds full-width ASCII variants, the ideographic space and the common non-Latin digit blocks
/// down to plain ASCII. Everything else passes through untouched.
pub(crate) fn fold(s: &str) -> Folded {
    let mut folded = Folded {
        text: String::with_capacity(s.len()),
        ..Folded::default()
    };
    for c in s.chars() {
        let code = c as u32;
        let out = match code {
            // full-width digits
            0xFF10..=0xFF19 => {
                folded.digits = true;
                char::from_u32(code - 0xFF10 + '0' as u32)
            }
            // full-width '.' and ','
            0xFF0E | 0xFF0C => {
                folded.separators = true;
                char::from_u32(code - 0xFEE0)
            }
            // the rest of the full-width ASCII block
            0xFF01..=0xFF5E => char::from_u32(code - 0xFEE0),
            0x3000 => Some(' '),
            // Arabic-Indic and Extended Arabic-Indic digits
            0x0660..=0x0669 => {
                folded.digits = true;
                char::from_u32(code - 0x0660 + '0' as u32)
            }
            0x06F0..=0x06F9 => {
                folded.digits = true;
                char::from_u32(code - 0x06F0 + '0' as u32)
            }
            // Devanagari digits
            0x0966..=0x096F => {
                folded.digits = true;
                char::from_u32(code - 0x0966 + '0' as u32)
            }
            // Arabic decimal and thousands separators
            0x066B => {
                folded.separators = true;
                Some('.')
            }
            0x066C => {
                folded.separators = true;
                Some(',')
            }
            _ => Some(c),
        };
        folded.text.push(out.unwrap_or(c));
    }
    folded
}
