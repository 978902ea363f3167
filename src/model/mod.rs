//! Types that represent the core data model, such as `RawTransaction` and `NormalizedTransaction`.
mod amount;
mod currency;
mod issue;
mod transaction;

pub use amount::Amount;
pub use currency::{Currency, CurrencyError};
pub use issue::{Field, Issue};
pub use transaction::{Confidence, NormalizedTransaction, RawTransaction};
