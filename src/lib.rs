//! finparse turns an inconsistent CSV of financial transactions into a normalized dataset and a
//! top-spending-category report.
//!
//! Each row goes through the date, amount and merchant normalizers independently, is categorized
//! by its canonical merchant and converted to USD with a fixed rate table. Rows are never dropped
//! for bad values: what could not be normalized is `None` and listed in the row's issues.

pub mod args;
pub mod categorize;
pub mod commands;
mod config;
mod error;
pub mod fx;
pub mod ingest;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod report;
mod utils;


pub use config::Config;
pub use error::Error;
pub use error::Result;
