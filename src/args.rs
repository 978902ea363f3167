//! These structs provide the CLI interface for the finparse CLI.

use crate::config::CONFIG_JSON;
use crate::model::Currency;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// finparse: normalize a messy transactions CSV and report the top spending category.
///
/// Dates in any common format become ISO dates, amounts become exact decimals with a currency,
/// and merchant spellings are matched to one canonical name. Every input row produces one output
/// row; anything that could not be normalized is listed in that row's issues.
#[derive(Debug, Parser, Clone)]
#[command(name = "finparse", version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Normalize an input CSV, print a summary and optionally write the report and cleaned CSV.
    Run(RunArgs),
    /// Write the default configuration file so that the merchant, category and FX tables can be
    /// edited.
    Init(InitArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, global = true, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// Log debug detail (issue counts, skipped rows, fuzzy scores). Same as --log-level debug.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// The configuration file. Defaults to <config dir>/finparse/config.json. The built-in
    /// settings are used when the file does not exist.
    #[arg(long, global = true, env = "FINPARSE_CONFIG", default_value_t = default_config_path())]
    config: DisplayPath,
}

impl Common {
    /// The effective level: `--verbose` raises it to at least debug.
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            self.log_level.max(LevelFilter::DEBUG)
        } else {
            self.log_level
        }
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn config(&self) -> &DisplayPath {
        &self.config
    }
}

/// Args for the `finparse run` command.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// The CSV to read. It needs `date`, `amount` and `merchant` columns (`description` or
    /// `payee` also work for `merchant`) and may have a `notes` column.
    #[arg(long, short)]
    input: PathBuf,

    /// Where to write the top-spending-category report as JSON.
    #[arg(long, short)]
    report: Option<PathBuf>,

    /// Where to write the cleaned CSV.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// How many normalized rows to show after the summary.
    #[arg(long, short, default_value_t = 3)]
    preview: usize,

    /// Only read the first N data rows.
    #[arg(long, short)]
    sample: Option<usize>,

    /// A currency to show next to amounts that have none, e.g. `12.00 (USD?)`. This only affects
    /// the preview, never the normalized data or the report.
    #[arg(long)]
    default_currency: Option<Currency>,
}

impl RunArgs {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            report: None,
            output: None,
            preview: 3,
            sample: None,
            default_currency: None,
        }
    }

    pub fn with_report(mut self, report: impl Into<PathBuf>) -> Self {
        self.report = Some(report.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_preview(mut self, preview: usize) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_sample(mut self, sample: usize) -> Self {
        self.sample = Some(sample);
        self
    }

    pub fn with_default_currency(mut self, currency: Currency) -> Self {
        self.default_currency = Some(currency);
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn report(&self) -> Option<&Path> {
        self.report.as_deref()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn preview(&self) -> usize {
        self.preview
    }

    pub fn sample(&self) -> Option<usize> {
        self.sample
    }

    pub fn default_currency(&self) -> Option<&Currency> {
        self.default_currency.as_ref()
    }
}

/// Args for the `finparse init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

impl InitArgs {
    pub fn force(&self) -> bool {
        self.force
    }
}

fn default_config_path() -> DisplayPath {
    DisplayPath(match dirs::config_dir() {
        Some(dir) => dir.join(env!("CARGO_PKG_NAME")).join(CONFIG_JSON),
        None => {
            error!(
                "There was an error when trying to get your config directory. You can get around \
                this by providing --config or FINPARSE_CONFIG. Until then the config file is \
                looked for in the current directory.",
            );
            PathBuf::from(CONFIG_JSON)
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
