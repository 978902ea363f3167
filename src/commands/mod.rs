//! Command handlers for the finparse CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod init;
mod run;

use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use std::io::Write;
use tracing::debug;

pub use init::init;
pub use run::{run, RunSummary};

/// The output type for a command. The message is what the user sees, the structure carries the
/// same outcome as data for debugging and tests.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Writes the message to stdout, outside the log filter, and the structured data (if it
    /// exists) as JSON to `debug!`.
    pub fn print(&self) -> Result<()> {
        self.write_message(&mut std::io::stdout().lock())?;
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
        Ok(())
    }

    fn write_message(&self, out: &mut impl Write) -> Result<()> {
        writeln!(out, "{}", self.message).context("Unable to write the command output")?;
        out.flush().context("Unable to flush the command output")?;
        Ok(())
    }
}
