// /////////////////////////////////////////////////////////////////////////////
// Claim Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Command-line interface: clap parsing plus a thin validation pass that
//! rejects path-traversal and shell-metacharacter patterns in any argument
//! that ends up as part of a filesystem path (mailbox subfolder, archive
//! virtual path).
//!
//! ```text
//! Cli::parse() -> Cli -> validate() -> PipelineCommand
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use claim_engine::presentation::PipelineCommand;

/// Patterns that have no legitimate place in a mailbox subfolder name or an
/// archive virtual path.
const DANGEROUS_PATTERNS: &[&str] = &["..", "\0", "\n", "\r"];

#[derive(Debug, Error)]
pub enum CliError {
    #[error("argument '{arg}' contains a disallowed pattern: {pattern}")]
    DangerousPattern { arg: String, pattern: String },
    #[error("argument '{arg}' must not be empty")]
    Empty { arg: String },
}

fn validate_path_component(arg_name: &str, value: &str) -> Result<(), CliError> {
    if value.is_empty() {
        return Err(CliError::Empty { arg: arg_name.to_string() });
    }
    for pattern in DANGEROUS_PATTERNS {
        if value.contains(pattern) {
            return Err(CliError::DangerousPattern {
                arg: arg_name.to_string(),
                pattern: pattern.to_string(),
            });
        }
    }
    Ok(())
}

/// Claim pipeline command-line entry point.
#[derive(Parser, Debug, Clone)]
#[command(name = "claim-pipeline")]
#[command(about = concat!("Claim pipeline v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (TOML), overridden by CLAIMPIPE_* env vars.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// One subcommand per pipeline stage (spec.md §2, §4.8).
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Pull unread mail from a mailbox subfolder and register new PDFs.
    Download {
        /// Mailbox subfolder to poll (e.g. "Inbox/Claims").
        #[arg(short, long)]
        subfolder: String,
    },
    /// Run OCR extraction against a registered document.
    Extract {
        /// Document record id.
        record_id: i64,
        /// Issuer code used to select the extraction template (e.g. "OBI_DE").
        #[arg(short, long)]
        issuer: String,
        /// Re-run extraction even if the record already has extracted data.
        #[arg(long)]
        force_reextract: bool,
    },
    /// Compile and reconcile a claim from an extracted document.
    CreateClaim {
        /// Document record id.
        record_id: i64,
        /// Message category to apply instead of the categorizer's guess.
        #[arg(long)]
        applied_message_category: Option<String>,
        /// Treat an existing notification as success instead of an error.
        #[arg(long)]
        ignore_already_existing: bool,
    },
    /// Move a finished document's mail message to its terminal folder.
    Dispatch {
        /// Document record id.
        record_id: i64,
    },
    /// Move a completed document's PDF to cold storage.
    Archive {
        /// Document record id.
        record_id: i64,
        /// Destination path in the archive blob store.
        #[arg(long)]
        archive_virtual_path: String,
    },
}

impl Cli {
    /// Parses `std::env::args()` via clap. Clap exits the process on
    /// `--help`/`--version`/parse failure.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validates path-like arguments and converts to the engine's command
    /// enum.
    pub fn into_pipeline_command(self) -> Result<PipelineCommand, CliError> {
        let command = match self.command {
            Commands::Download { subfolder } => {
                validate_path_component("subfolder", &subfolder)?;
                PipelineCommand::Download { subfolder }
            }
            Commands::Extract { record_id, issuer, force_reextract } => {
                validate_path_component("issuer", &issuer)?;
                PipelineCommand::Extract { record_id, issuer, force_reextract }
            }
            Commands::CreateClaim { record_id, applied_message_category, ignore_already_existing } => {
                PipelineCommand::CreateClaim { record_id, applied_message_category, ignore_already_existing }
            }
            Commands::Dispatch { record_id } => PipelineCommand::Dispatch { record_id },
            Commands::Archive { record_id, archive_virtual_path } => {
                validate_path_component("archive-virtual-path", &archive_virtual_path)?;
                PipelineCommand::Archive { record_id, archive_virtual_path }
            }
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_traversal_in_subfolder() {
        let err = validate_path_component("subfolder", "../../etc").unwrap_err();
        assert!(matches!(err, CliError::DangerousPattern { .. }));
    }

    #[test]
    fn rejects_empty_issuer() {
        let err = validate_path_component("issuer", "").unwrap_err();
        assert!(matches!(err, CliError::Empty { .. }));
    }

    #[test]
    fn accepts_ordinary_subfolder() {
        assert!(validate_path_component("subfolder", "Inbox/Claims").is_ok());
    }

    #[test]
    fn download_command_converts() {
        let cli = Cli {
            command: Commands::Download { subfolder: "Inbox".to_string() },
            config: PathBuf::from("config/default.toml"),
            verbose: false,
        };
        let cmd = cli.into_pipeline_command().unwrap();
        assert!(matches!(cmd, PipelineCommand::Download { .. }));
    }
}
