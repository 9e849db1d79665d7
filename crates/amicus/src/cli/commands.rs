//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::auth::Role;
use crate::export::CsvStyle;

/// Login command arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Role to sign in as
    #[arg(value_enum)]
    pub role: RoleArg,

    /// Account name
    #[arg(short, long)]
    pub username: String,

    /// Account password
    #[arg(short, long)]
    pub password: String,

    /// Display name
    #[arg(short, long)]
    pub name: String,

    /// Course or department label
    #[arg(long)]
    pub course: String,
}

/// Whoami command arguments.
#[derive(Debug, Args)]
pub struct WhoamiCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Generate command arguments.
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Badge or employee id; emits an identity payload instead of a session
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    /// Department label for an identity payload (defaults to the course)
    #[arg(long, requires = "id")]
    pub department: Option<String>,

    /// Contact email for an identity payload
    #[arg(long, requires = "id")]
    pub email: Option<String>,

    /// Write the payload to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Scan command arguments.
#[derive(Debug, Args)]
pub struct ScanCommand {
    /// Read scan lines from a file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Stop after the first recorded scan
    #[arg(long)]
    pub once: bool,
}

/// Manual entry command arguments.
#[derive(Debug, Args)]
pub struct LogCommand {
    /// The subject id to record
    pub id: String,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only records scanned on this date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Group records by session id
    #[arg(long)]
    pub by_session: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// The record id to delete
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Only export records scanned on this date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Write to this file instead of the default name
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// CSV field style
    #[arg(short, long, value_enum)]
    pub style: Option<CsvStyleArg>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Role argument for sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// Generates QR codes for check-in
    User,
    /// Scans codes and manages records
    Admin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::User => Self::User,
            RoleArg::Admin => Self::Admin,
        }
    }
}

/// CSV style argument for exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CsvStyleArg {
    /// Strip commas from field values
    StripCommas,
    /// Double-quote every field
    Quoted,
}

impl From<CsvStyleArg> for CsvStyle {
    fn from(arg: CsvStyleArg) -> Self {
        match arg {
            CsvStyleArg::StripCommas => Self::StripCommas,
            CsvStyleArg::Quoted => Self::Quoted,
        }
    }
}
