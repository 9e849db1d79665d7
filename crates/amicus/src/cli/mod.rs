//! Command-line interface for the `amicus` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, CsvStyleArg, DeleteCommand, ExportCommand, GenerateCommand, ListCommand,
    LogCommand, LoginCommand, RoleArg, ScanCommand, WhoamiCommand,
};

/// amicus - QR attendance logging
///
/// Generates per-person QR check-in codes, scans them from a line feed,
/// and keeps a persisted attendance log with CSV export.
#[derive(Debug, Parser)]
#[command(name = "amicus")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with a role
    Login(LoginCommand),

    /// Sign out
    Logout,

    /// Show the signed-in session
    Whoami(WhoamiCommand),

    /// Generate a check-in payload for the signed-in user
    Generate(GenerateCommand),

    /// Run the scanner against a line feed
    Scan(ScanCommand),

    /// Record a manual attendance entry
    Log(LogCommand),

    /// List attendance records
    List(ListCommand),

    /// Delete an attendance record
    Delete(DeleteCommand),

    /// Export attendance records as CSV
    Export(ExportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "amicus");
    }

    #[test]
    fn test_verbosity_flags() {
        let quiet = Cli::try_parse_from(["amicus", "-q", "logout"]).unwrap();
        assert_eq!(quiet.verbosity(), crate::logging::Verbosity::Quiet);

        let normal = Cli::try_parse_from(["amicus", "logout"]).unwrap();
        assert_eq!(normal.verbosity(), crate::logging::Verbosity::Normal);

        let verbose = Cli::try_parse_from(["amicus", "-v", "logout"]).unwrap();
        assert_eq!(verbose.verbosity(), crate::logging::Verbosity::Verbose);

        let trace = Cli::try_parse_from(["amicus", "-vv", "logout"]).unwrap();
        assert_eq!(trace.verbosity(), crate::logging::Verbosity::Trace);
    }

    #[test]
    fn test_parse_login() {
        let cli = Cli::try_parse_from([
            "amicus", "login", "admin", "-u", "admin", "-p", "admin123", "-n", "Grace Hopper",
            "--course", "CS101",
        ])
        .unwrap();
        match cli.command {
            Command::Login(cmd) => {
                assert_eq!(cmd.role, RoleArg::Admin);
                assert_eq!(cmd.username, "admin");
                assert_eq!(cmd.name, "Grace Hopper");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_generate_identity() {
        let cli = Cli::try_parse_from([
            "amicus",
            "generate",
            "--id",
            "EMP-42",
            "--department",
            "Engineering",
        ])
        .unwrap();
        match cli.command {
            Command::Generate(cmd) => {
                assert_eq!(cmd.id.as_deref(), Some("EMP-42"));
                assert_eq!(cmd.department.as_deref(), Some("Engineering"));
                assert_eq!(cmd.email, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_generate_department_requires_id() {
        let result = Cli::try_parse_from(["amicus", "generate", "--department", "Engineering"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_scan_with_input() {
        let cli = Cli::try_parse_from(["amicus", "scan", "-i", "feed.txt", "--once"]).unwrap();
        match cli.command {
            Command::Scan(cmd) => {
                assert_eq!(cmd.input, Some(PathBuf::from("feed.txt")));
                assert!(cmd.once);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_with_date() {
        let cli = Cli::try_parse_from(["amicus", "list", "-d", "2024-01-15", "--json"]).unwrap();
        match cli.command {
            Command::List(cmd) => {
                assert_eq!(cmd.date.as_deref(), Some("2024-01-15"));
                assert!(cmd.json);
                assert!(!cmd.by_session);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_delete_yes() {
        let cli = Cli::try_parse_from(["amicus", "delete", "rec-1", "--yes"]).unwrap();
        match cli.command {
            Command::Delete(cmd) => {
                assert_eq!(cmd.id, "rec-1");
                assert!(cmd.yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_export_style() {
        let cli = Cli::try_parse_from(["amicus", "export", "-s", "quoted"]).unwrap();
        match cli.command {
            Command::Export(cmd) => assert_eq!(cmd.style, Some(CsvStyleArg::Quoted)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_path() {
        let cli = Cli::try_parse_from(["amicus", "config", "path"]).unwrap();
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Path)));
    }

    #[test]
    fn test_parse_with_custom_config() {
        let cli = Cli::try_parse_from(["amicus", "-c", "/custom/config.toml", "logout"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }
}
