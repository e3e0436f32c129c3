// src/cli.rs

use clap::{Parser, Subcommand};

/// Dispatch org maintenance workflows via the org's GitHub App.
///
/// Credentials and target come from the environment (or a local `.env`):
/// ORG_APP_ID, ORG_APP_PRIVATE_KEY, and optionally ORG / REPO / BRANCH /
/// GITHUB_API. CLI flags only carry workflow inputs.
#[derive(Parser, Debug)]
#[command(
    name = "orgctl",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// All supported CLI commands.
///
/// Each dispatching command maps to exactly one workflow file in the
/// org's `.github` repository and forwards a fixed set of string inputs.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the workflows defined in the target repository.
    ///
    /// Useful to confirm the app installation and token scopes work
    /// before dispatching anything.
    Check,

    /// Trigger the task aggregation workflow.
    Tasks {
        /// Publish the aggregated board instead of a dry preview
        #[arg(long, default_value = "false", value_parser = ["true", "false"])]
        publish: String,

        /// Comma-separated repo names to restrict the run to
        ///
        /// Empty means all repos.
        #[arg(long, default_value = "")]
        subset: String,
    },

    /// Trigger the repository inventory workflow.
    Inventory {
        /// Comma-separated repo names to restrict the run to
        #[arg(long, default_value = "")]
        subset: String,

        /// Issue number the inventory report is posted to
        #[arg(long, default_value = "26")]
        issue: String,
    },

    /// Trigger the security hardening workflow.
    Harden {
        /// Report what would change without applying anything
        #[arg(long, default_value = "true", value_parser = ["true", "false"])]
        dry_run: String,

        /// Comma-separated repo names to restrict the run to
        #[arg(long, default_value = "")]
        subset: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["orgctl", "bogus"]).is_err());
    }

    #[test]
    fn tasks_rejects_non_boolean_publish() {
        assert!(Cli::try_parse_from(["orgctl", "tasks", "--publish", "yes"]).is_err());
    }

    #[test]
    fn harden_defaults_to_dry_run() {
        let cli = Cli::try_parse_from(["orgctl", "harden"]).unwrap();
        match cli.command {
            Command::Harden { dry_run, subset } => {
                assert_eq!(dry_run, "true");
                assert_eq!(subset, "");
            }
            other => panic!("parsed wrong command: {:?}", other),
        }
    }
}
