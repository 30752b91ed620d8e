//! Command-line interface for blogr, parsed with clap.

use clap::{Parser, Subcommand};

/// Blogr - a minimal multi-user blog server
#[derive(Parser)]
#[command(name = "blogr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (the default when no command is given)
    Serve,

    /// Destructively recreate the database schema
    #[command(name = "init-db")]
    InitDb,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_init_db_subcommand() {
        let cli = Cli::try_parse_from(["blogr", "init-db"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::InitDb)));
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["blogr"]).unwrap();
        assert!(cli.command.is_none());
    }
}
