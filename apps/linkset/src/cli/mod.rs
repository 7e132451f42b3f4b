//! # Linkset CLI Module
//!
//! ## Available Commands
//!
//! - `init` - Initialize a new database
//! - `status` - Show node and edge counts
//! - `node` - Add a node
//! - `fields` - List declared fields and their accessors
//! - `get` - Read a relationship field
//! - `set` - Replace a relationship field
//! - `add` - Link one target into a field
//! - `remove` - Unlink one target from a field
//! - `edges` - List every edge touching a node
//! - `compact` - Compact the database file

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use linkset_core::LinksetError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Linkset - relationship field reconciliation over a property graph
#[derive(Parser, Debug)]
#[command(name = "linkset")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the mapping file
    #[arg(short, long, global = true, default_value = "linkset.toml")]
    pub config: PathBuf,

    /// Path to the graph database (overrides the mapping file)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new empty database
    Init {
        /// Overwrite an existing database
        #[arg(short, long)]
        force: bool,
    },

    /// Show node and edge counts
    Status,

    /// Add a node
    Node {
        /// Node label
        #[arg(short, long)]
        label: String,
    },

    /// List declared fields and the accessor each resolves to
    Fields,

    /// Read a relationship field
    Get {
        /// Source node ID
        #[arg(short, long)]
        node: u64,

        /// Qualified field name (Owner.name)
        #[arg(short, long)]
        field: String,

        /// Load related entities eagerly
        #[arg(long)]
        eager: bool,

        /// Eager load depth
        #[arg(long, requires = "eager")]
        depth: Option<u32>,
    },

    /// Replace a relationship field; with neither --targets nor --clear nothing changes
    Set {
        /// Source node ID
        #[arg(short, long)]
        node: u64,

        /// Qualified field name (Owner.name)
        #[arg(short, long)]
        field: String,

        /// Target node IDs (comma-separated)
        #[arg(short, long, value_delimiter = ',', conflicts_with = "clear")]
        targets: Option<Vec<u64>>,

        /// Remove every relationship of the field
        #[arg(long)]
        clear: bool,
    },

    /// Link one target into a field
    Add {
        /// Source node ID
        #[arg(short, long)]
        node: u64,

        /// Qualified field name (Owner.name)
        #[arg(short, long)]
        field: String,

        /// Target node ID
        #[arg(short, long)]
        target: u64,
    },

    /// Unlink one target from a field
    Remove {
        /// Source node ID
        #[arg(short, long)]
        node: u64,

        /// Qualified field name (Owner.name)
        #[arg(short, long)]
        field: String,

        /// Target node ID
        #[arg(short, long)]
        target: u64,
    },

    /// List every edge touching a node
    Edges {
        /// Node ID
        #[arg(short, long)]
        node: u64,
    },

    /// Compact the database file
    Compact,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), LinksetError> {
    let config = AppConfig::load(&cli.config)?;
    let db_path = config.database(cli.database.as_deref());
    let json_mode = cli.json;

    match cli.command {
        Commands::Init { force } => cmd_init(&db_path, force),
        Commands::Status => cmd_status(&db_path, json_mode),
        Commands::Node { label } => cmd_node(&db_path, json_mode, &label),
        Commands::Fields => cmd_fields(&config, json_mode),
        Commands::Get {
            node,
            field,
            eager,
            depth,
        } => cmd_get(&db_path, &config, json_mode, node, &field, eager, depth),
        Commands::Set {
            node,
            field,
            targets,
            clear,
        } => cmd_set(&db_path, &config, json_mode, node, &field, targets, clear),
        Commands::Add {
            node,
            field,
            target,
        } => cmd_add(&db_path, &config, json_mode, node, &field, target),
        Commands::Remove {
            node,
            field,
            target,
        } => cmd_remove(&db_path, &config, json_mode, node, &field, target),
        Commands::Edges { node } => cmd_edges(&db_path, json_mode, node),
        Commands::Compact => cmd_compact(&db_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn set_parses_comma_separated_targets() {
        let cli = Cli::try_parse_from(["linkset", "set", "-n", "1", "-f", "Person.friends", "-t", "2,3"])
            .expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Set {
                ref targets,
                clear: false,
                ..
            } if targets.as_deref() == Some(&[2, 3][..])
        ));
    }

    #[test]
    fn set_without_value_is_absent() {
        let cli = Cli::try_parse_from(["linkset", "set", "-n", "1", "-f", "Person.friends"])
            .expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Set {
                targets: None,
                clear: false,
                ..
            }
        ));
    }

    #[test]
    fn targets_and_clear_conflict() {
        assert!(
            Cli::try_parse_from([
                "linkset", "set", "-n", "1", "-f", "Person.friends", "-t", "2", "--clear"
            ])
            .is_err()
        );
    }
}
