//! # Linkset
//!
//! Inspect and reconcile relationship fields in a redb-backed graph.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            apps/linkset (THE BINARY)         │
//! │                                              │
//! │   ┌─────────────┐      ┌─────────────────┐   │
//! │   │    CLI      │      │  linkset.toml   │   │
//! │   │   (clap)    │      │  (serde, toml)  │   │
//! │   └──────┬──────┘      └────────┬────────┘   │
//! │          └───────────┬──────────┘            │
//! │                      ▼                       │
//! │              ┌───────────────┐               │
//! │              │ linkset-core  │               │
//! │              │  (THE LOGIC)  │               │
//! │              └───────────────┘               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! linkset init
//! linkset node --label Person
//! linkset set --node 0 --field Person.friends --targets 1,2
//! linkset get --node 0 --field Person.friends --eager --depth 2
//! linkset set --node 0 --field Person.friends --clear
//! ```

use clap::Parser;
use linkset::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // LINKSET_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("LINKSET_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "linkset=info,linkset_core=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
