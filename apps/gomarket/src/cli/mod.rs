//! # GoMarket CLI Module
//!
//! ## Available Commands
//!
//! - `list` - Show the cart (default when no command is given)
//! - `add` - Add one unit of a product
//! - `increment` - One more unit of a product already in the cart
//! - `decrement` - One less unit, removing the product at zero
//! - `serve` - Start the HTTP server

mod commands;

use clap::{Parser, Subcommand};
use gomarket_core::{CartError, NewLineItem};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// GoMarket - shopping cart server and CLI
///
/// Keeps one persisted cart and lets you inspect and change it from the
/// command line or over HTTP.
#[derive(Parser, Debug)]
#[command(name = "gomarket")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the cart database (redb) or JSON file (file backend)
    #[arg(short = 'D', long, global = true, default_value = "gomarket.db")]
    pub database: PathBuf,

    /// Storage backend: "redb" (ACID database), "file" (JSON file) or "memory"
    #[arg(short = 'B', long, global = true, default_value = "redb")]
    pub backend: String,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the cart with totals
    List,

    /// Add one unit of a product to the cart
    Add {
        /// Product id
        #[arg(long)]
        id: String,

        /// Product title
        #[arg(long)]
        title: String,

        /// Product image URL
        #[arg(long)]
        image_url: String,

        /// Unit price
        #[arg(long)]
        price: f64,
    },

    /// Add one unit to a product already in the cart
    Increment {
        /// Product id
        id: String,
    },

    /// Take one unit from a product, removing it at zero
    Decrement {
        /// Product id
        id: String,
    },

    /// Start HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CartError> {
    let backend = cli.backend.as_str();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            cmd_serve(&cli.database, backend, &host, port).await
        }
        Some(Commands::Add {
            id,
            title,
            image_url,
            price,
        }) => cmd_add(
            &cli.database,
            backend,
            json_mode,
            NewLineItem::new(id, title, image_url, price),
        ),
        Some(Commands::Increment { id }) => cmd_increment(&cli.database, backend, json_mode, &id),
        Some(Commands::Decrement { id }) => cmd_decrement(&cli.database, backend, json_mode, &id),
        Some(Commands::List) | None => cmd_list(&cli.database, backend, json_mode),
    }
}
