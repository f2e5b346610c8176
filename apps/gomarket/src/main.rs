//! # GoMarket - Cart Server
//!
//! The GoMarket binary: one persisted shopping cart, reachable from the
//! command line and over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/gomarket (THE BINARY)         │
//! │                                               │
//! │   ┌─────────────┐          ┌─────────────┐    │
//! │   │    CLI      │          │  HTTP API   │    │
//! │   │   (clap)    │          │   (axum)    │    │
//! │   └──────┬──────┘          └──────┬──────┘    │
//! │          └──────── use_cart ──────┘           │
//! │                      ▼                        │
//! │              ┌───────────────┐                │
//! │              │ gomarket-core │                │
//! │              │  (THE CART)   │                │
//! │              └───────────────┘                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! gomarket serve --host 0.0.0.0 --port 8080
//!
//! gomarket add --id 1 --title Apple --image-url https://img/apple.png --price 2.5
//! gomarket increment 1
//! gomarket decrement 1
//! gomarket list
//! ```

use clap::Parser;
use gomarket::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "gomarket=info,gomarket_core=info,tower_http=debug";
const VERBOSE_FILTER: &str = "gomarket=debug,gomarket_core=debug,tower_http=debug";

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    init_tracing(cli.verbose);

    // JSON output must stay parseable.
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `GOMARKET_LOG_FORMAT=json` switches to machine-parseable output.
/// `RUST_LOG` overrides the filter.
fn init_tracing(verbose: bool) {
    let log_format = std::env::var("GOMARKET_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn print_banner() {
    println!(
        r#"
   ___       __  __            _        _
  / __|___  |  \/  |__ _ _ _ | |__ ___| |_
 | (_ / _ \ | |\/| / _` | '_|| / // -_)  _|
  \___\___/ |_|  |_\__,_|_|  |_\_\\___|\__|

  GoMarket Cart v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
