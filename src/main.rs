//! # Local Docs CLI (`local-docs`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `local-docs serve stdio` | Serve the MCP tool over stdin/stdout |
//! | `local-docs serve http` | Serve the HTTP tool API and MCP Streamable HTTP |
//! | `local-docs search "<prompt>"` | Run one search and print the answer |
//! | `local-docs endpoints` | Show resolved endpoints and backend health |
//!
//! ## Examples
//!
//! ```bash
//! local-docs search "what is the capital of France?" --threshold 0.7
//! LOCAL_DOCS_SEARCH_URL=http://10.0.0.5:10001/api/search local-docs serve stdio
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use local_docs::{config, logging, search, server, LocalDocumentsSearch};

/// Local Docs: semantic search over a local corpus, exposed as an MCP tool.
#[derive(Parser)]
#[command(
    name = "local-docs",
    about = "Local Docs: semantic search over a local corpus, exposed as an MCP tool",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Missing file means built-in defaults.
    #[arg(long, global = true, default_value = "./config/local-docs.toml")]
    config: PathBuf,

    /// Debug-level logging (stderr).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a server.
    Serve {
        #[command(subcommand)]
        transport: ServeTransport,
    },

    /// Run `localDocumentsSearch` once and print the JSON answer.
    ///
    /// Ctrl-C cancels both in-flight requests.
    Search {
        /// The natural-language prompt.
        prompt: String,

        /// Minimum similarity score (0.0-1.0). Defaults to `search.default_threshold`.
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Print the resolved document and chunk endpoints and probe their health.
    Endpoints,
}

#[derive(Subcommand)]
enum ServeTransport {
    /// MCP over stdin/stdout, for agent hosts that spawn the server.
    Stdio,
    /// HTTP on `[server].bind`: `/tools/*`, `/health`, and MCP at `/mcp`.
    Http,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve { transport } => match transport {
            ServeTransport::Stdio => server::run_stdio(&cfg).await?,
            ServeTransport::Http => server::run_http(&cfg).await?,
        },
        Commands::Search { prompt, threshold } => {
            search::run_search(&cfg, &prompt, threshold).await?;
        }
        Commands::Endpoints => {
            let search = LocalDocumentsSearch::from_config(&cfg)?;
            let endpoints = search.endpoints();
            let (documents_ok, chunks_ok) = tokio::join!(
                search.client().check_health(&endpoints.documents),
                search.client().check_health(&endpoints.chunks),
            );
            let status = |ok: bool| if ok { "ok" } else { "unreachable" };
            println!("{:<10} {:<12} URL", "KIND", "HEALTH");
            println!("{:<10} {:<12} {}", "documents", status(documents_ok), endpoints.documents);
            println!("{:<10} {:<12} {}", "chunks", status(chunks_ok), endpoints.chunks);
        }
    }

    Ok(())
}
