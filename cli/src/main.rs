//! whois-mcp: MCP server exposing WHOIS lookups over STDIO.
//!
//! Logs and banners go to stderr; stdout is reserved for the protocol.
//! SIGINT/SIGTERM close the transport and exit with status 0.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use whois_mcp::{ShutdownSignals, WhoisConfig, WhoisMcpServer, console, serve_stdio};

/// MCP server for WHOIS lookups about domains, TLDs, IPs and ASNs.
#[derive(Parser)]
#[command(
    name = "whois-mcp",
    version,
    about = "MCP server for WHOIS lookups about domains, TLDs, IPs and ASNs"
)]
struct Cli {
    /// Path to whois-mcp.toml [default: ./whois-mcp.toml or ~/.config/whois-mcp/whois-mcp.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing with env filter (RUST_LOG controls verbosity)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    console::set_color_enabled(console::stderr_supports_color());

    let cli = Cli::parse();
    let cancel = CancellationToken::new();

    let server = match startup(cli.config).await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("{}", console::startup_error_banner(&format!("{:#}", e)));
            std::process::exit(1);
        }
    };

    // SIGINT/SIGTERM handler: cancels the root token, which closes the transport.
    // Installed before the banner so an early signal is not fatal.
    match ShutdownSignals::install() {
        Ok(mut signals) => {
            let cancel_for_signal = cancel.clone();
            tokio::spawn(async move {
                match signals.recv().await {
                    Ok(signal) => tracing::info!(?signal, "shutdown signal received"),
                    Err(e) => {
                        tracing::warn!(error = %e, "signal handler failed");
                        return;
                    }
                }
                eprintln!("{}", console::shutdown_banner());
                cancel_for_signal.cancel();
            });
        }
        Err(e) => tracing::warn!(error = %e, "failed to install signal handlers"),
    }

    eprintln!("{}", console::startup_banner(server.name()));
    eprintln!("{}", console::tools_banner(&server.registry().names()));

    if let Err(e) = serve_stdio(server, cancel).await {
        tracing::error!(error = %e, "whois-mcp stdio transport error");
        eprintln!("{}", console::startup_error_banner(&e));
        std::process::exit(1);
    }

    // stdin is read on a blocking thread that runtime shutdown would wait on.
    std::process::exit(0);
}

/// Load configuration and build the server without touching stdio.
async fn startup(explicit: Option<PathBuf>) -> Result<WhoisMcpServer> {
    let config = match resolve_config(explicit) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            WhoisConfig::load(&path)
                .await
                .with_context(|| format!("Failed to load config {:?}", path))?
        }
        None => {
            tracing::debug!("no config file found, using defaults");
            WhoisConfig::default()
        }
    };

    WhoisMcpServer::from_config(&config).context("Failed to build whois-mcp server")
}

/// Resolve config file path: explicit flag → ./whois-mcp.toml → ~/.config/whois-mcp/whois-mcp.toml.
///
/// Returns None when nothing is found; defaults apply in that case.
fn resolve_config(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path);
    }

    let local = Path::new("whois-mcp.toml");
    if local.exists() {
        return Some(local.to_path_buf());
    }

    if let Some(config_dir) = dirs::config_dir() {
        let xdg = config_dir.join("whois-mcp").join("whois-mcp.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }

    None
}
