// CH Dashboard - Web Server
// Read-through registry endpoints and the PDF document proxy

use anyhow::{Context, Result};
use ch_dashboard::server::{router, AppState};
use ch_dashboard::{init_logging, Config, RegistryClient, ReqwestHttpClient, Verbosity};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ch-server", version, about = "Registry proxy for the dashboard")]
struct Args {
    /// Config file (defaults to the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides server.bind_addr)
    #[arg(short, long)]
    bind: Option<String>,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(Verbosity::from_flags(args.quiet, args.verbose));

    println!("🌐 CH Dashboard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::load_from(args.config).context("Failed to load configuration")?;
    let api_key = config.require_api_key()?;

    let client = RegistryClient::new(
        Arc::new(ReqwestHttpClient::new()),
        config.api_base_url.clone(),
        api_key,
    )
    .with_revalidate(config.revalidate_window());
    println!("✓ Registry: {}", config.api_base_url);
    println!("✓ Revalidate window: {}s", config.revalidate_window().as_secs());

    let app = router(AppState::new(client));

    // Start server
    let addr = args.bind.unwrap_or_else(|| config.server.bind_addr.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    println!("\n🚀 Server running on http://{addr}");
    println!("   API: http://{addr}/company/<number>");
    println!("   PDF: http://{addr}/document?metaPath=<path>");
    println!("\n   Press Ctrl+C to stop\n");
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server error")?;

    Ok(())
}
