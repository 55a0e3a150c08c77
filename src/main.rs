// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use ch_dashboard::{
    init_file_logging, init_logging, Config, Follows, JsonFileStore, Monitor, RegistryClient,
    ReqwestHttpClient, Verbosity,
};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ch-dashboard", version, about = "Company registry dashboard")]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More output; repeat for trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive dashboard (default)
    Ui,
    /// Add a company number to the followed list
    Follow { number: String },
    /// Print the followed list
    List,
    /// Watch one company for officer and filing changes
    Monitor {
        number: String,
        /// Seconds between checks (overrides monitor.interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_from(cli.config).context("Failed to load configuration")?;
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);

    match cli.command.unwrap_or(Command::Ui) {
        Command::Ui => {
            init_file_logging(verbosity, &config.log_path())
                .with_context(|| format!("Cannot open log file {}", config.log_path().display()))?;
            run_ui_mode(config).await?;
        }
        Command::Follow { number } => {
            init_logging(verbosity);
            run_follow(&config, &number)?;
        }
        Command::List => {
            init_logging(verbosity);
            run_list(&config)?;
        }
        Command::Monitor { number, interval } => {
            init_logging(verbosity);
            run_monitor(&config, &number, interval).await?;
        }
    }

    Ok(())
}

fn load_follows(config: &Config) -> Result<Follows<JsonFileStore>> {
    let path = config.storage_path();
    Follows::load(JsonFileStore::new(&path))
        .with_context(|| format!("Cannot read followed companies from {}", path.display()))
}

fn run_follow(config: &Config, number: &str) -> Result<()> {
    let mut follows = load_follows(config)?;

    if follows.add(number)? {
        println!("✓ Now following {}", number.trim());
    } else {
        println!("ℹ️  Already following {}", number.trim());
    }
    println!("   {} companies followed", follows.companies().len());

    Ok(())
}

fn run_list(config: &Config) -> Result<()> {
    let follows = load_follows(config)?;

    println!("📋 Followed companies");
    println!("━━━━━━━━━━━━━━━━━━━━━━");
    if follows.companies().is_empty() {
        println!("   (none yet, run: ch-dashboard follow <number>)");
    }
    for number in follows.companies() {
        println!("   {number}");
    }

    Ok(())
}

async fn run_monitor(config: &Config, number: &str, interval: Option<u64>) -> Result<()> {
    let api_key = config.require_api_key()?;
    let client = RegistryClient::new(
        Arc::new(ReqwestHttpClient::new()),
        config.api_base_url.clone(),
        api_key,
    );

    let interval = Duration::from_secs(interval.unwrap_or(config.monitor.interval_secs).max(1));
    let quiet_log = Duration::from_secs(config.monitor.quiet_log_secs);
    let snapshot_dir = config.snapshot_dir();

    println!("🔔 Monitoring company {number}");
    println!("   Snapshots: {}", snapshot_dir.display());
    println!("   Press Ctrl+C to stop\n");

    let monitor = Monitor::new(client, number, &snapshot_dir);
    tokio::select! {
        _ = monitor.run(interval, quiet_log) => {}
        _ = tokio::signal::ctrl_c() => {
            println!("\n✅ Monitor stopped");
        }
    }

    Ok(())
}

#[cfg(feature = "tui")]
async fn run_ui_mode(config: Config) -> Result<()> {
    use ch_dashboard::dashboard::run_downloads;
    use ch_dashboard::{DashboardClient, Poller, View};
    use tokio::sync::{mpsc, watch};

    let follows = load_follows(&config)?;
    let client = DashboardClient::new(
        Arc::new(ReqwestHttpClient::new()),
        config.dashboard.server_url.clone(),
    );

    let (view_tx, view_rx) = watch::channel(View::Followed);
    let (follows_tx, follows_rx) = watch::channel(follows.companies().to_vec());
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let (download_tx, download_rx) = mpsc::unbounded_channel();

    let poller = Poller::new(client.clone(), config.poll_interval());
    tokio::spawn(poller.run(view_rx, follows_rx, update_tx.clone()));
    tokio::spawn(run_downloads(client, config.download_dir(), download_rx, update_tx));

    let mut app = ui::App::new(follows);
    let mut channels = ui::UiChannels {
        view_tx,
        follows_tx,
        download_tx,
        updates: update_rx,
    };

    tokio::task::spawn_blocking(move || ui::run_ui(&mut app, &mut channels)).await??;

    println!("✅ Dashboard closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
async fn run_ui_mode(_config: Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the CLI: ch-dashboard follow <number> / list / monitor <number>");
    std::process::exit(1);
}
