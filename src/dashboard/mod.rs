// Client State/View Layer plumbing: server client, poller, downloads

pub mod client;
pub mod poller;

pub use client::DashboardClient;
pub use poller::{CompanySnapshot, OfficerSnapshot, Poller, Update, View};

use crate::error::Result;
use crate::registry::Filing;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Download a filing's PDF into `dir` under its `{TYPE}_{transaction_id}.pdf` name.
pub async fn save_filing(client: &DashboardClient, dir: &Path, filing: &Filing) -> Result<PathBuf> {
    let (filename, bytes) = client.download_filing(filing).await?;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(filename);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Serve download requests until the request channel closes.
///
/// Failures are logged only; successes are reported on `updates`.
pub async fn run_downloads(
    client: DashboardClient,
    dir: PathBuf,
    mut requests: mpsc::UnboundedReceiver<Filing>,
    updates: mpsc::UnboundedSender<Update>,
) {
    while let Some(filing) = requests.recv().await {
        match save_filing(&client, &dir, &filing).await {
            Ok(path) => {
                tracing::info!(transaction_id = %filing.transaction_id, path = %path.display(), "filing saved");
                let _ = updates.send(Update::Downloaded(path.display().to_string()));
            }
            Err(e) => {
                tracing::warn!(transaction_id = %filing.transaction_id, error = %e, "Download failed");
            }
        }
    }
}
