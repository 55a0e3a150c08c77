// 🔔 Change monitor
// Polls one company's officers and filing history straight from the registry,
// diffs against the previous snapshot and logs what was added or removed.

use crate::error::Result;
use crate::registry::{CompanyOfficer, Filing, RegistryClient};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// SNAPSHOT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub officers: Vec<CompanyOfficer>,
    #[serde(default)]
    pub filing_history: Vec<Filing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<DateTime<Utc>>,
}

pub fn snapshot_path(dir: &Path, company_number: &str) -> PathBuf {
    dir.join(format!("{company_number}_snapshot.json"))
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Ok(Snapshot::default());
    }
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(snapshot)?)?;
    Ok(())
}

// ============================================================================
// DIFF
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Diff<T> {
    pub added: Vec<T>,
    pub removed: Vec<T>,
}

impl<T> Diff<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Items whose key appears only in `new` (added) or only in `old` (removed).
///
/// A key seen more than once keeps its last item.
pub fn diff_by_key<T, K, F>(old: &[T], new: &[T], key: F) -> Diff<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let old_keys: HashSet<K> = old.iter().map(&key).collect();
    let new_keys: HashSet<K> = new.iter().map(&key).collect();

    let added = dedupe_last(new, &key)
        .into_iter()
        .filter(|item| !old_keys.contains(&key(item)))
        .collect();
    let removed = dedupe_last(old, &key)
        .into_iter()
        .filter(|item| !new_keys.contains(&key(item)))
        .collect();

    Diff { added, removed }
}

fn dedupe_last<T: Clone, K: Eq + Hash, F: Fn(&T) -> K>(items: &[T], key: &F) -> Vec<T> {
    let mut position: HashMap<K, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::new();
    for item in items {
        match position.get(&key(item)) {
            Some(&i) => out[i] = item.clone(),
            None => {
                position.insert(key(item), out.len());
                out.push(item.clone());
            }
        }
    }
    out
}

pub fn officer_key(officer: &CompanyOfficer) -> Option<String> {
    officer.links.self_link.clone()
}

pub fn filing_key(filing: &Filing) -> String {
    filing.transaction_id.clone()
}

pub fn format_officer(officer: &CompanyOfficer) -> String {
    match officer.appointed_on {
        Some(date) => format!("{} (appointed {})", officer.name, date),
        None => format!("{} (appointed unknown)", officer.name),
    }
}

pub fn format_filing(filing: &Filing) -> String {
    format!("{} on {}", filing.filing_type, filing.date)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    pub officers: Diff<CompanyOfficer>,
    pub filings: Diff<Filing>,
}

impl ChangeSet {
    pub fn between(old: &Snapshot, new: &Snapshot) -> Self {
        Self {
            officers: diff_by_key(&old.officers, &new.officers, officer_key),
            filings: diff_by_key(&old.filing_history, &new.filing_history, filing_key),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.officers.is_empty() && self.filings.is_empty()
    }

    /// Human-readable lines, one heading per non-empty section.
    pub fn report(&self, company_number: &str) -> Vec<String> {
        let mut lines = Vec::new();
        push_section(
            &mut lines,
            &format!("Company {company_number}: Officer Changes"),
            &self.officers,
            format_officer,
        );
        push_section(
            &mut lines,
            &format!("Company {company_number}: Filing History Changes"),
            &self.filings,
            format_filing,
        );
        lines
    }
}

fn push_section<T>(lines: &mut Vec<String>, title: &str, diff: &Diff<T>, fmt: fn(&T) -> String) {
    if diff.is_empty() {
        return;
    }
    lines.push(format!("--- {title} ---"));
    if !diff.added.is_empty() {
        lines.push("  Added:".to_string());
        lines.extend(diff.added.iter().map(|item| format!("    {}", fmt(item))));
    }
    if !diff.removed.is_empty() {
        lines.push("  Removed:".to_string());
        lines.extend(diff.removed.iter().map(|item| format!("    {}", fmt(item))));
    }
}

// ============================================================================
// MONITOR LOOP
// ============================================================================

pub struct Monitor {
    client: RegistryClient,
    company_number: String,
    snapshot_path: PathBuf,
}

impl Monitor {
    pub fn new(client: RegistryClient, company_number: impl Into<String>, snapshot_dir: &Path) -> Self {
        let company_number = company_number.into();
        Self {
            snapshot_path: snapshot_path(snapshot_dir, &company_number),
            client,
            company_number,
        }
    }

    /// One check: fetch, diff, log, persist.
    pub async fn check(&self) -> Result<ChangeSet> {
        let previous = load_snapshot(&self.snapshot_path)?;

        let officers = self.client.company_officers(&self.company_number).await?.items;
        let filing_history = self.client.filing_history(&self.company_number).await?.items;
        let current = Snapshot {
            officers,
            filing_history,
            taken_at: Some(Utc::now()),
        };

        let changes = ChangeSet::between(&previous, &current);
        for line in changes.report(&self.company_number) {
            tracing::info!("{line}");
        }

        save_snapshot(&self.snapshot_path, &current)?;
        Ok(changes)
    }

    /// Check forever. Errors are logged and the loop carries on.
    pub async fn run(&self, interval: Duration, quiet_log: Duration) {
        tracing::info!(
            company_number = %self.company_number,
            interval_secs = interval.as_secs(),
            "starting monitor"
        );

        let mut last_no_change = tokio::time::Instant::now();
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            match self.check().await {
                Ok(changes) if changes.is_empty() => {
                    if last_no_change.elapsed() >= quiet_log {
                        tracing::info!(company_number = %self.company_number, "No changes detected.");
                        last_no_change = tokio::time::Instant::now();
                    }
                }
                Ok(_) => last_no_change = tokio::time::Instant::now(),
                Err(e) => tracing::error!(company_number = %self.company_number, error = %e, "Error during check"),
            }
        }
    }
}
