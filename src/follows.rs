// ⭐ Followed companies
// Insertion-ordered, deduplicated by value, append-only.
//
// Storage is injected: JsonFileStore on disk, MemoryStore for tests.

use crate::error::{DashboardError, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Storage key holding the followed list.
pub const FOLLOWS_KEY: &str = "follows";

// ============================================================================
// STORAGE INTERFACE
// ============================================================================

/// Key → list-of-strings persistence.
pub trait FollowStore: Send + Sync {
    /// Missing key reads as an empty list
    fn get_list(&self, key: &str) -> Result<Vec<String>>;
    fn set_list(&self, key: &str, values: &[String]) -> Result<()>;
}

/// JSON object on disk, one array per key.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, Vec<String>>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

impl FollowStore for JsonFileStore {
    fn get_list(&self, key: &str) -> Result<Vec<String>> {
        Ok(self.read_all()?.remove(key).unwrap_or_default())
    }

    fn set_list(&self, key: &str, values: &[String]) -> Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), values.to_vec());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&all)?)?;
        Ok(())
    }
}

/// In-memory store; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    lists: Arc<Mutex<BTreeMap<String, Vec<String>>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set_list` calls so far.
    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }
}

impl FollowStore for MemoryStore {
    fn get_list(&self, key: &str) -> Result<Vec<String>> {
        Ok(self.lists.lock().get(key).cloned().unwrap_or_default())
    }

    fn set_list(&self, key: &str, values: &[String]) -> Result<()> {
        self.lists.lock().insert(key.to_string(), values.to_vec());
        *self.writes.lock() += 1;
        Ok(())
    }
}

// ============================================================================
// FOLLOWS STATE
// ============================================================================

pub struct Follows<S: FollowStore> {
    store: S,
    companies: Vec<String>,
}

impl<S: FollowStore> Follows<S> {
    /// Read the persisted list once.
    pub fn load(store: S) -> Result<Self> {
        let mut companies: Vec<String> = Vec::new();
        for number in store.get_list(FOLLOWS_KEY)? {
            if !companies.contains(&number) {
                companies.push(number);
            }
        }
        Ok(Self { store, companies })
    }

    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    pub fn contains(&self, number: &str) -> bool {
        self.companies.iter().any(|c| c == number)
    }

    /// Append a company number. Returns false (and writes nothing) for a duplicate.
    pub fn add(&mut self, number: &str) -> Result<bool> {
        let number = number.trim();
        if number.is_empty() {
            return Err(DashboardError::validation("company number is empty"));
        }
        if self.contains(number) {
            tracing::debug!(company_number = %number, "already followed");
            return Ok(false);
        }

        let mut updated = self.companies.clone();
        updated.push(number.to_string());
        self.store.set_list(FOLLOWS_KEY, &updated)?;
        self.companies = updated;

        tracing::info!(company_number = %number, "company followed");
        Ok(true)
    }
}
