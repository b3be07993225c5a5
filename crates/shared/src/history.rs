use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::io::{read_json, write_json};
use crate::models::Briefing;

pub const HISTORY_FILE: &str = "history.json";

/// Entries kept per profile
pub const MAX_ENTRIES: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub generated_at: String,
    pub briefing: String,
}

impl HistoryEntry {
    pub fn from_briefing(briefing: &Briefing) -> Self {
        Self {
            date: briefing.generated_at.date_naive(),
            generated_at: briefing.generated_label(),
            briefing: briefing.text.clone(),
        }
    }
}

/// Past briefings, one per profile per day
pub struct HistoryStore {
    path: PathBuf,
    writer: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(HISTORY_FILE))
    }

    fn load_all(&self) -> Result<BTreeMap<String, Vec<HistoryEntry>>> {
        Ok(read_json(&self.path)
            .context("Failed to load briefing history")?
            .unwrap_or_default())
    }

    /// Store an entry, replacing any entry from the same day
    pub fn record(&self, profile_name: &str, entry: HistoryEntry) -> Result<()> {
        let _guard = self.lock_writes();
        let mut history = self.load_all()?;
        let entries = history.entry(profile_name.to_string()).or_default();

        entries.retain(|e| e.date != entry.date);
        entries.push(entry);
        entries.sort_by_key(|e| e.date);
        if entries.len() > MAX_ENTRIES {
            let excess = entries.len() - MAX_ENTRIES;
            entries.drain(..excess);
        }

        write_json(&self.path, &history).context("Failed to save briefing history")
    }

    /// Entries for a profile, newest first
    pub fn load(&self, profile_name: &str) -> Result<Vec<HistoryEntry>> {
        let mut entries = self
            .load_all()?
            .remove(profile_name)
            .unwrap_or_default();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    pub fn find(&self, profile_name: &str, date: NaiveDate) -> Result<Option<HistoryEntry>> {
        Ok(self
            .load(profile_name)?
            .into_iter()
            .find(|e| e.date == date))
    }

    /// Drop all history for a profile
    pub fn forget(&self, profile_name: &str) -> Result<()> {
        let _guard = self.lock_writes();
        let mut history = self.load_all()?;
        if history.remove(profile_name).is_some() {
            write_json(&self.path, &history).context("Failed to save briefing history")?;
        }
        Ok(())
    }
}
