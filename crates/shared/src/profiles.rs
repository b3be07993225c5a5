use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::io::{read_json, write_json};
use crate::models::Profile;

pub const PROFILES_FILE: &str = "profiles.json";

/// Named profiles kept in a single JSON object keyed by name.
/// Changes through one store are applied one at a time.
pub struct ProfileStore {
    path: PathBuf,
    writer: Mutex<()>,
}

impl ProfileStore {
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
        Self::new(data_dir.join(PROFILES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All profiles; a missing file is an empty store
    pub fn load(&self) -> Result<BTreeMap<String, Profile>> {
        Ok(read_json(&self.path)
            .context("Failed to load profiles")?
            .unwrap_or_default())
    }

    pub fn save(&self, profiles: &BTreeMap<String, Profile>) -> Result<()> {
        write_json(&self.path, profiles).context("Failed to save profiles")
    }

    pub fn get(&self, name: &str) -> Result<Option<Profile>> {
        Ok(self.load()?.remove(name))
    }

    pub fn create(&self, name: &str, profile: Profile) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("Profile name is required.");
        }

        let _guard = self.lock_writes();
        let mut profiles = self.load()?;
        if profiles.contains_key(name) {
            anyhow::bail!("'{}' already exists.", name);
        }

        profiles.insert(name.to_string(), profile.normalized());
        self.save(&profiles)
    }

    pub fn update(&self, name: &str, profile: Profile) -> Result<()> {
        let _guard = self.lock_writes();
        let mut profiles = self.load()?;
        match profiles.get_mut(name) {
            Some(existing) => *existing = profile.normalized(),
            None => anyhow::bail!("Profile '{}' not found.", name),
        }
        self.save(&profiles)
    }

    /// Remove a profile; the last remaining profile cannot be removed
    pub fn remove(&self, name: &str) -> Result<()> {
        let _guard = self.lock_writes();
        let mut profiles = self.load()?;
        if !profiles.contains_key(name) {
            anyhow::bail!("Profile '{}' not found.", name);
        }
        if profiles.len() == 1 {
            anyhow::bail!("Cannot delete '{}': it is the only profile.", name);
        }

        profiles.remove(name);
        self.save(&profiles)
    }
}
