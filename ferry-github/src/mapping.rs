//! Source-to-target issue number mapping

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::Result;

/// Source issue number to target issue number, filled as target issues are
/// created. Entries are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierMapping {
    entries: BTreeMap<u64, u64>,
}

impl IdentifierMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a created target issue. Returns false, leaving the mapping
    /// unchanged, if `source` is already mapped.
    pub fn record(&mut self, source: u64, target: u64) -> bool {
        if self.entries.contains_key(&source) {
            return false;
        }
        self.entries.insert(source, target);
        true
    }

    pub fn get(&self, source: u64) -> Option<u64> {
        self.entries.get(&source).copied()
    }

    pub fn contains(&self, source: u64) -> bool {
        self.entries.contains_key(&source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs in ascending source order
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.entries.iter().map(|(s, t)| (*s, *t))
    }

    pub fn to_json(&self) -> String {
        // A map of integers always serializes
        serde_json::to_string(&self.entries).unwrap_or_default()
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json())?;
        Ok(())
    }
}

impl fmt::Display for IdentifierMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (source, target)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", source, target)?;
        }
        f.write_str("}")
    }
}

/// Receives the mapping when a run ends, successfully or not
pub trait MappingSink: Send + Sync {
    fn surface(&self, mapping: &IdentifierMapping);
}

/// Logs the mapping and optionally writes it to a JSON file
#[derive(Debug, Clone, Default)]
pub struct LogMappingSink {
    pub file: Option<std::path::PathBuf>,
}

impl LogMappingSink {
    pub fn new(file: Option<std::path::PathBuf>) -> Self {
        Self { file }
    }
}

impl MappingSink for LogMappingSink {
    fn surface(&self, mapping: &IdentifierMapping) {
        info!(count = mapping.len(), "Issue map of issues written: {}", mapping);

        if let Some(path) = &self.file {
            match mapping.write_to(path) {
                Ok(()) => info!(path = %path.display(), "Wrote issue map"),
                Err(e) => error!(path = %path.display(), error = %e, "Failed to write issue map"),
            }
        }
    }
}
