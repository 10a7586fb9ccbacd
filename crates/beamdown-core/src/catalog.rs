//! Platform catalog: which build a platform id downloads and how large it is.

use std::collections::BTreeMap;

use eyre::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::size;

pub const DEFAULT_PLATFORM: &str = "windows";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEntry {
    /// Display name, e.g. `Windows`.
    pub name: String,
    /// Size label, e.g. `420 MB`.
    pub size: String,
}

impl PlatformEntry {
    pub fn new(name: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: size.into(),
        }
    }

    /// Total in MB, falling back to the default size for bad labels.
    pub fn total_mb(&self) -> f64 {
        size::resolve_total(&self.size)
    }
}

/// Platform id → entry, with a fallback for unknown ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCatalog {
    default_id: String,
    default_entry: PlatformEntry,
    entries: BTreeMap<String, PlatformEntry>,
}

impl PlatformCatalog {
    /// Ids are matched case-insensitively. The default id must be present in
    /// `entries`.
    pub fn new(
        default_id: impl AsRef<str>,
        entries: BTreeMap<String, PlatformEntry>,
    ) -> Result<Self> {
        let default_id = normalize_id(default_id.as_ref());
        let entries: BTreeMap<String, PlatformEntry> = entries
            .into_iter()
            .map(|(id, entry)| (normalize_id(&id), entry))
            .collect();
        let Some(default_entry) = entries.get(&default_id).cloned() else {
            bail!("default platform '{default_id}' is not defined in the platform table");
        };
        Ok(Self {
            default_id,
            default_entry,
            entries,
        })
    }

    pub fn builtin() -> Self {
        let default_entry = PlatformEntry::new("Windows", "420 MB");
        let mut entries = BTreeMap::new();
        entries.insert(DEFAULT_PLATFORM.to_string(), default_entry.clone());
        Self {
            default_id: DEFAULT_PLATFORM.to_string(),
            default_entry,
            entries,
        }
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Look up `id`, returning the id actually used alongside its entry.
    pub fn lookup<'a>(&'a self, id: &str) -> (&'a str, &'a PlatformEntry) {
        if let Some((found, entry)) = self.entries.get_key_value(&normalize_id(id)) {
            return (found.as_str(), entry);
        }
        log::debug!("unknown platform '{id}'; using '{}'", self.default_id);
        (self.default_id.as_str(), &self.default_entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlatformEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PlatformCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_id(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_windows() {
        let catalog = PlatformCatalog::builtin();
        let (id, entry) = catalog.lookup("windows");
        assert_eq!(id, "windows");
        assert_eq!(entry.name, "Windows");
        assert_eq!(entry.total_mb(), 420.0);
    }

    #[test]
    fn unknown_platform_falls_back_to_default() {
        let catalog = PlatformCatalog::builtin();
        let (id, entry) = catalog.lookup("amiga");
        assert_eq!(id, "windows");
        assert_eq!(entry.size, "420 MB");
    }

    #[test]
    fn lookup_ignores_case() {
        let catalog = PlatformCatalog::builtin();
        assert_eq!(catalog.lookup(" Windows ").0, "windows");
    }

    #[test]
    fn default_must_exist() {
        let mut entries = BTreeMap::new();
        entries.insert("linux".to_string(), PlatformEntry::new("Linux", "8.2 GB"));
        assert!(PlatformCatalog::new("mac", entries.clone()).is_err());

        let catalog = PlatformCatalog::new("Linux", entries).unwrap();
        assert_eq!(catalog.default_id(), "linux");
        assert_eq!(catalog.lookup("mac").1.name, "Linux");
        assert_eq!(catalog.len(), 1);
    }
}
