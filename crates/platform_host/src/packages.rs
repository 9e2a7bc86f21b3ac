//! Package catalog models shared by remote adapters and the session handler.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Metadata record describing one installable application.
pub struct PackageMetadata {
    /// Regular-expression sources matched against file MIME types.
    #[serde(default)]
    pub mime: Vec<String>,
    /// Remaining descriptor fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageMetadata {
    /// Creates a record that only declares MIME patterns.
    pub fn with_mime<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mime: patterns.into_iter().map(Into::into).collect(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
/// Application identifier to metadata mapping, in the order the catalog source listed them.
pub struct PackageCatalog {
    entries: IndexMap<String, PackageMetadata>,
}

impl PackageCatalog {
    /// Returns whether the catalog has no applications.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of applications in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Looks up one application's metadata.
    pub fn get(&self, name: &str) -> Option<&PackageMetadata> {
        self.entries.get(name)
    }

    /// Iterates entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PackageMetadata)> {
        self.entries.iter().map(|(name, meta)| (name.as_str(), meta))
    }

    /// Adds or replaces an entry, keeping the original position of a replaced name.
    pub fn insert(&mut self, name: impl Into<String>, metadata: PackageMetadata) {
        self.entries.insert(name.into(), metadata);
    }
}

impl FromIterator<(String, PackageMetadata)> for PackageCatalog {
    fn from_iter<I: IntoIterator<Item = (String, PackageMetadata)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
