//! MIME-type to application resolution over the package catalog.

use platform_host::PackageCatalog;
use regex::Regex;

/// Compiled MIME patterns for every catalog entry, in catalog order.
///
/// Built once per applied catalog so lookups never recompile patterns. Patterns that fail to
/// compile are skipped for that entry.
#[derive(Debug, Clone, Default)]
pub struct MimeIndex {
    entries: Vec<(String, Vec<Regex>)>,
}

impl MimeIndex {
    pub fn from_catalog(catalog: &PackageCatalog) -> Self {
        let entries = catalog
            .iter()
            .map(|(name, meta)| {
                let patterns = meta
                    .mime
                    .iter()
                    .filter_map(|pattern| match Regex::new(pattern) {
                        Ok(regex) => Some(regex),
                        Err(err) => {
                            tracing::warn!(
                                application = name,
                                pattern = pattern.as_str(),
                                error = %err,
                                "skipping invalid MIME pattern"
                            );
                            None
                        }
                    })
                    .collect();
                (name.to_string(), patterns)
            })
            .collect();
        Self { entries }
    }

    /// Applications with at least one pattern matching `mime` anywhere in the string.
    ///
    /// Each application appears once, in catalog order.
    pub fn applications_for(&self, mime: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, patterns)| patterns.iter().any(|regex| regex.is_match(mime)))
            .map(|(name, _)| name.clone())
            .collect()
    }
}
