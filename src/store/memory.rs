use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::{GocreteError, Result};
use crate::store::{entries_from_files, StoreEntry, TemplateStore};

/// Template store held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file at a `/`-separated store path such as `base/go.mod.tmpl`.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }
}

impl TemplateStore for MemoryStore {
    fn list(&self, bundle: &str) -> Result<Vec<StoreEntry>> {
        let entries = entries_from_files(bundle, self.files.keys().map(String::as_str));
        if entries.is_empty() {
            return Err(GocreteError::BundleNotFound {
                bundle: bundle.to_string(),
            });
        }
        Ok(entries)
    }

    fn read(&self, path: &str) -> Result<Cow<'_, [u8]>> {
        self.files
            .get(path)
            .map(|content| Cow::Borrowed(content.as_slice()))
            .ok_or_else(|| GocreteError::TemplateNotFound {
                path: path.to_string(),
            })
    }
}
