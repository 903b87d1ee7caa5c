mod dir;
mod embedded;
mod memory;

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::Result;

pub use dir::DirStore;
pub use embedded::EmbeddedStore;
pub use memory::MemoryStore;

/// One entry of a bundle, relative to the bundle root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    /// `/`-separated path relative to the bundle root.
    pub relative_path: String,
    /// Full store path, suitable for [`TemplateStore::read`].
    pub store_path: String,
    pub is_dir: bool,
}

/// Read-only source of template bundles.
///
/// Implementations list entries in byte-wise lexicographic order of the
/// relative path, so every directory precedes its contents and repeated walks
/// are identical.
pub trait TemplateStore {
    /// Every entry beneath `bundle`, excluding the bundle root itself.
    fn list(&self, bundle: &str) -> Result<Vec<StoreEntry>>;

    fn read(&self, path: &str) -> Result<Cow<'_, [u8]>>;
}

/// Join a bundle id and a relative path into a store path.
pub fn store_path(bundle: &str, relative: &str) -> String {
    let bundle = bundle.trim_matches('/');
    if bundle.is_empty() {
        relative.to_string()
    } else {
        format!("{bundle}/{relative}")
    }
}

/// Build a sorted entry listing from the file paths of a flat store,
/// synthesizing the intermediate directories.
pub(crate) fn entries_from_files<'a>(
    bundle: &str,
    files: impl IntoIterator<Item = &'a str>,
) -> Vec<StoreEntry> {
    let bundle = bundle.trim_matches('/');
    let prefix = if bundle.is_empty() {
        String::new()
    } else {
        format!("{bundle}/")
    };

    let mut listing: BTreeMap<String, bool> = BTreeMap::new();
    for file in files {
        let Some(relative) = file.strip_prefix(prefix.as_str()) else {
            continue;
        };
        if relative.is_empty() {
            continue;
        }
        let mut end = 0;
        while let Some(slash) = relative[end..].find('/') {
            end += slash;
            listing.insert(relative[..end].to_string(), true);
            end += 1;
        }
        listing.insert(relative.to_string(), false);
    }

    listing
        .into_iter()
        .map(|(relative_path, is_dir)| StoreEntry {
            store_path: store_path(bundle, &relative_path),
            relative_path,
            is_dir,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_include_parent_directories_in_order() {
        let files = [
            "base/cmd/server/main.go.tmpl",
            "base/.gitignore",
            "base/go.mod.tmpl",
            "base/cmd/tool.go",
            "db/postgres/x.go",
        ];
        let entries = entries_from_files("base", files);
        let listed: Vec<_> = entries
            .iter()
            .map(|e| (e.relative_path.as_str(), e.is_dir))
            .collect();
        assert_eq!(
            listed,
            [
                (".gitignore", false),
                ("cmd", true),
                ("cmd/server", true),
                ("cmd/server/main.go.tmpl", false),
                ("cmd/tool.go", false),
                ("go.mod.tmpl", false),
            ]
        );
        assert_eq!(entries[3].store_path, "base/cmd/server/main.go.tmpl");
    }

    #[test]
    fn bundle_prefix_must_match_a_whole_segment() {
        let entries = entries_from_files("db/postgres", ["db/postgres-extra/a.go", "db/postgres/b.go"]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].relative_path, "b.go");
    }

    #[test]
    fn store_path_ignores_stray_slashes() {
        assert_eq!(store_path("/docker/", "Dockerfile"), "docker/Dockerfile");
        assert_eq!(store_path("", "Dockerfile"), "Dockerfile");
    }
}
