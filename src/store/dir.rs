use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{GocreteError, Result};
use crate::store::{store_path, StoreEntry, TemplateStore};

/// Template store backed by a directory on disk, one subdirectory per bundle.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateStore for DirStore {
    fn list(&self, bundle: &str) -> Result<Vec<StoreEntry>> {
        let bundle = bundle.trim_matches('/');
        let bundle_dir = self.root.join(bundle);
        if !bundle_dir.is_dir() {
            return Err(GocreteError::BundleNotFound {
                bundle: bundle.to_string(),
            });
        }

        let mut listing: BTreeMap<String, bool> = BTreeMap::new();
        for entry in WalkDir::new(&bundle_dir).min_depth(1).follow_links(true) {
            let entry = entry.map_err(|e| GocreteError::Io {
                context: format!("walking template bundle {}", bundle_dir.display()),
                source: e.into(),
            })?;

            let file_type = entry.file_type();
            if entry.path_is_symlink() {
                debug!(path = %entry.path().display(), "following symlinked template entry");
            }

            let rel = entry
                .path()
                .strip_prefix(&bundle_dir)
                .expect("entry must be under bundle_dir");
            let relative = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            listing.insert(relative, file_type.is_dir());
        }

        if listing.is_empty() {
            return Err(GocreteError::BundleNotFound {
                bundle: bundle.to_string(),
            });
        }

        Ok(listing
            .into_iter()
            .map(|(relative_path, is_dir)| StoreEntry {
                store_path: store_path(bundle, &relative_path),
                relative_path,
                is_dir,
            })
            .collect())
    }

    fn read(&self, path: &str) -> Result<Cow<'_, [u8]>> {
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(GocreteError::TemplateNotFound {
                path: path.to_string(),
            });
        }

        let full_path = self.root.join(relative);
        match std::fs::read(&full_path) {
            Ok(content) => Ok(Cow::Owned(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(GocreteError::TemplateNotFound {
                    path: path.to_string(),
                })
            }
            Err(e) => Err(GocreteError::Io {
                context: format!("reading template {}", full_path.display()),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn lists_bundle_lexicographically() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "base/go.mod.tmpl", "module {{.ModulePath}}");
        write(root.path(), "base/cmd/server/main.go.tmpl", "package main");
        write(root.path(), "base/cmd.txt", "x");
        std::fs::create_dir_all(root.path().join("base/empty")).unwrap();

        let store = DirStore::new(root.path());
        let entries = store.list("base").unwrap();
        let listed: Vec<_> = entries
            .iter()
            .map(|e| (e.relative_path.as_str(), e.is_dir))
            .collect();
        assert_eq!(
            listed,
            [
                ("cmd", true),
                ("cmd.txt", false),
                ("cmd/server", true),
                ("cmd/server/main.go.tmpl", false),
                ("empty", true),
                ("go.mod.tmpl", false),
            ]
        );

        let content = store.read(&entries[1].store_path).unwrap();
        assert_eq!(content.as_ref(), b"x");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_entries_are_followed() {
        let root = tempfile::tempdir().unwrap();
        let shared = tempfile::tempdir().unwrap();
        write(shared.path(), "LICENSE", "MIT");
        write(shared.path(), "docs/index.md.tmpl", "# {{.ProjectName}}");
        write(root.path(), "base/go.mod.tmpl", "module x");
        std::os::unix::fs::symlink(shared.path().join("LICENSE"), root.path().join("base/LICENSE"))
            .unwrap();
        std::os::unix::fs::symlink(shared.path().join("docs"), root.path().join("base/docs")).unwrap();

        let store = DirStore::new(root.path());
        let entries = store.list("base").unwrap();
        let listed: Vec<_> = entries
            .iter()
            .map(|e| (e.relative_path.as_str(), e.is_dir))
            .collect();
        assert_eq!(
            listed,
            [
                ("LICENSE", false),
                ("docs", true),
                ("docs/index.md.tmpl", false),
                ("go.mod.tmpl", false),
            ]
        );
        assert_eq!(store.read("base/LICENSE").unwrap().as_ref(), b"MIT");
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_an_io_error() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "base/go.mod.tmpl", "module x");
        std::os::unix::fs::symlink(root.path().join("gone"), root.path().join("base/broken")).unwrap();

        let store = DirStore::new(root.path());
        assert!(matches!(store.list("base"), Err(GocreteError::Io { .. })));
    }

    #[test]
    fn missing_bundle_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let store = DirStore::new(root.path());
        assert!(matches!(
            store.list("docker"),
            Err(GocreteError::BundleNotFound { .. })
        ));
    }

    #[test]
    fn read_rejects_parent_traversal() {
        let root = tempfile::tempdir().unwrap();
        let store = DirStore::new(root.path().join("templates"));
        write(root.path(), "secret.txt", "s");
        assert!(matches!(
            store.read("../secret.txt"),
            Err(GocreteError::TemplateNotFound { .. })
        ));
    }
}
