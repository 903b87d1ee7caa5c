use std::borrow::Cow;

use rust_embed::RustEmbed;

use crate::error::{GocreteError, Result};
use crate::store::{entries_from_files, StoreEntry, TemplateStore};

#[derive(RustEmbed)]
#[folder = "templates/"]
struct Bundled;

/// The template bundles compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedStore;

impl TemplateStore for EmbeddedStore {
    fn list(&self, bundle: &str) -> Result<Vec<StoreEntry>> {
        let files: Vec<Cow<'static, str>> = Bundled::iter().collect();
        let entries = entries_from_files(bundle, files.iter().map(|f| f.as_ref()));
        if entries.is_empty() {
            return Err(GocreteError::BundleNotFound {
                bundle: bundle.to_string(),
            });
        }
        Ok(entries)
    }

    fn read(&self, path: &str) -> Result<Cow<'_, [u8]>> {
        Bundled::get(path)
            .map(|file| file.data)
            .ok_or_else(|| GocreteError::TemplateNotFound {
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_bundle_is_embedded() {
        for bundle in [
            "base",
            "db/postgres",
            "db/mongo",
            "openapi/gen",
            "openapi/manual",
            "docker",
            "extras/goose",
            "extras/openapi-example",
        ] {
            let entries = EmbeddedStore.list(bundle).unwrap();
            assert!(
                entries.iter().any(|e| !e.is_dir),
                "bundle {bundle} should contain files"
            );
        }
    }

    #[test]
    fn base_bundle_has_manifest_template() {
        let entries = EmbeddedStore.list("base").unwrap();
        let manifest = entries
            .iter()
            .find(|e| e.relative_path == "go.mod.tmpl")
            .expect("base bundle should template go.mod");
        let content = EmbeddedStore.read(&manifest.store_path).unwrap();
        assert!(String::from_utf8_lossy(&content).starts_with("module {{.ModulePath}}"));
    }

    #[test]
    fn unknown_bundle_is_not_found() {
        assert!(matches!(
            EmbeddedStore.list("db/mysql"),
            Err(GocreteError::BundleNotFound { .. })
        ));
    }
}
