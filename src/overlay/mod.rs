use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{GocreteError, Result};
use crate::render::{render_bytes, RenderContext};
use crate::store::{StoreEntry, TemplateStore};

/// Files ending in this suffix are rendered and written without it.
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// What one bundle application wrote, relative to the destination root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedBundle {
    pub bundle: String,
    pub directories: Vec<PathBuf>,
    pub files_rendered: Vec<PathBuf>,
    pub files_copied: Vec<PathBuf>,
}

impl AppliedBundle {
    fn new(bundle: &str) -> Self {
        Self {
            bundle: bundle.to_string(),
            ..Self::default()
        }
    }

    /// Every file written, in walk order per kind.
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.files_rendered.iter().chain(self.files_copied.iter())
    }
}

/// Apply one bundle beneath `dest`.
///
/// Entries are processed in store order. Existing files at the same path are
/// replaced; nothing already written is rolled back if a later entry fails.
pub fn apply_bundle(
    store: &dyn TemplateStore,
    bundle: &str,
    dest: &Path,
    context: &RenderContext,
) -> Result<AppliedBundle> {
    let entries = store.list(bundle)?;
    info!(bundle, dest = %dest.display(), "applying bundle");

    let mut applied = AppliedBundle::new(bundle);
    for entry in &entries {
        apply_entry(store, entry, dest, context, &mut applied).map_err(|e| {
            GocreteError::Apply {
                bundle: bundle.to_string(),
                path: to_path(&entry.relative_path),
                source: Box::new(e),
            }
        })?;
    }

    Ok(applied)
}

fn apply_entry(
    store: &dyn TemplateStore,
    entry: &StoreEntry,
    dest: &Path,
    context: &RenderContext,
    applied: &mut AppliedBundle,
) -> Result<()> {
    if entry.is_dir {
        let rel = to_path(&entry.relative_path);
        create_dir(&dest.join(&rel))?;
        applied.directories.push(rel);
        return Ok(());
    }

    let content = store.read(&entry.store_path)?.into_owned();
    let (target, is_template) = destination_path(&entry.relative_path);

    let content = if is_template {
        render_bytes(&entry.store_path, content, context)?
    } else {
        content
    };

    write_file(&dest.join(&target), &content)?;
    debug!(path = %target.display(), rendered = is_template, "wrote file");

    if is_template {
        applied.files_rendered.push(target);
    } else {
        applied.files_copied.push(target);
    }
    Ok(())
}

/// Destination path for a bundle entry, and whether it is a template.
pub fn destination_path(relative: &str) -> (PathBuf, bool) {
    match relative.strip_suffix(TEMPLATE_SUFFIX) {
        Some(stripped) if !stripped.is_empty() && !stripped.ends_with('/') => {
            (to_path(stripped), true)
        }
        _ => (to_path(relative), false),
    }
}

fn to_path(relative: &str) -> PathBuf {
    relative.split('/').filter(|s| !s.is_empty()).collect()
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| GocreteError::Io {
        context: format!("creating directory {}", path.display()),
        source: e,
    })
}

/// Write `content` to `path`, creating missing parent directories first.
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    std::fs::write(path, content).map_err(|e| GocreteError::Io {
        context: format!("writing {}", path.display()),
        source: e,
    })
}
