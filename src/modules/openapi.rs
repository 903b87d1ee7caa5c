use std::path::{Path, PathBuf};

use crate::error::{GocreteError, Result};
use crate::modules::{ModuleContext, ModuleOutcome};
use crate::overlay::{apply_bundle, write_file};

const EXAMPLE_SPEC_BUNDLE: &str = "extras/openapi-example";

/// Where the project keeps its OpenAPI document.
pub(crate) fn spec_target() -> PathBuf {
    PathBuf::from("api").join("openapi.yaml")
}

/// Copy the supplied spec into the project, or write an example spec when
/// the supplied path does not exist yet.
pub(super) fn gen_extras(cx: &ModuleContext<'_>, outcome: &mut ModuleOutcome) -> Result<()> {
    let Some(spec_path) = cx.selection.spec_path.as_deref() else {
        return Ok(());
    };

    let source = Path::new(spec_path);
    if source.is_file() {
        let content = std::fs::read(source).map_err(|e| GocreteError::Io {
            context: format!("reading OpenAPI spec {}", source.display()),
            source: e,
        })?;
        let target = spec_target();
        write_file(&cx.project_path.join(&target), &content)?;
        outcome.extra_files.push(target);
    } else {
        let problem = if source.exists() { "is not a file" } else { "not found" };
        outcome.notes.push(format!(
            "spec {spec_path} {problem}; wrote an example spec to {}",
            spec_target().display()
        ));
        outcome.applied.push(apply_bundle(
            cx.store,
            EXAMPLE_SPEC_BUNDLE,
            cx.project_path,
            cx.variables,
        )?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InitOptions, Selection};
    use crate::modules::Module;
    use crate::render::RenderContext;
    use crate::store::EmbeddedStore;

    fn selection(spec_path: Option<String>) -> Selection {
        InitOptions {
            project_name: "billing".into(),
            module_path: "github.com/acme/billing".into(),
            openapi: "gen".into(),
            spec_path,
            ..InitOptions::default()
        }
        .validate()
        .unwrap()
    }

    fn apply(selection: &Selection, dest: &Path) -> ModuleOutcome {
        let variables = RenderContext::from_selection(selection);
        let cx = ModuleContext {
            store: &EmbeddedStore,
            project_path: dest,
            selection,
            variables: &variables,
        };
        Module::OpenApiGen.apply(&cx).unwrap()
    }

    #[test]
    fn existing_spec_is_copied() {
        let scratch = tempfile::tempdir().unwrap();
        let spec = scratch.path().join("api.yaml");
        std::fs::write(&spec, "openapi: 3.0.0\ninfo:\n  title: Mine\n").unwrap();
        let dest = tempfile::tempdir().unwrap();

        let outcome = apply(&selection(Some(spec.display().to_string())), dest.path());

        assert_eq!(outcome.extra_files, [spec_target()]);
        assert_eq!(
            std::fs::read_to_string(dest.path().join(spec_target())).unwrap(),
            "openapi: 3.0.0\ninfo:\n  title: Mine\n"
        );
    }

    #[test]
    fn missing_spec_writes_example() {
        let scratch = tempfile::tempdir().unwrap();
        let spec = scratch.path().join("does-not-exist.yaml");
        let dest = tempfile::tempdir().unwrap();

        let outcome = apply(&selection(Some(spec.display().to_string())), dest.path());

        assert_eq!(outcome.notes.len(), 1);
        assert!(outcome.notes[0].contains("not found"));
        let example = std::fs::read_to_string(dest.path().join(spec_target())).unwrap();
        assert!(example.contains("title: billing API"));
    }

    #[test]
    fn directory_spec_path_is_reported_as_not_a_file() {
        let scratch = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();

        let outcome = apply(&selection(Some(scratch.path().display().to_string())), dest.path());

        assert_eq!(outcome.notes.len(), 1);
        assert!(outcome.notes[0].contains("is not a file"), "{}", outcome.notes[0]);
        assert!(outcome.extra_files.is_empty());
        assert!(dest.path().join(spec_target()).is_file());
    }

    #[test]
    fn no_spec_path_writes_no_spec() {
        let dest = tempfile::tempdir().unwrap();
        let outcome = apply(&selection(None), dest.path());

        assert!(outcome.extra_files.is_empty());
        assert!(!dest.path().join(spec_target()).exists());
        assert!(dest.path().join("Makefile").exists());
    }
}
