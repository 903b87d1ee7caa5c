use std::path::Path;

use regex_lite::Regex;

use crate::config::Router;
use crate::error::{GocreteError, Result};

pub const MANIFEST: &str = "go.mod";

/// The module path declared by the project's `go.mod`, and the router it
/// depends on.
pub fn read_module_path(project: &Path) -> Result<(String, Router)> {
    let path = project.join(MANIFEST);
    if !path.is_file() {
        return Err(GocreteError::ManifestMissing {
            path: project.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(&path).map_err(|e| GocreteError::Io {
        context: format!("reading {}", path.display()),
        source: e,
    })?;

    let module_path = parse_module_path(&text).ok_or(GocreteError::ModulePathMissing { path })?;
    Ok((module_path, detect_router(&text)))
}

pub fn parse_module_path(manifest: &str) -> Option<String> {
    let re = Regex::new(r#"(?m)^\s*module\s+"?([^\s"]+)"?"#).expect("valid regex");
    re.captures(manifest).map(|caps| caps[1].to_string())
}

/// The router a project depends on, judged by its requirements.
pub fn detect_router(manifest: &str) -> Router {
    if manifest.contains("github.com/gin-gonic/gin") {
        Router::Gin
    } else if manifest.contains("github.com/gofiber/fiber") {
        Router::Fiber
    } else {
        Router::Chi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("module github.com/acme/svc\n\ngo 1.22\n", Some("github.com/acme/svc"))]
    #[case("// comment\n  module   example.com/x  \n", Some("example.com/x"))]
    #[case("module \"example.com/quoted\"\n", Some("example.com/quoted"))]
    #[case("go 1.22\nrequire example.com/module v1.0.0\n", None)]
    #[case("", None)]
    fn parses_module_line(#[case] manifest: &str, #[case] expected: Option<&str>) {
        assert_eq!(parse_module_path(manifest).as_deref(), expected);
    }

    #[rstest]
    #[case("require github.com/gin-gonic/gin v1.9.1", Router::Gin)]
    #[case("require (\n\tgithub.com/gofiber/fiber/v2 v2.52.0\n)", Router::Fiber)]
    #[case("require github.com/go-chi/chi/v5 v5.0.12", Router::Chi)]
    #[case("", Router::Chi)]
    fn detects_router(#[case] manifest: &str, #[case] expected: Router) {
        assert_eq!(detect_router(manifest), expected);
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let project = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_module_path(project.path()),
            Err(GocreteError::ManifestMissing { .. })
        ));
    }

    #[test]
    fn manifest_without_module_line_is_an_error() {
        let project = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join(MANIFEST), "go 1.22\n").unwrap();
        assert!(matches!(
            read_module_path(project.path()),
            Err(GocreteError::ModulePathMissing { .. })
        ));
    }

    #[test]
    fn reads_module_path_and_router() {
        let project = tempfile::tempdir().unwrap();
        std::fs::write(
            project.path().join(MANIFEST),
            "module github.com/acme/shop\n\ngo 1.22\n\nrequire github.com/gofiber/fiber/v2 v2.52.0\n",
        )
        .unwrap();
        let (module_path, router) = read_module_path(project.path()).unwrap();
        assert_eq!(module_path, "github.com/acme/shop");
        assert_eq!(router, Router::Fiber);
    }
}
