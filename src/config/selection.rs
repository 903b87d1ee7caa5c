use std::fmt;

use crate::error::{GocreteError, Result};

/// A capability drawn from a fixed, enumerated domain.
pub trait Choice: Sized + Copy + 'static {
    /// Field name used in validation errors.
    const FIELD: &'static str;
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(value: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|choice| choice.as_str() == value)
            .ok_or_else(|| GocreteError::InvalidChoice {
                field: Self::FIELD.to_string(),
                value: value.to_string(),
                allowed: Self::allowed(),
            })
    }

    fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|choice| choice.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Router {
    Chi,
    Gin,
    Fiber,
}

impl Choice for Router {
    const FIELD: &'static str = "router";
    const ALL: &'static [Self] = &[Self::Chi, Self::Gin, Self::Fiber];

    fn as_str(self) -> &'static str {
        match self {
            Self::Chi => "chi",
            Self::Gin => "gin",
            Self::Fiber => "fiber",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Database {
    None,
    Postgres,
    Mongo,
}

impl Choice for Database {
    const FIELD: &'static str = "database";
    const ALL: &'static [Self] = &[Self::None, Self::Postgres, Self::Mongo];

    fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Postgres => "postgres",
            Self::Mongo => "mongo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenApiMode {
    None,
    Gen,
    Manual,
}

impl Choice for OpenApiMode {
    const FIELD: &'static str = "openapi";
    const ALL: &'static [Self] = &[Self::None, Self::Gen, Self::Manual];

    fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gen => "gen",
            Self::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migrations {
    None,
    Goose,
}

impl Choice for Migrations {
    const FIELD: &'static str = "migrations";
    const ALL: &'static [Self] = &[Self::None, Self::Goose];

    fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Goose => "goose",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Router, Database, OpenApiMode, Migrations);

/// Raw capability choices as received from the command line.
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub project_name: String,
    pub module_path: String,
    pub router: String,
    pub database: String,
    pub openapi: String,
    pub spec_path: Option<String>,
    pub docker: bool,
    pub migrations: String,
    pub force: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            module_path: String::new(),
            router: Router::Chi.as_str().to_string(),
            database: Database::None.as_str().to_string(),
            openapi: OpenApiMode::None.as_str().to_string(),
            spec_path: None,
            docker: false,
            migrations: Migrations::None.as_str().to_string(),
            force: false,
        }
    }
}

impl InitOptions {
    /// Check every field against its domain, stopping at the first violation.
    pub fn validate(&self) -> Result<Selection> {
        require_non_empty("project_name", &self.project_name)?;
        require_non_empty("module_path", &self.module_path)?;

        Ok(Selection {
            project_name: self.project_name.clone(),
            module_path: self.module_path.clone(),
            router: Router::parse(&self.router)?,
            database: Database::parse(&self.database)?,
            openapi: OpenApiMode::parse(&self.openapi)?,
            spec_path: self.spec_path.clone().filter(|p| !p.is_empty()),
            docker: self.docker,
            migrations: Migrations::parse(&self.migrations)?,
            force: self.force,
        })
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GocreteError::EmptyField {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validated capability choices, built by [`InitOptions::validate`] or
/// [`Selection::for_existing`]. The enum-typed fields keep every choice inside
/// its domain, so downstream code never re-checks them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub project_name: String,
    pub module_path: String,
    pub router: Router,
    pub database: Database,
    pub openapi: OpenApiMode,
    pub spec_path: Option<String>,
    pub docker: bool,
    pub migrations: Migrations,
    pub force: bool,
}

impl Selection {
    /// Selection for a project that already exists on disk: every optional
    /// capability starts disabled and the project name is the last segment
    /// of the module path.
    pub fn for_existing(module_path: &str, router: Router) -> Self {
        let project_name = module_path
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(module_path)
            .to_string();

        Self {
            project_name,
            module_path: module_path.to_string(),
            router,
            database: Database::None,
            openapi: OpenApiMode::None,
            spec_path: None,
            docker: false,
            migrations: Migrations::None,
            force: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn valid_options() -> InitOptions {
        InitOptions {
            project_name: "test".into(),
            module_path: "github.com/test/test".into(),
            ..InitOptions::default()
        }
    }

    #[test]
    fn validate_accepts_defaults() {
        let selection = valid_options().validate().unwrap();
        assert_eq!(selection.router, Router::Chi);
        assert_eq!(selection.database, Database::None);
        assert_eq!(selection.openapi, OpenApiMode::None);
        assert_eq!(selection.migrations, Migrations::None);
    }

    #[rstest]
    #[case("router", "chi, gin, fiber")]
    #[case("database", "none, postgres, mongo")]
    #[case("openapi", "none, gen, manual")]
    #[case("migrations", "none, goose")]
    fn validate_names_the_invalid_field(#[case] field: &str, #[case] domain: &str) {
        let mut options = valid_options();
        match field {
            "router" => options.router = "invalid".into(),
            "database" => options.database = "invalid".into(),
            "openapi" => options.openapi = "invalid".into(),
            _ => options.migrations = "invalid".into(),
        }

        match options.validate() {
            Err(GocreteError::InvalidChoice {
                field: got,
                value,
                allowed,
            }) => {
                assert_eq!(got, field);
                assert_eq!(value, "invalid");
                assert_eq!(allowed, domain);
            }
            other => panic!("expected InvalidChoice, got {other:?}"),
        }
    }

    #[test]
    fn validate_stops_at_first_violation() {
        let options = InitOptions {
            router: "bad-router".into(),
            database: "bad-db".into(),
            ..valid_options()
        };
        let err = options.validate().unwrap_err();
        assert!(matches!(err, GocreteError::InvalidChoice { ref field, .. } if field == "router"));
    }

    #[test]
    fn validate_rejects_empty_module_path() {
        let options = InitOptions {
            module_path: "  ".into(),
            ..valid_options()
        };
        assert!(matches!(
            options.validate(),
            Err(GocreteError::EmptyField { ref field }) if field == "module_path"
        ));
    }

    #[test]
    fn empty_spec_path_is_treated_as_absent() {
        let options = InitOptions {
            spec_path: Some(String::new()),
            ..valid_options()
        };
        assert_eq!(options.validate().unwrap().spec_path, None);
    }

    #[test]
    fn existing_project_name_comes_from_module_path() {
        let selection = Selection::for_existing("github.com/acme/billing", Router::Gin);
        assert_eq!(selection.project_name, "billing");
        assert_eq!(selection.router, Router::Gin);
        assert!(!selection.docker);
    }
}
