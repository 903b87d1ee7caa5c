use std::collections::BTreeMap;

use tera::{Context, Value};

use crate::config::{Choice, Selection};

pub const PROJECT_NAME: &str = "ProjectName";
pub const MODULE_PATH: &str = "ModulePath";
pub const ROUTER: &str = "Router";
pub const DATABASE: &str = "Database";
pub const OPENAPI: &str = "OpenAPI";
pub const MIGRATIONS: &str = "Migrations";
pub const HAS_DOCKER: &str = "HasDocker";

/// Read-only variables shared by every bundle applied during one run.
#[derive(Debug, Clone)]
pub struct RenderContext {
    variables: BTreeMap<String, Value>,
    tera: Context,
}

impl RenderContext {
    pub fn new(variables: BTreeMap<String, Value>) -> Self {
        let tera = build_context(&variables);
        Self { variables, tera }
    }

    pub fn from_selection(selection: &Selection) -> Self {
        let mut variables = BTreeMap::new();
        variables.insert(PROJECT_NAME.to_string(), Value::from(selection.project_name.as_str()));
        variables.insert(MODULE_PATH.to_string(), Value::from(selection.module_path.as_str()));
        variables.insert(ROUTER.to_string(), Value::from(selection.router.as_str()));
        variables.insert(DATABASE.to_string(), Value::from(selection.database.as_str()));
        variables.insert(OPENAPI.to_string(), Value::from(selection.openapi.as_str()));
        variables.insert(MIGRATIONS.to_string(), Value::from(selection.migrations.as_str()));
        variables.insert(HAS_DOCKER.to_string(), Value::Bool(selection.docker));
        Self::new(variables)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    pub fn variables(&self) -> &BTreeMap<String, Value> {
        &self.variables
    }

    pub(crate) fn as_tera(&self) -> &Context {
        &self.tera
    }
}

impl<K, V> FromIterator<(K, V)> for RenderContext
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn build_context(variables: &BTreeMap<String, Value>) -> Context {
    let mut context = Context::new();
    for (key, value) in variables {
        context.insert(key, value);
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InitOptions;

    #[test]
    fn context_from_selection_has_every_key() {
        let selection = InitOptions {
            project_name: "svc".into(),
            module_path: "github.com/acme/svc".into(),
            database: "postgres".into(),
            docker: true,
            ..InitOptions::default()
        }
        .validate()
        .unwrap();

        let context = RenderContext::from_selection(&selection);
        let keys: Vec<_> = context.variables().keys().cloned().collect();
        assert_eq!(
            keys,
            [
                "Database",
                "HasDocker",
                "Migrations",
                "ModulePath",
                "OpenAPI",
                "ProjectName",
                "Router"
            ]
        );
        assert_eq!(context.get(DATABASE), Some(&Value::from("postgres")));
        assert_eq!(context.get(HAS_DOCKER), Some(&Value::Bool(true)));
    }

    #[test]
    fn collect_from_pairs() {
        let context: RenderContext = [("Name", Value::from("World")), ("Show", Value::from(true))]
            .into_iter()
            .collect();
        assert!(context.contains("Name"));
        assert!(context.contains("Show"));
        assert!(!context.contains("Missing"));
    }
}
