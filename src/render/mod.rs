pub mod context;
mod dialect;

use std::collections::HashMap;

use tera::{Tera, Value};
use thiserror::Error;

use crate::error::{GocreteError, Result};

pub use context::RenderContext;

/// Why a template failed to render.
#[derive(Debug, Error)]
pub enum RenderFault {
    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("variable '{name}' is not defined")]
    Undefined { name: String },

    #[error("template is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("evaluation failed")]
    Evaluation(#[from] tera::Error),
}

/// Render template text against the context. `template` only names the
/// template in errors.
pub fn render(template: &str, text: &str, context: &RenderContext) -> Result<String> {
    render_text(template, text, context).map_err(|source| GocreteError::RenderError {
        template: template.to_string(),
        source,
    })
}

/// Like [`render`], for template bytes read from a store.
pub fn render_bytes(template: &str, bytes: Vec<u8>, context: &RenderContext) -> Result<Vec<u8>> {
    let text = String::from_utf8(bytes).map_err(|e| GocreteError::RenderError {
        template: template.to_string(),
        source: RenderFault::Encoding(e),
    })?;
    render(template, &text, context).map(String::into_bytes)
}

fn render_text(
    template: &str,
    text: &str,
    context: &RenderContext,
) -> std::result::Result<String, RenderFault> {
    let compiled = dialect::compile(text)?;

    if let Some(name) = compiled.references.iter().find(|name| !context.contains(name)) {
        return Err(RenderFault::Undefined { name: name.clone() });
    }

    let mut tera = Tera::default();
    tera.autoescape_on(Vec::new());
    tera.register_filter(dialect::DISPLAY_FILTER, display);
    tera.add_raw_template(template, &compiled.source)?;
    Ok(tera.render(template, context.as_tera())?)
}

/// Lists print space-separated in brackets, as Go's templates print them.
fn display(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(match value {
        Value::Array(_) => Value::String(go_format(value)),
        other => other.clone(),
    })
}

fn go_format(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let items: Vec<_> = items.iter().map(go_format).collect();
            format!("[{}]", items.join(" "))
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
