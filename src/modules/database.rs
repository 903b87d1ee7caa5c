use crate::config::Migrations;
use crate::error::Result;
use crate::modules::{ModuleContext, ModuleOutcome};
use crate::overlay::apply_bundle;

const GOOSE_BUNDLE: &str = "extras/goose";

pub(super) fn postgres_extras(cx: &ModuleContext<'_>, outcome: &mut ModuleOutcome) -> Result<()> {
    if cx.selection.migrations == Migrations::Goose {
        outcome.applied.push(apply_bundle(
            cx.store,
            GOOSE_BUNDLE,
            cx.project_path,
            cx.variables,
        )?);
    }
    Ok(())
}

pub(super) fn mongo_extras(cx: &ModuleContext<'_>, outcome: &mut ModuleOutcome) {
    if cx.selection.migrations == Migrations::Goose {
        outcome
            .notes
            .push("goose migrations are SQL-only; none were generated for mongo".to_string());
    }
}
