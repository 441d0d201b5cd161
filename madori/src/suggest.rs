use std::path::Path;

use anyhow::{Context, Result};
use madori_ipc::{AppCatalog, AppEntry};

use crate::core::{ActionField, MatchField, Rule, Ruleset};

pub fn load_catalog(path: &Path) -> Result<AppCatalog> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    AppCatalog::from_json(&json).with_context(|| format!("Invalid catalog {}", path.display()))
}

/// Catalog applications none of whose window classes any rule mentions.
pub fn uncovered<'a>(catalog: &'a AppCatalog, ruleset: &Ruleset) -> Vec<&'a AppEntry> {
    catalog
        .apps
        .iter()
        .filter(|app| !app.classes.iter().any(|class| ruleset.covers_class(class)))
        .collect()
}

/// A starting-point rule for an application: matches all of its classes
/// exactly and tags windows with the app's category.
pub fn suggested_rule(app: &AppEntry) -> Rule {
    let alternatives: Vec<String> = app.classes.iter().map(|c| regex::escape(c)).collect();
    let pattern = match alternatives.as_slice() {
        [single] => format!("^{}$", single),
        _ => format!("^({})$", alternatives.join("|")),
    };

    let mut rule = Rule::new()
        .with_name(app.name.clone())
        .with_match(MatchField::Class, pattern);
    if !app.category.is_empty() {
        rule = rule.with_action(ActionField::Tag, app.category.clone());
    }
    rule
}
