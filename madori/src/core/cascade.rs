use std::fmt;

use super::error::try_push;
use super::{ActionField, Actions, Matcher, Result, Ruleset, ToggleField, Window};

pub const SUMMARY_SEPARATOR: &str = " → ";
pub const NO_MATCH_SUMMARY: &str = "No rules match this window";
pub const NO_CHANGES: &str = "no visible changes";

/// How many rule names the summary lists before collapsing into "+ more".
const SUMMARY_LIMIT: usize = 3;

/// One matching rule's contribution to the cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeStep {
    pub index: usize,
    pub name: String,
    /// The action fields this rule sets, as written
    pub delta: Actions,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeResult {
    pub steps: Vec<CascadeStep>,
    pub final_actions: Actions,
    pub summary: String,
}

/// Walk the ruleset in order and merge every matching rule's actions.
/// Later rules overwrite the fields earlier rules set.
pub fn resolve(ruleset: &Ruleset, window: &Window, matcher: &Matcher) -> Result<CascadeResult> {
    let mut steps = Vec::new();
    let mut state = Actions::default();

    for (index, rule) in ruleset.iter().enumerate() {
        if !matcher.matches(rule, window) {
            continue;
        }

        let explanation = explain(&state, &rule.actions);
        merge(&mut state, &rule.actions);
        try_push(
            &mut steps,
            CascadeStep {
                index,
                name: rule.display_name(index),
                delta: rule.actions.clone(),
                explanation,
            },
        )?;
    }

    tracing::debug!("{} rule(s) match {}", steps.len(), window.label());
    let summary = summarize(&steps);
    Ok(CascadeResult {
        steps,
        final_actions: state,
        summary,
    })
}

/// Last write wins per field. Float and center carry their set-flag with the
/// value, so they are replaced as a unit.
pub fn merge(state: &mut Actions, delta: &Actions) {
    for field in ActionField::ALL {
        if let Some(value) = delta.get(field) {
            *state.slot_mut(field) = Some(value.to_string());
        }
    }
    for field in ToggleField::ALL {
        if let Some(value) = delta.toggle(field) {
            *state.toggle_mut(field) = Some(value);
        }
    }
}

/// Describe the fields of `delta` that differ from `prior`.
fn explain(prior: &Actions, delta: &Actions) -> String {
    let mut changes = Vec::new();

    for field in ActionField::ALL {
        let Some(new) = delta.get(field) else {
            continue;
        };
        let old = prior.get(field);
        if old != Some(new) {
            changes.push(format!(
                "{}: {} → {}",
                field.key(),
                old.unwrap_or("unset"),
                new
            ));
        }
    }

    for field in ToggleField::ALL {
        let Some(new) = delta.toggle(field) else {
            continue;
        };
        let old = prior.toggle(field);
        if old != Some(new) {
            let old = old.map_or_else(|| "unset".to_string(), |v| v.to_string());
            changes.push(format!("{}: {} → {}", field.key(), old, new));
        }
    }

    if changes.is_empty() {
        NO_CHANGES.to_string()
    } else {
        changes.join(", ")
    }
}

fn summarize(steps: &[CascadeStep]) -> String {
    if steps.is_empty() {
        return NO_MATCH_SUMMARY.to_string();
    }

    let names: Vec<&str> = steps
        .iter()
        .take(SUMMARY_LIMIT)
        .map(|step| step.name.as_str())
        .collect();
    let mut summary = names.join(SUMMARY_SEPARATOR);
    if steps.len() > SUMMARY_LIMIT {
        summary.push_str(" + more");
    }
    summary
}

impl fmt::Display for CascadeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary)?;
        for step in &self.steps {
            writeln!(f, "  [{}] {}: {}", step.index, step.name, step.explanation)?;
        }
        if self.steps.is_empty() {
            return Ok(());
        }

        writeln!(f, "effective:")?;
        for field in ActionField::ALL {
            if let Some(value) = self.final_actions.get(field) {
                writeln!(f, "  {} = {}", field.key(), value)?;
            }
        }
        for field in ToggleField::ALL {
            if let Some(value) = self.final_actions.toggle(field) {
                writeln!(f, "  {} = {}", field.key(), value)?;
            }
        }
        Ok(())
    }
}
