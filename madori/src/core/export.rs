use std::fmt::Write;

use super::{ActionField, MatchField, Rule, Ruleset, ToggleField};

/// Render a ruleset as `windowrule` blocks separated by blank lines.
pub fn to_dsl(ruleset: &Ruleset) -> String {
    ruleset
        .iter()
        .map(rule_to_dsl)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fields are emitted in a fixed order: match fields, name, actions, then
/// extras as they were encountered.
pub fn rule_to_dsl(rule: &Rule) -> String {
    let mut out = String::from("windowrule {\n");
    let mut line = |key: &str, value: &str| {
        // Writing to a String cannot fail
        let _ = writeln!(out, "    {} = {}", key, value);
    };

    for field in MatchField::ALL {
        if let Some(pattern) = rule.matcher.get(field) {
            line(field.key(), pattern);
        }
    }
    if let Some(name) = &rule.name {
        line("name", name);
    }
    for field in ActionField::ALL {
        if let Some(value) = rule.actions.get(field) {
            line(field.key(), value);
        }
    }
    for field in ToggleField::ALL {
        if let Some(value) = rule.actions.toggle(field) {
            line(field.key(), if value { "true" } else { "false" });
        }
    }
    for (key, value) in &rule.extras {
        line(key, value);
    }

    out.push_str("}\n");
    out
}

/// Render a rule as a commented-out block, the way disabled rules are kept.
pub fn rule_to_commented_dsl(rule: &Rule) -> String {
    rule_to_dsl(rule)
        .lines()
        .map(|line| format!("# {}\n", line))
        .collect()
}
