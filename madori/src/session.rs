use std::collections::HashSet;

use anyhow::{Context, Result};

use crate::core::{
    analyze, parse_file, resolve, rule_to_commented_dsl, to_dsl, CascadeResult, ChangeKind,
    HistoryStack, HistoryStep, Matcher, Report, Rule, Ruleset, Settings, Window,
};

/// Everything one editing session owns: the live ruleset, rules that were
/// disabled during the session, the undo log and the pattern cache.
pub struct Session {
    settings: Settings,
    ruleset: Ruleset,
    disabled: Vec<Rule>,
    history: HistoryStack,
    matcher: Matcher,
}

impl Session {
    pub fn new(settings: Settings, ruleset: Ruleset) -> Self {
        let history = HistoryStack::new(settings.history_capacity);
        Self {
            settings,
            ruleset,
            disabled: Vec::new(),
            history,
            matcher: Matcher::new(),
        }
    }

    pub fn load(settings: Settings) -> Result<Self> {
        let ruleset = parse_file(&settings.config_path)?;
        Ok(Self::new(settings, ruleset))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn disabled(&self) -> &[Rule] {
        &self.disabled
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    fn rule_at(&self, index: usize) -> Result<&Rule> {
        self.ruleset.get(index).with_context(|| {
            format!(
                "no rule at index {} ({} rule(s) loaded)",
                index,
                self.ruleset.len()
            )
        })
    }

    /// Replace the rule at `index` with `rule`. Identical content is not recorded.
    pub fn edit(&mut self, index: usize, rule: Rule, description: impl Into<String>) -> Result<()> {
        let before = self.rule_at(index)?.clone();
        if before == rule {
            return Ok(());
        }

        let description = description.into();
        tracing::info!("Edit rule {}: {}", index, description);
        self.history
            .record(ChangeKind::Edit, index, &before, &rule, description);
        self.ruleset.replace(index, rule);
        self.prune_patterns();
        Ok(())
    }

    pub fn set_field(&mut self, index: usize, key: &str, value: &str) -> Result<()> {
        let mut rule = self.rule_at(index)?.clone();
        rule.set(key, value)?;
        self.edit(index, rule, format!("set {} = {}", key, value))
    }

    /// Returns whether the field was present.
    pub fn unset_field(&mut self, index: usize, key: &str) -> Result<bool> {
        let mut rule = self.rule_at(index)?.clone();
        if !rule.unset(key) {
            return Ok(false);
        }
        self.edit(index, rule, format!("unset {}", key))?;
        Ok(true)
    }

    /// An empty name clears it.
    pub fn rename(&mut self, index: usize, name: &str) -> Result<()> {
        let before = self.rule_at(index)?.clone();
        let mut after = before.clone();
        after.name = (!name.is_empty()).then(|| name.to_string());
        if before == after {
            return Ok(());
        }

        let description = format!(
            "rename {} -> {}",
            before.display_name(index),
            after.display_name(index)
        );
        tracing::info!("Rename rule {}: {}", index, description);
        self.history
            .record(ChangeKind::Rename, index, &before, &after, description);
        self.ruleset.replace(index, after);
        Ok(())
    }

    pub fn delete(&mut self, index: usize) -> Result<Rule> {
        let before = self.rule_at(index)?.clone();
        let description = format!("delete {}", before.display_name(index));
        tracing::info!("Delete rule {}: {}", index, description);

        self.history
            .record(ChangeKind::Delete, index, &before, &Rule::new(), description);
        self.ruleset.remove(index);
        self.prune_patterns();
        Ok(before)
    }

    /// Take a rule out of the cascade without losing it; it is exported
    /// as a commented-out block.
    pub fn disable(&mut self, index: usize) -> Result<()> {
        let rule = self.rule_at(index)?.clone();
        let description = format!("disable {}", rule.display_name(index));
        tracing::info!("Disable rule {}: {}", index, description);

        self.history
            .record(ChangeKind::Disable, index, &rule, &rule, description);
        self.ruleset.remove(index);
        self.disabled.push(rule);
        self.prune_patterns();
        Ok(())
    }

    /// Revert the latest change. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<Option<ChangeKind>> {
        let Some(step) = self.history.undo() else {
            return Ok(None);
        };
        tracing::info!("Undo {} of rule {}", step.kind, step.index);

        let kind = step.kind;
        match kind {
            ChangeKind::Edit | ChangeKind::Rename => self.replace_from_history(step)?,
            ChangeKind::Delete => self.ruleset.insert(step.index, step.rule),
            ChangeKind::Disable => {
                if let Some(pos) = self.disabled.iter().rposition(|r| *r == step.rule) {
                    self.disabled.remove(pos);
                }
                self.ruleset.insert(step.index, step.rule);
            }
        }
        self.prune_patterns();
        Ok(Some(kind))
    }

    /// Re-apply the change after the history cursor. `None` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Result<Option<ChangeKind>> {
        let Some(step) = self.history.redo() else {
            return Ok(None);
        };
        tracing::info!("Redo {} of rule {}", step.kind, step.index);

        let kind = step.kind;
        match kind {
            ChangeKind::Edit | ChangeKind::Rename => self.replace_from_history(step)?,
            ChangeKind::Delete | ChangeKind::Disable => {
                let removed = self.ruleset.remove(step.index).with_context(|| {
                    format!("history refers to missing rule {}", step.index)
                })?;
                if removed != step.rule {
                    tracing::warn!("Rule {} changed outside the history log", step.index);
                }
                if kind == ChangeKind::Disable {
                    self.disabled.push(removed);
                }
            }
        }
        self.prune_patterns();
        Ok(Some(kind))
    }

    /// Forget compiled patterns no active rule uses any more.
    fn prune_patterns(&self) {
        let live: HashSet<&str> = self
            .ruleset
            .iter()
            .flat_map(|rule| rule.matcher.patterns().map(|(_, pattern)| pattern))
            .collect();
        self.matcher.retain_patterns(|pattern| live.contains(pattern));
    }

    fn replace_from_history(&mut self, step: HistoryStep) -> Result<()> {
        self.ruleset
            .replace(step.index, step.rule)
            .with_context(|| format!("history refers to missing rule {}", step.index))?;
        Ok(())
    }

    pub fn resolve(&self, window: &Window) -> Result<CascadeResult> {
        Ok(resolve(&self.ruleset, window, &self.matcher)?)
    }

    pub fn analyze(&self, windows: Option<&[Window]>) -> Result<Report> {
        Ok(analyze(&self.ruleset, windows, &self.matcher)?)
    }

    /// Active rules as DSL, followed by disabled rules commented out.
    pub fn export(&self) -> String {
        let mut out = to_dsl(&self.ruleset);
        for rule in &self.disabled {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&rule_to_commented_dsl(rule));
        }
        out
    }
}
