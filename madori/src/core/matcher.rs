use std::cell::RefCell;
use std::collections::HashMap;

use regex::Regex;

use super::{MatchField, Rule, Window};

/// Evaluates rule match criteria against window snapshots.
///
/// Patterns are unanchored regular expressions; `^`/`$` anchor explicitly.
/// Compiled patterns are memoized by their text until the owner prunes them
/// with [`Matcher::retain_patterns`]. A pattern that fails to compile never
/// matches anything.
#[derive(Debug, Default)]
pub struct Matcher {
    cache: RefCell<HashMap<String, Option<Regex>>>,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All present match fields must match (logical AND). A rule without
    /// match fields matches every window.
    pub fn matches(&self, rule: &Rule, window: &Window) -> bool {
        rule.matcher.patterns().all(|(field, pattern)| {
            window_attribute(window, field).is_some_and(|value| self.is_match(pattern, value))
        })
    }

    pub fn is_match(&self, pattern: &str, value: &str) -> bool {
        self.with_compiled(pattern, |regex| {
            regex.is_some_and(|regex| regex.is_match(value))
        })
    }

    pub fn is_valid(&self, pattern: &str) -> bool {
        self.with_compiled(pattern, |regex| regex.is_some())
    }

    /// Drop cached patterns for which `keep` returns false.
    pub fn retain_patterns(&self, keep: impl Fn(&str) -> bool) {
        let mut cache = self.cache.borrow_mut();
        let before = cache.len();
        cache.retain(|pattern, _| keep(pattern.as_str()));
        if cache.len() < before {
            tracing::debug!("Evicted {} compiled pattern(s)", before - cache.len());
        }
    }

    #[cfg(test)]
    pub fn is_cached(&self, pattern: &str) -> bool {
        self.cache.borrow().contains_key(pattern)
    }

    fn with_compiled<T>(&self, pattern: &str, f: impl FnOnce(Option<&Regex>) -> T) -> T {
        let mut cache = self.cache.borrow_mut();
        if let Some(compiled) = cache.get(pattern) {
            return f(compiled.as_ref());
        }
        let compiled = cache
            .entry(pattern.to_string())
            .or_insert_with(|| compile(pattern));
        f(compiled.as_ref())
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::debug!("Pattern {:?} does not compile: {}", pattern, e);
            None
        }
    }
}

/// The window attribute a match field is tested against.
pub fn window_attribute(window: &Window, field: MatchField) -> Option<&str> {
    match field {
        MatchField::Class => window.class.as_deref(),
        MatchField::Title => window.title.as_deref(),
        MatchField::InitialClass => window.initial_class.as_deref(),
        MatchField::InitialTitle => window.initial_title.as_deref(),
        MatchField::WorkspaceTag => window.workspace_name.as_deref(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_window(class: &str, title: &str) -> Window {
        Window {
            class: Some(class.to_string()),
            title: Some(title.to_string()),
            initial_class: Some(class.to_string()),
            initial_title: Some(title.to_string()),
            workspace_name: Some("1".to_string()),
            workspace_id: Some(1),
        }
    }

    #[test]
    fn test_rule_without_match_fields_matches_everything() {
        let matcher = Matcher::new();
        let rule = Rule::new();

        assert!(matcher.matches(&rule, &create_window("firefox", "Home")));
        assert!(matcher.matches(&rule, &Window::default()));
    }

    #[test]
    fn test_patterns_are_unanchored() {
        let matcher = Matcher::new();
        let rule = Rule::new().with_match(MatchField::Class, "fire");

        assert!(matcher.matches(&rule, &create_window("firefox", "")));
        assert!(matcher.matches(&rule, &create_window("campfire", "")));
    }

    #[test]
    fn test_explicit_anchors() {
        let matcher = Matcher::new();
        let rule = Rule::new().with_match(MatchField::Class, "^fire$");

        assert!(matcher.matches(&rule, &create_window("fire", "")));
        assert!(!matcher.matches(&rule, &create_window("firefox", "")));
    }

    #[test]
    fn test_all_fields_must_match() {
        let matcher = Matcher::new();
        let rule = Rule::new()
            .with_match(MatchField::Class, "^firefox$")
            .with_match(MatchField::Title, "Picture-in-Picture");

        assert!(matcher.matches(&rule, &create_window("firefox", "Picture-in-Picture")));
        assert!(!matcher.matches(&rule, &create_window("firefox", "GitHub")));
        assert!(!matcher.matches(&rule, &create_window("chromium", "Picture-in-Picture")));
    }

    #[test]
    fn test_absent_window_attribute_never_matches() {
        let matcher = Matcher::new();
        let rule = Rule::new().with_match(MatchField::Title, ".*");
        let window = Window::with_class("kitty");

        assert!(!matcher.matches(&rule, &window));
    }

    #[test]
    fn test_workspace_tag_matches_workspace_name() {
        let matcher = Matcher::new();
        let rule = Rule::new().with_match(MatchField::WorkspaceTag, "^special:");

        let mut window = create_window("kitty", "~");
        assert!(!matcher.matches(&rule, &window));

        window.workspace_name = Some("special:scratch".to_string());
        assert!(matcher.matches(&rule, &window));
    }

    #[test]
    fn test_invalid_pattern_does_not_match() {
        let matcher = Matcher::new();
        let rule = Rule::new().with_match(MatchField::Class, "(unclosed");

        assert!(!matcher.matches(&rule, &create_window("(unclosed", "")));
        assert!(!matcher.is_valid("(unclosed"));
        assert!(matcher.is_valid("^(Steam|steam)$"));
    }

    #[test]
    fn test_posix_bracket_classes() {
        let matcher = Matcher::new();
        assert!(matcher.is_match("^[[:alpha:]]+[[:digit:]]$", "steam1"));
        assert!(!matcher.is_match("^[[:alpha:]]+$", "steam1"));
    }

    #[test]
    fn test_cached_results_are_stable() {
        let matcher = Matcher::new();
        let rule = Rule::new().with_match(MatchField::Class, "^kitty$");
        let window = create_window("kitty", "");

        for _ in 0..3 {
            assert!(matcher.matches(&rule, &window));
        }
        assert_eq!(matcher.cache.borrow().len(), 1);
    }

    #[test]
    fn test_retain_patterns_evicts_unwanted() {
        let matcher = Matcher::new();
        assert!(matcher.is_match("^kitty$", "kitty"));
        assert!(!matcher.is_valid("(broken"));
        assert!(matcher.is_cached("^kitty$"));
        assert!(matcher.is_cached("(broken"));

        matcher.retain_patterns(|pattern| pattern == "^kitty$");
        assert!(matcher.is_cached("^kitty$"));
        assert!(!matcher.is_cached("(broken"));

        // Evicted patterns compile again on demand
        assert!(!matcher.is_match("(broken", "x"));
        assert!(matcher.is_cached("(broken"));
    }
}
