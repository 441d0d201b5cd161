use super::Rule;

/// Ordered collection of rules. Order is cascade precedence: a later
/// matching rule overrides the fields an earlier one set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ruleset {
    rules: Vec<Rule>,
}

impl Ruleset {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rules: Vec::with_capacity(capacity),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Replace the rule at `index` as a whole, returning the previous one.
    pub fn replace(&mut self, index: usize, rule: Rule) -> Option<Rule> {
        let slot = self.rules.get_mut(index)?;
        Some(std::mem::replace(slot, rule))
    }

    /// Insert at `index`; an index past the end appends.
    pub fn insert(&mut self, index: usize, rule: Rule) {
        let index = index.min(self.rules.len());
        self.rules.insert(index, rule);
    }

    pub fn remove(&mut self, index: usize) -> Option<Rule> {
        (index < self.rules.len()).then(|| self.rules.remove(index))
    }

    /// Whether any rule's class pattern mentions `class`, ignoring case.
    pub fn covers_class(&self, class: &str) -> bool {
        let needle = class.to_lowercase();
        self.rules.iter().any(|rule| {
            rule.matcher
                .class
                .as_deref()
                .is_some_and(|pattern| pattern.to_lowercase().contains(&needle))
        })
    }
}

impl From<Vec<Rule>> for Ruleset {
    fn from(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl<'a> IntoIterator for &'a Ruleset {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
