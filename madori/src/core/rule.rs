use thiserror::Error;

/// Window attribute a rule can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchField {
    Class,
    Title,
    InitialClass,
    InitialTitle,
    /// Matched against the window's workspace name
    WorkspaceTag,
}

impl MatchField {
    pub const ALL: [MatchField; 5] = [
        MatchField::Class,
        MatchField::Title,
        MatchField::InitialClass,
        MatchField::InitialTitle,
        MatchField::WorkspaceTag,
    ];

    /// Canonical DSL key, used when exporting.
    pub fn key(self) -> &'static str {
        match self {
            MatchField::Class => "match:class",
            MatchField::Title => "match:title",
            MatchField::InitialClass => "match:initial_class",
            MatchField::InitialTitle => "match:initial_title",
            MatchField::WorkspaceTag => "match:tag",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "match:class" => Some(MatchField::Class),
            "match:title" => Some(MatchField::Title),
            "match:initialClass" | "match:initial_class" => Some(MatchField::InitialClass),
            "match:initialTitle" | "match:initial_title" => Some(MatchField::InitialTitle),
            "match:tag" => Some(MatchField::WorkspaceTag),
            _ => None,
        }
    }
}

/// String-valued action a rule can set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionField {
    Tag,
    Workspace,
    Opacity,
    Size,
    Move,
}

impl ActionField {
    pub const ALL: [ActionField; 5] = [
        ActionField::Tag,
        ActionField::Workspace,
        ActionField::Opacity,
        ActionField::Size,
        ActionField::Move,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ActionField::Tag => "tag",
            ActionField::Workspace => "workspace",
            ActionField::Opacity => "opacity",
            ActionField::Size => "size",
            ActionField::Move => "move",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// Boolean action carried as "not mentioned" / explicitly true / explicitly false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleField {
    Float,
    Center,
}

impl ToggleField {
    pub const ALL: [ToggleField; 2] = [ToggleField::Float, ToggleField::Center];

    pub fn key(self) -> &'static str {
        match self {
            ToggleField::Float => "float",
            ToggleField::Center => "center",
        }
    }
}

/// Classification of a `key = value` line inside a `windowrule` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Match(MatchField),
    Action(ActionField),
    Toggle(ToggleField),
    Name,
    /// A `match:*` key this model does not understand
    UnknownMatch,
    Extra,
}

impl Directive {
    pub fn from_key(key: &str) -> Self {
        if let Some(field) = MatchField::from_key(key) {
            return Directive::Match(field);
        }
        if key.starts_with("match:") {
            return Directive::UnknownMatch;
        }
        if let Some(field) = ActionField::from_key(key) {
            return Directive::Action(field);
        }
        match key {
            "float" => Directive::Toggle(ToggleField::Float),
            "center" => Directive::Toggle(ToggleField::Center),
            "name" => Directive::Name,
            _ => Directive::Extra,
        }
    }
}

/// Parse a DSL boolean. Case-sensitive; anything else is `None`.
pub fn parse_bool(token: &str) -> Option<bool> {
    match token {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Regex patterns a window must satisfy. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RuleMatch {
    pub class: Option<String>,
    pub title: Option<String>,
    pub initial_class: Option<String>,
    pub initial_title: Option<String>,
    pub workspace_tag: Option<String>,
}

impl RuleMatch {
    pub fn get(&self, field: MatchField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    fn slot(&self, field: MatchField) -> &Option<String> {
        match field {
            MatchField::Class => &self.class,
            MatchField::Title => &self.title,
            MatchField::InitialClass => &self.initial_class,
            MatchField::InitialTitle => &self.initial_title,
            MatchField::WorkspaceTag => &self.workspace_tag,
        }
    }

    pub fn slot_mut(&mut self, field: MatchField) -> &mut Option<String> {
        match field {
            MatchField::Class => &mut self.class,
            MatchField::Title => &mut self.title,
            MatchField::InitialClass => &mut self.initial_class,
            MatchField::InitialTitle => &mut self.initial_title,
            MatchField::WorkspaceTag => &mut self.workspace_tag,
        }
    }

    /// Present (field, pattern) pairs in canonical order.
    pub fn patterns(&self) -> impl Iterator<Item = (MatchField, &str)> {
        MatchField::ALL
            .into_iter()
            .filter_map(move |field| self.get(field).map(|pattern| (field, pattern)))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns().next().is_none()
    }
}

/// Effects a rule applies. Every field is optional; `None` means "no change".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Actions {
    pub tag: Option<String>,
    pub workspace: Option<String>,
    pub opacity: Option<String>,
    pub size: Option<String>,
    pub move_to: Option<String>,
    pub float: Option<bool>,
    pub center: Option<bool>,
}

impl Actions {
    pub fn get(&self, field: ActionField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    fn slot(&self, field: ActionField) -> &Option<String> {
        match field {
            ActionField::Tag => &self.tag,
            ActionField::Workspace => &self.workspace,
            ActionField::Opacity => &self.opacity,
            ActionField::Size => &self.size,
            ActionField::Move => &self.move_to,
        }
    }

    pub fn slot_mut(&mut self, field: ActionField) -> &mut Option<String> {
        match field {
            ActionField::Tag => &mut self.tag,
            ActionField::Workspace => &mut self.workspace,
            ActionField::Opacity => &mut self.opacity,
            ActionField::Size => &mut self.size,
            ActionField::Move => &mut self.move_to,
        }
    }

    pub fn toggle(&self, field: ToggleField) -> Option<bool> {
        match field {
            ToggleField::Float => self.float,
            ToggleField::Center => self.center,
        }
    }

    pub fn toggle_mut(&mut self, field: ToggleField) -> &mut Option<bool> {
        match field {
            ToggleField::Float => &mut self.float,
            ToggleField::Center => &mut self.center,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Actions::default()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("unsupported match key '{0}'")]
    UnknownMatchKey(String),

    #[error("'{key}' expects true/false, yes/no or 1/0, got '{value}'")]
    InvalidBool { key: String, value: String },
}

/// One `windowrule { ... }` entry. Identified by its position in a ruleset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rule {
    pub name: Option<String>,
    pub matcher: RuleMatch,
    pub actions: Actions,
    /// Directives the model does not interpret, in original order
    pub extras: Vec<(String, String)>,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match(mut self, field: MatchField, pattern: impl Into<String>) -> Self {
        *self.matcher.slot_mut(field) = Some(pattern.into());
        self
    }

    pub fn with_action(mut self, field: ActionField, value: impl Into<String>) -> Self {
        *self.actions.slot_mut(field) = Some(value.into());
        self
    }

    pub fn with_toggle(mut self, field: ToggleField, value: bool) -> Self {
        *self.actions.toggle_mut(field) = Some(value);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Label shown to users: the explicit name, else the class or title
    /// pattern without anchors, else the rule's 1-based position.
    pub fn display_name(&self, index: usize) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        [&self.matcher.class, &self.matcher.title]
            .into_iter()
            .flatten()
            .map(|pattern| strip_anchors(pattern))
            .find(|label| !label.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("rule #{}", index + 1))
    }

    /// Overwrite the field named by `key`. Unknown keys replace the first
    /// extra with the same key, or are appended.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), FieldError> {
        match Directive::from_key(key) {
            Directive::Match(field) => *self.matcher.slot_mut(field) = Some(value.to_string()),
            Directive::Action(field) => *self.actions.slot_mut(field) = Some(value.to_string()),
            Directive::Toggle(field) => {
                let parsed = parse_bool(value).ok_or_else(|| FieldError::InvalidBool {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
                *self.actions.toggle_mut(field) = Some(parsed);
            }
            Directive::Name => self.name = Some(value.to_string()),
            Directive::UnknownMatch => return Err(FieldError::UnknownMatchKey(key.to_string())),
            Directive::Extra => match self.extras.iter_mut().find(|(k, _)| k == key) {
                Some(extra) => extra.1 = value.to_string(),
                None => self.extras.push((key.to_string(), value.to_string())),
            },
        }
        Ok(())
    }

    /// Clear the field named by `key`. Returns whether anything was removed.
    pub fn unset(&mut self, key: &str) -> bool {
        match Directive::from_key(key) {
            Directive::Match(field) => self.matcher.slot_mut(field).take().is_some(),
            Directive::Action(field) => self.actions.slot_mut(field).take().is_some(),
            Directive::Toggle(field) => self.actions.toggle_mut(field).take().is_some(),
            Directive::Name => self.name.take().is_some(),
            Directive::UnknownMatch => false,
            Directive::Extra => {
                let before = self.extras.len();
                self.extras.retain(|(k, _)| k != key);
                self.extras.len() < before
            }
        }
    }
}

/// Remove one leading `^` and one trailing `$`.
pub fn strip_anchors(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix('^').unwrap_or(pattern);
    pattern.strip_suffix('$').unwrap_or(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_classification() {
        assert_eq!(
            Directive::from_key("match:class"),
            Directive::Match(MatchField::Class)
        );
        assert_eq!(
            Directive::from_key("match:initialClass"),
            Directive::Match(MatchField::InitialClass)
        );
        assert_eq!(
            Directive::from_key("match:initial_title"),
            Directive::Match(MatchField::InitialTitle)
        );
        assert_eq!(
            Directive::from_key("match:tag"),
            Directive::Match(MatchField::WorkspaceTag)
        );
        assert_eq!(Directive::from_key("match:xwayland"), Directive::UnknownMatch);
        assert_eq!(
            Directive::from_key("move"),
            Directive::Action(ActionField::Move)
        );
        assert_eq!(
            Directive::from_key("center"),
            Directive::Toggle(ToggleField::Center)
        );
        assert_eq!(Directive::from_key("name"), Directive::Name);
        assert_eq!(Directive::from_key("pin"), Directive::Extra);
        // Keys are case-sensitive
        assert_eq!(Directive::from_key("Workspace"), Directive::Extra);
    }

    #[test]
    fn test_parse_bool() {
        for token in ["true", "yes", "1"] {
            assert_eq!(parse_bool(token), Some(true));
        }
        for token in ["false", "no", "0"] {
            assert_eq!(parse_bool(token), Some(false));
        }
        assert_eq!(parse_bool("True"), None);
        assert_eq!(parse_bool("on"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_display_name() {
        let named = Rule::new()
            .with_name("browsers")
            .with_match(MatchField::Class, "^firefox$");
        assert_eq!(named.display_name(0), "browsers");

        let by_class = Rule::new().with_match(MatchField::Class, "^firefox$");
        assert_eq!(by_class.display_name(0), "firefox");

        let by_title = Rule::new().with_match(MatchField::Title, "^Picture-in-Picture$");
        assert_eq!(by_title.display_name(4), "Picture-in-Picture");

        let anonymous = Rule::new().with_action(ActionField::Opacity, "0.9");
        assert_eq!(anonymous.display_name(2), "rule #3");
    }

    #[test]
    fn test_set_overwrites_fields() {
        let mut rule = Rule::new().with_action(ActionField::Workspace, "1");
        rule.set("workspace", "2").unwrap();
        rule.set("match:initialTitle", "Save As").unwrap();
        rule.set("float", "yes").unwrap();

        assert_eq!(rule.actions.workspace.as_deref(), Some("2"));
        assert_eq!(rule.matcher.initial_title.as_deref(), Some("Save As"));
        assert_eq!(rule.actions.float, Some(true));
    }

    #[test]
    fn test_set_extras_replaces_first_then_appends() {
        let mut rule = Rule::new();
        rule.set("pin", "1").unwrap();
        rule.set("rounding", "0").unwrap();
        rule.set("pin", "0").unwrap();

        assert_eq!(
            rule.extras,
            vec![
                ("pin".to_string(), "0".to_string()),
                ("rounding".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut rule = Rule::new();
        assert_eq!(
            rule.set("match:xdg_tag", "foo"),
            Err(FieldError::UnknownMatchKey("match:xdg_tag".to_string()))
        );
        assert!(matches!(
            rule.set("center", "maybe"),
            Err(FieldError::InvalidBool { .. })
        ));
        assert_eq!(rule, Rule::new());
    }

    #[test]
    fn test_unset() {
        let mut rule = Rule::new()
            .with_match(MatchField::Class, "kitty")
            .with_toggle(ToggleField::Float, false);
        rule.extras.push(("pin".to_string(), "1".to_string()));

        assert!(rule.unset("float"));
        assert!(!rule.unset("float"));
        assert!(rule.unset("match:class"));
        assert!(rule.unset("pin"));
        assert_eq!(rule, Rule::new());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Rule::new().with_action(ActionField::Tag, "browser");
        let mut copy = original.clone();
        copy.set("tag", "media").unwrap();

        assert_eq!(original.actions.tag.as_deref(), Some("browser"));
        assert_eq!(copy.actions.tag.as_deref(), Some("media"));
    }

    #[test]
    fn test_patterns_in_canonical_order() {
        let rule = Rule::new()
            .with_match(MatchField::WorkspaceTag, "web")
            .with_match(MatchField::Class, "firefox");
        let fields: Vec<_> = rule.matcher.patterns().map(|(f, _)| f).collect();
        assert_eq!(fields, vec![MatchField::Class, MatchField::WorkspaceTag]);
        assert!(Rule::new().matcher.is_empty());
    }

    #[test]
    fn test_strip_anchors() {
        assert_eq!(strip_anchors("^firefox$"), "firefox");
        assert_eq!(strip_anchors("^^a$$"), "^a$");
        assert_eq!(strip_anchors("kitty"), "kitty");
    }
}
