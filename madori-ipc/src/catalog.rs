use serde::{Deserialize, Serialize};

/// Application metadata used to suggest rules for apps that have none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppCatalog {
    #[serde(default)]
    pub apps: Vec<AppEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    pub name: String,
    /// Window classes the application is known to use
    pub classes: Vec<String>,
    /// Where the application is installed from (e.g. "pacman", "flatpak")
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub category: String,
}

impl AppCatalog {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a AppEntry> {
        self.apps.iter().filter(move |app| app.category == category)
    }
}
