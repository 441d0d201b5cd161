use std::path::PathBuf;

use super::DEFAULT_HISTORY_CAPACITY;

pub const CONFIG_ENV: &str = "MADORI_CONFIG";
pub const HISTORY_CAPACITY_ENV: &str = "MADORI_HISTORY_CAPACITY";

/// Tool settings. Grouped separately from the ruleset they describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_path: PathBuf,
    pub history_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: default_config_path(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl Settings {
    /// Resolve from the process environment. An explicit path wins over
    /// `MADORI_CONFIG`, which wins over the Hyprland default location.
    pub fn resolve(config_override: Option<PathBuf>) -> Self {
        Self::resolve_with(config_override, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        config_override: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let config_path = config_override
            .or_else(|| env(CONFIG_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(default_config_path);

        let history_capacity = match env(HISTORY_CAPACITY_ENV) {
            None => DEFAULT_HISTORY_CAPACITY,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(
                        "Ignoring {}={:?} (expected a positive integer), using {}",
                        HISTORY_CAPACITY_ENV,
                        raw,
                        DEFAULT_HISTORY_CAPACITY
                    );
                    DEFAULT_HISTORY_CAPACITY
                }
            },
        };

        Self {
            config_path,
            history_capacity,
        }
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("hypr")
        .join("hyprland.conf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve_with(None, env_of(&[]));
        assert!(settings.config_path.ends_with("hypr/hyprland.conf"));
        assert_eq!(settings.history_capacity, DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_explicit_path_wins() {
        let settings = Settings::resolve_with(
            Some(PathBuf::from("/tmp/rules.conf")),
            env_of(&[(CONFIG_ENV, "/etc/hypr.conf")]),
        );
        assert_eq!(settings.config_path, PathBuf::from("/tmp/rules.conf"));
    }

    #[test]
    fn test_env_path() {
        let settings = Settings::resolve_with(None, env_of(&[(CONFIG_ENV, "/etc/hypr.conf")]));
        assert_eq!(settings.config_path, PathBuf::from("/etc/hypr.conf"));

        let empty = Settings::resolve_with(None, env_of(&[(CONFIG_ENV, "")]));
        assert!(empty.config_path.ends_with("hyprland.conf"));
    }

    #[test]
    fn test_history_capacity_from_env() {
        let settings = Settings::resolve_with(None, env_of(&[(HISTORY_CAPACITY_ENV, "200")]));
        assert_eq!(settings.history_capacity, 200);

        for bad in ["0", "-1", "lots"] {
            let settings = Settings::resolve_with(None, env_of(&[(HISTORY_CAPACITY_ENV, bad)]));
            assert_eq!(settings.history_capacity, DEFAULT_HISTORY_CAPACITY);
        }
    }
}
