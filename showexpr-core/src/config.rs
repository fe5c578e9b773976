//! Configuration
//!
//! Defaults suit a `show!` sprinkled into ordinary code. The environment can
//! switch on pretty output, add source roots and attach a history file.

use std::ffi::OsString;
use std::path::PathBuf;

pub const ENV_PRETTY: &str = "SHOWEXPR_PRETTY";
pub const ENV_SOURCE_ROOTS: &str = "SHOWEXPR_SOURCE_ROOTS";
pub const ENV_HISTORY: &str = "SHOWEXPR_HISTORY";
pub const ENV_HISTORY_SESSION: &str = "SHOWEXPR_HISTORY_SESSION";

/// Configuration for a [`Show`](crate::Show)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowConfig {
    /// Name of the macro/function whose calls are looked up in source
    pub target: String,
    /// Render values with `{:#?}` instead of `{:?}`
    pub pretty: bool,
    /// Extra directories to resolve relative source paths against
    pub source_roots: Vec<PathBuf>,
    /// JSON-Lines history file of an interactive front-end
    pub history_path: Option<PathBuf>,
    /// Session to read from the history file (default: the latest)
    pub history_session: Option<u64>,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            target: "show".to_string(),
            pretty: false,
            source_roots: Vec::new(),
            history_path: None,
            history_session: None,
        }
    }
}

impl ShowConfig {
    /// Defaults overridden by `SHOWEXPR_*` environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var_os(key))
    }

    fn from_vars(var: impl Fn(&str) -> Option<OsString>) -> Self {
        let mut config = Self::default();

        if let Some(value) = var(ENV_PRETTY) {
            config.pretty = is_truthy(&value.to_string_lossy());
        }
        if let Some(value) = var(ENV_SOURCE_ROOTS) {
            config.source_roots = std::env::split_paths(&value).collect();
        }
        if let Some(value) = var(ENV_HISTORY).filter(|v| !v.is_empty()) {
            config.history_path = Some(PathBuf::from(value));
        }
        if let Some(value) = var(ENV_HISTORY_SESSION) {
            match value.to_string_lossy().trim().parse() {
                Ok(session) => config.history_session = Some(session),
                Err(e) => log::warn!("ignoring {}={:?}: {}", ENV_HISTORY_SESSION, value, e),
            }
        }

        config
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ShowConfig {
        let vars: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        ShowConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, ShowConfig::default());
        assert_eq!(config.target, "show");
    }

    #[test]
    fn test_env_overrides() {
        let roots = std::env::join_paths(["/a", "/b"]).unwrap();
        let config = config_from(&[
            (ENV_PRETTY, "true"),
            (ENV_SOURCE_ROOTS, roots.to_str().unwrap()),
            (ENV_HISTORY, "/tmp/history.jsonl"),
            (ENV_HISTORY_SESSION, "3"),
        ]);
        assert!(config.pretty);
        assert_eq!(config.source_roots, [PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(config.history_path, Some(PathBuf::from("/tmp/history.jsonl")));
        assert_eq!(config.history_session, Some(3));
    }

    #[test]
    fn test_bad_session_is_ignored() {
        let config = config_from(&[(ENV_HISTORY_SESSION, "latest"), (ENV_PRETTY, "0")]);
        assert_eq!(config.history_session, None);
        assert!(!config.pretty);
    }
}
