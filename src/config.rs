//! Configuration for the ShuttleXpress mapper
//!
//! Loaded once at startup from a JSON file:
//!
//! ```json
//! {
//!   "buttons": { "256": "ctrl+c", "257": "ctrl+v" },
//!   "jog":     { "1": "up", "-1": "down" },
//!   "ring":    { "3": "right" }
//! }
//! ```
//!
//! Button keys are decimal evdev key codes, ring keys are decimal ring
//! positions, jog keys are `"1"` (right) and `"-1"` (left).

use crate::action::Chord;
use crate::keyboard::DEFAULT_DEVICE_NAME;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Errors loading the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Button, jog and ring action mappings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShuttleConfig {
    /// Button code → action
    #[serde(default)]
    pub buttons: HashMap<String, String>,
    /// Jog direction ("1" / "-1") → action
    #[serde(default)]
    pub jog: HashMap<String, String>,
    /// Ring position → action
    #[serde(default)]
    pub ring: HashMap<String, String>,
    /// Name for the virtual keyboard device
    #[serde(default = "default_device_name")]
    pub device_name: String,
}

fn default_device_name() -> String {
    DEFAULT_DEVICE_NAME.to_string()
}

impl ShuttleConfig {
    /// Get the default config file path
    ///
    /// `config.json` in the working directory wins if present, otherwise
    /// `~/.config/shuttle-keys/config.json`.
    pub fn default_path() -> PathBuf {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return local;
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shuttle-keys")
            .join(CONFIG_FILE_NAME)
    }

    /// Load config from a file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse config from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Action for a pressed button code
    pub fn button_action(&self, code: u16) -> Option<&str> {
        self.buttons.get(&code.to_string()).map(String::as_str)
    }

    /// Action for a jog direction key ("1" or "-1")
    pub fn jog_action(&self, key: &str) -> Option<&str> {
        self.jog.get(key).map(String::as_str)
    }

    /// Action for a ring position
    pub fn ring_action(&self, position: i32) -> Option<&str> {
        self.ring.get(&position.to_string()).map(String::as_str)
    }

    /// Check mappings for problems that would only show up at runtime.
    ///
    /// Returns human-readable warnings; none of them stop the mapper.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for (section, map) in [
            ("buttons", &self.buttons),
            ("jog", &self.jog),
            ("ring", &self.ring),
        ] {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                let action = &map[key];
                if let Err(e) = Chord::parse(action) {
                    warnings.push(format!("{section}[\"{key}\"] = \"{action}\": {e}"));
                }
                // Lookups format the event value with `to_string`, so only the
                // canonical decimal form can ever match.
                let key_ok = match section {
                    "jog" => key == "1" || key == "-1",
                    "buttons" => key.parse::<u16>().is_ok_and(|n| n.to_string() == *key),
                    _ => key.parse::<i32>().is_ok_and(|n| n.to_string() == *key),
                };
                if !key_ok {
                    warnings.push(format!("{section}[\"{key}\"] will never match an event"));
                }
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = ShuttleConfig::from_json(
            r#"{"buttons":{"256":"ctrl+c"},"jog":{"1":"up","-1":"down"},"ring":{"2":"right"}}"#,
        )
        .unwrap();
        assert_eq!(config.button_action(256), Some("ctrl+c"));
        assert_eq!(config.button_action(257), None);
        assert_eq!(config.jog_action("1"), Some("up"));
        assert_eq!(config.jog_action("-1"), Some("down"));
        assert_eq!(config.ring_action(2), Some("right"));
        assert_eq!(config.device_name, DEFAULT_DEVICE_NAME);
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let config = ShuttleConfig::from_json("{}").unwrap();
        assert!(config.buttons.is_empty());
        assert!(config.jog.is_empty());
        assert!(config.ring.is_empty());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(ShuttleConfig::from_json("{\"buttons\": ").is_err());
        assert!(ShuttleConfig::from_json("{\"buttons\": {\"256\": 5}}").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ShuttleConfig::load(Path::new("/nonexistent/shuttle-keys.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("shuttle-keys-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"jog":{"1":"up"},"device_name":"test-kb"}"#).unwrap();
        let config = ShuttleConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.jog_action("1"), Some("up"));
        assert_eq!(config.device_name, "test-kb");
    }

    #[test]
    fn test_validate_clean_config() {
        let config = ShuttleConfig::from_json(
            r#"{"buttons":{"256":"ctrl+c"},"jog":{"1":"up","-1":"down"},"ring":{"-3":"left"}}"#,
        )
        .unwrap();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_rejects_non_canonical_numbers() {
        let config = ShuttleConfig::from_json(
            r#"{"buttons":{"0256":"ctrl+c","256":"ctrl+v"},"ring":{"+3":"right","-3":"left","03":"up"}}"#,
        )
        .unwrap();
        let warnings = config.validate();
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert!(warnings.iter().any(|w| w.contains("buttons[\"0256\"]")));
        assert!(warnings.iter().any(|w| w.contains("ring[\"+3\"]")));
        assert!(warnings.iter().any(|w| w.contains("ring[\"03\"]")));
    }

    #[test]
    fn test_validate_reports_problems() {
        let config = ShuttleConfig::from_json(
            r#"{"buttons":{"abc":"ctrl+c","257":"ctrl+zz"},"jog":{"2":"up"},"ring":{}}"#,
        )
        .unwrap();
        let warnings = config.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("zz")));
        assert!(warnings.iter().any(|w| w.contains("buttons[\"abc\"]")));
        assert!(warnings.iter().any(|w| w.contains("jog[\"2\"]")));
    }
}
