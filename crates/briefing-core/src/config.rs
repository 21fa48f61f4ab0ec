//! TOML-based widget configuration.
//!
//! Holds the display strings and the set of implicit categories whose badge
//! is suppressed. Stored at `~/.config/briefing-widget/config.toml`
//! unless `BRIEFING_CONFIG` points elsewhere.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Category treated as the default when no override is configured.
pub const DEFAULT_CATEGORY: &str = "Homework";

/// Display strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_heading")]
    pub heading: String,
    #[serde(default = "default_loading_message")]
    pub loading_message: String,
    #[serde(default = "default_empty_message")]
    pub empty_message: String,
}

/// Category badge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoriesConfig {
    /// Categories rendered without a badge. Matched case-insensitively.
    #[serde(default = "default_implicit_categories")]
    pub implicit: Vec<String>,
}

/// Widget configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub categories: CategoriesConfig,
}

fn default_heading() -> String {
    "📚 Daily Briefing".into()
}
fn default_loading_message() -> String {
    "Loading briefing...".into()
}
fn default_empty_message() -> String {
    "✨ No upcoming assignments in this timeframe!".into()
}
fn default_implicit_categories() -> Vec<String> {
    vec![DEFAULT_CATEGORY.to_string()]
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            heading: default_heading(),
            loading_message: default_loading_message(),
            empty_message: default_empty_message(),
        }
    }
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            implicit: default_implicit_categories(),
        }
    }
}

/// Returns `~/.config/briefing-widget[-dev]/` based on BRIEFING_ENV.
///
/// # Errors
/// Returns [`ConfigError::NoDataDir`] if the home directory is unknown.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .ok_or(ConfigError::NoDataDir)?
        .join(".config");

    let env = std::env::var("BRIEFING_ENV").unwrap_or_else(|_| "production".to_string());
    if env == "dev" {
        Ok(base_dir.join("briefing-widget-dev"))
    } else {
        Ok(base_dir.join("briefing-widget"))
    }
}

impl WidgetConfig {
    /// Config file location. `BRIEFING_CONFIG` overrides the default.
    ///
    /// # Errors
    /// Returns an error when no location can be derived.
    pub fn path() -> Result<PathBuf, ConfigError> {
        match std::env::var_os("BRIEFING_CONFIG") {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Ok(data_dir()?.join("config.toml")),
        }
    }

    /// Load from the default location.
    ///
    /// # Errors
    /// See [`WidgetConfig::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::LoadFailed`] if the file exists but cannot be
    /// read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };
        toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from the default location, returning defaults on any error.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "using default widget configuration");
                Self::default()
            }
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    /// See [`WidgetConfig::save_to`].
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Persist to `path`, creating parent directories.
    ///
    /// # Errors
    /// Returns [`ConfigError::SaveFailed`] if serialization or writing fails.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Whether `category` renders without a badge.
    pub fn is_implicit_category(&self, category: &str) -> bool {
        let category = category.trim();
        self.categories
            .implicit
            .iter()
            .any(|implicit| implicit.trim().eq_ignore_ascii_case(category))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value does not fit
    /// the existing value's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }
}

fn get_json_value_by_path<'a>(
    root: &'a serde_json::Value,
    key: &str,
) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }

    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let unknown = || ConfigError::UnknownKey(key.to_string());
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let mut parts = key.split('.').peekable();
    if key.is_empty() {
        return Err(unknown());
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        if parts.peek().is_some() {
            current = current.get_mut(part).ok_or_else(unknown)?;
            continue;
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(part).ok_or_else(unknown)?;
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => value
                .parse::<u64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
            serde_json::Value::Array(_) => {
                // Accept a JSON array or a comma-separated list.
                match serde_json::from_str::<serde_json::Value>(value) {
                    Ok(parsed @ serde_json::Value::Array(_)) => parsed,
                    _ => serde_json::Value::Array(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(|s| serde_json::Value::String(s.to_string()))
                            .collect(),
                    ),
                }
            }
            serde_json::Value::Object(_) => {
                return Err(invalid("cannot replace a whole section".to_string()))
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(part.to_string(), new_value);
        return Ok(());
    }

    Err(unknown())
}
