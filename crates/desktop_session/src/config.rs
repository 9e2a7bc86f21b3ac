//! Static runtime configuration tree and its providers.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

pub const DEFAULT_HOME: &str = "/opt/webdesk/home";
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 2_097_152;
pub const DEFAULT_WINDOW_MANAGER: &str = "CoreWM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreloadKind {
    Javascript,
    Stylesheet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preload {
    #[serde(rename = "type")]
    pub kind: PreloadKind,
    pub src: String,
}

impl Preload {
    pub fn javascript(src: impl Into<String>) -> Self {
        Self {
            kind: PreloadKind::Javascript,
            src: src.into(),
        }
    }

    pub fn stylesheet(src: impl Into<String>) -> Self {
        Self {
            kind: PreloadKind::Stylesheet,
            src: src.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CoreConfig {
    pub home: String,
    pub max_upload_size: u64,
    #[serde(default)]
    pub preloads: Vec<Preload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowManagerConfig {
    /// Application identifier launched as the window manager.
    pub exec: String,
    /// Launch arguments handed to the window manager untouched.
    #[serde(default)]
    pub args: Map<String, Value>,
}

/// Read-only configuration tree. Serialized field names are the lookup keys accepted by
/// [`Config::value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "Core")]
    pub core: CoreConfig,
    #[serde(rename = "WM")]
    pub wm: WindowManagerConfig,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl Default for Config {
    fn default() -> Self {
        let themes = json!({"default": {"title": "Default"}});
        let mut args = Map::new();
        args.insert("themes".to_string(), themes);

        Self {
            core: CoreConfig {
                home: DEFAULT_HOME.to_string(),
                max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
                preloads: vec![
                    Preload::javascript("/apps/CoreWM/main.js"),
                    Preload::stylesheet("/apps/CoreWM/main.css"),
                ],
            },
            wm: WindowManagerConfig {
                exec: DEFAULT_WINDOW_MANAGER.to_string(),
                args,
            },
        }
    }
}

impl Config {
    /// Parses and validates a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or missing fields, and
    /// [`ConfigError::Invalid`] when a value breaks a config invariant.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value-level invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.core.max_upload_size == 0 {
            return Err(ConfigError::Invalid(
                "Core.MaxUploadSize must be positive".to_string(),
            ));
        }
        if self.wm.exec.trim().is_empty() {
            return Err(ConfigError::Invalid("WM.exec must not be empty".to_string()));
        }
        if let Some(index) = self.core.preloads.iter().position(|p| p.src.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "Core.Preloads[{index}].src must not be empty"
            )));
        }
        Ok(())
    }

    /// Whole tree as JSON.
    pub fn to_value(&self) -> Value {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Top-level section by key (`"Core"`, `"WM"`), or `None` for unknown keys.
    pub fn value(&self, key: &str) -> Option<Value> {
        match self.to_value() {
            Value::Object(mut sections) => sections.remove(key),
            _ => None,
        }
    }
}

/// Source of the handler's configuration. Called once per handler construction.
pub trait ConfigProvider {
    fn provide(&self) -> Config;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConfigProvider;

impl ConfigProvider for DefaultConfigProvider {
    fn provide(&self) -> Config {
        Config::default()
    }
}

/// Provider serving a configuration resolved ahead of time (for example parsed from TOML).
#[derive(Debug, Clone)]
pub struct StaticConfigProvider {
    config: Config,
}

impl StaticConfigProvider {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Config::from_toml_str(raw).map(Self::new)
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn provide(&self) -> Config {
        self.config.clone()
    }
}
