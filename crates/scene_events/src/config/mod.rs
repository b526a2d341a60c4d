//! Configuration system
//!
//! Event manager settings can be loaded from TOML or RON files, picked by
//! file extension.

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Custom event fired when the game is sent to the background.
pub const EVENT_HIDE: &str = "game_on_hide";

/// Custom event fired when the game returns to the foreground.
pub const EVENT_SHOW: &str = "game_on_show";

/// # Event Manager Configuration
///
/// Runtime settings for [`EventManager`](crate::events::EventManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventManagerConfig {
    /// Whether dispatching starts enabled
    pub enabled: bool,
    /// Custom event names that `remove_all_listeners` leaves in place
    pub internal_custom_events: Vec<String>,
    /// Default `env_logger` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl EventManagerConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial enabled state
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Add a custom event name that survives `remove_all_listeners`
    pub fn with_internal_event(mut self, name: impl Into<String>) -> Self {
        self.internal_custom_events.push(name.into());
        self
    }

    /// Set the default log filter
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.internal_custom_events.iter().any(String::is_empty) {
            return Err("Internal custom event names cannot be empty".to_string());
        }
        if self.log_filter.trim().is_empty() {
            return Err("Log filter cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for EventManagerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            internal_custom_events: vec![EVENT_HIDE.to_string(), EVENT_SHOW.to_string()],
            log_filter: "info".to_string(),
        }
    }
}

impl Config for EventManagerConfig {}
