//! Mocker configuration from YAML.

use crate::clock::ClockKind;
use crate::error::{Result, StuntError};
use serde::{Deserialize, Serialize};

/// Settings for a [`Mocker`](crate::Mocker).
///
/// Every field has a default, so an empty document is a valid config.
///
/// ```
/// use stunt_core::config::MockerConfig;
///
/// let config = MockerConfig::from_yaml("marker: Double\n").unwrap();
/// assert_eq!(config.target_name("app::Request::Double"), Some("app::Request"));
/// assert_eq!(config.target_name("app::Request::Mock"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockerConfig {
    /// Last path segment that marks a name as a stand-in request.
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Path separator between name segments.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Clock used to timestamp recorded calls.
    #[serde(default)]
    pub clock: ClockKind,

    /// Record calls on newly created stand-ins.
    #[serde(default = "default_record_calls")]
    pub record_calls: bool,
}

fn default_marker() -> String {
    "Mock".to_string()
}
fn default_separator() -> String {
    "::".to_string()
}
fn default_record_calls() -> bool {
    true
}

impl Default for MockerConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            separator: default_separator(),
            clock: ClockKind::default(),
            record_calls: default_record_calls(),
        }
    }
}

impl MockerConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| StuntError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the naming contract is usable.
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(StuntError::InvalidConfig {
                field: "separator".to_string(),
                cause: "must not be empty".to_string(),
            });
        }
        if self.marker.is_empty() {
            return Err(StuntError::InvalidConfig {
                field: "marker".to_string(),
                cause: "must not be empty".to_string(),
            });
        }
        if self.marker.contains(&self.separator) {
            return Err(StuntError::InvalidConfig {
                field: "marker".to_string(),
                cause: format!("must not contain the separator '{}'", self.separator),
            });
        }
        Ok(())
    }

    /// Set the marker token.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Set the path separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Set the clock kind.
    pub fn with_clock(mut self, clock: ClockKind) -> Self {
        self.clock = clock;
        self
    }

    /// Enable or disable call recording.
    pub fn with_record_calls(mut self, record_calls: bool) -> Self {
        self.record_calls = record_calls;
        self
    }

    /// The target a requested stand-in name stands in for.
    ///
    /// Returns `None` unless the last segment is exactly the marker and
    /// something precedes it.
    pub fn target_name<'a>(&self, requested: &'a str) -> Option<&'a str> {
        let (target, last) = requested.rsplit_once(self.separator.as_str())?;
        (last == self.marker && !target.is_empty()).then_some(target)
    }
}
