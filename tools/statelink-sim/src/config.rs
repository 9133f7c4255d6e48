// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scenario configuration.
//!
//! A scenario describes the simulated link and the ordered steps applied to
//! it. Scenarios are loaded from TOML:
//!
//! ```toml
//! name = "button-sync"
//! handle_policy = "retain"
//!
//! [link]
//! first_handle = 40
//!
//! [[steps]]
//! action = "connect"
//! session = 7
//!
//! [[steps]]
//! action = "press"
//! node = "gate"
//! ```

use serde::{Deserialize, Serialize};
use statelink::{HandlePolicy, SessionHandle};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Scenario name (for identification).
    #[serde(default = "default_scenario_name")]
    pub name: String,

    /// What the gate does with peer handles on disconnect.
    #[serde(default)]
    pub handle_policy: PolicyConfig,

    /// Simulated link parameters.
    #[serde(default)]
    pub link: LinkConfig,

    /// Steps, applied in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_scenario_name() -> String {
    "statelink-sim".to_string()
}

fn default_namespace_capacity() -> usize {
    4
}

fn default_first_handle() -> u16 {
    1
}

/// Vendor bases a link side can bind.
pub const MAX_NAMESPACE_CAPACITY: usize = 254;

/// Handles the actuator allocates: service, declaration, value, subscription.
const ACTUATOR_HANDLES: u16 = 4;

fn default_reason() -> u8 {
    // Remote user terminated connection
    0x13
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: default_scenario_name(),
            handle_policy: PolicyConfig::default(),
            link: LinkConfig::default(),
            steps: Vec::new(),
        }
    }
}

impl ScenarioConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Button round trip in both directions.
    pub fn example() -> Self {
        Self {
            name: "button-sync".into(),
            handle_policy: PolicyConfig::Retain,
            link: LinkConfig {
                namespace_capacity: default_namespace_capacity(),
                first_handle: 40,
            },
            steps: vec![
                Step::Connect { session: 7 },
                Step::Discover,
                Step::Press { node: NodeKind::Gate },
                Step::ExpectLed {
                    node: NodeKind::Actuator,
                    on: true,
                },
                Step::Release { node: NodeKind::Gate },
                Step::ExpectLed {
                    node: NodeKind::Actuator,
                    on: false,
                },
                Step::Press {
                    node: NodeKind::Actuator,
                },
                Step::ExpectLed {
                    node: NodeKind::Gate,
                    on: true,
                },
                Step::Disconnect {
                    reason: default_reason(),
                },
            ],
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps.is_empty() {
            return Err(ConfigError::Invalid("No steps configured".into()));
        }
        if self.link.namespace_capacity == 0 {
            return Err(ConfigError::Invalid(
                "link.namespace_capacity must be at least 1".into(),
            ));
        }
        if self.link.namespace_capacity > MAX_NAMESPACE_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "link.namespace_capacity must be at most {}",
                MAX_NAMESPACE_CAPACITY
            )));
        }
        if self.link.first_handle == 0 {
            return Err(ConfigError::Invalid(
                "link.first_handle 0 is the invalid attribute handle".into(),
            ));
        }
        if self.link.first_handle > u16::MAX - ACTUATOR_HANDLES {
            return Err(ConfigError::Invalid(format!(
                "link.first_handle {} leaves no room for the actuator's {} handles",
                self.link.first_handle, ACTUATOR_HANDLES
            )));
        }

        for (i, step) in self.steps.iter().enumerate() {
            if let Step::Connect { session } = step {
                if !SessionHandle(*session).is_valid() {
                    return Err(ConfigError::Invalid(format!(
                        "Step {} connects with the invalid session handle {:#06x}",
                        i, session
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Simulated link parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Vendor bases each side can bind.
    #[serde(default = "default_namespace_capacity")]
    pub namespace_capacity: usize,

    /// First attribute handle allocated by the actuator.
    #[serde(default = "default_first_handle")]
    pub first_handle: u16,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            namespace_capacity: default_namespace_capacity(),
            first_handle: default_first_handle(),
        }
    }
}

/// Handle retention policy of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyConfig {
    /// Keep handles until rediscovery.
    #[default]
    Retain,
    /// Forget handles on disconnect.
    Invalidate,
}

impl From<PolicyConfig> for HandlePolicy {
    fn from(policy: PolicyConfig) -> Self {
        match policy {
            PolicyConfig::Retain => HandlePolicy::RetainUntilReassigned,
            PolicyConfig::Invalidate => HandlePolicy::InvalidateOnSessionDown,
        }
    }
}

/// Which node a step targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Responder side.
    Actuator,
    /// Initiator side.
    Gate,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator => f.write_str("actuator"),
            Self::Gate => f.write_str("gate"),
        }
    }
}

/// One scenario step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Establish a session.
    Connect {
        /// Session handle handed to both nodes.
        session: u16,
    },

    /// Tear the session down.
    Disconnect {
        /// Reason code.
        #[serde(default = "default_reason")]
        reason: u8,
    },

    /// Run service discovery on the gate.
    Discover,

    /// Press the node's button.
    Press {
        /// Target node.
        node: NodeKind,
    },

    /// Release the node's button.
    Release {
        /// Target node.
        node: NodeKind,
    },

    /// Fail unless the node's LED is in the given state.
    ExpectLed {
        /// Target node.
        node: NodeKind,
        /// Expected LED state.
        on: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_example_is_valid() {
        assert!(ScenarioConfig::example().validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = ScenarioConfig::default();
        assert!(config.validate().is_err()); // No steps

        config.steps.push(Step::Connect { session: 0xFFFF });
        assert!(config.validate().is_err());

        config.steps[0] = Step::Connect { session: 7 };
        assert!(config.validate().is_ok());

        config.link.first_handle = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_link_bounds() {
        let mut config = ScenarioConfig::example();

        config.link.first_handle = u16::MAX - 2;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.link.first_handle = u16::MAX - ACTUATOR_HANDLES;
        assert!(config.validate().is_ok());

        config.link.namespace_capacity = MAX_NAMESPACE_CAPACITY + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.link.namespace_capacity = MAX_NAMESPACE_CAPACITY;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = ScenarioConfig::example();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        assert!(toml_str.contains("first_handle = 40"));
        assert!(toml_str.contains("action = \"expect_led\""));

        let parsed: ScenarioConfig = toml::from_str(&toml_str).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_file_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"
[[steps]]
action = "connect"
session = 3

[[steps]]
action = "disconnect"
"#
        )
        .expect("write");

        let config = ScenarioConfig::from_file(file.path()).expect("load");
        assert_eq!(config.name, "statelink-sim");
        assert_eq!(config.link, LinkConfig::default());
        assert_eq!(config.handle_policy, PolicyConfig::Retain);
        assert_eq!(config.steps[1], Step::Disconnect { reason: 0x13 });
    }

    #[test]
    fn test_from_file_rejects_unknown_action() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[[steps]]\naction = \"shake\"").expect("write");

        assert!(matches!(
            ScenarioConfig::from_file(file.path()),
            Err(ConfigError::Toml(_))
        ));
    }
}
