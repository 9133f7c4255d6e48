// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # StateLink Simulator
//!
//! Runs an actuator node (responder) and a gate node (initiator) against each
//! other over the in-memory attribute link, driven by a TOML scenario.
//!
//! # Example
//!
//! ```rust,no_run
//! use statelink_sim::{run, ScenarioConfig};
//!
//! let config = ScenarioConfig::from_file("scenario.toml").unwrap();
//! let report = run(&config).unwrap();
//! println!("{} steps, actuator LED {}", report.steps, report.actuator_led);
//! ```

pub mod config;
pub mod node;
pub mod runner;

pub use config::{ConfigError, NodeKind, ScenarioConfig, Step};
pub use node::{ActuatorNode, Board, GateNode};
pub use runner::{run, RunError, ScenarioReport};
