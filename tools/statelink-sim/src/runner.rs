// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scenario runner.

use statelink::transport::sim::{SimLinkConfig, SimLink};
use statelink::{Outcome, SessionHandle, TransportError};
use thiserror::Error;

use crate::config::{NodeKind, ScenarioConfig, Step};
use crate::node::{ActuatorNode, Board, GateNode};

/// Scenario failures.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("link error at step {step}: {source}")]
    Link {
        step: usize,
        #[source]
        source: TransportError,
    },

    #[error("protocol error: {0}")]
    Protocol(#[from] statelink::Error),

    #[error("step {step}: {node} LED is {}, expected {}", on_off(.actual), on_off(.expected))]
    Expectation {
        step: usize,
        node: NodeKind,
        expected: bool,
        actual: bool,
    },
}

fn on_off(on: &bool) -> &'static str {
    if *on {
        "on"
    } else {
        "off"
    }
}

/// Summary of a completed scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioReport {
    /// Steps applied.
    pub steps: usize,
    /// Button events that issued a write or push.
    pub issued: usize,
    /// Button events skipped by a role.
    pub skipped: usize,
    /// Button events ignored because the button was disabled.
    pub ignored: usize,
    /// Transport events delivered to the nodes.
    pub events: usize,
    /// Final actuator LED.
    pub actuator_led: bool,
    /// Final gate LED.
    pub gate_led: bool,
}

/// Run `config` over a fresh simulated link.
pub fn run(config: &ScenarioConfig) -> Result<ScenarioReport, RunError> {
    let link = SimLink::new(SimLinkConfig {
        namespace_capacity: config.link.namespace_capacity,
        first_handle: config.link.first_handle,
    });

    let actuator_board = Board::new("actuator");
    let gate_board = Board::new("gate");
    let mut actuator = ActuatorNode::new(link.server(), &actuator_board)?;
    let mut gate = GateNode::new(link.client(), &gate_board, config.handle_policy.into())?;

    log::info!("[scenario] '{}': {} step(s)", config.name, config.steps.len());

    let mut report = ScenarioReport::default();
    for (index, step) in config.steps.iter().enumerate() {
        log::debug!("[scenario] step {}: {:?}", index, step);
        let link_err = |source| RunError::Link {
            step: index,
            source,
        };

        match *step {
            Step::Connect { session } => link.connect(SessionHandle(session)).map_err(link_err)?,
            Step::Disconnect { reason } => link.disconnect(reason).map_err(link_err)?,
            Step::Discover => {
                let watched = link.discover().map_err(link_err)?;
                log::debug!("[scenario] discovery ran for {} service(s)", watched);
            }
            Step::Press { node } | Step::Release { node } => {
                let pressed = matches!(step, Step::Press { .. });
                let outcome = match node {
                    NodeKind::Actuator => actuator.button(pressed)?,
                    NodeKind::Gate => gate.button(pressed)?,
                };
                match outcome {
                    Some(Outcome::Issued) => report.issued += 1,
                    Some(Outcome::Skipped(reason)) => {
                        log::info!("[scenario] {} button skipped: {}", node, reason);
                        report.skipped += 1;
                    }
                    None => report.ignored += 1,
                }
            }
            Step::ExpectLed { node, on } => {
                let actual = match node {
                    NodeKind::Actuator => actuator_board.led(),
                    NodeKind::Gate => gate_board.led(),
                };
                if actual != on {
                    return Err(RunError::Expectation {
                        step: index,
                        node,
                        expected: on,
                        actual,
                    });
                }
            }
        }

        report.events += link.pump(&mut actuator, &mut gate)?;
        report.steps += 1;
    }

    report.actuator_led = actuator_board.led();
    report.gate_led = gate_board.led();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LinkConfig, PolicyConfig};

    fn scenario(steps: Vec<Step>) -> ScenarioConfig {
        ScenarioConfig {
            steps,
            ..ScenarioConfig::default()
        }
    }

    #[test]
    fn test_example_scenario_passes() {
        let report = run(&ScenarioConfig::example()).expect("example scenario");

        assert_eq!(report.steps, ScenarioConfig::example().steps.len());
        assert_eq!(report.issued, 3);
        assert_eq!(report.skipped, 0);
        assert!(report.actuator_led);
        assert!(report.gate_led);
    }

    #[test]
    fn test_press_before_connect_is_ignored() {
        let report = run(&scenario(vec![
            Step::Press {
                node: NodeKind::Actuator,
            },
            Step::ExpectLed {
                node: NodeKind::Actuator,
                on: false,
            },
        ]))
        .unwrap();

        assert_eq!(report.ignored, 1);
    }

    #[test]
    fn test_failed_expectation() {
        let err = run(&scenario(vec![Step::ExpectLed {
            node: NodeKind::Gate,
            on: true,
        }]))
        .unwrap_err();

        assert!(matches!(
            err,
            RunError::Expectation {
                step: 0,
                node: NodeKind::Gate,
                expected: true,
                actual: false,
            }
        ));
        assert_eq!(err.to_string(), "step 0: gate LED is off, expected on");
    }

    #[test]
    fn test_invalidated_handles_skip_after_reconnect() {
        let mut config = scenario(vec![
            Step::Connect { session: 1 },
            Step::Discover,
            Step::Disconnect { reason: 0x13 },
            Step::Connect { session: 2 },
            Step::Press {
                node: NodeKind::Gate,
            },
        ]);
        config.handle_policy = PolicyConfig::Invalidate;

        let report = run(&config).unwrap();
        assert_eq!(report.skipped, 1);
        assert!(!report.actuator_led);
    }

    #[test]
    fn test_double_connect_is_a_link_error() {
        let err = run(&scenario(vec![
            Step::Connect { session: 1 },
            Step::Connect { session: 2 },
        ]))
        .unwrap_err();

        assert!(matches!(
            err,
            RunError::Link {
                step: 1,
                source: TransportError::Rejected,
            }
        ));
    }

    #[test]
    fn test_registration_failure_is_reported() {
        let mut config = scenario(vec![Step::Discover]);
        config.link = LinkConfig {
            namespace_capacity: 0,
            first_handle: 1,
        };

        assert!(matches!(run(&config), Err(RunError::Protocol(e)) if e.is_registration()));
    }

    #[test]
    fn test_handle_space_exhaustion_is_reported() {
        let mut config = ScenarioConfig::example();
        config.link.first_handle = u16::MAX - 2;

        assert!(matches!(
            run(&config),
            Err(RunError::Protocol(statelink::Error::Registration {
                step: statelink::RegistrationStep::ValueAttribute,
                source: TransportError::TableFull,
            }))
        ));
    }
}
