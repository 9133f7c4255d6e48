// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Application nodes.
//!
//! Each node pairs one role with a [`Board`] (one LED, one button). The
//! actuator mirrors writes from the gate onto its LED and pushes its own
//! button state; the gate does the opposite.

use std::cell::Cell;

use statelink::dispatch::EventObserver;
use statelink::{
    ClientTransport, HandlePolicy, Initiator, InitiatorConfig, InitiatorEvent, InitiatorHandler,
    Outcome, Responder, ResponderConfig, Result, ServerTransport, StateValue, TransportEvent,
    WriteHandler,
};

/// Simulated board with one LED and one button
///
/// The button starts disabled; presses are ignored until the node enables it.
#[derive(Debug)]
pub struct Board {
    name: &'static str,
    led: Cell<bool>,
    button_enabled: Cell<bool>,
}

impl Board {
    /// Create a board with the LED off and the button disabled
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            led: Cell::new(false),
            button_enabled: Cell::new(false),
        }
    }

    /// Board name used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current LED state
    pub fn led(&self) -> bool {
        self.led.get()
    }

    /// True once presses are handled
    pub fn button_enabled(&self) -> bool {
        self.button_enabled.get()
    }

    fn set_led(&self, on: bool) {
        if self.led.replace(on) != on {
            log::info!("[{}] LED {}", self.name, if on { "on" } else { "off" });
        }
    }

    fn enable_button(&self) {
        if !self.button_enabled.replace(true) {
            log::info!("[{}] button enabled", self.name);
        }
    }
}

impl WriteHandler for Board {
    fn on_write(&self, value: StateValue) {
        self.set_led(value.is_on());
    }
}

impl<T: ClientTransport> InitiatorHandler<T> for Board {
    fn on_event(&self, event: &InitiatorEvent, initiator: &mut Initiator<'_, T>) -> Result<()> {
        match event {
            InitiatorEvent::DiscoveryComplete(handles) => {
                initiator.assign_handles(handles);
                let outcome = initiator.set_subscription(true)?;
                log::debug!("[{}] enable notifications: {:?}", self.name, outcome);
                self.enable_button();
            }
            InitiatorEvent::NotificationReceived(value) => self.set_led(value.is_on()),
        }
        Ok(())
    }
}

/// Responder node: LED follows the gate, button is pushed to the gate
pub struct ActuatorNode<'h, T: ServerTransport> {
    board: &'h Board,
    responder: Responder<'h, T>,
}

impl<'h, T: ServerTransport> ActuatorNode<'h, T> {
    /// Register the service on `transport`
    pub fn new(transport: T, board: &'h Board) -> Result<Self> {
        let responder = Responder::new(transport, ResponderConfig::new(board))?;
        Ok(Self { board, responder })
    }

    /// Underlying responder
    pub fn responder(&self) -> &Responder<'h, T> {
        &self.responder
    }

    /// Handle a transport event; a new session enables the button
    pub fn on_event(&mut self, event: &TransportEvent<'_>) -> Result<()> {
        self.responder.on_event(event)?;
        if let TransportEvent::SessionUp { .. } = event {
            self.board.enable_button();
        }
        Ok(())
    }

    /// Button press or release
    ///
    /// Returns `None` while the button is disabled.
    pub fn button(&mut self, pressed: bool) -> Result<Option<Outcome>> {
        if !self.board.button_enabled() {
            log::debug!("[{}] button disabled, ignoring", self.board.name());
            return Ok(None);
        }
        self.board.set_led(pressed);
        self.responder.push_update(StateValue::from(pressed)).map(Some)
    }
}

impl<T: ServerTransport> EventObserver for ActuatorNode<'_, T> {
    fn on_transport_event(&mut self, event: &TransportEvent<'_>) -> Result<()> {
        self.on_event(event)
    }
}

/// Initiator node: button is written to the actuator, LED follows pushes
pub struct GateNode<'h, T: ClientTransport> {
    board: &'h Board,
    initiator: Initiator<'h, T>,
}

impl<'h, T: ClientTransport> GateNode<'h, T> {
    /// Watch for the service on `transport`
    pub fn new(transport: T, board: &'h Board, policy: HandlePolicy) -> Result<Self> {
        let config = InitiatorConfig::<T>::new(board).handle_policy(policy);
        let initiator = Initiator::new(transport, config)?;
        Ok(Self { board, initiator })
    }

    /// Underlying initiator
    pub fn initiator(&self) -> &Initiator<'h, T> {
        &self.initiator
    }

    /// Handle a transport event
    pub fn on_event(&mut self, event: &TransportEvent<'_>) -> Result<()> {
        self.initiator.on_event(event)
    }

    /// Button press or release
    ///
    /// Returns `None` while the button is disabled.
    pub fn button(&mut self, pressed: bool) -> Result<Option<Outcome>> {
        if !self.board.button_enabled() {
            log::debug!("[{}] button disabled, ignoring", self.board.name());
            return Ok(None);
        }
        self.board.set_led(pressed);
        self.initiator.write_value(StateValue::from(pressed)).map(Some)
    }
}

impl<T: ClientTransport> EventObserver for GateNode<'_, T> {
    fn on_transport_event(&mut self, event: &TransportEvent<'_>) -> Result<()> {
        self.on_event(event)
    }
}
