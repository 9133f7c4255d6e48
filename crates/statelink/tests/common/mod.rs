// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// Shared setup for the role integration tests

#![allow(dead_code)]

use std::cell::RefCell;

use statelink::transport::sim::{SimClient, SimLinkConfig, SimLink, SimServer};
use statelink::{
    ClientTransport, DiscoveredHandles, HandlePolicy, Initiator, InitiatorConfig, InitiatorEvent,
    InitiatorHandler, Responder, ResponderConfig, StateValue, WriteHandler,
};

/// First server handle; yields value 42 and subscription 43
pub const FIRST_HANDLE: u16 = 40;

pub fn link() -> SimLink {
    SimLink::new(SimLinkConfig {
        first_handle: FIRST_HANDLE,
        ..SimLinkConfig::default()
    })
}

pub fn responder<'h>(link: &SimLink, on_write: &'h dyn WriteHandler) -> Responder<'h, SimServer> {
    Responder::new(link.server(), ResponderConfig::new(on_write)).expect("register responder")
}

pub fn initiator<'h>(
    link: &SimLink,
    handler: &'h dyn InitiatorHandler<SimClient>,
    policy: HandlePolicy,
) -> Initiator<'h, SimClient> {
    Initiator::new(
        link.client(),
        InitiatorConfig::new(handler).handle_policy(policy),
    )
    .expect("register initiator")
}

/// Initiator owner recording every event
///
/// With `adopt` set it behaves like the gate application: discovered
/// handles are assigned and notifications enabled right away.
#[derive(Default)]
pub struct Recorder {
    pub events: RefCell<Vec<InitiatorEvent>>,
    pub adopt: bool,
}

impl Recorder {
    pub fn adopting() -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            adopt: true,
        }
    }

    pub fn discovered(&self) -> Option<DiscoveredHandles> {
        self.events.borrow().iter().rev().find_map(|e| match e {
            InitiatorEvent::DiscoveryComplete(handles) => Some(*handles),
            _ => None,
        })
    }

    pub fn notifications(&self) -> Vec<StateValue> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                InitiatorEvent::NotificationReceived(value) => Some(*value),
                _ => None,
            })
            .collect()
    }
}

impl<T: ClientTransport> InitiatorHandler<T> for Recorder {
    fn on_event(&self, event: &InitiatorEvent, initiator: &mut Initiator<'_, T>) -> statelink::Result<()> {
        self.events.borrow_mut().push(*event);
        if let (true, InitiatorEvent::DiscoveryComplete(handles)) = (self.adopt, event) {
            initiator.assign_handles(handles);
            let _ = initiator.set_subscription(true)?;
        }
        Ok(())
    }
}
