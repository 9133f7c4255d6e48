// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Event dispatch glue
//!
//! Roles never call each other. Each one reacts to transport events through
//! its `on_event` entry point and to explicit calls from its owner. An
//! [`ObserverSet`] fans one transport event out to several observers in
//! priority order, the way a stack-level observer table does on target.

use heapless::Vec;

use crate::error::{Error, Result};
use crate::role::{Initiator, Responder};
use crate::transport::{ClientTransport, ServerTransport, TransportEvent};

/// Default observer priority of the roles
pub const ROLE_OBSERVER_PRIORITY: u8 = 3;

/// Anything that consumes transport events
pub trait EventObserver {
    /// Handle one event to completion
    fn on_transport_event(&mut self, event: &TransportEvent<'_>) -> Result<()>;
}

impl<T: ServerTransport> EventObserver for Responder<'_, T> {
    fn on_transport_event(&mut self, event: &TransportEvent<'_>) -> Result<()> {
        self.on_event(event)
    }
}

impl<T: ClientTransport> EventObserver for Initiator<'_, T> {
    fn on_transport_event(&mut self, event: &TransportEvent<'_>) -> Result<()> {
        self.on_event(event)
    }
}

struct Entry<'a> {
    priority: u8,
    observer: &'a mut dyn EventObserver,
}

/// Fixed-capacity, priority-ordered set of observers
///
/// Lower priority values are served first; equal priorities keep
/// registration order.
pub struct ObserverSet<'a, const N: usize> {
    entries: Vec<Entry<'a>, N>,
}

impl<'a, const N: usize> ObserverSet<'a, N> {
    /// Create an empty set
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register `observer` at `priority`
    pub fn register(&mut self, priority: u8, observer: &'a mut dyn EventObserver) -> Result<()> {
        let at = self
            .entries
            .iter()
            .position(|e| e.priority > priority)
            .unwrap_or(self.entries.len());

        self.entries
            .insert(at, Entry { priority, observer })
            .map_err(|_| Error::ObserverSetFull)
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver `event` to every observer in order
    ///
    /// Stops at the first observer that returns an error.
    pub fn dispatch(&mut self, event: &TransportEvent<'_>) -> Result<()> {
        log::trace!("[dispatch] {} to {} observer(s)", event.kind(), self.entries.len());

        for entry in self.entries.iter_mut() {
            entry.observer.on_transport_event(event)?;
        }
        Ok(())
    }
}

impl<const N: usize> Default for ObserverSet<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
