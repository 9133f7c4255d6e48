// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Responder - serves the state value and notifies its subscriber

use super::{Outcome, SkipReason};
use crate::error::{Error, RegistrationStep, Result};
use crate::transport::{
    AttributeHandle, ServerTransport, SessionHandle, TransportError, TransportEvent,
    ValueAttributeHandles, ValueAttributeSpec, WriteEvent,
};
use crate::uuid::{self, AttributeFamilyId, SERVICE_UUID, VALUE_UUID};
use crate::value::StateValue;

/// Receives values written by the initiator
pub trait WriteHandler {
    /// Called once per well-formed write to the value attribute
    fn on_write(&self, value: StateValue);
}

impl<F: Fn(StateValue)> WriteHandler for F {
    fn on_write(&self, value: StateValue) {
        self(value)
    }
}

/// Parameters needed to initialize a responder
#[derive(Clone, Copy, Default)]
pub struct ResponderConfig<'h> {
    /// Write handler; writes are dropped with a diagnostic when absent
    pub on_write: Option<&'h dyn WriteHandler>,
}

impl<'h> ResponderConfig<'h> {
    /// Config with a write handler
    pub fn new(on_write: &'h dyn WriteHandler) -> Self {
        Self {
            on_write: Some(on_write),
        }
    }
}

/// Lifecycle of a responder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderState {
    /// Service registered, no subscriber connected
    Registered,
    /// A session is active
    SessionActive,
}

/// Responder - owner of the state value attribute
///
/// # Design
///
/// - Registration happens once in [`Responder::new`] and lives as long as the
///   process; a disconnect goes back to [`ResponderState::Registered`]
/// - One session at a time
/// - One-byte payloads, so a push is delivered whole or not at all
///
/// # Example
///
/// ```ignore
/// let on_write = |value: StateValue| led.set(value.is_on());
/// let mut responder = Responder::new(transport, ResponderConfig::new(&on_write))?;
///
/// // From the transport's event loop
/// responder.on_event(&event)?;
///
/// // From the application
/// responder.push_update(StateValue::ON)?;
/// ```
pub struct Responder<'h, T: ServerTransport> {
    transport: T,
    service_family: AttributeFamilyId,
    value_family: AttributeFamilyId,
    service_handle: AttributeHandle,
    handles: ValueAttributeHandles,
    session: SessionHandle,
    on_write: Option<&'h dyn WriteHandler>,
}

impl<'h, T: ServerTransport> Responder<'h, T> {
    /// Register the service and its value attribute with `transport`
    ///
    /// Any rejected registration is returned as [`Error::Registration`].
    pub fn new(mut transport: T, config: ResponderConfig<'h>) -> Result<Self> {
        let service_family = uuid::register(&mut transport, SERVICE_UUID)?;

        let service_handle = transport
            .add_service(service_family)
            .map_err(|e| Error::registration(RegistrationStep::Service, e))?;

        let value_family = uuid::register(&mut transport, VALUE_UUID)?;
        let handles = transport
            .add_value_attribute(service_handle, value_family, &ValueAttributeSpec::state_value())
            .map_err(|e| Error::registration(RegistrationStep::ValueAttribute, e))?;

        log::info!(
            "[responder] registered service {} at {}, value {} (subscription {})",
            service_family,
            service_handle,
            handles.value,
            handles.subscription
        );

        Ok(Self {
            transport,
            service_family,
            value_family,
            service_handle,
            handles,
            session: SessionHandle::INVALID,
            on_write: config.on_write,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> ResponderState {
        if self.session.is_valid() {
            ResponderState::SessionActive
        } else {
            ResponderState::Registered
        }
    }

    /// Active session, `INVALID` when disconnected
    pub const fn session(&self) -> SessionHandle {
        self.session
    }

    /// Registered service identifier
    pub const fn service_family(&self) -> AttributeFamilyId {
        self.service_family
    }

    /// Registered value attribute identifier
    pub const fn value_family(&self) -> AttributeFamilyId {
        self.value_family
    }

    /// Handle of the service container
    pub const fn service_handle(&self) -> AttributeHandle {
        self.service_handle
    }

    /// Handles of the value attribute
    pub const fn handles(&self) -> ValueAttributeHandles {
        self.handles
    }

    /// Get transport (immutable)
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get transport (mutable)
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Single dispatch point for transport events
    ///
    /// Session up: store the handle. Session down: reset it. Peer write:
    /// hand the value to the write handler. Everything else is ignored.
    pub fn on_event(&mut self, event: &TransportEvent<'_>) -> Result<()> {
        match event {
            TransportEvent::SessionUp { session } => {
                log::debug!("[responder] session {} up", session);
                self.session = *session;
            }
            TransportEvent::SessionDown { session, reason } => {
                log::debug!("[responder] session {} down (reason {:#04x})", session, reason);
                self.session = SessionHandle::INVALID;
            }
            TransportEvent::PeerWrite(write) => self.on_peer_write(write),
            TransportEvent::Discovery(_) | TransportEvent::PeerPush(_) => {}
        }
        Ok(())
    }

    /// Notify the subscriber that the state changed
    ///
    /// Skipped without error when no session is active or when the peer has
    /// not enabled notifications yet. Any other transport status is fatal.
    pub fn push_update(&mut self, value: StateValue) -> Result<Outcome> {
        if !self.session.is_valid() {
            log::info!("[responder] no session, not pushing {}", value);
            return Ok(Outcome::Skipped(SkipReason::NoSession));
        }

        match self
            .transport
            .notify(self.session, self.handles.value, &value.encode())
        {
            Ok(()) => {
                log::debug!("[responder] pushed {} on session {}", value, self.session);
                Ok(Outcome::Issued)
            }
            Err(TransportError::SubscriptionNotConfigured) => {
                log::info!("[responder] subscription not configured yet, not pushing {}", value);
                Ok(Outcome::Skipped(SkipReason::NotSubscribed))
            }
            Err(e) => Err(Error::Transport(e)),
        }
    }

    fn on_peer_write(&self, write: &WriteEvent<'_>) {
        if !write.family.matches(&self.value_family) || write.handle != self.handles.value {
            log::trace!("[responder] ignoring write to {} ({})", write.handle, write.family);
            return;
        }

        let value = match StateValue::decode(write.data) {
            Ok(value) => value,
            Err(e) => {
                log::trace!("[responder] ignoring write to {}: {}", write.handle, e);
                return;
            }
        };

        match self.on_write {
            Some(handler) => handler.on_write(value),
            None => log::info!("[responder] no write handler, dropping {}", value),
        }
    }
}
