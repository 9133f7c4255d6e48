// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Initiator - discovers the peer's state value, writes it and receives pushes

use super::{Outcome, SkipReason};
use crate::error::{Error, RegistrationStep, Result};
use crate::transport::{
    AttributeHandle, ClientTransport, DiscoveryEvent, DiscoveryReport, PushEvent, SessionHandle,
    TransportEvent,
};
use crate::uuid::{self, AttributeFamilyId, SERVICE_UUID, VALUE_UUID};
use crate::value::{StateValue, SubscriptionControl};

/// Peer handles extracted from a discovery report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscoveredHandles {
    /// Value attribute on the peer
    pub value: AttributeHandle,
    /// Subscription-control attribute on the peer
    pub subscription: AttributeHandle,
}

impl DiscoveredHandles {
    /// Both handles are `INVALID`
    pub const UNRESOLVED: DiscoveredHandles = DiscoveredHandles {
        value: AttributeHandle::INVALID,
        subscription: AttributeHandle::INVALID,
    };

    /// True once the value handle is known
    pub const fn is_resolved(&self) -> bool {
        self.value.is_valid()
    }
}

/// Event raised to the initiator's owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitiatorEvent {
    /// Discovery of the peer's service finished
    DiscoveryComplete(DiscoveredHandles),
    /// The peer pushed a new value
    NotificationReceived(StateValue),
}

/// Receives [`InitiatorEvent`]s
///
/// The initiator is passed back so the owner can call
/// [`Initiator::assign_handles`] and [`Initiator::set_subscription`] while
/// handling [`InitiatorEvent::DiscoveryComplete`]. An error returned here is
/// propagated out of [`Initiator::on_event`].
pub trait InitiatorHandler<T: ClientTransport> {
    /// Handle one event
    fn on_event(&self, event: &InitiatorEvent, initiator: &mut Initiator<'_, T>) -> Result<()>;
}

/// What happens to peer handles when the session goes down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlePolicy {
    /// Keep them until the next discovery reassigns them
    #[default]
    RetainUntilReassigned,
    /// Reset them to `INVALID`
    InvalidateOnSessionDown,
}

/// Parameters needed to initialize an initiator
pub struct InitiatorConfig<'h, T: ClientTransport> {
    /// Event handler; events are dropped with a diagnostic when absent
    pub handler: Option<&'h dyn InitiatorHandler<T>>,
    /// Handle retention across disconnects
    pub handle_policy: HandlePolicy,
}

impl<'h, T: ClientTransport> InitiatorConfig<'h, T> {
    /// Config with an event handler and the default handle policy
    pub fn new(handler: &'h dyn InitiatorHandler<T>) -> Self {
        Self {
            handler: Some(handler),
            handle_policy: HandlePolicy::default(),
        }
    }

    /// Set the handle policy
    pub fn handle_policy(mut self, policy: HandlePolicy) -> Self {
        self.handle_policy = policy;
        self
    }
}

impl<T: ClientTransport> Default for InitiatorConfig<'_, T> {
    fn default() -> Self {
        Self {
            handler: None,
            handle_policy: HandlePolicy::default(),
        }
    }
}

/// Lifecycle of an initiator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitiatorState {
    /// No session
    Idle,
    /// Session up, peer handles not resolved
    Connected,
    /// Session up and peer handles resolved
    Ready,
}

/// Initiator - client side of the state value
///
/// # Design
///
/// - Discovery results are reported to the owner, who assigns them
///   explicitly with [`Initiator::assign_handles`]
/// - Writes are unacknowledged
/// - One session at a time
///
/// # Example
///
/// ```ignore
/// let mut initiator = Initiator::new(transport, InitiatorConfig::new(&app))?;
///
/// // From the transport's event loop
/// initiator.on_event(&event)?;
///
/// // From the application, once handles are assigned
/// initiator.write_value(StateValue::ON)?;
/// ```
pub struct Initiator<'h, T: ClientTransport> {
    transport: T,
    service_family: AttributeFamilyId,
    session: SessionHandle,
    handles: DiscoveredHandles,
    subscription: SubscriptionControl,
    handler: Option<&'h dyn InitiatorHandler<T>>,
    handle_policy: HandlePolicy,
}

impl<'h, T: ClientTransport> Initiator<'h, T> {
    /// Register the service identifier and subscribe to its discovery results
    pub fn new(mut transport: T, config: InitiatorConfig<'h, T>) -> Result<Self> {
        let service_family = uuid::register(&mut transport, SERVICE_UUID)?;

        transport
            .register_discovery(service_family)
            .map_err(|e| Error::registration(RegistrationStep::DiscoveryObserver, e))?;

        log::info!("[initiator] watching discovery of service {}", service_family);

        Ok(Self {
            transport,
            service_family,
            session: SessionHandle::INVALID,
            handles: DiscoveredHandles::UNRESOLVED,
            subscription: SubscriptionControl::Disabled,
            handler: config.handler,
            handle_policy: config.handle_policy,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> InitiatorState {
        if !self.session.is_valid() {
            InitiatorState::Idle
        } else if self.handles.is_resolved() {
            InitiatorState::Ready
        } else {
            InitiatorState::Connected
        }
    }

    /// Active session, `INVALID` when disconnected
    pub const fn session(&self) -> SessionHandle {
        self.session
    }

    /// Currently assigned peer handles
    pub const fn handles(&self) -> DiscoveredHandles {
        self.handles
    }

    /// Registered service identifier
    pub const fn service_family(&self) -> AttributeFamilyId {
        self.service_family
    }

    /// Last subscription-control value written
    pub const fn subscription(&self) -> SubscriptionControl {
        self.subscription
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
    /// Session up: store the handle. Session down: reset it (and the peer
    /// handles under [`HandlePolicy::InvalidateOnSessionDown`]). Discovery:
    /// raise [`InitiatorEvent::DiscoveryComplete`]. Push: raise
    /// [`InitiatorEvent::NotificationReceived`].
    pub fn on_event(&mut self, event: &TransportEvent<'_>) -> Result<()> {
        match event {
            TransportEvent::SessionUp { session } => {
                log::debug!("[initiator] session {} up", session);
                self.session = *session;
                Ok(())
            }
            TransportEvent::SessionDown { session, reason } => {
                log::debug!("[initiator] session {} down (reason {:#04x})", session, reason);
                self.on_session_down();
                Ok(())
            }
            TransportEvent::Discovery(discovery) => self.on_discovery(discovery),
            TransportEvent::PeerPush(push) => self.on_peer_push(push),
            TransportEvent::PeerWrite(_) => Ok(()),
        }
    }

    /// Copy discovered handles into this instance
    ///
    /// Until this is called, [`Self::write_value`] and
    /// [`Self::set_subscription`] are skipped.
    pub fn assign_handles(&mut self, handles: &DiscoveredHandles) {
        self.handles = *handles;
        log::info!(
            "[initiator] handles assigned: value {}, subscription {}",
            handles.value,
            handles.subscription
        );
    }

    /// Write `value` to the peer's value attribute (unacknowledged)
    pub fn write_value(&mut self, value: StateValue) -> Result<Outcome> {
        if !self.handles.value.is_valid() {
            log::info!("[initiator] value handle not assigned, not writing {}", value);
            return Ok(Outcome::Skipped(SkipReason::HandlesUnresolved));
        }
        if !self.session.is_valid() {
            log::info!("[initiator] no session, not writing {}", value);
            return Ok(Outcome::Skipped(SkipReason::NoSession));
        }

        self.transport
            .write_command(self.session, self.handles.value, &value.encode())?;

        log::debug!("[initiator] wrote {} to {}", value, self.handles.value);
        Ok(Outcome::Issued)
    }

    /// Enable or disable notifications of the peer's value
    ///
    /// Every call writes the subscription control, even if the requested
    /// state is already in place.
    pub fn set_subscription(&mut self, enabled: bool) -> Result<Outcome> {
        if !self.handles.value.is_valid() || !self.handles.subscription.is_valid() {
            log::info!("[initiator] subscription handle not assigned, leaving");
            return Ok(Outcome::Skipped(SkipReason::HandlesUnresolved));
        }
        if !self.session.is_valid() {
            log::info!("[initiator] no session, not changing subscription");
            return Ok(Outcome::Skipped(SkipReason::NoSession));
        }

        let control = SubscriptionControl::from_enabled(enabled);
        self.transport
            .write_command(self.session, self.handles.subscription, &control.encode())?;
        self.subscription = control;

        log::debug!("[initiator] subscription {:?} on {}", control, self.handles.subscription);
        Ok(Outcome::Issued)
    }

    fn on_session_down(&mut self) {
        self.session = SessionHandle::INVALID;
        self.subscription = SubscriptionControl::Disabled;

        if self.handle_policy == HandlePolicy::InvalidateOnSessionDown {
            self.handles = DiscoveredHandles::UNRESOLVED;
        }
    }

    fn on_discovery(&mut self, discovery: &DiscoveryEvent<'_>) -> Result<()> {
        let report = match discovery {
            DiscoveryEvent::Complete(report) => *report,
            DiscoveryEvent::ServiceNotFound { session, service } => {
                log::info!("[initiator] service {} not found on session {}", service, session);
                return Ok(());
            }
            DiscoveryEvent::Unavailable { session } => {
                log::info!("[initiator] discovery incomplete on session {}, leaving", session);
                return Ok(());
            }
        };

        if !report.service.matches(&self.service_family) {
            log::trace!("[initiator] ignoring discovery of {}", report.service);
            return Ok(());
        }

        let handles = self.extract_handles(report);
        self.emit(InitiatorEvent::DiscoveryComplete(handles))
    }

    fn extract_handles(&self, report: &DiscoveryReport) -> DiscoveredHandles {
        let value_family = AttributeFamilyId::new(VALUE_UUID, self.service_family.namespace);

        let mut handles = DiscoveredHandles::UNRESOLVED;
        for attribute in report.attributes() {
            if attribute.family.matches(&value_family) {
                handles.value = attribute.value_handle;
                handles.subscription = attribute.subscription_handle;
            }
        }
        handles
    }

    fn on_peer_push(&mut self, push: &PushEvent<'_>) -> Result<()> {
        if !push.handle.is_valid() || push.handle != self.handles.value {
            log::trace!("[initiator] ignoring push from {}", push.handle);
            return Ok(());
        }

        match StateValue::decode(push.data) {
            Ok(value) => self.emit(InitiatorEvent::NotificationReceived(value)),
            Err(e) => {
                log::trace!("[initiator] ignoring push from {}: {}", push.handle, e);
                Ok(())
            }
        }
    }

    fn emit(&mut self, event: InitiatorEvent) -> Result<()> {
        match self.handler {
            Some(handler) => handler.on_event(&event, self),
            None => {
                log::info!("[initiator] no event handler, dropping {:?}", event);
                Ok(())
            }
        }
    }
}
