// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory attribute transport for host testing
//!
//! A [`SimLink`] joins one [`SimServer`] endpoint and one [`SimClient`]
//! endpoint. Each endpoint keeps its own namespace table, the way two devices
//! each bind the vendor base independently. Writes and pushes are not
//! delivered synchronously: they are queued as [`OwnedEvent`]s that the
//! caller pumps into the roles, which keeps handlers run-to-completion.
//!
//! ```ignore
//! let link = SimLink::new(SimLinkConfig::default());
//! let mut responder = Responder::new(link.server(), ResponderConfig::new(&on_write))?;
//! let mut initiator = Initiator::new(link.client(), InitiatorConfig::new(&app))?;
//!
//! link.connect(SessionHandle(7))?;
//! link.discover()?;
//! link.pump(&mut responder, &mut initiator)?;
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;
use std::vec::Vec;

use super::{
    AttributeHandle, ClientTransport, DiscoveredAttribute, DiscoveryEvent, DiscoveryReport,
    PushEvent, ServerTransport, SessionHandle, Transport, TransportError, TransportEvent,
    ValueAttributeHandles, ValueAttributeSpec, WriteEvent,
};
use crate::dispatch::EventObserver;
use crate::uuid::{AttributeFamilyId, NamespaceTag};
use crate::value::SubscriptionControl;

/// Simulated transport parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimLinkConfig {
    /// Vendor bases each endpoint can bind
    pub namespace_capacity: usize,
    /// First attribute handle allocated on the server
    pub first_handle: u16,
}

impl Default for SimLinkConfig {
    fn default() -> Self {
        Self {
            namespace_capacity: 4,
            first_handle: 1,
        }
    }
}

/// Transport call recorded by an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimCall {
    /// `register_base`
    RegisterBase {
        /// Tag handed back, `UNKNOWN` when the table was full
        tag: NamespaceTag,
    },
    /// `add_service`
    AddService {
        /// Service family
        service: AttributeFamilyId,
    },
    /// `add_value_attribute`
    AddValueAttribute {
        /// Owning service
        service: AttributeHandle,
        /// Attribute family
        family: AttributeFamilyId,
    },
    /// `register_discovery`
    RegisterDiscovery {
        /// Watched service
        service: AttributeFamilyId,
    },
    /// `notify`
    Notify {
        /// Target session
        session: SessionHandle,
        /// Source attribute
        handle: AttributeHandle,
        /// Pushed bytes
        data: Vec<u8>,
    },
    /// `write_command`
    WriteCommand {
        /// Target session
        session: SessionHandle,
        /// Target attribute
        handle: AttributeHandle,
        /// Written bytes
        data: Vec<u8>,
    },
}

/// Event queued on one side of the link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedEvent {
    /// Connection established
    SessionUp {
        /// New session
        session: SessionHandle,
    },
    /// Connection torn down
    SessionDown {
        /// Ended session
        session: SessionHandle,
        /// Reason code
        reason: u8,
    },
    /// Discovery found the watched service
    DiscoveryComplete(DiscoveryReport),
    /// Discovery did not find the watched service
    ServiceNotFound {
        /// Session
        session: SessionHandle,
        /// Watched service
        service: AttributeFamilyId,
    },
    /// Discovery could not run
    DiscoveryUnavailable {
        /// Session
        session: SessionHandle,
    },
    /// Write from the client
    PeerWrite {
        /// Session
        session: SessionHandle,
        /// Written attribute
        handle: AttributeHandle,
        /// Family of the written attribute
        family: AttributeFamilyId,
        /// Bytes
        data: Vec<u8>,
    },
    /// Push from the server
    PeerPush {
        /// Session
        session: SessionHandle,
        /// Source attribute
        handle: AttributeHandle,
        /// Bytes
        data: Vec<u8>,
    },
}

impl OwnedEvent {
    /// Borrow as a [`TransportEvent`]
    pub fn as_event(&self) -> TransportEvent<'_> {
        match self {
            OwnedEvent::SessionUp { session } => TransportEvent::SessionUp { session: *session },
            OwnedEvent::SessionDown { session, reason } => TransportEvent::SessionDown {
                session: *session,
                reason: *reason,
            },
            OwnedEvent::DiscoveryComplete(report) => {
                TransportEvent::Discovery(DiscoveryEvent::Complete(report))
            }
            OwnedEvent::ServiceNotFound { session, service } => {
                TransportEvent::Discovery(DiscoveryEvent::ServiceNotFound {
                    session: *session,
                    service: *service,
                })
            }
            OwnedEvent::DiscoveryUnavailable { session } => {
                TransportEvent::Discovery(DiscoveryEvent::Unavailable { session: *session })
            }
            OwnedEvent::PeerWrite {
                session,
                handle,
                family,
                data,
            } => TransportEvent::PeerWrite(WriteEvent {
                session: *session,
                handle: *handle,
                family: *family,
                data,
            }),
            OwnedEvent::PeerPush {
                session,
                handle,
                data,
            } => TransportEvent::PeerPush(PushEvent {
                session: *session,
                handle: *handle,
                data,
            }),
        }
    }
}

// ============================================================================
// Link state
// ============================================================================

/// Vendor bases bound by one endpoint
#[derive(Debug)]
struct NamespaceTable {
    bases: Vec<[u8; 16]>,
    capacity: usize,
}

impl NamespaceTable {
    /// Tags above `VENDOR_BEGIN` fit in a byte, which caps the capacity
    const MAX_CAPACITY: usize = (u8::MAX - NamespaceTag::VENDOR_BEGIN.0) as usize + 1;

    fn new(capacity: usize) -> Self {
        Self {
            bases: Vec::new(),
            capacity: capacity.min(Self::MAX_CAPACITY),
        }
    }

    fn register(&mut self, base: &[u8; 16]) -> Result<NamespaceTag, TransportError> {
        if let Some(tag) = self.lookup(base) {
            return Ok(tag);
        }
        if self.bases.len() >= self.capacity {
            return Err(TransportError::TableFull);
        }
        self.bases.push(*base);
        Ok(Self::tag_at(self.bases.len() - 1))
    }

    fn lookup(&self, base: &[u8; 16]) -> Option<NamespaceTag> {
        self.bases
            .iter()
            .position(|b| b == base)
            .map(Self::tag_at)
    }

    fn base_of(&self, tag: NamespaceTag) -> Option<[u8; 16]> {
        let index = tag.0.checked_sub(NamespaceTag::VENDOR_BEGIN.0)?;
        self.bases.get(index as usize).copied()
    }

    /// Resolve a full identifier into this endpoint's namespace
    fn family_of(&self, uuid128: &[u8; 16]) -> AttributeFamilyId {
        let (base, short_code) = AttributeFamilyId::split_uuid128(uuid128);
        AttributeFamilyId::new(short_code, self.lookup(&base).unwrap_or(NamespaceTag::UNKNOWN))
    }

    /// Expand a family into its full identifier, if its base is bound here
    fn uuid128_of(&self, family: &AttributeFamilyId) -> Option<[u8; 16]> {
        self.base_of(family.namespace)
            .map(|base| family.to_uuid128(&base))
    }

    fn tag_at(index: usize) -> NamespaceTag {
        u8::try_from(index)
            .ok()
            .and_then(|i| NamespaceTag::VENDOR_BEGIN.0.checked_add(i))
            .map_or(NamespaceTag::UNKNOWN, NamespaceTag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeKind {
    Service,
    Declaration,
    Value {
        subscription: AttributeHandle,
        max_len: usize,
        notify: bool,
    },
    Subscription {
        value: AttributeHandle,
    },
}

#[derive(Debug, Clone, Copy)]
struct ServerAttribute {
    handle: AttributeHandle,
    uuid128: [u8; 16],
    kind: AttributeKind,
}

#[derive(Debug)]
struct LinkState {
    server_ns: NamespaceTable,
    client_ns: NamespaceTable,
    attributes: Vec<ServerAttribute>,
    next_handle: u16,
    values: BTreeMap<AttributeHandle, Vec<u8>>,
    session: SessionHandle,
    subscribed: BTreeSet<AttributeHandle>,
    watched: Vec<[u8; 16]>,
    server_events: VecDeque<OwnedEvent>,
    client_events: VecDeque<OwnedEvent>,
    server_calls: Vec<SimCall>,
    client_calls: Vec<SimCall>,
}

impl LinkState {
    fn new(config: SimLinkConfig) -> Self {
        Self {
            server_ns: NamespaceTable::new(config.namespace_capacity),
            client_ns: NamespaceTable::new(config.namespace_capacity),
            attributes: Vec::new(),
            next_handle: config.first_handle.max(1),
            values: BTreeMap::new(),
            session: SessionHandle::INVALID,
            subscribed: BTreeSet::new(),
            watched: Vec::new(),
            server_events: VecDeque::new(),
            client_events: VecDeque::new(),
            server_calls: Vec::new(),
            client_calls: Vec::new(),
        }
    }

    fn allocate(&mut self, uuid128: [u8; 16], kind: AttributeKind) -> Result<AttributeHandle, TransportError> {
        if self.next_handle == u16::MAX {
            return Err(TransportError::TableFull);
        }
        let handle = AttributeHandle(self.next_handle);
        self.next_handle += 1;
        self.attributes.push(ServerAttribute {
            handle,
            uuid128,
            kind,
        });
        Ok(handle)
    }

    /// Fail unless `count` more handles can be allocated
    fn reserve(&self, count: u16) -> Result<(), TransportError> {
        if u16::MAX - self.next_handle < count {
            return Err(TransportError::TableFull);
        }
        Ok(())
    }

    fn link_subscription(&mut self, value: AttributeHandle, handle: AttributeHandle) {
        for attribute in self.attributes.iter_mut().filter(|a| a.handle == value) {
            if let AttributeKind::Value { subscription, .. } = &mut attribute.kind {
                *subscription = handle;
            }
        }
    }

    fn attribute(&self, handle: AttributeHandle) -> Option<ServerAttribute> {
        self.attributes.iter().find(|a| a.handle == handle).copied()
    }

    fn check_session(&self, session: SessionHandle) -> Result<(), TransportError> {
        if session.is_valid() && session == self.session {
            Ok(())
        } else {
            Err(TransportError::InvalidSession)
        }
    }

    /// Build the client-side report for the service declared with `uuid128`
    fn report_for(&self, uuid128: &[u8; 16]) -> Option<DiscoveryReport> {
        let start = self
            .attributes
            .iter()
            .position(|a| a.kind == AttributeKind::Service && &a.uuid128 == uuid128)?;

        let mut report = DiscoveryReport::new(self.session, self.client_ns.family_of(uuid128));
        for attribute in self.attributes[start + 1..]
            .iter()
            .take_while(|a| a.kind != AttributeKind::Service)
        {
            if let AttributeKind::Value { subscription, .. } = attribute.kind {
                report = report.with_attribute(DiscoveredAttribute {
                    family: self.client_ns.family_of(&attribute.uuid128),
                    value_handle: attribute.handle,
                    subscription_handle: subscription,
                });
            }
        }
        Some(report)
    }
}

// ============================================================================
// SimLink - shared in-memory link
// ============================================================================

/// Shared in-memory link between one server and one client
#[derive(Clone)]
pub struct SimLink {
    state: Rc<RefCell<LinkState>>,
}

impl SimLink {
    /// Create a link with no session
    pub fn new(config: SimLinkConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(LinkState::new(config))),
        }
    }

    /// Server endpoint
    pub fn server(&self) -> SimServer {
        SimServer {
            state: Rc::clone(&self.state),
        }
    }

    /// Client endpoint
    pub fn client(&self) -> SimClient {
        SimClient {
            state: Rc::clone(&self.state),
        }
    }

    /// Establish `session` and queue session-up on both sides
    pub fn connect(&self, session: SessionHandle) -> Result<(), TransportError> {
        let mut state = self.state.borrow_mut();
        if !session.is_valid() || state.session.is_valid() {
            return Err(TransportError::Rejected);
        }
        state.session = session;
        state.server_events.push_back(OwnedEvent::SessionUp { session });
        state.client_events.push_back(OwnedEvent::SessionUp { session });
        Ok(())
    }

    /// Tear the session down and queue session-down on both sides
    ///
    /// Subscriptions do not survive the session.
    pub fn disconnect(&self, reason: u8) -> Result<(), TransportError> {
        let mut state = self.state.borrow_mut();
        let session = state.session;
        if !session.is_valid() {
            return Err(TransportError::InvalidSession);
        }
        state.session = SessionHandle::INVALID;
        state.subscribed.clear();
        state
            .server_events
            .push_back(OwnedEvent::SessionDown { session, reason });
        state
            .client_events
            .push_back(OwnedEvent::SessionDown { session, reason });
        Ok(())
    }

    /// Run discovery for every service the client watches
    ///
    /// Returns the number of discovery events queued for the client.
    pub fn discover(&self) -> Result<usize, TransportError> {
        let mut state = self.state.borrow_mut();
        let session = state.session;
        if !session.is_valid() {
            return Err(TransportError::InvalidSession);
        }

        let watched = state.watched.clone();
        for uuid128 in &watched {
            let event = match state.report_for(uuid128) {
                Some(report) => OwnedEvent::DiscoveryComplete(report),
                None => OwnedEvent::ServiceNotFound {
                    session,
                    service: state.client_ns.family_of(uuid128),
                },
            };
            state.client_events.push_back(event);
        }
        Ok(watched.len())
    }

    /// Next event for the server side
    pub fn poll_server(&self) -> Option<OwnedEvent> {
        self.state.borrow_mut().server_events.pop_front()
    }

    /// Next event for the client side
    pub fn poll_client(&self) -> Option<OwnedEvent> {
        self.state.borrow_mut().client_events.pop_front()
    }

    /// Queue an arbitrary event for the server side
    pub fn inject_server(&self, event: OwnedEvent) {
        self.state.borrow_mut().server_events.push_back(event);
    }

    /// Queue an arbitrary event for the client side
    pub fn inject_client(&self, event: OwnedEvent) {
        self.state.borrow_mut().client_events.push_back(event);
    }

    /// Deliver queued events until both queues are empty
    ///
    /// Events raised while handling an event are delivered in the same call.
    /// Returns the number of events delivered.
    pub fn pump(
        &self,
        server: &mut dyn EventObserver,
        client: &mut dyn EventObserver,
    ) -> crate::Result<usize> {
        let mut delivered = 0;
        loop {
            if let Some(event) = self.poll_server() {
                server.on_transport_event(&event.as_event())?;
            } else if let Some(event) = self.poll_client() {
                client.on_transport_event(&event.as_event())?;
            } else {
                return Ok(delivered);
            }
            delivered += 1;
        }
    }

    /// Active session
    pub fn session(&self) -> SessionHandle {
        self.state.borrow().session
    }

    /// True when the client enabled notifications of `value`
    pub fn is_subscribed(&self, value: AttributeHandle) -> bool {
        self.state.borrow().subscribed.contains(&value)
    }

    /// Server-resident value of `handle`
    pub fn stored_value(&self, handle: AttributeHandle) -> Option<Vec<u8>> {
        self.state.borrow().values.get(&handle).cloned()
    }

    /// Calls made through the server endpoint
    pub fn server_calls(&self) -> Vec<SimCall> {
        self.state.borrow().server_calls.clone()
    }

    /// Calls made through the client endpoint
    pub fn client_calls(&self) -> Vec<SimCall> {
        self.state.borrow().client_calls.clone()
    }

    /// Writes made through the client endpoint
    pub fn client_writes(&self) -> Vec<(SessionHandle, AttributeHandle, Vec<u8>)> {
        self.state
            .borrow()
            .client_calls
            .iter()
            .filter_map(|call| match call {
                SimCall::WriteCommand {
                    session,
                    handle,
                    data,
                } => Some((*session, *handle, data.clone())),
                _ => None,
            })
            .collect()
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// Server endpoint of a [`SimLink`]
pub struct SimServer {
    state: Rc<RefCell<LinkState>>,
}

impl Transport for SimServer {
    fn register_base(&mut self, base: &[u8; 16]) -> Result<NamespaceTag, TransportError> {
        let mut state = self.state.borrow_mut();
        let result = state.server_ns.register(base);
        state.server_calls.push(SimCall::RegisterBase {
            tag: result.unwrap_or(NamespaceTag::UNKNOWN),
        });
        result
    }
}

impl ServerTransport for SimServer {
    fn add_service(&mut self, service: AttributeFamilyId) -> Result<AttributeHandle, TransportError> {
        let mut state = self.state.borrow_mut();
        state.server_calls.push(SimCall::AddService { service });

        let uuid128 = state
            .server_ns
            .uuid128_of(&service)
            .ok_or(TransportError::Rejected)?;
        state.allocate(uuid128, AttributeKind::Service)
    }

    fn add_value_attribute(
        &mut self,
        service: AttributeHandle,
        family: AttributeFamilyId,
        spec: &ValueAttributeSpec,
    ) -> Result<ValueAttributeHandles, TransportError> {
        let mut state = self.state.borrow_mut();
        state
            .server_calls
            .push(SimCall::AddValueAttribute { service, family });

        match state.attribute(service) {
            Some(attribute) if attribute.kind == AttributeKind::Service => {}
            _ => return Err(TransportError::InvalidHandle),
        }
        let uuid128 = state
            .server_ns
            .uuid128_of(&family)
            .ok_or(TransportError::Rejected)?;

        let notify = spec.properties.notify;
        state.reserve(if notify { 3 } else { 2 })?;

        // Declaration, value, then subscription control
        let declaration = state.allocate(uuid128, AttributeKind::Declaration)?;
        let value = state.allocate(
            uuid128,
            AttributeKind::Value {
                subscription: AttributeHandle::INVALID,
                max_len: spec.length as usize,
                notify,
            },
        )?;
        let subscription = if notify {
            let subscription = state.allocate(uuid128, AttributeKind::Subscription { value })?;
            state.link_subscription(value, subscription);
            subscription
        } else {
            AttributeHandle::INVALID
        };
        state.values.insert(value, spec.initial.encode().to_vec());

        Ok(ValueAttributeHandles {
            declaration,
            value,
            subscription,
        })
    }

    fn notify(
        &mut self,
        session: SessionHandle,
        handle: AttributeHandle,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let mut state = self.state.borrow_mut();
        state.server_calls.push(SimCall::Notify {
            session,
            handle,
            data: data.to_vec(),
        });

        state.check_session(session)?;
        match state.attribute(handle).map(|a| a.kind) {
            Some(AttributeKind::Value { notify: true, .. }) => {}
            _ => return Err(TransportError::InvalidHandle),
        }
        if !state.subscribed.contains(&handle) {
            return Err(TransportError::SubscriptionNotConfigured);
        }

        state.values.insert(handle, data.to_vec());
        state.client_events.push_back(OwnedEvent::PeerPush {
            session,
            handle,
            data: data.to_vec(),
        });
        Ok(())
    }
}

/// Client endpoint of a [`SimLink`]
pub struct SimClient {
    state: Rc<RefCell<LinkState>>,
}

impl Transport for SimClient {
    fn register_base(&mut self, base: &[u8; 16]) -> Result<NamespaceTag, TransportError> {
        let mut state = self.state.borrow_mut();
        let result = state.client_ns.register(base);
        state.client_calls.push(SimCall::RegisterBase {
            tag: result.unwrap_or(NamespaceTag::UNKNOWN),
        });
        result
    }
}

impl ClientTransport for SimClient {
    fn register_discovery(&mut self, service: AttributeFamilyId) -> Result<(), TransportError> {
        let mut state = self.state.borrow_mut();
        state.client_calls.push(SimCall::RegisterDiscovery { service });

        let uuid128 = state
            .client_ns
            .uuid128_of(&service)
            .ok_or(TransportError::Rejected)?;
        if !state.watched.contains(&uuid128) {
            state.watched.push(uuid128);
        }
        Ok(())
    }

    fn write_command(
        &mut self,
        session: SessionHandle,
        handle: AttributeHandle,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let mut state = self.state.borrow_mut();
        state.client_calls.push(SimCall::WriteCommand {
            session,
            handle,
            data: data.to_vec(),
        });

        state.check_session(session)?;
        let attribute = state.attribute(handle).ok_or(TransportError::InvalidHandle)?;

        match attribute.kind {
            AttributeKind::Value { max_len, .. } => {
                // Oversized write commands are dropped by the server
                if data.len() > max_len {
                    return Ok(());
                }
                state.values.insert(handle, data.to_vec());
                let family = state.server_ns.family_of(&attribute.uuid128);
                state.server_events.push_back(OwnedEvent::PeerWrite {
                    session,
                    handle,
                    family,
                    data: data.to_vec(),
                });
            }
            AttributeKind::Subscription { value } => {
                let enabled = SubscriptionControl::decode(data)
                    .map(SubscriptionControl::is_enabled)
                    .unwrap_or(false);
                if enabled {
                    state.subscribed.insert(value);
                } else {
                    state.subscribed.remove(&value);
                }
            }
            AttributeKind::Service | AttributeKind::Declaration => {
                return Err(TransportError::Rejected);
            }
        }
        Ok(())
    }
}
