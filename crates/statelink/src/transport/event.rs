// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Events delivered by the transport to the roles

use heapless::Vec;

use super::types::{AttributeHandle, SessionHandle};
use crate::uuid::AttributeFamilyId;

/// Maximum attributes kept from one discovered service
pub const MAX_DISCOVERED_ATTRIBUTES: usize = 6;

/// Event delivered to a role's dispatch entry point
///
/// Each variant carries only the payload relevant to its kind. Borrowed data
/// is only valid for the duration of the dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent<'a> {
    /// A connection was established
    SessionUp {
        /// New session
        session: SessionHandle,
    },

    /// A connection was torn down
    SessionDown {
        /// Session that ended
        session: SessionHandle,
        /// Transport-specific reason code
        reason: u8,
    },

    /// Service discovery finished (or gave up)
    Discovery(DiscoveryEvent<'a>),

    /// A peer wrote one of our attributes (responder side)
    PeerWrite(WriteEvent<'a>),

    /// A peer pushed a value to us (initiator side)
    PeerPush(PushEvent<'a>),
}

impl TransportEvent<'_> {
    /// Short name for logs
    pub const fn kind(&self) -> &'static str {
        match self {
            TransportEvent::SessionUp { .. } => "session-up",
            TransportEvent::SessionDown { .. } => "session-down",
            TransportEvent::Discovery(_) => "discovery",
            TransportEvent::PeerWrite(_) => "peer-write",
            TransportEvent::PeerPush(_) => "peer-push",
        }
    }
}

/// Write received from a peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteEvent<'a> {
    /// Session the write arrived on
    pub session: SessionHandle,
    /// Target attribute
    pub handle: AttributeHandle,
    /// Family of the target attribute
    pub family: AttributeFamilyId,
    /// Written bytes
    pub data: &'a [u8],
}

/// Notification received from a peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushEvent<'a> {
    /// Session the push arrived on
    pub session: SessionHandle,
    /// Source attribute on the peer
    pub handle: AttributeHandle,
    /// Pushed bytes
    pub data: &'a [u8],
}

/// Outcome of a discovery procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryEvent<'a> {
    /// Service found and its attributes enumerated
    Complete(&'a DiscoveryReport),

    /// The peer does not expose the service
    ServiceNotFound {
        /// Session the discovery ran on
        session: SessionHandle,
        /// Service looked for
        service: AttributeFamilyId,
    },

    /// Discovery could not run (transport busy, link lost)
    Unavailable {
        /// Session the discovery ran on
        session: SessionHandle,
    },
}

/// One attribute found during discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscoveredAttribute {
    /// Family of the attribute
    pub family: AttributeFamilyId,
    /// Value handle on the peer
    pub value_handle: AttributeHandle,
    /// Subscription-control handle, `INVALID` when the attribute has none
    pub subscription_handle: AttributeHandle,
}

/// Read-only description of one discovered service instance
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiscoveryReport {
    /// Session the discovery ran on
    pub session: SessionHandle,
    /// Discovered service
    pub service: AttributeFamilyId,
    attributes: Vec<DiscoveredAttribute, MAX_DISCOVERED_ATTRIBUTES>,
}

impl DiscoveryReport {
    /// Empty report for `service`
    pub fn new(session: SessionHandle, service: AttributeFamilyId) -> Self {
        Self {
            session,
            service,
            attributes: Vec::new(),
        }
    }

    /// Append an attribute; returns it back when the report is full
    pub fn push(&mut self, attribute: DiscoveredAttribute) -> Result<(), DiscoveredAttribute> {
        self.attributes.push(attribute)
    }

    /// Builder-style [`Self::push`] that drops attributes past capacity
    pub fn with_attribute(mut self, attribute: DiscoveredAttribute) -> Self {
        if self.attributes.push(attribute).is_err() {
            log::trace!("[discovery] report full, dropping {}", attribute.family);
        }
        self
    }

    /// Discovered attributes in discovery order
    pub fn attributes(&self) -> &[DiscoveredAttribute] {
        &self.attributes
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// True when no attribute was found
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uuid::{NamespaceTag, SERVICE_UUID, VALUE_UUID};

    #[test]
    fn test_report_capacity() {
        let service = AttributeFamilyId::new(SERVICE_UUID, NamespaceTag(2));
        let mut report = DiscoveryReport::new(SessionHandle(1), service);

        let attr = DiscoveredAttribute {
            family: AttributeFamilyId::new(VALUE_UUID, NamespaceTag(2)),
            value_handle: AttributeHandle(3),
            subscription_handle: AttributeHandle(4),
        };
        for _ in 0..MAX_DISCOVERED_ATTRIBUTES {
            report.push(attr).unwrap();
        }
        assert_eq!(report.push(attr), Err(attr));
        assert_eq!(report.len(), MAX_DISCOVERED_ATTRIBUTES);
    }

    #[test]
    fn test_event_kind_names() {
        let up = TransportEvent::SessionUp {
            session: SessionHandle(7),
        };
        assert_eq!(up.kind(), "session-up");

        let push = TransportEvent::PeerPush(PushEvent {
            session: SessionHandle(7),
            handle: AttributeHandle(42),
            data: &[1],
        });
        assert_eq!(push.kind(), "peer-push");
    }
}
