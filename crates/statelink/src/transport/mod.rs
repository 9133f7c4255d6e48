// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport abstraction for StateLink
//!
//! The attribute transport (connection setup, MTU, link security, attribute
//! tables) is external. Roles call into it through the traits below and
//! receive its [`TransportEvent`]s through their dispatch entry point.
//!
//! ## Design Principles
//!
//! - **Fire-and-forget** - calls return the transport's immediate status only
//! - **No heap allocations** - payloads are borrowed slices
//! - **Split by role** - a server endpoint never needs client operations

use thiserror::Error;

use crate::uuid::{AttributeFamilyId, NamespaceTag};

mod event;
mod types;

#[cfg(feature = "std")]
pub mod sim;

pub use event::{
    DiscoveredAttribute, DiscoveryEvent, DiscoveryReport, PushEvent, TransportEvent, WriteEvent,
    MAX_DISCOVERED_ATTRIBUTES,
};
pub use types::{
    AttributeHandle, Permission, Properties, SessionHandle, StorageLocation, ValueAttributeHandles,
    ValueAttributeSpec,
};

/// Status codes reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Identifier or attribute table has no room left
    #[error("table full")]
    TableFull,

    /// Request rejected (bad parameters, wrong state)
    #[error("request rejected")]
    Rejected,

    /// Session handle does not name a live connection
    #[error("invalid session handle")]
    InvalidSession,

    /// Attribute handle does not exist
    #[error("invalid attribute handle")]
    InvalidHandle,

    /// Peer has not configured push delivery yet
    #[error("subscription not configured by peer")]
    SubscriptionNotConfigured,

    /// Transport queue is busy
    #[error("transport busy")]
    Busy,

    /// Any other transport-specific status
    #[error("transport status {0:#x}")]
    Other(u32),
}

/// Operations shared by both endpoints
pub trait Transport {
    /// Bind a vendor base identifier and return its namespace tag
    ///
    /// Registering the same base twice returns the same tag.
    fn register_base(&mut self, base: &[u8; 16]) -> Result<NamespaceTag, TransportError>;
}

/// Attribute server endpoint (used by the responder)
pub trait ServerTransport: Transport {
    /// Add a primary service container
    fn add_service(&mut self, service: AttributeFamilyId) -> Result<AttributeHandle, TransportError>;

    /// Add the value attribute (and its subscription control) to `service`
    fn add_value_attribute(
        &mut self,
        service: AttributeHandle,
        family: AttributeFamilyId,
        spec: &ValueAttributeSpec,
    ) -> Result<ValueAttributeHandles, TransportError>;

    /// Push `data` to the subscriber of `handle` on `session`
    ///
    /// Returns [`TransportError::SubscriptionNotConfigured`] if the peer has
    /// not enabled notifications.
    fn notify(
        &mut self,
        session: SessionHandle,
        handle: AttributeHandle,
        data: &[u8],
    ) -> Result<(), TransportError>;
}

/// Attribute client endpoint (used by the initiator)
pub trait ClientTransport: Transport {
    /// Ask for discovery results of `service` to be delivered
    fn register_discovery(&mut self, service: AttributeFamilyId) -> Result<(), TransportError>;

    /// Unacknowledged write of `data` to `handle` on `session`
    fn write_command(
        &mut self,
        session: SessionHandle,
        handle: AttributeHandle,
        data: &[u8],
    ) -> Result<(), TransportError>;
}

/// Null transport (for testing)
///
/// Accepts every registration, discards writes and pushes.
pub struct NullTransport {
    namespace: NamespaceTag,
    next_handle: u16,
}

impl NullTransport {
    /// Create a new null transport
    pub const fn new() -> Self {
        Self {
            namespace: NamespaceTag::VENDOR_BEGIN,
            next_handle: 1,
        }
    }

    fn allocate(&mut self) -> AttributeHandle {
        let handle = AttributeHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        handle
    }
}

impl Default for NullTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for NullTransport {
    fn register_base(&mut self, _base: &[u8; 16]) -> Result<NamespaceTag, TransportError> {
        Ok(self.namespace)
    }
}

impl ServerTransport for NullTransport {
    fn add_service(&mut self, _service: AttributeFamilyId) -> Result<AttributeHandle, TransportError> {
        Ok(self.allocate())
    }

    fn add_value_attribute(
        &mut self,
        _service: AttributeHandle,
        _family: AttributeFamilyId,
        _spec: &ValueAttributeSpec,
    ) -> Result<ValueAttributeHandles, TransportError> {
        Ok(ValueAttributeHandles {
            declaration: self.allocate(),
            value: self.allocate(),
            subscription: self.allocate(),
        })
    }

    fn notify(
        &mut self,
        _session: SessionHandle,
        _handle: AttributeHandle,
        _data: &[u8],
    ) -> Result<(), TransportError> {
        // Discard push
        Ok(())
    }
}

impl ClientTransport for NullTransport {
    fn register_discovery(&mut self, _service: AttributeFamilyId) -> Result<(), TransportError> {
        Ok(())
    }

    fn write_command(
        &mut self,
        _session: SessionHandle,
        _handle: AttributeHandle,
        _data: &[u8],
    ) -> Result<(), TransportError> {
        // Discard write
        Ok(())
    }
}
