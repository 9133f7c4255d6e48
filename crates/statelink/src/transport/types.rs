// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Handles and attribute descriptors exchanged with the transport

use crate::value::StateValue;

/// Transport-assigned token for one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(pub u16);

impl SessionHandle {
    /// No connection
    pub const INVALID: SessionHandle = SessionHandle(0xFFFF);

    /// True unless this is [`Self::INVALID`]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl core::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            f.write_str("invalid")
        }
    }
}

/// Transport-assigned token for one attribute in a session's table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeHandle(pub u16);

impl AttributeHandle {
    /// Not discovered / not registered
    pub const INVALID: AttributeHandle = AttributeHandle(0x0000);

    /// True unless this is [`Self::INVALID`]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl Default for AttributeHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl core::fmt::Display for AttributeHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// Handles created when the value attribute is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValueAttributeHandles {
    /// Characteristic declaration
    pub declaration: AttributeHandle,
    /// Value attribute
    pub value: AttributeHandle,
    /// Subscription-control attribute (held by the transport)
    pub subscription: AttributeHandle,
}

/// Access required to read or write an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// No security required
    Open,
    /// Not accessible
    NoAccess,
}

/// Where the attribute value is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLocation {
    /// Held by the transport (server-resident)
    Transport,
    /// Held by the application
    User,
}

/// Declared capabilities of the value attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Properties {
    /// Readable
    pub read: bool,
    /// Write without response (best effort)
    pub write_without_response: bool,
    /// Acknowledged write
    pub write: bool,
    /// Notifications, backed by a subscription-control attribute
    pub notify: bool,
}

/// Everything the transport needs to register the value attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueAttributeSpec {
    /// Read permission of the value
    pub read: Permission,
    /// Write permission of the value
    pub write: Permission,
    /// Value storage
    pub storage: StorageLocation,
    /// Fixed value length in bytes
    pub length: u16,
    /// Initial value
    pub initial: StateValue,
    /// Declared properties
    pub properties: Properties,
    /// Read permission of the subscription control
    pub subscription_read: Permission,
    /// Write permission of the subscription control
    pub subscription_write: Permission,
}

impl ValueAttributeSpec {
    /// The StateLink value attribute: open access, transport-resident,
    /// one byte, write-without-response and notify
    pub const fn state_value() -> Self {
        Self {
            read: Permission::Open,
            write: Permission::Open,
            storage: StorageLocation::Transport,
            length: StateValue::SIZE as u16,
            initial: StateValue::OFF,
            properties: Properties {
                read: false,
                write_without_response: true,
                write: false,
                notify: true,
            },
            subscription_read: Permission::Open,
            subscription_write: Permission::Open,
        }
    }
}
