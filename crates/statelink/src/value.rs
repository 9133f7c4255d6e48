// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Payload types carried by the value and subscription-control attributes

use thiserror::Error;

/// Payload decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Payload length differs from the fixed attribute length
    #[error("expected {expected} byte payload, got {actual}")]
    Length {
        /// Required length
        expected: usize,
        /// Received length
        actual: usize,
    },
}

/// The shared state byte
///
/// Semantically a boolean, transported as a full byte. Any non-zero value
/// reads as "on"; no other range validation is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateValue(pub u8);

impl StateValue {
    /// Encoded size on the wire
    pub const SIZE: usize = 1;

    /// Off state
    pub const OFF: StateValue = StateValue(0);

    /// On state
    pub const ON: StateValue = StateValue(1);

    /// Decode a payload that must be exactly [`Self::SIZE`] bytes
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        match payload {
            [byte] => Ok(StateValue(*byte)),
            _ => Err(DecodeError::Length {
                expected: Self::SIZE,
                actual: payload.len(),
            }),
        }
    }

    /// Encode to the wire representation
    pub const fn encode(self) -> [u8; 1] {
        [self.0]
    }

    /// Raw byte
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Boolean reading of the byte
    pub const fn is_on(self) -> bool {
        self.0 != 0
    }
}

impl From<bool> for StateValue {
    fn from(state: bool) -> Self {
        StateValue(state as u8)
    }
}

impl From<u8> for StateValue {
    fn from(raw: u8) -> Self {
        StateValue(raw)
    }
}

impl From<StateValue> for bool {
    fn from(value: StateValue) -> Self {
        value.is_on()
    }
}

impl core::fmt::Display for StateValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

/// Subscription-control byte written by the initiator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SubscriptionControl {
    /// Push delivery disabled
    Disabled = 0x00,
    /// Notifications enabled
    Notify = 0x01,
}

impl SubscriptionControl {
    /// Encoded size on the wire
    pub const SIZE: usize = 1;

    /// Map a requested state to its control code
    pub const fn from_enabled(enabled: bool) -> Self {
        if enabled {
            SubscriptionControl::Notify
        } else {
            SubscriptionControl::Disabled
        }
    }

    /// Decode a written control value
    ///
    /// Only the notification bit is honoured; other bits are ignored.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let Some(first) = payload.first() else {
            return Err(DecodeError::Length {
                expected: Self::SIZE,
                actual: 0,
            });
        };
        Ok(Self::from_enabled(first & 0x01 != 0))
    }

    /// Encode to the wire representation
    pub const fn encode(self) -> [u8; 1] {
        [self as u8]
    }

    /// True when notifications are requested
    pub const fn is_enabled(self) -> bool {
        matches!(self, SubscriptionControl::Notify)
    }
}
