// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for StateLink
//!
//! Only conditions the caller cannot recover from are errors. Operations that
//! are skipped because a session or handle is not ready yet report an
//! [`Outcome::Skipped`](crate::role::Outcome) instead.

use thiserror::Error;

use crate::transport::TransportError;
use crate::value::DecodeError;

/// Result type for StateLink operations
pub type Result<T> = core::result::Result<T, Error>;

/// Which registration step was rejected by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStep {
    /// Binding the base identifier into the transport's namespace table
    BaseIdentifier,
    /// Adding the service container
    Service,
    /// Adding the value attribute and its subscription control
    ValueAttribute,
    /// Subscribing to discovery results for the service
    DiscoveryObserver,
}

impl core::fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            RegistrationStep::BaseIdentifier => "base identifier",
            RegistrationStep::Service => "service",
            RegistrationStep::ValueAttribute => "value attribute",
            RegistrationStep::DiscoveryObserver => "discovery observer",
        };
        f.write_str(name)
    }
}

/// Error type for StateLink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The transport refused one of the registrations done at init
    #[error("registration of {step} failed: {source}")]
    Registration {
        /// Step that failed
        step: RegistrationStep,
        /// Transport status
        source: TransportError,
    },

    /// A write or push was issued and the transport failed it
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// A payload had the wrong shape
    #[error("decode failure: {0}")]
    Decode(#[from] DecodeError),

    /// No room left in a fixed-capacity observer set
    #[error("observer set is full")]
    ObserverSetFull,
}

impl Error {
    /// Wrap a transport status from a registration step
    pub const fn registration(step: RegistrationStep, source: TransportError) -> Self {
        Error::Registration { step, source }
    }

    /// True for errors raised while setting a role up
    pub const fn is_registration(&self) -> bool {
        matches!(self, Error::Registration { .. })
    }
}
