// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # StateLink - Binary State Sync over an Attribute Transport
//!
//! Mirrors one byte of on/off state between two devices. The **responder**
//! owns a value attribute inside a vendor service and pushes changes to its
//! subscriber. The **initiator** discovers that attribute, writes new values
//! to it and receives the pushes.
//!
//! ## Design Constraints
//!
//! - **No heap allocations** in the roles (borrowed payloads, fixed reports)
//! - **Run-to-completion** - every event is handled inside one call
//! - **`no_std` compatible**
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------+
//! |  Application (button, LED)              |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  Responder / Initiator                  |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  ObserverSet (event fan-out)            |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  Transport (attribute server / client)  |
//! +-----------------------------------------+
//! ```
//!
//! ## Feature Flags
//!
//! - `std` -- Enable std and the in-memory [`transport::sim`] link (default)

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Event fan-out to roles and other observers
pub mod dispatch;

/// Error types for StateLink
pub mod error;

/// Responder and initiator roles
pub mod role;

/// Transport abstraction and events
pub mod transport;

/// Identifier registry (vendor base and short codes)
pub mod uuid;

/// Wire format of the state value and subscription control
pub mod value;

// Re-exports for convenience
pub use crate::dispatch::{EventObserver, ObserverSet};
pub use crate::error::{Error, RegistrationStep, Result};
pub use crate::role::{
    DiscoveredHandles, HandlePolicy, Initiator, InitiatorConfig, InitiatorEvent, InitiatorHandler,
    InitiatorState, Outcome, Responder, ResponderConfig, ResponderState, SkipReason, WriteHandler,
};
pub use crate::transport::{
    AttributeHandle, ClientTransport, ServerTransport, SessionHandle, Transport, TransportError,
    TransportEvent,
};
pub use crate::uuid::{AttributeFamilyId, NamespaceTag};
pub use crate::value::{StateValue, SubscriptionControl};

/// Version of StateLink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
