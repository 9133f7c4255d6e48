// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The two protocol roles
//!
//! The [`Responder`] owns the value attribute and pushes updates to its
//! subscriber. The [`Initiator`] discovers that attribute on the peer, writes
//! to it, and receives the pushes. Neither calls the other: everything crosses
//! the transport.

mod initiator;
mod responder;

pub use initiator::{
    DiscoveredHandles, HandlePolicy, Initiator, InitiatorConfig, InitiatorEvent, InitiatorHandler,
    InitiatorState,
};
pub use responder::{Responder, ResponderConfig, ResponderState, WriteHandler};

/// Result of an application request that did not fail
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A transport call was issued
    Issued,
    /// Nothing was sent; retry once the state is ready
    Skipped(SkipReason),
}

impl Outcome {
    /// True if a transport call was issued
    pub const fn is_issued(&self) -> bool {
        matches!(self, Outcome::Issued)
    }
}

/// Why a request was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No session is active
    NoSession,
    /// Attribute handles are not known yet
    HandlesUnresolved,
    /// The peer has not enabled push delivery
    NotSubscribed,
}

impl core::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            SkipReason::NoSession => "no active session",
            SkipReason::HandlesUnresolved => "attribute handles not resolved",
            SkipReason::NotSubscribed => "peer not subscribed",
        };
        f.write_str(text)
    }
}
