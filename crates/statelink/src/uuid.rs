// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Attribute identity registry
//!
//! StateLink identifiers share one vendor-specific 128-bit base. Bytes 12 and
//! 13 of the base are left zero and receive the 16-bit short code of the
//! service or attribute. The transport binds the base once per process and
//! hands back a [`NamespaceTag`]; the `(short_code, tag)` pair is what gets
//! compared in events and discovery reports.
//!
//! ```text
//! 62A1XXXX-6806-4B01-BFAA-2104556C6508
//!     ^^^^ short code (bytes 12..14 in little-endian storage)
//! ```

use crate::error::{Error, RegistrationStep, Result};
use crate::transport::Transport;

/// Base identifier, little-endian, with the short-code bytes zeroed
pub const BASE_UUID: [u8; 16] = [
    0x08, 0x65, 0x6C, 0x55, 0x04, 0x21, 0xAA, 0xBF, 0x01, 0x4B, 0x06, 0x68, // fixed
    0x00, 0x00, // short code
    0xA1, 0x62,
];

/// Offset of the short code inside a 128-bit identifier
pub const SHORT_CODE_OFFSET: usize = 12;

/// Short code of the service container
pub const SERVICE_UUID: u16 = 0x0001;

/// Short code of the value attribute
pub const VALUE_UUID: u16 = 0x0002;

/// Transport-assigned namespace for a registered base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NamespaceTag(pub u8);

impl NamespaceTag {
    /// Not registered / unknown base
    pub const UNKNOWN: NamespaceTag = NamespaceTag(0);

    /// Standard 16-bit SIG namespace
    pub const SIG: NamespaceTag = NamespaceTag(1);

    /// First tag available to vendor bases
    pub const VENDOR_BEGIN: NamespaceTag = NamespaceTag(2);

    /// True once the transport has assigned this tag
    pub const fn is_known(self) -> bool {
        self.0 != Self::UNKNOWN.0
    }
}

/// Registered identifier of a service or attribute family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttributeFamilyId {
    /// 16-bit code inside the base
    pub short_code: u16,
    /// Namespace assigned by the transport
    pub namespace: NamespaceTag,
}

impl AttributeFamilyId {
    /// Build an identifier from its parts
    pub const fn new(short_code: u16, namespace: NamespaceTag) -> Self {
        Self {
            short_code,
            namespace,
        }
    }

    /// Same family: short code and namespace tag both match
    pub fn matches(&self, other: &AttributeFamilyId) -> bool {
        self.short_code == other.short_code && self.namespace == other.namespace
    }

    /// Expand into the full 128-bit identifier over `base`
    pub fn to_uuid128(&self, base: &[u8; 16]) -> [u8; 16] {
        let mut full = *base;
        full[SHORT_CODE_OFFSET..SHORT_CODE_OFFSET + 2]
            .copy_from_slice(&self.short_code.to_le_bytes());
        full
    }

    /// Split a 128-bit identifier into its base and short code
    pub fn split_uuid128(full: &[u8; 16]) -> ([u8; 16], u16) {
        let short_code = u16::from_le_bytes([full[SHORT_CODE_OFFSET], full[SHORT_CODE_OFFSET + 1]]);
        let mut base = *full;
        base[SHORT_CODE_OFFSET] = 0;
        base[SHORT_CODE_OFFSET + 1] = 0;
        (base, short_code)
    }
}

impl core::fmt::Display for AttributeFamilyId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:04x}@{}", self.short_code, self.namespace.0)
    }
}

/// Register `short_code` under the StateLink base
///
/// Exhaustion of the transport's identifier table is a configuration error
/// and is returned as [`Error::Registration`].
pub fn register<T: Transport + ?Sized>(transport: &mut T, short_code: u16) -> Result<AttributeFamilyId> {
    let namespace = transport
        .register_base(&BASE_UUID)
        .map_err(|e| Error::registration(RegistrationStep::BaseIdentifier, e))?;

    log::debug!(
        "[uuid] registered short code 0x{:04x} in namespace {}",
        short_code,
        namespace.0
    );

    Ok(AttributeFamilyId::new(short_code, namespace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{NullTransport, TransportError};

    struct FullTable;

    impl Transport for FullTable {
        fn register_base(&mut self, _base: &[u8; 16]) -> core::result::Result<NamespaceTag, TransportError> {
            Err(TransportError::TableFull)
        }
    }

    #[test]
    fn test_register_uses_transport_namespace() {
        let mut transport = NullTransport::default();
        let id = register(&mut transport, SERVICE_UUID).unwrap();

        assert_eq!(id.short_code, SERVICE_UUID);
        assert_eq!(id.namespace, NamespaceTag::VENDOR_BEGIN);
    }

    #[test]
    fn test_register_table_exhausted_is_fatal() {
        let err = register(&mut FullTable, VALUE_UUID).unwrap_err();
        assert_eq!(
            err,
            Error::registration(RegistrationStep::BaseIdentifier, TransportError::TableFull)
        );
    }

    #[test]
    fn test_matches_requires_both_parts() {
        let a = AttributeFamilyId::new(VALUE_UUID, NamespaceTag(2));
        assert!(a.matches(&AttributeFamilyId::new(VALUE_UUID, NamespaceTag(2))));
        assert!(!a.matches(&AttributeFamilyId::new(VALUE_UUID, NamespaceTag(3))));
        assert!(!a.matches(&AttributeFamilyId::new(SERVICE_UUID, NamespaceTag(2))));
    }

    #[test]
    fn test_uuid128_expansion() {
        let id = AttributeFamilyId::new(0x1234, NamespaceTag(2));
        let full = id.to_uuid128(&BASE_UUID);

        assert_eq!(full[12], 0x34);
        assert_eq!(full[13], 0x12);
        assert_eq!(full[14..], [0xA1, 0x62]);

        let (base, short_code) = AttributeFamilyId::split_uuid128(&full);
        assert_eq!(base, BASE_UUID);
        assert_eq!(short_code, 0x1234);
    }
}
