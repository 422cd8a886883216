//! Object identifier resolution.
//!
//! The codec never interprets OIDs itself; it asks an [`OidResolver`] for the
//! symbolic identifier and checks that symbol against its allow-lists.
//! [`BsiOidRegistry`] is the default resolver with the identifiers used by
//! TSE exports.

use crate::domain::constants::{
    OID_AUDIT_LOG, OID_ECDSA_PLAIN_ARC, OID_ECSDSA_PLAIN_ARC, OID_SYSTEM_LOG,
    OID_TRANSACTION_LOG,
};
use der::asn1::ObjectIdentifier;
use std::fmt;
use thiserror::Error;

/// An OID together with its registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedOid {
    oid: ObjectIdentifier,
    symbol: String,
    name: String,
}

impl ResolvedOid {
    #[must_use]
    pub fn new(oid: ObjectIdentifier, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            oid,
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn oid(&self) -> &ObjectIdentifier {
        &self.oid
    }

    /// Symbolic identifier, e.g. `ecdsa-plain-SHA256`.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResolvedOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.oid)
    }
}

/// The resolver has no entry for an OID. Carries the dotted form, or the hex
/// encoding when the bytes are not a valid OID.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown object identifier {0}")]
pub struct UnknownOid(pub String);

/// Lookup service from raw OID encodings to symbolic identifiers.
pub trait OidResolver: Send + Sync {
    /// Resolve the value octets of an OBJECT IDENTIFIER.
    fn resolve(&self, raw_oid: &[u8]) -> Result<ResolvedOid, UnknownOid>;
}

struct RegistryEntry {
    oid: &'static str,
    symbol: &'static str,
    name: &'static str,
}

const fn entry(oid: &'static str, symbol: &'static str, name: &'static str) -> RegistryEntry {
    RegistryEntry { oid, symbol, name }
}

// Both signature families hang off their arc with the same digest suffixes.
const SIGNATURE_SUFFIXES: [(&str, &str); 8] = [
    ("SHA224", "SHA-224"),
    ("SHA256", "SHA-256"),
    ("SHA384", "SHA-384"),
    ("SHA512", "SHA-512"),
    ("SHA3-224", "SHA3-224"),
    ("SHA3-256", "SHA3-256"),
    ("SHA3-384", "SHA3-384"),
    ("SHA3-512", "SHA3-512"),
];

const ECDSA_ARCS: [u32; 8] = [2, 3, 4, 5, 8, 9, 10, 11];
const ECSDSA_ARCS: [u32; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

const STATIC_ENTRIES: [RegistryEntry; 8] = [
    entry(
        OID_TRANSACTION_LOG,
        "id-SE-API-transaction-log",
        "SE API transaction log",
    ),
    entry(OID_SYSTEM_LOG, "id-SE-API-system-log", "SE API system log"),
    entry(OID_AUDIT_LOG, "id-SE-API-SE-audit-log", "SE API audit log"),
    entry(
        "0.4.0.127.0.7.3.7.1",
        "id-SE-API-log-types",
        "SE API log message types",
    ),
    entry(
        "1.2.840.10045.4.3.2",
        "ecdsa-with-SHA256",
        "ECDSA with SHA-256 (X9.62)",
    ),
    entry(
        "1.2.840.10045.4.3.3",
        "ecdsa-with-SHA384",
        "ECDSA with SHA-384 (X9.62)",
    ),
    entry(
        "1.2.840.113549.1.1.11",
        "sha256WithRSAEncryption",
        "RSA PKCS#1 v1.5 with SHA-256",
    ),
    entry("2.16.840.1.101.3.4.2.1", "id-sha256", "SHA-256"),
];

/// Static registry of the OIDs found in TSE exports.
pub struct BsiOidRegistry {
    entries: Vec<ResolvedOid>,
}

impl Default for BsiOidRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BsiOidRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut entries = Vec::with_capacity(STATIC_ENTRIES.len() + 16);

        for e in &STATIC_ENTRIES {
            if let Ok(oid) = ObjectIdentifier::new(e.oid) {
                entries.push(ResolvedOid::new(oid, e.symbol, e.name));
            }
        }

        let families = [
            (OID_ECDSA_PLAIN_ARC, "ecdsa-plain", "ECDSA plain", ECDSA_ARCS),
            (
                OID_ECSDSA_PLAIN_ARC,
                "ecsdsa-plain",
                "EC-Schnorr plain",
                ECSDSA_ARCS,
            ),
        ];
        for (arc, prefix, label, numbers) in families {
            for (number, (suffix, digest)) in numbers.iter().zip(SIGNATURE_SUFFIXES) {
                if let Ok(oid) = ObjectIdentifier::new(&format!("{arc}.{number}")) {
                    entries.push(ResolvedOid::new(
                        oid,
                        format!("{prefix}-{suffix}"),
                        format!("{label} signature with {digest}"),
                    ));
                }
            }
        }

        Self { entries }
    }

    /// Number of known identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reverse lookup, used when building messages.
    #[must_use]
    pub fn by_symbol(&self, symbol: &str) -> Option<&ResolvedOid> {
        self.entries.iter().find(|e| e.symbol == symbol)
    }
}

impl OidResolver for BsiOidRegistry {
    fn resolve(&self, raw_oid: &[u8]) -> Result<ResolvedOid, UnknownOid> {
        let oid = ObjectIdentifier::from_bytes(raw_oid)
            .map_err(|_| UnknownOid(hex::encode(raw_oid)))?;
        self.entries
            .iter()
            .find(|e| e.oid == oid)
            .cloned()
            .ok_or_else(|| UnknownOid(oid.to_string()))
    }
}
