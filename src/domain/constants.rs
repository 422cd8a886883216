//! Centralized constants for the tag bytes and OIDs used by TSE log messages.
//! Keep this intentionally small; only broadly reused literals should live here.

// === ASN.1 universal tags ===

/// ASN.1 INTEGER tag
pub const ASN1_INTEGER_TAG: u8 = 0x02;

/// ASN.1 OCTET STRING tag
pub const ASN1_OCTET_STRING_TAG: u8 = 0x04;

/// ASN.1 OBJECT IDENTIFIER tag
pub const ASN1_OID_TAG: u8 = 0x06;

/// ASN.1 PrintableString tag
pub const ASN1_PRINTABLE_STRING_TAG: u8 = 0x13;

/// ASN.1 UTCTime tag
pub const ASN1_UTC_TIME_TAG: u8 = 0x17;

/// ASN.1 GeneralizedTime tag
pub const ASN1_GENERALIZED_TIME_TAG: u8 = 0x18;

/// ASN.1 SEQUENCE tag (constructed)
pub const ASN1_SEQUENCE_TAG: u8 = 0x30;

// === Identifier octet masks ===

/// Tag class bits of the first identifier octet
pub const TAG_CLASS_MASK: u8 = 0xc0;

/// Constructed bit of the first identifier octet
pub const TAG_CONSTRUCTED_BIT: u8 = 0x20;

/// Low tag number bits; all ones announce the high-tag-number form
pub const TAG_NUMBER_MASK: u8 = 0x1f;

/// Long form length marker (low 7 bits carry the number of length octets)
pub const LENGTH_LONG_FORM_BIT: u8 = 0x80;

/// Largest supported number of length octets in the long form
pub const MAX_LENGTH_OCTETS: usize = 8;

// === Log message grammar ===

/// The only supported log message version
pub const LOG_MESSAGE_VERSION: i64 = 2;

/// Suffix marker carried by certificate file names inside an export
pub const CERTIFICATE_NAME_SUFFIX: &str = "_X509";

// === BSI object identifiers (dotted form) ===

/// certifiedDataType for transaction logs
pub const OID_TRANSACTION_LOG: &str = "0.4.0.127.0.7.3.7.1.1";

/// certifiedDataType for system logs
pub const OID_SYSTEM_LOG: &str = "0.4.0.127.0.7.3.7.1.2";

/// certifiedDataType for SE audit logs
pub const OID_AUDIT_LOG: &str = "0.4.0.127.0.7.3.7.1.3";

/// Arc shared by the plain ECDSA signature algorithms (ecdsa-plain-signatures)
pub const OID_ECDSA_PLAIN_ARC: &str = "0.4.0.127.0.7.1.1.4.1";

/// Arc shared by the plain EC-Schnorr signature algorithms (ecsdsa-plain-signatures)
pub const OID_ECSDSA_PLAIN_ARC: &str = "0.4.0.127.0.7.1.1.4.4";
