//! Digest algorithms of the BSI plain signature families.
//!
//! Maps each digest to its OpenSSL `MessageDigest` and output size.

use openssl::hash::{hash, MessageDigest};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl DigestAlgorithm {
    /// Parse the digest suffix of an algorithm symbol, e.g. `SHA3-256`.
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "SHA224" => Some(DigestAlgorithm::Sha224),
            "SHA256" => Some(DigestAlgorithm::Sha256),
            "SHA384" => Some(DigestAlgorithm::Sha384),
            "SHA512" => Some(DigestAlgorithm::Sha512),
            "SHA3-224" => Some(DigestAlgorithm::Sha3_224),
            "SHA3-256" => Some(DigestAlgorithm::Sha3_256),
            "SHA3-384" => Some(DigestAlgorithm::Sha3_384),
            "SHA3-512" => Some(DigestAlgorithm::Sha3_512),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha224 => "SHA224",
            DigestAlgorithm::Sha256 => "SHA256",
            DigestAlgorithm::Sha384 => "SHA384",
            DigestAlgorithm::Sha512 => "SHA512",
            DigestAlgorithm::Sha3_224 => "SHA3-224",
            DigestAlgorithm::Sha3_256 => "SHA3-256",
            DigestAlgorithm::Sha3_384 => "SHA3-384",
            DigestAlgorithm::Sha3_512 => "SHA3-512",
        }
    }

    /// Output length in bytes.
    #[must_use]
    pub fn digest_size(&self) -> usize {
        match self {
            DigestAlgorithm::Sha224 | DigestAlgorithm::Sha3_224 => 28,
            DigestAlgorithm::Sha256 | DigestAlgorithm::Sha3_256 => 32,
            DigestAlgorithm::Sha384 | DigestAlgorithm::Sha3_384 => 48,
            DigestAlgorithm::Sha512 | DigestAlgorithm::Sha3_512 => 64,
        }
    }

    #[must_use]
    pub fn message_digest(&self) -> MessageDigest {
        match self {
            DigestAlgorithm::Sha224 => MessageDigest::sha224(),
            DigestAlgorithm::Sha256 => MessageDigest::sha256(),
            DigestAlgorithm::Sha384 => MessageDigest::sha384(),
            DigestAlgorithm::Sha512 => MessageDigest::sha512(),
            DigestAlgorithm::Sha3_224 => MessageDigest::sha3_224(),
            DigestAlgorithm::Sha3_256 => MessageDigest::sha3_256(),
            DigestAlgorithm::Sha3_384 => MessageDigest::sha3_384(),
            DigestAlgorithm::Sha3_512 => MessageDigest::sha3_512(),
        }
    }

    pub fn digest(&self, data: &[u8]) -> Result<Vec<u8>, openssl::error::ErrorStack> {
        Ok(hash(self.message_digest(), data)?.to_vec())
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
