use std::fmt;

use super::DigestAlgorithm;

/// Signature families a log message may be signed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// ECDSA with the plain `r || s` encoding (BSI TR-03111).
    EcdsaPlain,
    /// EC-Schnorr with the plain `r || s` encoding (BSI TR-03111).
    EcsdsaPlain,
}

/// A scheme together with its digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureAlgorithm {
    pub scheme: SignatureScheme,
    pub digest: DigestAlgorithm,
}

impl SignatureAlgorithm {
    /// Map a symbolic algorithm identifier such as `ecsdsa-plain-SHA3-256`.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let (scheme, suffix) = if let Some(rest) = symbol.strip_prefix("ecdsa-plain-") {
            (SignatureScheme::EcdsaPlain, rest)
        } else if let Some(rest) = symbol.strip_prefix("ecsdsa-plain-") {
            (SignatureScheme::EcsdsaPlain, rest)
        } else {
            return None;
        };
        DigestAlgorithm::from_suffix(suffix).map(|digest| Self { scheme, digest })
    }

    /// Expected signature length for a curve whose order is `order_len` bytes.
    #[must_use]
    pub fn signature_len(&self, order_len: usize) -> usize {
        match self.scheme {
            SignatureScheme::EcdsaPlain => 2 * order_len,
            SignatureScheme::EcsdsaPlain => self.digest.digest_size() + order_len,
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.scheme {
            SignatureScheme::EcdsaPlain => "ecdsa-plain",
            SignatureScheme::EcsdsaPlain => "ecsdsa-plain",
        };
        write!(f, "{prefix}-{}", self.digest)
    }
}
