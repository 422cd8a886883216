//! Cryptographic domain types.
//!
//! Digest and signature algorithm descriptors for the BSI plain signature
//! families and the device certificate wrapper that derives key serials.

mod cert;
mod hash;
mod signature;

pub use cert::DeviceCertificate;
pub use hash::DigestAlgorithm;
pub use signature::{SignatureAlgorithm, SignatureScheme};
