//! Signature verification of log messages against device certificates.
//!
//! Two schemes are supported, both with the plain `r || s` signature encoding
//! of BSI TR-03111:
//! - ECDSA: `r` and `s` each take the byte length of the curve order and the
//!   pair is checked by OpenSSL over the digest of the DTBS.
//! - EC-Schnorr (EC-SDSA): `r` has the digest length and `s` the order length.
//!   The verifier computes `Q = sG - rP` and accepts if
//!   `H(x_Q || y_Q || dtbs) == r`.

use crate::domain::crypto::{DeviceCertificate, SignatureAlgorithm, SignatureScheme};
use crate::domain::log_message::LogMessage;
use crate::domain::verification::VerificationFailure;
use openssl::bn::{BigNum, BigNumContext};
use openssl::ec::{EcGroupRef, EcKey, EcPoint, EcPointRef};
use openssl::ecdsa::EcdsaSig;
use openssl::pkey::Public;

/// Verifies log message signatures with a fixed set of candidate certificates.
pub struct SignatureVerifier {
    certificates: Vec<DeviceCertificate>,
}

impl SignatureVerifier {
    #[must_use]
    pub fn new(certificates: impl IntoIterator<Item = DeviceCertificate>) -> Self {
        Self {
            certificates: certificates.into_iter().collect(),
        }
    }

    /// Certificate whose key serial equals `serial`.
    #[must_use]
    pub fn certificate_for(&self, serial: &[u8]) -> Option<&DeviceCertificate> {
        self.certificates.iter().find(|c| c.key_serial() == serial)
    }

    /// Verify `message` with the certificate named by its serial number.
    pub fn verify(&self, message: &LogMessage) -> Result<(), VerificationFailure> {
        let algorithm = algorithm_of(message)?;
        let certificate = self
            .certificate_for(message.serial_number())
            .ok_or_else(|| VerificationFailure::NoCertificateForSerial(message.serial_number_hex()))?;
        log::debug!(
            "Verifying {} with {} using {}",
            message.filename(),
            certificate.subject(),
            algorithm
        );
        check_signature(
            algorithm,
            certificate,
            message.dtbs(),
            message.signature_value(),
        )
    }

    /// Verify `message` with an explicitly chosen certificate.
    pub fn verify_with(
        &self,
        message: &LogMessage,
        certificate: &DeviceCertificate,
    ) -> Result<(), VerificationFailure> {
        check_signature(
            algorithm_of(message)?,
            certificate,
            message.dtbs(),
            message.signature_value(),
        )
    }
}

fn algorithm_of(message: &LogMessage) -> Result<SignatureAlgorithm, VerificationFailure> {
    let symbol = message.signature_algorithm().symbol();
    SignatureAlgorithm::from_symbol(symbol)
        .ok_or_else(|| VerificationFailure::UnsupportedAlgorithm(symbol.to_string()))
}

/// Check `signature` over `dtbs` with the public key of `certificate`.
pub fn check_signature(
    algorithm: SignatureAlgorithm,
    certificate: &DeviceCertificate,
    dtbs: &[u8],
    signature: &[u8],
) -> Result<(), VerificationFailure> {
    let key = certificate
        .ec_public_key()
        .map_err(|_| VerificationFailure::UnsupportedKey("certificate key is not an EC key".into()))?;

    let mut ctx = BigNumContext::new()?;
    let mut order = BigNum::new()?;
    key.group().order(&mut order, &mut ctx)?;
    let order_len = usize::try_from(order.num_bytes())
        .map_err(|_| VerificationFailure::UnsupportedKey("curve order has no size".into()))?;

    let expected = algorithm.signature_len(order_len);
    if signature.len() != expected {
        return Err(VerificationFailure::MalformedSignature {
            expected,
            actual: signature.len(),
        });
    }

    let valid = match algorithm.scheme {
        SignatureScheme::EcdsaPlain => verify_ecdsa(algorithm, &key, dtbs, signature, order_len)?,
        SignatureScheme::EcsdsaPlain => verify_ecsdsa(algorithm, &key, dtbs, signature, &order)?,
    };
    if valid {
        Ok(())
    } else {
        Err(VerificationFailure::SignatureMismatch)
    }
}

fn verify_ecdsa(
    algorithm: SignatureAlgorithm,
    key: &EcKey<Public>,
    dtbs: &[u8],
    signature: &[u8],
    order_len: usize,
) -> Result<bool, VerificationFailure> {
    let (r, s) = signature.split_at(order_len);
    let sig = EcdsaSig::from_private_components(BigNum::from_slice(r)?, BigNum::from_slice(s)?)?;
    let digest = algorithm.digest.digest(dtbs)?;
    Ok(sig.verify(&digest, key)?)
}

fn verify_ecsdsa(
    algorithm: SignatureAlgorithm,
    key: &EcKey<Public>,
    dtbs: &[u8],
    signature: &[u8],
    order: &BigNum,
) -> Result<bool, VerificationFailure> {
    let group = key.group();
    let mut ctx = BigNumContext::new()?;

    let (r_bytes, s_bytes) = signature.split_at(algorithm.digest.digest_size());
    let r = BigNum::from_slice(r_bytes)?;
    let s = BigNum::from_slice(s_bytes)?;
    if s.num_bits() == 0 || s >= *order {
        return Ok(false);
    }
    let mut r_reduced = BigNum::new()?;
    r_reduced.nnmod(&r, order, &mut ctx)?;
    if r_reduced.num_bits() == 0 {
        return Ok(false);
    }

    // Q = sG - rP
    let mut s_g = EcPoint::new(group)?;
    s_g.mul_generator(group, &s, &ctx)?;
    let mut r_p = EcPoint::new(group)?;
    r_p.mul(group, key.public_key(), &r_reduced, &ctx)?;
    r_p.invert(group, &ctx)?;
    let mut q = EcPoint::new(group)?;
    q.add(group, &s_g, &r_p, &mut ctx)?;
    if q.is_infinity(group) {
        return Ok(false);
    }

    let mut input = point_coordinates(group, &q, &mut ctx)?;
    input.extend_from_slice(dtbs);
    Ok(algorithm.digest.digest(&input)? == r_bytes)
}

/// `x || y`, each padded to the field size.
pub(crate) fn point_coordinates(
    group: &EcGroupRef,
    point: &EcPointRef,
    ctx: &mut BigNumContext,
) -> Result<Vec<u8>, openssl::error::ErrorStack> {
    let mut x = BigNum::new()?;
    let mut y = BigNum::new()?;
    point.affine_coordinates_gfp(group, &mut x, &mut y, ctx)?;
    let field_len = i32::try_from(group.degree().div_ceil(8)).unwrap_or(i32::MAX);
    let mut out = x.to_vec_padded(field_len)?;
    out.extend(y.to_vec_padded(field_len)?);
    Ok(out)
}
