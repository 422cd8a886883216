use crate::domain::constants::CERTIFICATE_NAME_SUFFIX;
use crate::infra::error::{TseError, TseResult};
use der::Decode;
use openssl::ec::EcKey;
use openssl::pkey::Public;
use openssl::x509::X509;
use sha2::{Digest, Sha256};
use std::fmt;
use x509_cert::Certificate;

/// Certificate of a TSE signing device.
///
/// The key serial is the SHA-256 of the subject public key bits; log messages
/// carry it as their `serialNumber`.
#[derive(Clone)]
pub struct DeviceCertificate {
    x509: X509,
    subject: String,
    key_serial: Vec<u8>,
}

impl DeviceCertificate {
    pub fn from_der(der: &[u8]) -> TseResult<Self> {
        let parsed = Certificate::from_der(der)
            .map_err(|e| TseError::CertificateError(format!("Failed to parse certificate: {e}")))?;
        let public_key = parsed
            .tbs_certificate
            .subject_public_key_info
            .subject_public_key
            .raw_bytes();
        let key_serial = Sha256::digest(public_key).to_vec();
        let subject = parsed.tbs_certificate.subject.to_string();
        let x509 = X509::from_der(der)?;

        Ok(Self {
            x509,
            subject,
            key_serial,
        })
    }

    pub fn from_pem(pem: &[u8]) -> TseResult<Self> {
        let x509 = X509::from_pem(pem)
            .map_err(|e| TseError::CertificateError(format!("Invalid PEM certificate: {e}")))?;
        Self::from_der(&x509.to_der()?)
    }

    /// Accepts either encoding.
    pub fn from_bytes(bytes: &[u8]) -> TseResult<Self> {
        let start = bytes
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(bytes.len());
        if bytes[start..].starts_with(b"-----BEGIN") {
            Self::from_pem(bytes)
        } else {
            Self::from_der(bytes)
        }
    }

    #[must_use]
    pub fn key_serial(&self) -> &[u8] {
        &self.key_serial
    }

    #[must_use]
    pub fn key_serial_hex(&self) -> String {
        hex::encode(&self.key_serial)
    }

    /// Archive filename stem the certificate is expected under.
    #[must_use]
    pub fn expected_file_stem(&self) -> String {
        format!(
            "{}{}",
            hex::encode_upper(&self.key_serial),
            CERTIFICATE_NAME_SUFFIX
        )
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn x509(&self) -> &X509 {
        &self.x509
    }

    /// EC public key; fails for other key types.
    pub fn ec_public_key(&self) -> Result<EcKey<Public>, openssl::error::ErrorStack> {
        self.x509.public_key()?.ec_key()
    }
}

impl fmt::Debug for DeviceCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeviceCertificate(subject={}, key_serial={})",
            self.subject,
            self.key_serial_hex()
        )
    }
}
