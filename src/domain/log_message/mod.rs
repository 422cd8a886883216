//! Parsed TSE log messages.
//!
//! A [`LogMessage`] is immutable once decoded. It keeps the raw fields, the
//! typed [`LogBody`] produced by the handler of its certified data type and
//! the data-to-be-signed bytes reconstructed during decoding.

mod certified_data;
mod error;
mod parse;
mod time;

pub use certified_data::{
    AuditLogHandler, CertifiedDataHandler, CertifiedDataType, LogBody, SystemData,
    SystemLogHandler, TransactionData, TransactionLogHandler, TransactionOperation,
};
pub use error::{ParseErrorKind, ParsingFailure};
pub use parse::LogMessageCodec;
pub use time::{LogTime, LogTimeError};

use crate::domain::oid::ResolvedOid;
use crate::domain::tlv::RawElement;
use openssl::bn::{BigNum, BigNumRef};
use openssl::error::ErrorStack;
use std::cmp::Ordering;
use std::fmt;

/// Signature algorithms a log message may declare.
pub const ALLOWED_SIGNATURE_ALGORITHMS: [&str; 16] = [
    "ecdsa-plain-SHA224",
    "ecdsa-plain-SHA256",
    "ecdsa-plain-SHA384",
    "ecdsa-plain-SHA512",
    "ecdsa-plain-SHA3-224",
    "ecdsa-plain-SHA3-256",
    "ecdsa-plain-SHA3-384",
    "ecdsa-plain-SHA3-512",
    "ecsdsa-plain-SHA224",
    "ecsdsa-plain-SHA256",
    "ecsdsa-plain-SHA384",
    "ecsdsa-plain-SHA512",
    "ecsdsa-plain-SHA3-224",
    "ecsdsa-plain-SHA3-256",
    "ecsdsa-plain-SHA3-384",
    "ecsdsa-plain-SHA3-512",
];

/// Non-negative signature counter of unbounded width.
pub struct SignatureCounter(BigNum);

impl SignatureCounter {
    /// Counter from unsigned big-endian magnitude bytes.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self, ErrorStack> {
        BigNum::from_slice(bytes).map(Self)
    }

    pub fn from_u64(value: u64) -> Result<Self, ErrorStack> {
        BigNum::from_slice(&value.to_be_bytes()).map(Self)
    }

    #[must_use]
    pub fn as_bignum(&self) -> &BigNumRef {
        &self.0
    }

    /// `self == previous + 1`
    pub fn is_successor_of(&self, previous: &SignatureCounter) -> Result<bool, ErrorStack> {
        let one = BigNum::from_u32(1)?;
        let mut next = BigNum::new()?;
        next.checked_add(&previous.0, &one)?;
        Ok(self.0 == next)
    }
}

impl PartialEq for SignatureCounter {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SignatureCounter {}

impl PartialOrd for SignatureCounter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SignatureCounter {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.ucmp(&other.0)
    }
}

impl fmt::Display for SignatureCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.to_dec_str() {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "0x{}", hex::encode(self.0.to_vec())),
        }
    }
}

impl fmt::Debug for SignatureCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureCounter({self})")
    }
}

/// One decoded log message.
#[derive(Debug)]
pub struct LogMessage {
    pub(crate) filename: String,
    pub(crate) version: i64,
    pub(crate) certified_data_type: CertifiedDataType,
    pub(crate) certified_data_type_oid: ResolvedOid,
    pub(crate) certified_data: Vec<RawElement>,
    pub(crate) body: LogBody,
    pub(crate) serial_number: Vec<u8>,
    pub(crate) signature_algorithm: ResolvedOid,
    pub(crate) signature_algorithm_parameters: Vec<RawElement>,
    pub(crate) se_audit_data: Option<Vec<u8>>,
    pub(crate) signature_counter: Option<SignatureCounter>,
    pub(crate) log_time: LogTime,
    pub(crate) signature_value: Vec<u8>,
    pub(crate) dtbs: Vec<u8>,
}

impl LogMessage {
    /// Archive entry name the message was decoded from.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    #[must_use]
    pub fn certified_data_type(&self) -> CertifiedDataType {
        self.certified_data_type
    }

    #[must_use]
    pub fn certified_data_type_oid(&self) -> &ResolvedOid {
        &self.certified_data_type_oid
    }

    /// Certified data elements in encounter order, as encoded.
    #[must_use]
    pub fn certified_data(&self) -> &[RawElement] {
        &self.certified_data
    }

    #[must_use]
    pub fn body(&self) -> &LogBody {
        &self.body
    }

    /// Key serial of the signing device.
    #[must_use]
    pub fn serial_number(&self) -> &[u8] {
        &self.serial_number
    }

    /// Lower-case hex of [`serial_number`](Self::serial_number).
    #[must_use]
    pub fn serial_number_hex(&self) -> String {
        hex::encode(&self.serial_number)
    }

    #[must_use]
    pub fn signature_algorithm(&self) -> &ResolvedOid {
        &self.signature_algorithm
    }

    #[must_use]
    pub fn signature_algorithm_parameters(&self) -> &[RawElement] {
        &self.signature_algorithm_parameters
    }

    #[must_use]
    pub fn se_audit_data(&self) -> Option<&[u8]> {
        self.se_audit_data.as_deref()
    }

    #[must_use]
    pub fn signature_counter(&self) -> Option<&SignatureCounter> {
        self.signature_counter.as_ref()
    }

    #[must_use]
    pub fn log_time(&self) -> &LogTime {
        &self.log_time
    }

    #[must_use]
    pub fn signature_value(&self) -> &[u8] {
        &self.signature_value
    }

    /// Data to be signed: value octets of every field from version through
    /// logTime in encounter order.
    #[must_use]
    pub fn dtbs(&self) -> &[u8] {
        &self.dtbs
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.filename)?;
        writeln!(f, "  version:              {}", self.version)?;
        writeln!(f, "  certifiedDataType:    {}", self.certified_data_type_oid)?;
        match &self.body {
            LogBody::Transaction(data) => {
                writeln!(f, "  operationType:        {}", data.operation.as_str())?;
                writeln!(f, "  clientId:             {}", data.client_id)?;
                writeln!(f, "  processType:          {}", data.process_type)?;
                writeln!(f, "  processData:          {}", hex::encode(&data.process_data))?;
                writeln!(f, "  transactionNumber:    {}", data.transaction_number)?;
            }
            LogBody::System(data) => {
                writeln!(f, "  operationType:        {}", data.operation_type)?;
                writeln!(
                    f,
                    "  systemOperationData:  {}",
                    hex::encode(&data.system_operation_data)
                )?;
            }
            LogBody::Audit => {}
        }
        for element in &self.certified_data {
            writeln!(
                f,
                "  certifiedData {:<7} {}",
                element.kind().to_string(),
                hex::encode(element.value())
            )?;
        }
        writeln!(f, "  serialNumber:         {}", self.serial_number_hex())?;
        writeln!(f, "  signatureAlgorithm:   {}", self.signature_algorithm)?;
        for param in &self.signature_algorithm_parameters {
            writeln!(f, "    parameter {}: {}", param.kind(), hex::encode(param.encoded()))?;
        }
        if let Some(audit) = &self.se_audit_data {
            writeln!(f, "  seAuditData:          {} bytes", audit.len())?;
        }
        match &self.signature_counter {
            Some(counter) => writeln!(f, "  signatureCounter:     {counter}")?,
            None => writeln!(f, "  signatureCounter:     (none)")?,
        }
        writeln!(
            f,
            "  logTime:              {} ({})",
            self.log_time,
            self.log_time.variant_name()
        )?;
        writeln!(f, "  signatureValue:       {}", hex::encode(&self.signature_value))?;
        write!(f, "  dtbs:                 {}", hex::encode(&self.dtbs))
    }
}
