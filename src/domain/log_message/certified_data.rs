//! Variant handlers for the `certifiedData` part of a log message.
//!
//! The certified data type selects one handler; the codec hands it the raw
//! certified data elements and the optional seAuditData once the rest of the
//! message has been decoded. Each handler checks the shape its log type
//! requires and produces the typed [`LogBody`].

use super::error::ParseErrorKind;
use crate::domain::tlv::{signed_be_to_i64, Element, ElementKind, RawElement};
use std::fmt;

/// Allow-listed certified data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CertifiedDataType {
    TransactionLog,
    SystemLog,
    AuditLog,
}

impl CertifiedDataType {
    /// All allow-listed types.
    pub const ALL: [CertifiedDataType; 3] = [
        CertifiedDataType::TransactionLog,
        CertifiedDataType::SystemLog,
        CertifiedDataType::AuditLog,
    ];

    /// Look up the type for a resolved symbolic identifier.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.symbol() == symbol)
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            CertifiedDataType::TransactionLog => "id-SE-API-transaction-log",
            CertifiedDataType::SystemLog => "id-SE-API-system-log",
            CertifiedDataType::AuditLog => "id-SE-API-SE-audit-log",
        }
    }

    /// Handler used unless the codec was configured with another one.
    #[must_use]
    pub fn default_handler(self) -> &'static dyn CertifiedDataHandler {
        match self {
            CertifiedDataType::TransactionLog => &TransactionLogHandler,
            CertifiedDataType::SystemLog => &SystemLogHandler,
            CertifiedDataType::AuditLog => &AuditLogHandler,
        }
    }
}

impl fmt::Display for CertifiedDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Operation recorded by a transaction log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOperation {
    Start,
    Update,
    Finish,
}

impl TransactionOperation {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "StartTransaction" => Some(TransactionOperation::Start),
            "UpdateTransaction" => Some(TransactionOperation::Update),
            "FinishTransaction" => Some(TransactionOperation::Finish),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionOperation::Start => "StartTransaction",
            TransactionOperation::Update => "UpdateTransaction",
            TransactionOperation::Finish => "FinishTransaction",
        }
    }
}

/// Certified data of a transaction log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionData {
    pub operation: TransactionOperation,
    pub client_id: String,
    pub process_data: Vec<u8>,
    pub process_type: String,
    pub additional_external_data: Option<Vec<u8>>,
    pub transaction_number: u64,
    pub additional_internal_data: Option<Vec<u8>>,
}

/// Certified data of a system log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemData {
    pub operation_type: String,
    pub system_operation_data: Vec<u8>,
    pub additional_internal_data: Option<Vec<u8>>,
}

/// Typed body of a log message, one variant per certified data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogBody {
    Transaction(TransactionData),
    System(SystemData),
    /// Audit logs carry their payload in seAuditData.
    Audit,
}

/// Extension point invoked by the codec for the certified data type.
pub trait CertifiedDataHandler: Send + Sync {
    fn interpret(
        &self,
        certified_data: &[RawElement],
        se_audit_data: Option<&[u8]>,
    ) -> Result<LogBody, ParseErrorKind>;
}

/// Reads context-specific implicitly tagged fields in ascending tag order.
struct TaggedFields<'a> {
    elements: &'a [RawElement],
    pos: usize,
}

impl<'a> TaggedFields<'a> {
    fn new(elements: &'a [RawElement]) -> Self {
        Self { elements, pos: 0 }
    }

    fn optional(&mut self, number: u32) -> Option<Element<'a>> {
        let element = self.elements.get(self.pos)?.as_element();
        match element.kind() {
            ElementKind::ContextSpecific {
                number: n,
                constructed: false,
            } if n == number => {
                self.pos += 1;
                Some(element)
            }
            _ => None,
        }
    }

    fn required(&mut self, number: u32, field: &str) -> Result<Element<'a>, ParseErrorKind> {
        self.optional(number).ok_or_else(|| {
            ParseErrorKind::InvalidCertifiedData(format!("[{number}] {field} is missing"))
        })
    }

    fn finish(self) -> Result<(), ParseErrorKind> {
        match self.elements.get(self.pos) {
            None => Ok(()),
            Some(extra) => Err(ParseErrorKind::InvalidCertifiedData(format!(
                "unexpected element {}",
                extra.kind()
            ))),
        }
    }
}

fn printable_string(element: Element<'_>, field: &str) -> Result<String, ParseErrorKind> {
    let value = element.value();
    let printable = value.iter().all(|&b| {
        b.is_ascii_alphanumeric() || b" '()+,-./:=?".contains(&b)
    });
    if !printable {
        return Err(ParseErrorKind::InvalidCertifiedData(format!(
            "{field} is not a PrintableString"
        )));
    }
    Ok(String::from_utf8_lossy(value).into_owned())
}

fn unsigned_integer(element: Element<'_>, field: &str) -> Result<u64, ParseErrorKind> {
    let invalid =
        || ParseErrorKind::InvalidCertifiedData(format!("{field} is not a non-negative integer"));
    let value = element.value();
    // a leading zero octet keeps the sign bit clear for values >= 2^63
    let trimmed = match value {
        [0, rest @ ..] if value.len() == 9 => rest,
        _ => value,
    };
    if trimmed.len() == 8 && trimmed[0] & 0x80 != 0 {
        return Ok(u64::from_be_bytes(trimmed.try_into().map_err(|_| invalid())?));
    }
    let signed = signed_be_to_i64(value).ok_or_else(invalid)?;
    u64::try_from(signed).map_err(|_| invalid())
}

fn reject_se_audit_data(se_audit_data: Option<&[u8]>) -> Result<(), ParseErrorKind> {
    match se_audit_data {
        Some(_) => Err(ParseErrorKind::UnexpectedSeAuditData),
        None => Ok(()),
    }
}

/// `[0] operationType, [1] clientId, [2] processData, [3] processType,
/// [4] additionalExternalData OPTIONAL, [5] transactionNumber,
/// [6] additionalInternalData OPTIONAL`
pub struct TransactionLogHandler;

impl CertifiedDataHandler for TransactionLogHandler {
    fn interpret(
        &self,
        certified_data: &[RawElement],
        se_audit_data: Option<&[u8]>,
    ) -> Result<LogBody, ParseErrorKind> {
        reject_se_audit_data(se_audit_data)?;
        let mut fields = TaggedFields::new(certified_data);

        let operation_type = printable_string(fields.required(0, "operationType")?, "operationType")?;
        let operation = TransactionOperation::parse(&operation_type).ok_or_else(|| {
            ParseErrorKind::InvalidCertifiedData(format!(
                "unknown transaction operation '{operation_type}'"
            ))
        })?;
        let client_id = printable_string(fields.required(1, "clientId")?, "clientId")?;
        let process_data = fields.required(2, "processData")?.value().to_vec();
        let process_type = printable_string(fields.required(3, "processType")?, "processType")?;
        let additional_external_data = fields.optional(4).map(|e| e.value().to_vec());
        let transaction_number =
            unsigned_integer(fields.required(5, "transactionNumber")?, "transactionNumber")?;
        let additional_internal_data = fields.optional(6).map(|e| e.value().to_vec());
        fields.finish()?;

        Ok(LogBody::Transaction(TransactionData {
            operation,
            client_id,
            process_data,
            process_type,
            additional_external_data,
            transaction_number,
            additional_internal_data,
        }))
    }
}

/// `[0] operationType, [1] systemOperationData, [2] additionalInternalData OPTIONAL`
pub struct SystemLogHandler;

impl CertifiedDataHandler for SystemLogHandler {
    fn interpret(
        &self,
        certified_data: &[RawElement],
        se_audit_data: Option<&[u8]>,
    ) -> Result<LogBody, ParseErrorKind> {
        reject_se_audit_data(se_audit_data)?;
        let mut fields = TaggedFields::new(certified_data);

        let operation_type = printable_string(fields.required(0, "operationType")?, "operationType")?;
        let system_operation_data = fields
            .required(1, "systemOperationData")?
            .value()
            .to_vec();
        let additional_internal_data = fields.optional(2).map(|e| e.value().to_vec());
        fields.finish()?;

        Ok(LogBody::System(SystemData {
            operation_type,
            system_operation_data,
            additional_internal_data,
        }))
    }
}

/// Audit logs have no certified data; seAuditData is mandatory.
pub struct AuditLogHandler;

impl CertifiedDataHandler for AuditLogHandler {
    fn interpret(
        &self,
        certified_data: &[RawElement],
        se_audit_data: Option<&[u8]>,
    ) -> Result<LogBody, ParseErrorKind> {
        if let Some(first) = certified_data.first() {
            return Err(ParseErrorKind::InvalidCertifiedData(format!(
                "audit log messages carry no certified data, found {}",
                first.kind()
            )));
        }
        if se_audit_data.is_none() {
            return Err(ParseErrorKind::SeAuditDataMissing);
        }
        Ok(LogBody::Audit)
    }
}
