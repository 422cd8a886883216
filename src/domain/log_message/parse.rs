//! Log message decoding.
//!
//! ```text
//! LogMessage ::= SEQUENCE {
//!     version                INTEGER (2),
//!     certifiedDataType      OBJECT IDENTIFIER,
//!     certifiedData          ANY (zero or more elements),
//!     serialNumber           OCTET STRING,
//!     signatureAlgorithm     SEQUENCE { algorithm OBJECT IDENTIFIER, parameters ANY },
//!     seAuditData            OCTET STRING OPTIONAL,
//!     signatureCounter       INTEGER OPTIONAL,
//!     logTime                CHOICE { unixTime INTEGER, utcTime UTCTime,
//!                                     generalizedTime GeneralizedTime },
//!     signatureValue         OCTET STRING
//! }
//! ```
//!
//! The DTBS is collected while decoding: the value octets of every consumed
//! field from `version` through `logTime`. Algorithm parameters and the
//! signature value are not part of it.

use super::{
    CertifiedDataHandler, CertifiedDataType, LogMessage, LogTime, ParseErrorKind, ParsingFailure,
    SignatureCounter, ALLOWED_SIGNATURE_ALGORITHMS,
};
use crate::domain::constants::LOG_MESSAGE_VERSION;
use crate::domain::oid::{BsiOidRegistry, OidResolver, ResolvedOid};
use crate::domain::tlv::{Element, ElementKind, RawElement, TlvCursor, TlvError};
use std::collections::HashMap;
use std::sync::Arc;

/// Decoder from raw log message bytes to [`LogMessage`].
pub struct LogMessageCodec {
    resolver: Arc<dyn OidResolver>,
    handlers: HashMap<CertifiedDataType, Arc<dyn CertifiedDataHandler>>,
}

impl Default for LogMessageCodec {
    fn default() -> Self {
        Self::new(Arc::new(BsiOidRegistry::new()))
    }
}

impl LogMessageCodec {
    #[must_use]
    pub fn new(resolver: Arc<dyn OidResolver>) -> Self {
        Self {
            resolver,
            handlers: HashMap::new(),
        }
    }

    /// Replace the certified data handler for one data type.
    #[must_use]
    pub fn with_handler(
        mut self,
        data_type: CertifiedDataType,
        handler: Arc<dyn CertifiedDataHandler>,
    ) -> Self {
        self.handlers.insert(data_type, handler);
        self
    }

    #[must_use]
    pub fn resolver(&self) -> &dyn OidResolver {
        self.resolver.as_ref()
    }

    fn handler(&self, data_type: CertifiedDataType) -> &dyn CertifiedDataHandler {
        match self.handlers.get(&data_type) {
            Some(handler) => handler.as_ref(),
            None => data_type.default_handler(),
        }
    }

    /// Decode one log message. `filename` is kept as provenance and reported
    /// with any failure.
    pub fn decode(&self, raw: &[u8], filename: &str) -> Result<LogMessage, ParsingFailure> {
        match self.decode_fields(raw, filename) {
            Ok(message) => {
                log::debug!(
                    "Decoded {} ({}, counter {:?}, {} DTBS bytes)",
                    filename,
                    message.certified_data_type,
                    message.signature_counter,
                    message.dtbs.len()
                );
                Ok(message)
            }
            Err(kind) => {
                log::debug!("Rejected {filename}: {kind}");
                Err(ParsingFailure::new(filename, kind))
            }
        }
    }

    fn decode_fields(&self, raw: &[u8], filename: &str) -> Result<LogMessage, ParseErrorKind> {
        let envelope = read_envelope(raw)?;
        let mut parser = Parser::new(envelope.children()?);

        // version
        let version = match parser.next()? {
            Some(e) if e.is(ElementKind::Integer) => e,
            _ => return Err(ParseErrorKind::VersionMissing),
        };
        parser.sign(version);
        let version = match version.to_i64() {
            Ok(v) => Ok(v),
            Err(TlvError::IntegerOverflow { .. }) => {
                Err(format!("0x{}", hex::encode(version.value())))
            }
            Err(e) => return Err(e.into()),
        };

        // certifiedDataType
        let data_type_element = match parser.next()? {
            Some(e) if e.is(ElementKind::ObjectIdentifier) => e,
            _ => return Err(ParseErrorKind::CertifiedDataTypeMissing),
        };
        parser.sign(data_type_element);
        let certified_data_type_oid = self.resolver.resolve(data_type_element.value())?;
        let certified_data_type = CertifiedDataType::from_symbol(certified_data_type_oid.symbol())
            .ok_or_else(|| {
                ParseErrorKind::DisallowedCertifiedDataType(certified_data_type_oid.to_string())
            })?;

        // certifiedData, up to the serialNumber
        let mut certified_data = Vec::new();
        let serial = loop {
            match parser.next()? {
                Some(e) if e.is(ElementKind::OctetString) => break e,
                Some(e) => {
                    parser.sign(e);
                    certified_data.push(e.to_raw());
                }
                None if certified_data.is_empty() => {
                    return Err(ParseErrorKind::SerialNumberMissing)
                }
                None => return Err(ParseErrorKind::CertifiedDataIncomplete),
            }
        };
        parser.sign(serial);

        // signatureAlgorithm
        let (signature_algorithm, signature_algorithm_parameters) =
            self.signature_algorithm(&mut parser)?;

        // seAuditData
        let mut se_audit_data = None;
        match parser.next()? {
            Some(e) if e.is(ElementKind::OctetString) => {
                parser.sign(e);
                se_audit_data = Some(e.value().to_vec());
            }
            Some(e) => parser.hold(e),
            None => return Err(ParseErrorKind::LogTimeMissing),
        }

        // signatureCounter and logTime
        let pending = match parser.next()? {
            Some(e) => e,
            None => return Err(ParseErrorKind::LogTimeMissing),
        };
        let followed_by_time = parser
            .peek()?
            .is_some_and(|next| next.kind().is_counter_or_time());
        let (signature_counter, time_element) = if followed_by_time {
            let counter = read_counter(pending)?;
            parser.sign(pending);
            (Some(counter), parser.next()?)
        } else {
            (None, Some(pending))
        };
        let log_time = match time_element {
            Some(e) => read_log_time(e)?,
            None => return Err(ParseErrorKind::LogTimeMissing),
        };
        if let Some(e) = time_element {
            parser.sign(e);
        }

        // signatureValue
        let signature_value = match parser.next()? {
            Some(e) if e.is(ElementKind::OctetString) => e.value().to_vec(),
            _ => return Err(ParseErrorKind::SignatureMissing),
        };
        if !parser.is_exhausted() {
            return Err(ParseErrorKind::TrailingData);
        }

        let version = match version {
            Ok(LOG_MESSAGE_VERSION) => LOG_MESSAGE_VERSION,
            Ok(other) => return Err(ParseErrorKind::InvalidVersion(other.to_string())),
            Err(wide) => return Err(ParseErrorKind::InvalidVersion(wide)),
        };
        if serial.value().is_empty() {
            return Err(ParseErrorKind::EmptySerialNumber);
        }
        let body = self
            .handler(certified_data_type)
            .interpret(&certified_data, se_audit_data.as_deref())?;

        Ok(LogMessage {
            filename: filename.to_string(),
            version,
            certified_data_type,
            certified_data_type_oid,
            certified_data,
            body,
            serial_number: serial.value().to_vec(),
            signature_algorithm,
            signature_algorithm_parameters,
            se_audit_data,
            signature_counter,
            log_time,
            signature_value,
            dtbs: parser.into_dtbs(),
        })
    }

    fn signature_algorithm(
        &self,
        parser: &mut Parser<'_>,
    ) -> Result<(ResolvedOid, Vec<RawElement>), ParseErrorKind> {
        let block = match parser.next()? {
            Some(e) if e.is(ElementKind::Sequence) => e,
            _ => return Err(ParseErrorKind::SignatureAlgorithmMissing),
        };
        let mut children = block.children()?;
        let algorithm = match children.next_element()? {
            Some(e) if e.is(ElementKind::ObjectIdentifier) => e,
            _ => return Err(ParseErrorKind::SignatureAlgorithmMissing),
        };
        parser.sign(algorithm);

        let resolved = self.resolver.resolve(algorithm.value())?;
        if !ALLOWED_SIGNATURE_ALGORITHMS.contains(&resolved.symbol()) {
            return Err(ParseErrorKind::DisallowedAlgorithm(resolved.to_string()));
        }

        let parameters = children
            .map(|e| e.map(|e| e.to_raw()))
            .collect::<Result<Vec<_>, TlvError>>()?;
        Ok((resolved, parameters))
    }
}

fn read_envelope(raw: &[u8]) -> Result<Element<'_>, ParseErrorKind> {
    let mut cursor = TlvCursor::new(raw);
    let envelope = match cursor.next_element() {
        Ok(Some(e)) if e.is(ElementKind::Sequence) => e,
        Ok(Some(e)) => {
            return Err(ParseErrorKind::MalformedEnvelope(format!(
                "outer element is {}",
                e.kind()
            )))
        }
        Ok(None) => return Err(ParseErrorKind::MalformedEnvelope("input is empty".into())),
        Err(e) => return Err(ParseErrorKind::MalformedEnvelope(e.to_string())),
    };
    if !cursor.is_exhausted() {
        return Err(ParseErrorKind::MalformedEnvelope(format!(
            "{} bytes after the outer SEQUENCE",
            cursor.remaining().len()
        )));
    }
    Ok(envelope)
}

fn read_counter(element: Element<'_>) -> Result<SignatureCounter, ParseErrorKind> {
    if !element.is(ElementKind::Integer) {
        return Err(ParseErrorKind::SignatureCounterMissing);
    }
    let bytes = element
        .integer_bytes()
        .map_err(|_| ParseErrorKind::InvalidSignatureCounter)?;
    if bytes[0] & 0x80 != 0 {
        return Err(ParseErrorKind::InvalidSignatureCounter);
    }
    SignatureCounter::from_be_bytes(bytes).map_err(|_| ParseErrorKind::InvalidSignatureCounter)
}

fn read_log_time(element: Element<'_>) -> Result<LogTime, ParseErrorKind> {
    let invalid = |e: TlvError| ParseErrorKind::InvalidLogTime(e.to_string());
    match element.kind() {
        ElementKind::Integer => element.to_i64().map(LogTime::UnixTime).map_err(invalid),
        ElementKind::UtcTime => element
            .to_ascii()
            .map(|s| LogTime::UtcTime(s.to_string()))
            .map_err(invalid),
        ElementKind::GeneralizedTime => element
            .to_ascii()
            .map(|s| LogTime::GeneralizedTime(s.to_string()))
            .map_err(invalid),
        _ => Err(ParseErrorKind::LogTimeMissing),
    }
}

/// Element stream with a single pending slot and the DTBS accumulator of one
/// decode call.
struct Parser<'a> {
    cursor: TlvCursor<'a>,
    pending: Option<Element<'a>>,
    dtbs: Vec<u8>,
}

impl<'a> Parser<'a> {
    fn new(cursor: TlvCursor<'a>) -> Self {
        Self {
            cursor,
            pending: None,
            dtbs: Vec::new(),
        }
    }

    fn next(&mut self) -> Result<Option<Element<'a>>, ParseErrorKind> {
        if let Some(element) = self.pending.take() {
            return Ok(Some(element));
        }
        Ok(self.cursor.next_element()?)
    }

    /// Element after the pending one.
    fn peek(&self) -> Result<Option<Element<'a>>, ParseErrorKind> {
        Ok(self.cursor.peek_element()?)
    }

    fn hold(&mut self, element: Element<'a>) {
        self.pending = Some(element);
    }

    fn sign(&mut self, element: Element<'a>) {
        self.dtbs.extend_from_slice(element.value());
    }

    fn is_exhausted(&self) -> bool {
        self.pending.is_none() && self.cursor.is_exhausted()
    }

    fn into_dtbs(self) -> Vec<u8> {
        self.dtbs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::log_message::{LogBody, TransactionOperation};
    use der::asn1::ObjectIdentifier;

    fn tlv(tag: u8, value: &[u8]) -> Vec<u8> {
        let mut out = vec![tag];
        let len = value.len();
        if len < 0x80 {
            out.push(len as u8);
        } else {
            let bytes: Vec<u8> = len
                .to_be_bytes()
                .into_iter()
                .skip_while(|&b| b == 0)
                .collect();
            out.push(0x80 | bytes.len() as u8);
            out.extend(bytes);
        }
        out.extend_from_slice(value);
        out
    }

    fn oid(dotted: &str) -> Vec<u8> {
        ObjectIdentifier::new_unwrap(dotted).as_bytes().to_vec()
    }

    const TRANSACTION_LOG: &str = "0.4.0.127.0.7.3.7.1.1";
    const SYSTEM_LOG: &str = "0.4.0.127.0.7.3.7.1.2";
    const AUDIT_LOG: &str = "0.4.0.127.0.7.3.7.1.3";
    const ECDSA_PLAIN_SHA256: &str = "0.4.0.127.0.7.1.1.4.1.3";

    struct Fields {
        version: Vec<u8>,
        data_type: &'static str,
        certified_data: Vec<Vec<u8>>,
        serial: Vec<u8>,
        algorithm: &'static str,
        parameters: Vec<u8>,
        se_audit_data: Option<Vec<u8>>,
        counter: Option<Vec<u8>>,
        log_time: Vec<u8>,
        signature: Option<Vec<u8>>,
        trailing: Vec<u8>,
    }

    impl Fields {
        fn transaction() -> Self {
            Self {
                version: vec![2],
                data_type: TRANSACTION_LOG,
                certified_data: vec![
                    tlv(0x80, b"StartTransaction"),
                    tlv(0x81, b"POS-01"),
                    tlv(0x82, &[0xCA, 0xFE]),
                    tlv(0x83, b"Kassenbeleg-V1"),
                    tlv(0x85, &[0x2A]),
                ],
                serial: vec![0xAB; 32],
                algorithm: ECDSA_PLAIN_SHA256,
                parameters: Vec::new(),
                se_audit_data: None,
                counter: Some(vec![0x05]),
                log_time: tlv(0x02, &[0x65, 0x5F, 0x6A, 0x00]),
                signature: Some(vec![0x11; 64]),
                trailing: Vec::new(),
            }
        }

        fn system() -> Self {
            Self {
                data_type: SYSTEM_LOG,
                certified_data: vec![tlv(0x80, b"updateTime"), tlv(0x81, &[0x30, 0x00])],
                ..Self::transaction()
            }
        }

        fn encode(&self) -> Vec<u8> {
            let mut body = tlv(0x02, &self.version);
            body.extend(tlv(0x06, &oid(self.data_type)));
            for e in &self.certified_data {
                body.extend_from_slice(e);
            }
            body.extend(tlv(0x04, &self.serial));
            let mut algorithm = tlv(0x06, &oid(self.algorithm));
            algorithm.extend_from_slice(&self.parameters);
            body.extend(tlv(0x30, &algorithm));
            if let Some(audit) = &self.se_audit_data {
                body.extend(tlv(0x04, audit));
            }
            if let Some(counter) = &self.counter {
                body.extend(tlv(0x02, counter));
            }
            body.extend_from_slice(&self.log_time);
            if let Some(signature) = &self.signature {
                body.extend(tlv(0x04, signature));
            }
            body.extend_from_slice(&self.trailing);
            tlv(0x30, &body)
        }
    }

    fn decode(fields: &Fields) -> Result<LogMessage, ParseErrorKind> {
        LogMessageCodec::default()
            .decode(&fields.encode(), "test.log")
            .map_err(|f| f.kind)
    }

    #[test]
    fn decodes_transaction_log() {
        let message = decode(&Fields::transaction()).unwrap();

        assert_eq!(message.filename(), "test.log");
        assert_eq!(message.version(), 2);
        assert_eq!(message.certified_data_type(), CertifiedDataType::TransactionLog);
        assert_eq!(message.certified_data().len(), 5);
        assert_eq!(message.serial_number(), &[0xAB; 32]);
        assert_eq!(message.signature_algorithm().symbol(), "ecdsa-plain-SHA256");
        assert!(message.signature_algorithm_parameters().is_empty());
        assert_eq!(
            message.signature_counter(),
            Some(&SignatureCounter::from_u64(5).unwrap())
        );
        assert_eq!(message.log_time(), &LogTime::UnixTime(0x655F_6A00));
        assert_eq!(message.signature_value(), &[0x11; 64]);

        let LogBody::Transaction(data) = message.body() else {
            panic!("expected transaction body");
        };
        assert_eq!(data.operation, TransactionOperation::Start);
        assert_eq!(data.transaction_number, 42);
    }

    #[test]
    fn dtbs_is_concatenated_value_octets() {
        let message = decode(&Fields::transaction()).unwrap();

        let mut expected = vec![0x02];
        expected.extend(oid(TRANSACTION_LOG));
        expected.extend_from_slice(b"StartTransaction");
        expected.extend_from_slice(b"POS-01");
        expected.extend_from_slice(&[0xCA, 0xFE]);
        expected.extend_from_slice(b"Kassenbeleg-V1");
        expected.push(0x2A);
        expected.extend_from_slice(&[0xAB; 32]);
        expected.extend(oid(ECDSA_PLAIN_SHA256));
        expected.push(0x05);
        expected.extend_from_slice(&[0x65, 0x5F, 0x6A, 0x00]);
        assert_eq!(message.dtbs(), &expected[..]);
    }

    #[test]
    fn omitted_counter_leaves_no_dtbs_contribution() {
        let with_counter = decode(&Fields::system()).unwrap();
        let without = decode(&Fields {
            counter: None,
            ..Fields::system()
        })
        .unwrap();

        assert!(without.signature_counter().is_none());
        assert_eq!(without.dtbs().len() + 1, with_counter.dtbs().len());

        let again = decode(&Fields {
            counter: None,
            ..Fields::system()
        })
        .unwrap();
        assert_eq!(again.dtbs(), without.dtbs());
    }

    #[test]
    fn time_variants() {
        let utc = decode(&Fields {
            log_time: tlv(0x17, b"240115103000Z"),
            ..Fields::system()
        })
        .unwrap();
        assert_eq!(utc.log_time(), &LogTime::UtcTime("240115103000Z".into()));

        let generalized = decode(&Fields {
            counter: None,
            log_time: tlv(0x18, b"20240115103000Z"),
            ..Fields::system()
        })
        .unwrap();
        assert_eq!(
            generalized.log_time(),
            &LogTime::GeneralizedTime("20240115103000Z".into())
        );
        assert!(generalized.dtbs().ends_with(b"20240115103000Z"));
    }

    #[test]
    fn algorithm_parameters_are_kept_but_not_signed() {
        let params = tlv(0x04, &[1, 2, 3]);
        let message = decode(&Fields {
            parameters: params.clone(),
            ..Fields::system()
        })
        .unwrap();
        assert_eq!(message.signature_algorithm_parameters().len(), 1);
        assert_eq!(message.signature_algorithm_parameters()[0].encoded(), &params[..]);
        assert_eq!(message.dtbs(), decode(&Fields::system()).unwrap().dtbs());
    }

    #[test]
    fn audit_log_with_long_se_audit_data() {
        let audit = vec![0x3C; 300];
        let message = decode(&Fields {
            data_type: AUDIT_LOG,
            certified_data: Vec::new(),
            se_audit_data: Some(audit.clone()),
            ..Fields::transaction()
        })
        .unwrap();

        assert_eq!(message.body(), &LogBody::Audit);
        assert_eq!(message.se_audit_data(), Some(&audit[..]));

        let mut tail = audit;
        tail.push(0x05);
        tail.extend_from_slice(&[0x65, 0x5F, 0x6A, 0x00]);
        assert!(message.dtbs().ends_with(&tail));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let err = decode(&Fields {
            version: vec![3],
            ..Fields::transaction()
        })
        .unwrap_err();
        assert_eq!(err, ParseErrorKind::InvalidVersion("3".into()));
    }

    #[test]
    fn version_wider_than_64_bits_is_invalid_version() {
        let err = decode(&Fields {
            version: vec![0x01, 0, 0, 0, 0, 0, 0, 0, 0x02],
            ..Fields::transaction()
        })
        .unwrap_err();
        assert_eq!(
            err,
            ParseErrorKind::InvalidVersion("0x010000000000000002".into())
        );
    }

    #[test]
    fn disallowed_certified_data_type() {
        let err = decode(&Fields {
            data_type: ECDSA_PLAIN_SHA256,
            ..Fields::transaction()
        })
        .unwrap_err();
        assert!(matches!(err, ParseErrorKind::DisallowedCertifiedDataType(ref s) if s.contains("ecdsa-plain-SHA256")));
    }

    #[test]
    fn unknown_certified_data_type() {
        let err = decode(&Fields {
            data_type: "1.3.6.1.4.1.99999",
            ..Fields::transaction()
        })
        .unwrap_err();
        assert!(matches!(err, ParseErrorKind::UnknownOid(_)));
    }

    #[test]
    fn disallowed_algorithm() {
        let err = decode(&Fields {
            algorithm: "1.2.840.10045.4.3.2",
            ..Fields::transaction()
        })
        .unwrap_err();
        assert!(matches!(err, ParseErrorKind::DisallowedAlgorithm(_)));
    }

    #[test]
    fn missing_serial_number() {
        let fields = Fields {
            data_type: AUDIT_LOG,
            certified_data: Vec::new(),
            ..Fields::transaction()
        };
        let mut body = tlv(0x02, &[2]);
        body.extend(tlv(0x06, &oid(fields.data_type)));
        let raw = tlv(0x30, &body);
        let err = LogMessageCodec::default().decode(&raw, "x.log").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::SerialNumberMissing);

        let mut body = tlv(0x02, &[2]);
        body.extend(tlv(0x06, &oid(TRANSACTION_LOG)));
        body.extend(tlv(0x80, b"StartTransaction"));
        let raw = tlv(0x30, &body);
        let err = LogMessageCodec::default().decode(&raw, "x.log").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::CertifiedDataIncomplete);
    }

    #[test]
    fn empty_serial_number() {
        let err = decode(&Fields {
            serial: Vec::new(),
            ..Fields::system()
        })
        .unwrap_err();
        assert_eq!(err, ParseErrorKind::EmptySerialNumber);
    }

    #[test]
    fn negative_counter() {
        let err = decode(&Fields {
            counter: Some(vec![0xFF]),
            ..Fields::system()
        })
        .unwrap_err();
        assert_eq!(err, ParseErrorKind::InvalidSignatureCounter);
    }

    #[test]
    fn counter_slot_must_be_integer() {
        let mut fields = Fields {
            counter: None,
            ..Fields::system()
        };
        let mut log_time = tlv(0x13, b"12");
        log_time.extend(tlv(0x02, &[0x01]));
        fields.log_time = log_time;
        assert_eq!(
            decode(&fields).unwrap_err(),
            ParseErrorKind::SignatureCounterMissing
        );
    }

    #[test]
    fn missing_log_time_and_signature() {
        let err = decode(&Fields {
            counter: None,
            log_time: tlv(0x13, b"noon"),
            ..Fields::system()
        })
        .unwrap_err();
        assert_eq!(err, ParseErrorKind::LogTimeMissing);

        let err = decode(&Fields {
            signature: None,
            ..Fields::system()
        })
        .unwrap_err();
        assert_eq!(err, ParseErrorKind::SignatureMissing);
    }

    #[test]
    fn trailing_elements_are_rejected() {
        let err = decode(&Fields {
            trailing: tlv(0x04, &[0]),
            ..Fields::system()
        })
        .unwrap_err();
        assert_eq!(err, ParseErrorKind::TrailingData);

        let mut raw = Fields::system().encode();
        raw.push(0x00);
        let err = LogMessageCodec::default().decode(&raw, "x.log").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MalformedEnvelope(_)));
    }

    #[test]
    fn se_audit_data_outside_audit_logs() {
        let err = decode(&Fields {
            se_audit_data: Some(vec![1]),
            ..Fields::system()
        })
        .unwrap_err();
        assert_eq!(err, ParseErrorKind::UnexpectedSeAuditData);
    }

    #[test]
    fn custom_handler_overrides_default() {
        struct Lenient;
        impl CertifiedDataHandler for Lenient {
            fn interpret(
                &self,
                _: &[RawElement],
                _: Option<&[u8]>,
            ) -> Result<LogBody, ParseErrorKind> {
                Ok(LogBody::Audit)
            }
        }

        let fields = Fields {
            certified_data: vec![tlv(0x80, b"anything")],
            ..Fields::system()
        };
        assert!(decode(&fields).is_err());

        let codec = LogMessageCodec::default()
            .with_handler(CertifiedDataType::SystemLog, Arc::new(Lenient));
        let message = codec.decode(&fields.encode(), "custom.log").unwrap();
        assert_eq!(message.body(), &LogBody::Audit);
    }
}
