//! DER builder for signed log messages.

use super::TestDevice;
use der::asn1::ObjectIdentifier;
use tse_log_validator::BsiOidRegistry;

const TRANSACTION_LOG: &str = "0.4.0.127.0.7.3.7.1.1";
const SYSTEM_LOG: &str = "0.4.0.127.0.7.3.7.1.2";
const AUDIT_LOG: &str = "0.4.0.127.0.7.3.7.1.3";

/// Encoded logTime alternative.
#[derive(Debug, Clone)]
pub enum Time {
    Unix(i64),
    Utc(&'static str),
    Generalized(&'static str),
}

pub fn tlv(tag: u8, value: &[u8]) -> Vec<u8> {
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

/// Minimal two's complement encoding.
pub fn integer_bytes(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < 7 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

fn oid_bytes(dotted: &str) -> Vec<u8> {
    ObjectIdentifier::new_unwrap(dotted).as_bytes().to_vec()
}

/// Encoded OID of an algorithm symbol such as `ecsdsa-plain-SHA3-256`.
pub fn algorithm_oid(symbol: &str) -> Vec<u8> {
    BsiOidRegistry::new()
        .by_symbol(symbol)
        .unwrap_or_else(|| panic!("unknown algorithm symbol {symbol}"))
        .oid()
        .as_bytes()
        .to_vec()
}

/// Field-by-field description of one log message.
#[derive(Debug, Clone)]
pub struct LogMessageBuilder {
    pub version: i64,
    pub data_type: &'static str,
    /// Context tag number and value of each certified data element.
    pub certified_data: Vec<(u8, Vec<u8>)>,
    pub serial: Vec<u8>,
    pub algorithm: String,
    pub se_audit_data: Option<Vec<u8>>,
    pub counter: Option<i64>,
    pub time: Time,
}

impl LogMessageBuilder {
    /// StartTransaction message signed by `device`.
    pub fn transaction(device: &TestDevice, transaction_number: i64) -> Self {
        Self {
            version: 2,
            data_type: TRANSACTION_LOG,
            certified_data: vec![
                (0, b"StartTransaction".to_vec()),
                (1, b"POS-01".to_vec()),
                (2, b"Beleg^12.50".to_vec()),
                (3, b"Kassenbeleg-V1".to_vec()),
                (5, integer_bytes(transaction_number)),
            ],
            serial: device.key_serial(),
            algorithm: "ecdsa-plain-SHA256".to_string(),
            se_audit_data: None,
            counter: Some(1),
            time: Time::Unix(1_700_000_000),
        }
    }

    pub fn system(device: &TestDevice, operation: &str) -> Self {
        Self {
            data_type: SYSTEM_LOG,
            certified_data: vec![
                (0, operation.as_bytes().to_vec()),
                (1, vec![0x30, 0x00]),
            ],
            ..Self::transaction(device, 0)
        }
    }

    pub fn audit(device: &TestDevice, se_audit_data: Vec<u8>) -> Self {
        Self {
            data_type: AUDIT_LOG,
            certified_data: Vec::new(),
            se_audit_data: Some(se_audit_data),
            ..Self::transaction(device, 0)
        }
    }

    pub fn counter(mut self, counter: Option<i64>) -> Self {
        self.counter = counter;
        self
    }

    pub fn time(mut self, time: Time) -> Self {
        self.time = time;
        self
    }

    pub fn algorithm(mut self, symbol: &str) -> Self {
        self.algorithm = symbol.to_string();
        self
    }

    pub fn serial(mut self, serial: Vec<u8>) -> Self {
        self.serial = serial;
        self
    }

    pub fn with_certified_data(mut self, number: u8, value: Vec<u8>) -> Self {
        self.certified_data.push((number, value));
        self.certified_data.sort_by_key(|(n, _)| *n);
        self
    }

    fn time_parts(&self) -> (u8, Vec<u8>) {
        match &self.time {
            Time::Unix(secs) => (0x02, integer_bytes(*secs)),
            Time::Utc(s) => (0x17, s.as_bytes().to_vec()),
            Time::Generalized(s) => (0x18, s.as_bytes().to_vec()),
        }
    }

    /// Concatenated value octets of the signed elements.
    pub fn dtbs(&self) -> Vec<u8> {
        let mut out = integer_bytes(self.version);
        out.extend(oid_bytes(self.data_type));
        for (_, value) in &self.certified_data {
            out.extend_from_slice(value);
        }
        out.extend_from_slice(&self.serial);
        out.extend(algorithm_oid(&self.algorithm));
        if let Some(audit) = &self.se_audit_data {
            out.extend_from_slice(audit);
        }
        if let Some(counter) = self.counter {
            out.extend(integer_bytes(counter));
        }
        out.extend(self.time_parts().1);
        out
    }

    /// DER encoding with the given signature value.
    pub fn encode(&self, signature: &[u8]) -> Vec<u8> {
        let mut body = tlv(0x02, &integer_bytes(self.version));
        body.extend(tlv(0x06, &oid_bytes(self.data_type)));
        for (number, value) in &self.certified_data {
            body.extend(tlv(0x80 | number, value));
        }
        body.extend(tlv(0x04, &self.serial));
        body.extend(tlv(
            0x30,
            &tlv(0x06, &algorithm_oid(&self.algorithm)),
        ));
        if let Some(audit) = &self.se_audit_data {
            body.extend(tlv(0x04, audit));
        }
        if let Some(counter) = self.counter {
            body.extend(tlv(0x02, &integer_bytes(counter)));
        }
        let (tag, value) = self.time_parts();
        body.extend(tlv(tag, &value));
        body.extend(tlv(0x04, signature));
        tlv(0x30, &body)
    }

    /// DER encoding signed by `device`.
    pub fn sign(&self, device: &TestDevice) -> Vec<u8> {
        let signature = device.sign(&self.algorithm, &self.dtbs());
        self.encode(&signature)
    }

    /// Conventional export file name for this message.
    pub fn file_name(&self) -> String {
        let time = match &self.time {
            Time::Unix(secs) => format!("Unixt_{secs}"),
            Time::Utc(s) => format!("UTCTime_{s}"),
            Time::Generalized(s) => format!("Gent_{s}"),
        };
        let kind = match self.data_type {
            TRANSACTION_LOG => "Tra",
            SYSTEM_LOG => "Sys",
            _ => "Aud",
        };
        match self.counter {
            Some(counter) => format!("{time}_Sig-{counter}_Log-{kind}.log"),
            None => format!("{time}_Log-{kind}.log"),
        }
    }
}
