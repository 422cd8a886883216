//! Tag-length-value cursor over DER/BER encoded buffers.
//!
//! The cursor reads one element at a time and reports, besides the element's
//! kind, the exact byte range it occupied. The header width is derived from
//! the tag and length encodings (high-tag-number form, long-form lengths), so
//! `Element::value` is correct for any length form. Log message DTBS
//! reconstruction relies on that.

use crate::domain::constants::{
    ASN1_GENERALIZED_TIME_TAG, ASN1_INTEGER_TAG, ASN1_OCTET_STRING_TAG, ASN1_OID_TAG,
    ASN1_PRINTABLE_STRING_TAG, ASN1_SEQUENCE_TAG, ASN1_UTC_TIME_TAG, LENGTH_LONG_FORM_BIT,
    MAX_LENGTH_OCTETS, TAG_CLASS_MASK, TAG_CONSTRUCTED_BIT, TAG_NUMBER_MASK,
};
use der::asn1::ObjectIdentifier;
use std::fmt;
use thiserror::Error;

/// Decoding errors raised by the cursor and by the typed value accessors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TlvError {
    #[error("truncated element at offset {offset}")]
    Truncated { offset: usize },

    #[error("indefinite length at offset {offset} is not supported")]
    IndefiniteLength { offset: usize },

    #[error("length field at offset {offset} uses {octets} octets")]
    LengthTooWide { offset: usize, octets: usize },

    #[error("tag number at offset {offset} does not fit in 32 bits")]
    TagNumberOverflow { offset: usize },

    #[error(
        "element at offset {offset} declares {declared} value bytes but only {available} remain"
    )]
    ValueOverrun {
        offset: usize,
        declared: usize,
        available: usize,
    },

    #[error("expected {expected}, found {found}")]
    UnexpectedKind {
        expected: ElementKind,
        found: ElementKind,
    },

    #[error("{kind} element at offset {offset} has no content")]
    EmptyValue { kind: ElementKind, offset: usize },

    #[error("integer at offset {offset} does not fit in 64 bits")]
    IntegerOverflow { offset: usize },

    #[error("invalid object identifier at offset {offset}: {reason}")]
    InvalidOid { offset: usize, reason: String },

    #[error("string at offset {offset} is not ASCII")]
    NonAsciiString { offset: usize },
}

/// Class bits of an identifier octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

/// Closed set of element kinds the log message grammar distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Integer,
    OctetString,
    ObjectIdentifier,
    PrintableString,
    UtcTime,
    GeneralizedTime,
    Sequence,
    Application { number: u32, constructed: bool },
    ContextSpecific { number: u32, constructed: bool },
    Other {
        class: TagClass,
        number: u32,
        constructed: bool,
    },
}

impl ElementKind {
    fn classify(class: TagClass, constructed: bool, number: u32) -> Self {
        match (class, constructed) {
            (TagClass::Universal, false) => match number {
                n if n == u32::from(ASN1_INTEGER_TAG) => ElementKind::Integer,
                n if n == u32::from(ASN1_OCTET_STRING_TAG) => ElementKind::OctetString,
                n if n == u32::from(ASN1_OID_TAG) => ElementKind::ObjectIdentifier,
                n if n == u32::from(ASN1_PRINTABLE_STRING_TAG) => ElementKind::PrintableString,
                n if n == u32::from(ASN1_UTC_TIME_TAG) => ElementKind::UtcTime,
                n if n == u32::from(ASN1_GENERALIZED_TIME_TAG) => ElementKind::GeneralizedTime,
                _ => ElementKind::Other {
                    class,
                    number,
                    constructed,
                },
            },
            (TagClass::Universal, true)
                if number == u32::from(ASN1_SEQUENCE_TAG & TAG_NUMBER_MASK) =>
            {
                ElementKind::Sequence
            }
            (TagClass::Application, _) => ElementKind::Application {
                number,
                constructed,
            },
            (TagClass::ContextSpecific, _) => ElementKind::ContextSpecific {
                number,
                constructed,
            },
            _ => ElementKind::Other {
                class,
                number,
                constructed,
            },
        }
    }

    /// True for the kinds that may carry a signature counter or a log time.
    #[must_use]
    pub fn is_counter_or_time(self) -> bool {
        matches!(
            self,
            ElementKind::Integer | ElementKind::UtcTime | ElementKind::GeneralizedTime
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Integer => write!(f, "INTEGER"),
            ElementKind::OctetString => write!(f, "OCTET STRING"),
            ElementKind::ObjectIdentifier => write!(f, "OBJECT IDENTIFIER"),
            ElementKind::PrintableString => write!(f, "PrintableString"),
            ElementKind::UtcTime => write!(f, "UTCTime"),
            ElementKind::GeneralizedTime => write!(f, "GeneralizedTime"),
            ElementKind::Sequence => write!(f, "SEQUENCE"),
            ElementKind::Application { number, .. } => write!(f, "[APPLICATION {number}]"),
            ElementKind::ContextSpecific { number, .. } => write!(f, "[{number}]"),
            ElementKind::Other { class, number, .. } => write!(f, "{class:?} tag {number}"),
        }
    }
}

/// One decoded TLV unit borrowing from the underlying buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    kind: ElementKind,
    offset: usize,
    header_len: usize,
    encoded: &'a [u8],
}

impl<'a> Element<'a> {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Offset of the first identifier octet, relative to the outermost buffer.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Width of the tag and length octets.
    #[must_use]
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Full encoding: tag, length and value octets.
    #[must_use]
    pub fn encoded(&self) -> &'a [u8] {
        self.encoded
    }

    /// Value octets with the header stripped.
    #[must_use]
    pub fn value(&self) -> &'a [u8] {
        &self.encoded[self.header_len..]
    }

    #[must_use]
    pub fn is(&self, kind: ElementKind) -> bool {
        self.kind == kind
    }

    fn expect(&self, expected: ElementKind) -> Result<(), TlvError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(TlvError::UnexpectedKind {
                expected,
                found: self.kind,
            })
        }
    }

    /// Cursor over the children of a SEQUENCE.
    pub fn children(&self) -> Result<TlvCursor<'a>, TlvError> {
        self.expect(ElementKind::Sequence)?;
        Ok(TlvCursor::with_base(
            self.value(),
            self.offset + self.header_len,
        ))
    }

    /// Content octets of an INTEGER (two's complement, big endian).
    pub fn integer_bytes(&self) -> Result<&'a [u8], TlvError> {
        self.expect(ElementKind::Integer)?;
        self.non_empty_value()
    }

    /// Content octets of a primitive element regardless of its tag.
    pub fn non_empty_value(&self) -> Result<&'a [u8], TlvError> {
        let value = self.value();
        if value.is_empty() {
            return Err(TlvError::EmptyValue {
                kind: self.kind,
                offset: self.offset,
            });
        }
        Ok(value)
    }

    /// Decode an INTEGER that fits in an `i64`.
    pub fn to_i64(&self) -> Result<i64, TlvError> {
        let bytes = self.integer_bytes()?;
        signed_be_to_i64(bytes).ok_or(TlvError::IntegerOverflow {
            offset: self.offset,
        })
    }

    /// Decode an OBJECT IDENTIFIER.
    pub fn to_oid(&self) -> Result<ObjectIdentifier, TlvError> {
        self.expect(ElementKind::ObjectIdentifier)?;
        ObjectIdentifier::from_bytes(self.value()).map_err(|e| TlvError::InvalidOid {
            offset: self.offset,
            reason: e.to_string(),
        })
    }

    /// Value octets interpreted as an ASCII string (time and printable strings).
    pub fn to_ascii(&self) -> Result<&'a str, TlvError> {
        let value = self.value();
        if !value.is_ascii() {
            return Err(TlvError::NonAsciiString {
                offset: self.offset,
            });
        }
        std::str::from_utf8(value).map_err(|_| TlvError::NonAsciiString {
            offset: self.offset,
        })
    }

    /// Owned copy, detached from the input buffer.
    #[must_use]
    pub fn to_raw(&self) -> RawElement {
        RawElement {
            kind: self.kind,
            header_len: self.header_len,
            encoded: self.encoded.to_vec(),
        }
    }
}

/// Interpret big-endian two's complement bytes as an `i64`.
pub(crate) fn signed_be_to_i64(bytes: &[u8]) -> Option<i64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return None;
    }
    let mut value: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
    for &b in bytes {
        value = (value << 8) | i64::from(b);
    }
    Some(value)
}

/// Owned element kept inside a parsed log message (certified data, algorithm
/// parameters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    kind: ElementKind,
    header_len: usize,
    encoded: Vec<u8>,
}

impl RawElement {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    #[must_use]
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.encoded[self.header_len..]
    }

    /// Borrowed view with the typed accessors of [`Element`].
    #[must_use]
    pub fn as_element(&self) -> Element<'_> {
        Element {
            kind: self.kind,
            offset: 0,
            header_len: self.header_len,
            encoded: &self.encoded,
        }
    }
}

/// Sequential reader over concatenated TLV elements.
#[derive(Debug, Clone)]
pub struct TlvCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> TlvCursor<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_base(buf, 0)
    }

    fn with_base(buf: &'a [u8], base: usize) -> Self {
        Self { buf, pos: 0, base }
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Bytes not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos.min(self.buf.len())..]
    }

    /// Read the next element and advance past it. `Ok(None)` once exhausted.
    pub fn next_element(&mut self) -> Result<Option<Element<'a>>, TlvError> {
        if self.is_exhausted() {
            return Ok(None);
        }
        match self.read_at(self.pos) {
            Ok(element) => {
                self.pos += element.encoded.len();
                Ok(Some(element))
            }
            Err(e) => {
                // a broken header leaves nothing sensible to resume from
                self.pos = self.buf.len();
                Err(e)
            }
        }
    }

    /// Decode the next element without advancing.
    pub fn peek_element(&self) -> Result<Option<Element<'a>>, TlvError> {
        if self.is_exhausted() {
            return Ok(None);
        }
        self.read_at(self.pos).map(Some)
    }

    fn read_at(&self, start: usize) -> Result<Element<'a>, TlvError> {
        let buf = self.buf;
        let offset = self.base + start;
        let truncated = |at: usize| TlvError::Truncated {
            offset: self.base + at,
        };

        let first = *buf.get(start).ok_or_else(|| truncated(start))?;
        let class = match first & TAG_CLASS_MASK {
            0x00 => TagClass::Universal,
            0x40 => TagClass::Application,
            0x80 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        };
        let constructed = first & TAG_CONSTRUCTED_BIT != 0;
        let mut cur = start + 1;

        let number = if first & TAG_NUMBER_MASK == TAG_NUMBER_MASK {
            let mut number: u32 = 0;
            loop {
                let b = *buf.get(cur).ok_or_else(|| truncated(cur))?;
                cur += 1;
                if number > (u32::MAX >> 7) {
                    return Err(TlvError::TagNumberOverflow { offset });
                }
                number = (number << 7) | u32::from(b & 0x7f);
                if b & 0x80 == 0 {
                    break;
                }
            }
            number
        } else {
            u32::from(first & TAG_NUMBER_MASK)
        };

        let length_octet = *buf.get(cur).ok_or_else(|| truncated(cur))?;
        cur += 1;
        let length = if length_octet & LENGTH_LONG_FORM_BIT == 0 {
            usize::from(length_octet)
        } else {
            let octets = usize::from(length_octet & !LENGTH_LONG_FORM_BIT);
            if octets == 0 {
                return Err(TlvError::IndefiniteLength { offset });
            }
            if octets > MAX_LENGTH_OCTETS || octets > std::mem::size_of::<usize>() {
                return Err(TlvError::LengthTooWide { offset, octets });
            }
            let bytes = buf.get(cur..cur + octets).ok_or_else(|| truncated(cur))?;
            cur += octets;
            bytes
                .iter()
                .fold(0usize, |acc, &b| (acc << 8) | usize::from(b))
        };

        let available = buf.len() - cur;
        if length > available {
            return Err(TlvError::ValueOverrun {
                offset,
                declared: length,
                available,
            });
        }

        Ok(Element {
            kind: ElementKind::classify(class, constructed, number),
            offset,
            header_len: cur - start,
            encoded: &buf[start..cur + length],
        })
    }
}

impl<'a> Iterator for TlvCursor<'a> {
    type Item = Result<Element<'a>, TlvError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_element().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_short_form_elements_in_order() {
        let buf = [0x02, 0x01, 0x02, 0x04, 0x02, 0xAA, 0xBB];
        let mut cursor = TlvCursor::new(&buf);

        let version = cursor.next_element().unwrap().unwrap();
        assert_eq!(version.kind(), ElementKind::Integer);
        assert_eq!(version.header_len(), 2);
        assert_eq!(version.value(), &[0x02]);
        assert_eq!(version.to_i64().unwrap(), 2);

        let serial = cursor.next_element().unwrap().unwrap();
        assert_eq!(serial.kind(), ElementKind::OctetString);
        assert_eq!(serial.offset(), 3);
        assert_eq!(serial.encoded(), &buf[3..]);
        assert_eq!(serial.value(), &[0xAA, 0xBB]);

        assert!(cursor.next_element().unwrap().is_none());
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn long_form_length_strips_full_header() {
        let payload = vec![0x5A; 300];
        let mut buf = vec![0x04, 0x82, 0x01, 0x2C];
        buf.extend_from_slice(&payload);

        let element = TlvCursor::new(&buf).next_element().unwrap().unwrap();
        assert_eq!(element.header_len(), 4);
        assert_eq!(element.value(), &payload[..]);
    }

    #[test]
    fn non_minimal_long_form_is_accepted() {
        let buf = [0x04, 0x81, 0x03, 1, 2, 3];
        let element = TlvCursor::new(&buf).next_element().unwrap().unwrap();
        assert_eq!(element.header_len(), 3);
        assert_eq!(element.value(), &[1, 2, 3]);
    }

    #[test]
    fn high_tag_number_application_element() {
        // [APPLICATION 129] wrapping an OCTET STRING
        let buf = [0x7F, 0x81, 0x01, 0x04, 0x04, 0x02, 0x00, 0x00];
        let element = TlvCursor::new(&buf).next_element().unwrap().unwrap();
        assert_eq!(
            element.kind(),
            ElementKind::Application {
                number: 129,
                constructed: true
            }
        );
        assert_eq!(element.header_len(), 4);
        assert_eq!(element.value().len(), 4);
    }

    #[test]
    fn context_specific_tags_are_not_universal_kinds() {
        let buf = [0x82, 0x01, 0xFF];
        let element = TlvCursor::new(&buf).next_element().unwrap().unwrap();
        assert_eq!(
            element.kind(),
            ElementKind::ContextSpecific {
                number: 2,
                constructed: false
            }
        );
        assert!(!element.kind().is_counter_or_time());
    }

    #[test]
    fn peek_does_not_advance() {
        let buf = [0x17, 0x01, 0x30, 0x02, 0x01, 0x05];
        let mut cursor = TlvCursor::new(&buf);
        let peeked = cursor.peek_element().unwrap().unwrap();
        let read = cursor.next_element().unwrap().unwrap();
        assert_eq!(peeked, read);
        assert_eq!(cursor.next_element().unwrap().unwrap().to_i64().unwrap(), 5);
    }

    #[test]
    fn sequence_children_keep_absolute_offsets() {
        let buf = [0x30, 0x05, 0x06, 0x03, 0x2A, 0x03, 0x04];
        let outer = TlvCursor::new(&buf).next_element().unwrap().unwrap();
        let mut children = outer.children().unwrap();
        let oid = children.next_element().unwrap().unwrap();
        assert_eq!(oid.offset(), 2);
        assert_eq!(oid.to_oid().unwrap().to_string(), "1.2.3.4");
        assert!(children.is_exhausted());
    }

    #[test]
    fn rejects_indefinite_length() {
        let buf = [0x30, 0x80, 0x00, 0x00];
        let err = TlvCursor::new(&buf).next_element().unwrap_err();
        assert_eq!(err, TlvError::IndefiniteLength { offset: 0 });
    }

    #[test]
    fn rejects_value_overrun_and_stops() {
        let buf = [0x04, 0x05, 0x01, 0x02];
        let mut cursor = TlvCursor::new(&buf);
        assert!(matches!(
            cursor.next_element(),
            Err(TlvError::ValueOverrun {
                declared: 5,
                available: 2,
                ..
            })
        ));
        assert!(cursor.next_element().unwrap().is_none());
    }

    #[test]
    fn rejects_truncated_header() {
        let buf = [0x04];
        assert_eq!(
            TlvCursor::new(&buf).next_element().unwrap_err(),
            TlvError::Truncated { offset: 1 }
        );
    }

    #[test]
    fn integer_decoding_handles_sign() {
        let buf = [0x02, 0x02, 0xFF, 0x38];
        let element = TlvCursor::new(&buf).next_element().unwrap().unwrap();
        assert_eq!(element.to_i64().unwrap(), -200);

        let empty = [0x02, 0x00];
        let element = TlvCursor::new(&empty).next_element().unwrap().unwrap();
        assert!(matches!(
            element.to_i64(),
            Err(TlvError::EmptyValue { .. })
        ));
    }

    #[test]
    fn typed_accessors_check_kind() {
        let buf = [0x04, 0x01, 0x02];
        let element = TlvCursor::new(&buf).next_element().unwrap().unwrap();
        assert_eq!(
            element.to_i64().unwrap_err(),
            TlvError::UnexpectedKind {
                expected: ElementKind::Integer,
                found: ElementKind::OctetString
            }
        );
    }

    #[test]
    fn raw_element_round_trips_value() {
        let buf = [0x80, 0x03, b'a', b'b', b'c'];
        let element = TlvCursor::new(&buf).next_element().unwrap().unwrap();
        let raw = element.to_raw();
        assert_eq!(raw.value(), b"abc");
        assert_eq!(raw.as_element().to_ascii().unwrap(), "abc");
    }
}
