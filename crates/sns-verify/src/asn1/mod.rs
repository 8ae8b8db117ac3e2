//! ASN.1 DER engine.
//!
//! Covers the subset of DER that X.509 certificates and RSA keys need:
//!
//! - [`decode`] / [`decode_with`]: bytes to an [`Asn1Node`] tree, including
//!   speculative decoding of structures nested inside BIT STRINGs
//! - [`encode`]: an [`Asn1Node`] tree back to DER
//! - [`oid_to_der`] / [`der_to_oid`]: dotted OID strings
//! - [`validate`]: structural matching against a static [`Template`] with
//!   value capture

mod decode;
mod encode;
mod oid;
mod template;


use crate::bytes::BufferUnderrun;

pub use decode::{decode, decode_with, DecodeOptions, MAX_DEPTH};
pub use encode::encode;
pub use oid::{der_to_oid, oid_to_der};
pub use template::{validate, Captured, Captures, Template};

/// Universal tag numbers used by certificates and keys.
pub mod tag {
    pub const BOOLEAN: u8 = 1;
    pub const INTEGER: u8 = 2;
    pub const BIT_STRING: u8 = 3;
    pub const OCTET_STRING: u8 = 4;
    pub const NULL: u8 = 5;
    pub const OID: u8 = 6;
    pub const UTF8_STRING: u8 = 12;
    pub const SEQUENCE: u8 = 16;
    pub const SET: u8 = 17;
    pub const PRINTABLE_STRING: u8 = 19;
    pub const IA5_STRING: u8 = 22;
    pub const UTC_TIME: u8 = 23;
    pub const GENERALIZED_TIME: u8 = 24;
}

/// DER decoding and OID errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Asn1Error {
    #[error("too few bytes to parse DER: {0}")]
    Underrun(#[from] BufferUnderrun),

    /// Input left over after the top-level value.
    #[error("unparsed DER bytes remain after parsing: {remaining}")]
    TrailingBytes { remaining: usize },

    /// Indefinite length in strict mode, or on a primitive value.
    #[error("indefinite length not allowed here")]
    IndefiniteLength,

    /// Long-form length wider than 32 bits.
    #[error("length of length too large: {octets} octets")]
    LengthTooLarge { octets: u8 },

    /// Nesting deeper than [`MAX_DEPTH`].
    #[error("nesting exceeds maximum depth of {max}")]
    TooDeep { max: usize },

    #[error("invalid OID: {reason}")]
    InvalidOid { reason: String },
}

/// Tag class, bits 7-6 of the identifier octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl TagClass {
    pub fn from_identifier(b: u8) -> Self {
        match b & 0xC0 {
            0x00 => Self::Universal,
            0x40 => Self::Application,
            0x80 => Self::ContextSpecific,
            _ => Self::Private,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Universal => 0x00,
            Self::Application => 0x40,
            Self::ContextSpecific => 0x80,
            Self::Private => 0xC0,
        }
    }
}

impl std::fmt::Display for TagClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Universal => "universal",
            Self::Application => "application",
            Self::ContextSpecific => "context-specific",
            Self::Private => "private",
        };
        f.write_str(name)
    }
}

/// Node content: child nodes, or raw content octets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asn1Value {
    Composed(Vec<Asn1Node>),
    Primitive(Vec<u8>),
}

/// A decoded (or hand-built) ASN.1 value.
///
/// A node is *composed* when its value is a child list. Constructed nodes are
/// always composed; a primitive BIT STRING is also composed when its content
/// was recognized as a nested DER value.
#[derive(Debug, Clone)]
pub struct Asn1Node {
    pub tag_class: TagClass,
    pub tag_number: u8,
    pub constructed: bool,
    pub value: Asn1Value,
    /// Raw BIT STRING content (unused-bits octet included) as decoded.
    pub bit_string_contents: Option<Vec<u8>>,
    /// Node as first decoded, used to re-emit `bit_string_contents` verbatim.
    pub original: Option<Box<Asn1Node>>,
}

// Cached auxiliary fields do not take part in equality.
impl PartialEq for Asn1Node {
    fn eq(&self, other: &Self) -> bool {
        self.tag_class == other.tag_class
            && self.tag_number == other.tag_number
            && self.constructed == other.constructed
            && self.value == other.value
    }
}

impl Eq for Asn1Node {}

impl Asn1Node {
    pub fn new(tag_class: TagClass, tag_number: u8, constructed: bool, value: Asn1Value) -> Self {
        Self {
            tag_class,
            tag_number,
            constructed,
            value,
            bit_string_contents: None,
            original: None,
        }
    }

    pub fn universal(tag_number: u8, constructed: bool, value: Asn1Value) -> Self {
        Self::new(TagClass::Universal, tag_number, constructed, value)
    }

    pub fn sequence(children: Vec<Asn1Node>) -> Self {
        Self::universal(tag::SEQUENCE, true, Asn1Value::Composed(children))
    }

    pub fn null() -> Self {
        Self::universal(tag::NULL, false, Asn1Value::Primitive(Vec::new()))
    }

    pub fn oid(dotted: &str) -> Result<Self, Asn1Error> {
        Ok(Self::universal(
            tag::OID,
            false,
            Asn1Value::Primitive(oid_to_der(dotted)?),
        ))
    }

    /// INTEGER from an unsigned big-endian magnitude.
    ///
    /// Redundant leading zeros are dropped and a single 0x00 is prepended
    /// when the top bit of the first octet is set, so the value never reads
    /// as negative.
    pub fn unsigned_integer(magnitude: &[u8]) -> Self {
        Self::universal(
            tag::INTEGER,
            false,
            Asn1Value::Primitive(twos_complement_unsigned(magnitude)),
        )
    }

    /// Primitive BIT STRING wrapping an encoded child, zero unused bits.
    pub fn bit_string_wrapping(child: Asn1Node) -> Self {
        Self::universal(tag::BIT_STRING, false, Asn1Value::Composed(vec![child]))
    }

    /// Context-specific constructed tag `[n]` (EXPLICIT tagging).
    pub fn explicit(tag_number: u8, child: Asn1Node) -> Self {
        Self::new(
            TagClass::ContextSpecific,
            tag_number,
            true,
            Asn1Value::Composed(vec![child]),
        )
    }

    pub fn is_composed(&self) -> bool {
        matches!(self.value, Asn1Value::Composed(_))
    }

    pub fn children(&self) -> &[Asn1Node] {
        match &self.value {
            Asn1Value::Composed(children) => children,
            Asn1Value::Primitive(_) => &[],
        }
    }

    /// Raw content octets of a primitive node.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.value {
            Asn1Value::Primitive(bytes) => Some(bytes),
            Asn1Value::Composed(_) => None,
        }
    }

    /// Snapshot without the cached auxiliary fields.
    pub(crate) fn bare_copy(&self) -> Self {
        let value = match &self.value {
            Asn1Value::Composed(children) => {
                Asn1Value::Composed(children.iter().map(Self::bare_copy).collect())
            }
            Asn1Value::Primitive(bytes) => Asn1Value::Primitive(bytes.clone()),
        };
        Self::new(self.tag_class, self.tag_number, self.constructed, value)
    }

    /// Indented one-line-per-node rendering, for diagnostics and the CLI.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.pretty_into(&mut out, 0);
        out
    }

    fn pretty_into(&self, out: &mut String, depth: usize) {
        use std::fmt::Write;

        let indent = "  ".repeat(depth);
        let name = self.type_name();
        match &self.value {
            Asn1Value::Composed(children) => {
                let _ = writeln!(out, "{indent}{name} ({} children)", children.len());
                for child in children {
                    child.pretty_into(out, depth + 1);
                }
            }
            Asn1Value::Primitive(bytes) => {
                let detail = match (self.tag_class, self.tag_number) {
                    (TagClass::Universal, tag::OID) => {
                        der_to_oid(bytes).unwrap_or_else(|_| hex::encode(bytes))
                    }
                    (
                        TagClass::Universal,
                        tag::PRINTABLE_STRING
                        | tag::UTF8_STRING
                        | tag::IA5_STRING
                        | tag::UTC_TIME
                        | tag::GENERALIZED_TIME,
                    ) => String::from_utf8_lossy(bytes).into_owned(),
                    _ if bytes.len() > 32 => {
                        format!("{}... ({} bytes)", hex::encode(&bytes[..32]), bytes.len())
                    }
                    _ => hex::encode(bytes),
                };
                let _ = writeln!(out, "{indent}{name} {detail}");
            }
        }
    }

    fn type_name(&self) -> String {
        if self.tag_class != TagClass::Universal {
            return format!("[{} {}]", self.tag_class, self.tag_number);
        }
        let name = match self.tag_number {
            tag::BOOLEAN => "BOOLEAN",
            tag::INTEGER => "INTEGER",
            tag::BIT_STRING => "BIT STRING",
            tag::OCTET_STRING => "OCTET STRING",
            tag::NULL => "NULL",
            tag::OID => "OBJECT IDENTIFIER",
            tag::UTF8_STRING => "UTF8String",
            tag::SEQUENCE => "SEQUENCE",
            tag::SET => "SET",
            tag::PRINTABLE_STRING => "PrintableString",
            tag::IA5_STRING => "IA5String",
            tag::UTC_TIME => "UTCTime",
            tag::GENERALIZED_TIME => "GeneralizedTime",
            n => return format!("[universal {n}]"),
        };
        name.to_string()
    }
}

/// Minimal two's-complement encoding of a non-negative magnitude.
pub(crate) fn twos_complement_unsigned(magnitude: &[u8]) -> Vec<u8> {
    let trimmed = strip_leading_zeros(magnitude);
    let mut out = Vec::with_capacity(trimmed.len() + 1);
    if trimmed.first().is_some_and(|b| b & 0x80 != 0) {
        out.push(0x00);
    }
    out.extend_from_slice(trimmed);
    out
}

/// Drop leading zero octets, keeping a single zero for the value 0.
pub(crate) fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|b| *b != 0) {
        Some(idx) => &bytes[idx..],
        None if bytes.is_empty() => bytes,
        None => &bytes[bytes.len() - 1..],
    }
}
