//! [`Asn1Node`] to DER.

use crate::bytes::ByteCursor;

use super::{tag, Asn1Node, Asn1Value, TagClass};

/// Encode a node tree as DER.
///
/// Primitive content is written verbatim; build INTEGERs from unsigned
/// magnitudes with [`Asn1Node::unsigned_integer`] to get the sign octet.
pub fn encode(node: &Asn1Node) -> Vec<u8> {
    let mut out = ByteCursor::new();
    encode_into(node, &mut out);
    out.into_bytes()
}

fn encode_into(node: &Asn1Node, out: &mut ByteCursor) {
    let content = content_octets(node);

    let mut identifier = node.tag_class.bits() | (node.tag_number & 0x1F);
    if node.constructed {
        identifier |= 0x20;
    }

    out.put_u8(identifier);
    put_length(out, content.len());
    out.put_bytes(&content);
}

fn content_octets(node: &Asn1Node) -> Vec<u8> {
    if let Some(contents) = unchanged_bit_string(node) {
        return contents.to_vec();
    }

    match &node.value {
        Asn1Value::Composed(children) => {
            let mut value = ByteCursor::new();
            // Composed primitive: BIT STRING wrapping DER, zero unused bits
            if !node.constructed {
                value.put_u8(0x00);
            }
            for child in children {
                encode_into(child, &mut value);
            }
            value.into_bytes()
        }
        Asn1Value::Primitive(bytes) => bytes.clone(),
    }
}

/// Raw contents of a decoded BIT STRING that has not been modified since.
fn unchanged_bit_string(node: &Asn1Node) -> Option<&[u8]> {
    if node.tag_class != TagClass::Universal || node.tag_number != tag::BIT_STRING {
        return None;
    }

    match (&node.bit_string_contents, &node.original) {
        (Some(contents), Some(original)) if **original == *node => Some(contents),
        _ => None,
    }
}

fn put_length(out: &mut ByteCursor, len: usize) {
    if len < 0x80 {
        out.put_u8(len as u8);
        return;
    }

    let be = (len as u64).to_be_bytes();
    let first = be.iter().position(|b| *b != 0).unwrap_or(be.len() - 1);
    let significant = &be[first..];
    out.put_u8(0x80 | significant.len() as u8);
    out.put_bytes(significant);
}
