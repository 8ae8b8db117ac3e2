//! DER to [`Asn1Node`].

use crate::bytes::{BufferUnderrun, ByteCursor};

use super::{tag, Asn1Error, Asn1Node, Asn1Value, TagClass};

/// Maximum nesting depth accepted by the decoder.
pub const MAX_DEPTH: usize = 64;

/// Decoder behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Reject indefinite lengths and lengths that overrun the input.
    pub strict: bool,

    /// Fail if input remains after the top-level value.
    pub parse_all_bytes: bool,

    /// Try to decode BIT STRING content as a nested DER value.
    pub decode_bit_strings: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            strict: true,
            parse_all_bytes: true,
            decode_bit_strings: true,
        }
    }
}

impl DecodeOptions {
    /// Non-strict decoding: indefinite lengths allowed, overlong lengths clamped.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    pub fn with_parse_all_bytes(mut self, enabled: bool) -> Self {
        self.parse_all_bytes = enabled;
        self
    }

    pub fn with_decode_bit_strings(mut self, enabled: bool) -> Self {
        self.decode_bit_strings = enabled;
        self
    }
}

/// Decode with default (strict) options.
pub fn decode(bytes: &[u8]) -> Result<Asn1Node, Asn1Error> {
    decode_with(bytes, DecodeOptions::default())
}

pub fn decode_with(bytes: &[u8], options: DecodeOptions) -> Result<Asn1Node, Asn1Error> {
    let mut cursor = ByteCursor::from_bytes(bytes);
    let total = cursor.remaining();
    let node = decode_node(&mut cursor, total, 0, &options)?;

    if options.parse_all_bytes && !cursor.is_empty() {
        return Err(Asn1Error::TrailingBytes {
            remaining: cursor.remaining(),
        });
    }

    Ok(node)
}

/// `remaining` is the number of bytes this value may consume, which can be
/// less than what the cursor holds when decoding inside a parent.
fn decode_node(
    cursor: &mut ByteCursor,
    mut remaining: usize,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Asn1Node, Asn1Error> {
    if depth > MAX_DEPTH {
        return Err(Asn1Error::TooDeep { max: MAX_DEPTH });
    }

    check_length(remaining, 2)?;
    let identifier = cursor.read_u8()?;
    remaining -= 1;

    let tag_class = TagClass::from_identifier(identifier);
    let constructed = identifier & 0x20 != 0;
    let tag_number = identifier & 0x1F;

    let before = cursor.remaining();
    let declared = read_length(cursor, remaining)?;
    remaining -= before - cursor.remaining();

    let length = match declared {
        Some(len) if len > remaining => {
            if options.strict {
                return Err(underrun(remaining, len));
            }
            Some(remaining)
        }
        other => other,
    };

    if constructed {
        let children = match length {
            Some(len) => decode_children(cursor, len, depth, options)?,
            None if options.strict => return Err(Asn1Error::IndefiniteLength),
            None => decode_until_end_marker(cursor, remaining, depth, options)?,
        };
        return Ok(Asn1Node::new(
            tag_class,
            tag_number,
            true,
            Asn1Value::Composed(children),
        ));
    }

    let length = length.ok_or(Asn1Error::IndefiniteLength)?;

    if tag_class == TagClass::Universal && tag_number == tag::BIT_STRING {
        return decode_bit_string(cursor, length, depth, options);
    }

    let bytes = cursor.read_bytes(length)?;
    Ok(Asn1Node::new(
        tag_class,
        tag_number,
        false,
        Asn1Value::Primitive(bytes),
    ))
}

fn decode_children(
    cursor: &mut ByteCursor,
    mut length: usize,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Vec<Asn1Node>, Asn1Error> {
    let mut children = Vec::new();
    while length > 0 {
        let before = cursor.remaining();
        children.push(decode_node(cursor, length, depth + 1, options)?);
        length -= before - cursor.remaining();
    }
    Ok(children)
}

fn decode_until_end_marker(
    cursor: &mut ByteCursor,
    mut remaining: usize,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Vec<Asn1Node>, Asn1Error> {
    let mut children = Vec::new();
    loop {
        check_length(remaining, 2)?;
        if matches!(cursor.peek_bytes(2)?, [0, 0]) {
            cursor.skip(2)?;
            return Ok(children);
        }

        let before = cursor.remaining();
        children.push(decode_node(cursor, remaining, depth + 1, options)?);
        remaining -= before - cursor.remaining();
    }
}

/// Primitive BIT STRING. When the content (after a zero unused-bits octet)
/// is exactly one universal DER value, the node's value becomes that value.
/// The attempt runs on a separate cursor over the content, so a failed
/// parse leaves `cursor` where it was.
fn decode_bit_string(
    cursor: &mut ByteCursor,
    length: usize,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Asn1Node, Asn1Error> {
    let contents = cursor.peek_bytes(length)?.to_vec();

    let nested = if options.decode_bit_strings && length > 1 && contents[0] == 0 {
        decode_nested(&contents[1..], depth)
    } else {
        None
    };

    let value = match nested {
        Some(inner) => {
            cursor.skip(length)?;
            Asn1Value::Composed(vec![inner])
        }
        None => Asn1Value::Primitive(cursor.read_bytes(length)?),
    };

    let mut node = Asn1Node::new(TagClass::Universal, tag::BIT_STRING, false, value);
    node.original = Some(Box::new(node.bare_copy()));
    node.bit_string_contents = Some(contents);
    Ok(node)
}

fn decode_nested(content: &[u8], depth: usize) -> Option<Asn1Node> {
    let nested_options = DecodeOptions {
        strict: true,
        parse_all_bytes: false,
        decode_bit_strings: true,
    };

    let mut probe = ByteCursor::from_bytes(content);
    let inner = decode_node(&mut probe, content.len(), depth + 1, &nested_options).ok()?;

    if probe.is_empty() && inner.tag_class == TagClass::Universal {
        Some(inner)
    } else {
        None
    }
}

fn read_length(cursor: &mut ByteCursor, remaining: usize) -> Result<Option<usize>, Asn1Error> {
    check_length(remaining, 1)?;
    let first = cursor.read_u8()?;

    if first & 0x80 == 0 {
        return Ok(Some(usize::from(first)));
    }

    let octets = first & 0x7F;
    if octets == 0 {
        return Ok(None);
    }
    if octets > 4 {
        return Err(Asn1Error::LengthTooLarge { octets });
    }

    check_length(remaining - 1, usize::from(octets))?;
    let length = cursor.read_uint(u32::from(octets) * 8)?;
    Ok(Some(length as usize))
}

fn check_length(remaining: usize, requested: usize) -> Result<(), Asn1Error> {
    if requested > remaining {
        return Err(underrun(remaining, requested));
    }
    Ok(())
}

fn underrun(available: usize, requested: usize) -> Asn1Error {
    Asn1Error::Underrun(BufferUnderrun {
        available,
        requested,
    })
}
