//! OBJECT IDENTIFIER content octets.

use super::Asn1Error;

/// Encode a dotted OID (`1.2.840.113549.1.1.1`) as DER content octets.
pub fn oid_to_der(dotted: &str) -> Result<Vec<u8>, Asn1Error> {
    let arcs = dotted
        .split('.')
        .map(|arc| {
            arc.parse::<u64>()
                .map_err(|_| invalid(format!("non-numeric arc {arc:?} in {dotted:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if arcs.len() < 2 {
        return Err(invalid(format!("{dotted:?} needs at least two arcs")));
    }

    let (first, second) = (arcs[0], arcs[1]);
    if first > 2 || (first < 2 && second >= 40) {
        return Err(invalid(format!("{dotted:?} has an invalid leading arc pair")));
    }
    let combined = (first * 40)
        .checked_add(second)
        .ok_or_else(|| invalid(format!("{dotted:?} second arc overflows")))?;

    let mut out = Vec::with_capacity(arcs.len() + 4);
    push_base128(&mut out, combined);
    for arc in &arcs[2..] {
        push_base128(&mut out, *arc);
    }
    Ok(out)
}

/// Decode DER content octets into a dotted OID.
pub fn der_to_oid(bytes: &[u8]) -> Result<String, Asn1Error> {
    if bytes.is_empty() {
        return Err(invalid("empty OID".to_string()));
    }

    let mut arcs: Vec<u64> = Vec::new();
    let mut value: u64 = 0;
    let mut pending = false;

    for &b in bytes {
        if value > (u64::MAX >> 7) {
            return Err(invalid("arc exceeds 64 bits".to_string()));
        }
        value = (value << 7) | u64::from(b & 0x7F);

        if b & 0x80 != 0 {
            pending = true;
            continue;
        }

        if arcs.is_empty() {
            let (first, second) = match value {
                0..=39 => (0, value),
                40..=79 => (1, value - 40),
                _ => (2, value - 80),
            };
            arcs.push(first);
            arcs.push(second);
        } else {
            arcs.push(value);
        }
        value = 0;
        pending = false;
    }

    if pending {
        return Err(invalid("truncated arc".to_string()));
    }

    Ok(arcs
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("."))
}

/// Base-128, most significant group first, high bit set on all but the last.
fn push_base128(out: &mut Vec<u8>, mut value: u64) {
    let mut groups = [0u8; 10];
    let mut n = 0;
    loop {
        groups[n] = (value & 0x7F) as u8;
        n += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }

    for i in (0..n).rev() {
        let mut b = groups[i];
        if i != 0 {
            b |= 0x80;
        }
        out.push(b);
    }
}

fn invalid(reason: String) -> Asn1Error {
    Asn1Error::InvalidOid { reason }
}
