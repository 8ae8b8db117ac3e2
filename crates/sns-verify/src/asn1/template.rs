//! Structural matching of an [`Asn1Node`] tree against a static template.
//!
//! Templates are declared as `static` trees of [`Template`] values built with
//! `const fn` builders. [`validate`] walks a node and template in lockstep:
//! children are matched positionally, and an optional template child that
//! does not match is skipped without consuming the node child.

use std::collections::HashMap;

use super::{Asn1Node, Asn1Value, TagClass};

/// One node of a validation template. `None` fields match anything.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    pub tag_class: Option<TagClass>,
    pub tag_number: Option<u8>,
    pub constructed: Option<bool>,
    pub optional: bool,
    pub children: Option<&'static [Template]>,
    /// Store the node's value under this key.
    pub capture: Option<&'static str>,
    /// Store the whole node under this key.
    pub capture_asn1: Option<&'static str>,
    /// Store BIT STRING content (unused-bits octet removed) under this key.
    pub capture_bit_string_value: Option<&'static str>,
}

impl Template {
    /// Matches any node.
    pub const fn any(name: &'static str) -> Self {
        Self {
            name,
            tag_class: None,
            tag_number: None,
            constructed: None,
            optional: false,
            children: None,
            capture: None,
            capture_asn1: None,
            capture_bit_string_value: None,
        }
    }

    pub const fn universal(name: &'static str, tag_number: u8, constructed: bool) -> Self {
        Self {
            tag_class: Some(TagClass::Universal),
            tag_number: Some(tag_number),
            constructed: Some(constructed),
            ..Self::any(name)
        }
    }

    pub const fn context(name: &'static str, tag_number: u8, constructed: bool) -> Self {
        Self {
            tag_class: Some(TagClass::ContextSpecific),
            tag_number: Some(tag_number),
            constructed: Some(constructed),
            ..Self::any(name)
        }
    }

    pub const fn optional(self) -> Self {
        Self {
            optional: true,
            ..self
        }
    }

    pub const fn with_children(self, children: &'static [Template]) -> Self {
        Self {
            children: Some(children),
            ..self
        }
    }

    pub const fn capturing(self, key: &'static str) -> Self {
        Self {
            capture: Some(key),
            ..self
        }
    }

    pub const fn capturing_node(self, key: &'static str) -> Self {
        Self {
            capture_asn1: Some(key),
            ..self
        }
    }

    pub const fn capturing_bit_string(self, key: &'static str) -> Self {
        Self {
            capture_bit_string_value: Some(key),
            ..self
        }
    }
}

/// A value recorded during [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Captured {
    Value(Asn1Value),
    Node(Asn1Node),
    BitString(Vec<u8>),
}

/// Values recorded during [`validate`], keyed by capture name.
#[derive(Debug, Clone, Default)]
pub struct Captures {
    entries: HashMap<&'static str, Captured>,
}

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Captured> {
        self.entries.get(key)
    }

    /// Raw bytes of a captured primitive value or BIT STRING.
    pub fn bytes(&self, key: &str) -> Option<&[u8]> {
        match self.entries.get(key)? {
            Captured::Value(Asn1Value::Primitive(bytes)) | Captured::BitString(bytes) => {
                Some(bytes)
            }
            _ => None,
        }
    }

    pub fn node(&self, key: &str) -> Option<&Asn1Node> {
        match self.entries.get(key)? {
            Captured::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: &'static str, value: Captured) {
        self.entries.insert(key, value);
    }
}

/// Match `node` against `template`, recording captures.
///
/// Returns `true` on a full match. When `errors` is given, mismatches append
/// diagnostics of the form `[name] Expected tag class "x", got "y"`.
/// Captures made before a failure are left in place.
pub fn validate(
    node: &Asn1Node,
    template: &Template,
    captures: &mut Captures,
    mut errors: Option<&mut Vec<String>>,
) -> bool {
    if !header_matches(node, template, errors.as_deref_mut()) {
        return false;
    }

    if let Some(child_templates) = template.children {
        let children = node.children();
        let mut next = 0;

        for child_template in child_templates {
            // Optional children are allowed to miss, so their mismatches are noise.
            let log = if child_template.optional {
                None
            } else {
                errors.as_deref_mut()
            };

            let matched = match children.get(next) {
                Some(child) => validate(child, child_template, captures, log),
                None => false,
            };
            if matched {
                next += 1;
                continue;
            }
            if child_template.optional {
                continue;
            }

            if next >= children.len() {
                if let Some(log) = errors.as_deref_mut() {
                    log.push(format!(
                        "[{}] Missing required element \"{}\"",
                        template.name, child_template.name
                    ));
                }
            }
            return false;
        }
    }

    if let Some(key) = template.capture {
        captures.insert(key, Captured::Value(node.value.clone()));
    }
    if let Some(key) = template.capture_asn1 {
        captures.insert(key, Captured::Node(node.clone()));
    }
    if let Some(key) = template.capture_bit_string_value {
        // Hand-built nodes have no cached contents; their raw value stands in
        let contents = node.bit_string_contents.as_deref().or_else(|| node.bytes());
        if let Some(contents) = contents {
            match contents.split_first() {
                None => captures.insert(key, Captured::BitString(Vec::new())),
                Some((0, rest)) => captures.insert(key, Captured::BitString(rest.to_vec())),
                Some((unused, _)) => {
                    if let Some(log) = errors {
                        log.push(format!(
                            "[{}] Expected 0 unused bits, got \"{unused}\"",
                            template.name
                        ));
                    }
                    return false;
                }
            }
        }
    }

    true
}

fn header_matches(node: &Asn1Node, template: &Template, errors: Option<&mut Vec<String>>) -> bool {
    let mut mismatches = Vec::new();

    if let Some(expected) = template.tag_class.filter(|c| *c != node.tag_class) {
        mismatches.push(format!(
            "[{}] Expected tag class \"{expected}\", got \"{}\"",
            template.name, node.tag_class
        ));
    }
    if let Some(expected) = template.tag_number.filter(|n| *n != node.tag_number) {
        mismatches.push(format!(
            "[{}] Expected type \"{expected}\", got \"{}\"",
            template.name, node.tag_number
        ));
    }
    if let Some(expected) = template.constructed.filter(|c| *c != node.constructed) {
        mismatches.push(format!(
            "[{}] Expected constructed \"{expected}\", got \"{}\"",
            template.name, node.constructed
        ));
    }

    let matched = mismatches.is_empty();
    if let Some(log) = errors {
        log.extend(mismatches);
    }
    matched
}
