//! PEM text codec.
//!
//! Decodes every `-----BEGIN <label>-----` / `-----END <label>-----` region
//! in a text, with an optional RFC 1421 header block (`Name: value` lines
//! ended by a blank line) ahead of the base64 body. Encoding writes CRLF
//! line endings with the body wrapped at 64 columns.

use base64::{engine::general_purpose::STANDARD, Engine};
use once_cell::sync::Lazy;
use regex::Regex;

static BEGIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-----BEGIN ([A-Z0-9 -]+)-----").unwrap());

const LINE_WIDTH: usize = 64;

/// PEM decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PemError {
    #[error("no PEM blocks found")]
    NoBlocks,

    #[error("invalid base64 in {label} block: {reason}")]
    InvalidBase64 { label: String, reason: String },

    #[error("malformed header in {label} block: {line:?}")]
    MalformedHeader { label: String, line: String },

    /// Block declares `Proc-Type: 4,ENCRYPTED`.
    #[error("{label} block is encrypted")]
    Encrypted { label: String },
}

/// `Name: value` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemHeader {
    pub name: String,
    pub value: String,
}

/// One decoded PEM block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemBlock {
    pub label: String,
    pub headers: Vec<PemHeader>,
    pub body: Vec<u8>,
}

impl PemBlock {
    pub fn new(label: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn is_encrypted(&self) -> bool {
        self.header("Proc-Type")
            .and_then(|v| v.split(',').nth(1))
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("ENCRYPTED"))
    }
}

/// Decode all PEM blocks in `text`, in order of appearance.
///
/// Each BEGIN closes at the first END carrying the same label; a BEGIN with
/// no such END is skipped. Finding no block at all is [`PemError::NoBlocks`].
pub fn decode(text: &str) -> Result<Vec<PemBlock>, PemError> {
    let mut blocks = Vec::new();
    let mut consumed = 0;

    for caps in BEGIN.captures_iter(text) {
        let Some(begin) = caps.get(0) else { continue };
        if begin.start() < consumed {
            continue;
        }

        let label = &caps[1];
        let end_marker = format!("-----END {label}-----");
        let Some(len) = text[begin.end()..].find(&end_marker) else {
            tracing::debug!(label, "skipping PEM block without matching END");
            continue;
        };
        let content = &text[begin.end()..begin.end() + len];
        consumed = begin.end() + len + end_marker.len();

        let (headers, body) = split_headers(label, content)?;
        let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let body = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| PemError::InvalidBase64 {
                label: label.to_string(),
                reason: e.to_string(),
            })?;

        blocks.push(PemBlock {
            label: label.to_string(),
            headers,
            body,
        });
    }

    if blocks.is_empty() {
        return Err(PemError::NoBlocks);
    }
    Ok(blocks)
}

/// Encode one block. Headers, when present, are followed by a blank line.
pub fn encode(block: &PemBlock) -> String {
    let mut out = format!("-----BEGIN {}-----\r\n", block.label);

    if !block.headers.is_empty() {
        for header in &block.headers {
            out.push_str(&header.name);
            out.push_str(": ");
            out.push_str(&header.value);
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
    }

    let encoded = STANDARD.encode(&block.body);
    // base64 output is ASCII, so byte chunks are valid str boundaries
    for line in encoded.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push_str("\r\n");
    }

    out.push_str(&format!("-----END {}-----\r\n", block.label));
    out
}

/// Split block content into its header lines and base64 body.
///
/// Headers are present when the first non-empty line contains a colon.
/// Lines starting with whitespace continue the previous header value.
fn split_headers<'a>(label: &str, content: &'a str) -> Result<(Vec<PemHeader>, &'a str), PemError> {
    let content = content.trim_start_matches(['\r', '\n']);

    let first_line = content.lines().next().unwrap_or_default();
    if !first_line.contains(':') {
        return Ok((Vec::new(), content));
    }

    let mut headers: Vec<PemHeader> = Vec::new();
    let mut offset = 0;

    for raw in content.split_inclusive('\n') {
        offset += raw.len();
        let line = raw.trim_end_matches(['\r', '\n']);

        if line.is_empty() {
            return Ok((headers, &content[offset..]));
        }

        if line.starts_with([' ', '\t']) {
            let Some(last) = headers.last_mut() else {
                return Err(malformed_header(label, line));
            };
            last.value.push_str(line.trim());
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(malformed_header(label, line));
        };
        headers.push(PemHeader {
            name: name.trim().to_string(),
            value: value.trim().to_string(),
        });
    }

    // Header block never terminated by a blank line
    Err(malformed_header(label, first_line))
}

fn malformed_header(label: &str, line: &str) -> PemError {
    PemError::MalformedHeader {
        label: label.to_string(),
        line: line.to_string(),
    }
}
