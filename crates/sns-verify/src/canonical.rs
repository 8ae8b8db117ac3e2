//! Canonical string construction.
//!
//! SNS signs a newline-delimited string made of selected fields in a fixed
//! order that depends on the message type. `Signature`, `SigningCertURL`,
//! `SignatureVersion` and `UnsubscribeURL` are never part of it.

use std::fmt;
use std::str::FromStr;

use crate::error::SnsError;
use crate::types::SnsPayload;

const NOTIFICATION_FIELDS: &[&str] = &[
    "Message",
    "MessageId",
    "Subject",
    "Timestamp",
    "TopicArn",
    "Type",
];

const CONFIRMATION_FIELDS: &[&str] = &[
    "Message",
    "MessageId",
    "SubscribeURL",
    "Timestamp",
    "Token",
    "TopicArn",
    "Type",
];

/// SNS message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Notification,
    SubscriptionConfirmation,
    UnsubscribeConfirmation,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notification => "Notification",
            Self::SubscriptionConfirmation => "SubscriptionConfirmation",
            Self::UnsubscribeConfirmation => "UnsubscribeConfirmation",
        }
    }

    /// Ordered list of signed fields for this type.
    pub fn signed_fields(self) -> &'static [&'static str] {
        match self {
            Self::Notification => NOTIFICATION_FIELDS,
            Self::SubscriptionConfirmation | Self::UnsubscribeConfirmation => CONFIRMATION_FIELDS,
        }
    }

    /// Parse the optional `Type` field of a payload.
    pub fn from_payload(payload: &SnsPayload) -> Result<Self, SnsError> {
        payload
            .message_type
            .as_deref()
            .ok_or(SnsError::UnsupportedType { message_type: None })?
            .parse()
    }
}

impl FromStr for MessageType {
    type Err = SnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Notification" => Ok(Self::Notification),
            "SubscriptionConfirmation" => Ok(Self::SubscriptionConfirmation),
            "UnsubscribeConfirmation" => Ok(Self::UnsubscribeConfirmation),
            other => Err(SnsError::UnsupportedType {
                message_type: Some(other.to_string()),
            }),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed fields for a `Type` value; `None` or an unknown type is
/// [`SnsError::UnsupportedType`].
pub fn signed_fields(message_type: Option<&str>) -> Result<&'static [&'static str], SnsError> {
    let message_type = message_type.ok_or(SnsError::UnsupportedType { message_type: None })?;
    Ok(message_type.parse::<MessageType>()?.signed_fields())
}

/// Build the string that was signed: `"<name>\n<value>\n"` for every field
/// in `fields` that is present on the payload. Absent fields are skipped.
pub fn canonical_string(payload: &SnsPayload, fields: &[&str]) -> String {
    let mut out = String::new();
    for name in fields {
        if let Some(value) = payload.field(name) {
            out.push_str(name);
            out.push('\n');
            out.push_str(value);
            out.push('\n');
        }
    }
    out
}
