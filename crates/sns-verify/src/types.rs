//! Wire types for SNS HTTP(S) deliveries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decoded SNS message body.
///
/// Fields are optional at this layer; which ones must be present depends on
/// the message type and is enforced during verification. Unknown fields are
/// kept in `extra` so the payload serializes back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnsPayload {
    /// `Notification`, `SubscriptionConfirmation` or `UnsubscribeConfirmation`.
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,

    #[serde(rename = "MessageId", default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(rename = "TopicArn", default, skip_serializing_if = "Option::is_none")]
    pub topic_arn: Option<String>,

    /// Notification subject, when the publisher set one.
    #[serde(rename = "Subject", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(rename = "Message", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(rename = "Timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// "1" (SHA1withRSA) or "2" (SHA256withRSA).
    #[serde(
        rename = "SignatureVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub signature_version: Option<String>,

    /// Base64 PKCS #1 v1.5 signature over the canonical string.
    #[serde(rename = "Signature", default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    #[serde(
        rename = "SigningCertURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub signing_cert_url: Option<String>,

    /// Confirmation types only.
    #[serde(rename = "SubscribeURL", default, skip_serializing_if = "Option::is_none")]
    pub subscribe_url: Option<String>,

    /// Confirmation types only.
    #[serde(rename = "Token", default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Notifications only. Never part of the signed string.
    #[serde(
        rename = "UnsubscribeURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub unsubscribe_url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SnsPayload {
    /// Parse a JSON text.
    pub fn from_json_str(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Convert an already decoded JSON value. Non-objects and non-string
    /// known fields are errors.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Value of a wire field by its wire name, for the known string fields.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "Type" => &self.message_type,
            "MessageId" => &self.message_id,
            "TopicArn" => &self.topic_arn,
            "Subject" => &self.subject,
            "Message" => &self.message,
            "Timestamp" => &self.timestamp,
            "SignatureVersion" => &self.signature_version,
            "Signature" => &self.signature,
            "SigningCertURL" => &self.signing_cert_url,
            "SubscribeURL" => &self.subscribe_url,
            "Token" => &self.token,
            "UnsubscribeURL" => &self.unsubscribe_url,
            _ => return self.extra.get(name).and_then(Value::as_str),
        };
        value.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_known_and_extra_fields() {
        let payload = SnsPayload::from_value(json!({
            "Type": "Notification",
            "MessageId": "abc",
            "SigningCertURL": "https://sns.us-east-1.amazonaws.com/x.pem",
            "UnsubscribeURL": "https://example.com/unsub",
            "MessageAttributes": {"k": {"Type": "String", "Value": "v"}}
        }))
        .unwrap();

        assert_eq!(payload.message_type.as_deref(), Some("Notification"));
        assert_eq!(payload.field("MessageId"), Some("abc"));
        assert_eq!(
            payload.field("SigningCertURL"),
            Some("https://sns.us-east-1.amazonaws.com/x.pem")
        );
        assert!(payload.extra.contains_key("MessageAttributes"));
        assert_eq!(payload.field("Subject"), None);
    }

    #[test]
    fn test_serializes_back_unchanged() {
        let original = json!({
            "Type": "SubscriptionConfirmation",
            "Token": "t",
            "SubscribeURL": "https://example.com/confirm",
            "Custom": [1, 2, 3]
        });
        let payload = SnsPayload::from_value(original.clone()).unwrap();
        assert_eq!(payload.to_value(), original);
    }

    #[test]
    fn test_null_is_absent() {
        let payload = SnsPayload::from_value(json!({"Subject": null})).unwrap();
        assert_eq!(payload.subject, None);
    }

    #[test]
    fn test_rejects_non_objects_and_wrong_types() {
        assert!(SnsPayload::from_value(json!([1, 2])).is_err());
        assert!(SnsPayload::from_value(json!("text")).is_err());
        assert!(SnsPayload::from_value(json!({"Message": 42})).is_err());
        assert!(SnsPayload::from_json_str("{not json").is_err());
    }
}
