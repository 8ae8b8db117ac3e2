//! Request-level entry point.
//!
//! A call moves through intake (method, JSON body), type check, signature
//! verification and, for confirmation messages, an optional callback to
//! `SubscribeURL`. Any failure ends the call with its fault; the callback
//! outcome is only logged.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::CertificateCache;
use crate::canonical::MessageType;
use crate::client::{Fetcher, HttpFetcher};
use crate::config::ValidatorConfig;
use crate::error::{SnsError, SnsResult};
use crate::types::SnsPayload;
use crate::verify::SignatureVerifier;

/// Error produced while reading or decoding a request body.
pub type BodyError = Box<dyn std::error::Error + Send + Sync>;

/// An inbound HTTP request as seen by the validator.
#[async_trait]
pub trait InboundRequest: Send + Sync {
    /// HTTP method, compared case-sensitively against "POST".
    fn method(&self) -> &str;

    /// Read and decode the body as JSON.
    async fn json(&self) -> Result<Value, BodyError>;
}

/// Method plus body text, for callers that already buffered the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub method: String,
    pub body: String,
}

impl RawRequest {
    pub fn new(method: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            body: body.into(),
        }
    }

    pub fn post(body: impl Into<String>) -> Self {
        Self::new("POST", body)
    }
}

#[async_trait]
impl InboundRequest for RawRequest {
    fn method(&self) -> &str {
        &self.method
    }

    async fn json(&self) -> Result<Value, BodyError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Validates SNS deliveries. Share one instance (it is `Send + Sync`) so
/// the certificate cache is reused across calls.
#[derive(Clone)]
pub struct Validator {
    config: ValidatorConfig,
    verifier: SignatureVerifier,
    fetcher: Arc<dyn Fetcher>,
}

impl Validator {
    /// Validator with the production HTTP client.
    pub fn new(config: ValidatorConfig) -> SnsResult<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::from_config(&config)
            .map_err(|e| SnsError::config(format!("failed to create HTTP client: {e}")))?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Validator using `fetcher` for certificate downloads and callbacks.
    pub fn with_fetcher(config: ValidatorConfig, fetcher: Arc<dyn Fetcher>) -> SnsResult<Self> {
        config.validate()?;

        let cache = if config.use_cache {
            CertificateCache::new(config.max_certs)
        } else {
            CertificateCache::disabled()
        };

        Ok(Self {
            verifier: SignatureVerifier::new(cache, fetcher.clone()),
            config,
            fetcher,
        })
    }

    /// Validator from a JSON options object (`useCache`, `maxCerts`, ...).
    pub fn from_options(options: &Value) -> SnsResult<Self> {
        Self::new(ValidatorConfig::from_json(options)?)
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn cache(&self) -> &CertificateCache {
        self.verifier.cache()
    }

    /// Validate a request. Returns the decoded payload on success.
    pub async fn validate<R>(&self, request: &R) -> SnsResult<SnsPayload>
    where
        R: InboundRequest + ?Sized,
    {
        let method = request.method();
        if method != "POST" {
            return Err(SnsError::InvalidMethod {
                method: method.to_string(),
            });
        }

        let body = request.json().await.map_err(|e| SnsError::InvalidJson {
            reason: e.to_string(),
        })?;
        let payload = SnsPayload::from_value(body).map_err(|e| SnsError::InvalidJson {
            reason: e.to_string(),
        })?;

        self.validate_payload(payload).await
    }

    /// Validate an already decoded payload, skipping method and body checks.
    pub async fn validate_payload(&self, payload: SnsPayload) -> SnsResult<SnsPayload> {
        let message_type = match self.check(&payload).await {
            Ok(message_type) => message_type,
            Err(err) => {
                debug!(
                    error = %err,
                    detail = ?err,
                    message_id = payload.message_id.as_deref().unwrap_or(""),
                    "rejected payload"
                );
                return Err(err);
            }
        };

        if self.should_confirm(message_type) {
            self.confirm(&payload).await;
        }

        Ok(payload)
    }

    async fn check(&self, payload: &SnsPayload) -> SnsResult<MessageType> {
        let message_type = MessageType::from_payload(payload)?;
        self.verifier
            .verify(payload, message_type.signed_fields())
            .await?;
        Ok(message_type)
    }

    fn should_confirm(&self, message_type: MessageType) -> bool {
        match message_type {
            MessageType::SubscriptionConfirmation => self.config.auto_subscribe,
            MessageType::UnsubscribeConfirmation => self.config.auto_resubscribe,
            MessageType::Notification => false,
        }
    }

    /// Single GET to `SubscribeURL`. Failures are logged, never returned.
    async fn confirm(&self, payload: &SnsPayload) {
        let Some(subscribe_url) = payload.subscribe_url.as_deref() else {
            warn!("confirmation message has no SubscribeURL");
            return;
        };

        let url = match url::Url::parse(subscribe_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, url = %subscribe_url, "invalid SubscribeURL");
                return;
            }
        };

        match self.fetcher.get_text(url.as_str()).await {
            Ok(_) => info!(url = %url, "subscription confirmed"),
            Err(e) => warn!(error = %e, url = %url, "subscription confirmation failed"),
        }
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.config)
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}
