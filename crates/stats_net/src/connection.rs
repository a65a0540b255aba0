//! NATS connection management.
//!
//! A thin wrapper around `async-nats` that speaks the MessagePack codec.

use async_nats::Message;
use serde::Serialize;
use tracing::info;

use crate::codec;
use crate::error::NetError;

/// Default NATS server URL.
pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// The environment variable used to override the NATS URL.
pub const NATS_URL_ENV: &str = "NATS_URL";

/// The NATS URL to use when none is given explicitly.
#[must_use]
pub fn default_url() -> String {
    std::env::var(NATS_URL_ENV).unwrap_or_else(|_| DEFAULT_NATS_URL.to_string())
}

/// An `async-nats` client with codec-aware helpers.
#[derive(Debug, Clone)]
pub struct NatsConnection {
    client: async_nats::Client,
}

impl NatsConnection {
    /// Connect using `NATS_URL`, falling back to [`DEFAULT_NATS_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Connect`] if the connection cannot be established.
    pub async fn connect() -> Result<Self, NetError> {
        Self::connect_to(&default_url()).await
    }

    /// Connect to NATS at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Connect`] if the connection cannot be established.
    pub async fn connect_to(url: &str) -> Result<Self, NetError> {
        info!(url, "connecting to NATS");
        let client = async_nats::connect(url).await?;
        info!("NATS connection established");
        Ok(Self { client })
    }

    #[must_use]
    pub fn client(&self) -> &async_nats::Client {
        &self.client
    }

    /// Publish a MessagePack-encoded message.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if encoding or publishing fails.
    pub async fn publish<T: Serialize>(&self, subject: &str, message: &T) -> Result<(), NetError> {
        let payload = codec::encode(message)?;
        self.client
            .publish(subject.to_string(), payload.into())
            .await?;
        Ok(())
    }

    /// Answer a request message.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::NoReplySubject`] if `request` carries no reply
    /// subject, or any publish error.
    pub async fn reply<T: Serialize>(&self, request: &Message, message: &T) -> Result<(), NetError> {
        let reply_to = request
            .reply
            .as_ref()
            .ok_or_else(|| NetError::NoReplySubject(request.subject.to_string()))?;
        self.publish(reply_to.as_str(), message).await
    }

    /// Subscribe to a subject.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Subscribe`] if the subscription fails.
    pub async fn subscribe(&self, subject: &str) -> Result<async_nats::Subscriber, NetError> {
        let sub = self.client.subscribe(subject.to_string()).await?;
        Ok(sub)
    }
}
