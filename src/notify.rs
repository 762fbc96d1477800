use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use url::Url;

use crate::render::Attachment;
use crate::revision::CompareLink;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook rejected the message with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// What the headline links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    PullRequest { url: String, title: String },
    Compare(CompareLink),
}

impl Source {
    pub fn headline(&self) -> String {
        match self {
            Source::PullRequest { url, title } => format!("Schema update on <{url}|`{title}`>"),
            Source::Compare(link) => format!("Schema update on <{}|`{}`>", link.url, link.head),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl Payload {
    pub fn new(source: &Source, attachments: Vec<Attachment>, bot_name: Option<String>) -> Self {
        Self {
            username: bot_name,
            text: source.headline(),
            attachments,
        }
    }
}

/// Outcome of a delivery the receiver accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub status: StatusCode,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, payload: &Payload) -> Result<Delivered, DeliveryError>;
}

/// Posts payloads to a chat incoming webhook.
#[derive(Debug, Clone)]
pub struct Webhook {
    client: reqwest::Client,
    url: Url,
}

impl Webhook {
    pub fn new(url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl Notifier for Webhook {
    async fn send(&self, payload: &Payload) -> Result<Delivered, DeliveryError> {
        tracing::info!(
            host = self.url.host_str().unwrap_or_default(),
            port = self.url.port_or_known_default(),
            attachments = payload.attachments.len(),
            "submitting to webhook"
        );

        let resp = self
            .client
            .post(self.url.clone())
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "could not read webhook response body");
                String::new()
            }
        };
        tracing::info!(status = status.as_u16(), "webhook responded");
        if !body.is_empty() {
            tracing::info!(response = %body, "webhook response body");
        }

        if !status.is_success() {
            return Err(DeliveryError::Rejected { status, body });
        }
        Ok(Delivered { status })
    }
}

#[cfg(test)]
mod tests;
