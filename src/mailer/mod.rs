use async_trait::async_trait;
use serde::Serialize;

pub mod composer;
pub mod resend;

/// Message handed to the email provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReceipt {
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Email provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Email provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Email relay is not configured: {0}")]
    NotConfigured(&'static str),
}

/// Delivers one email per call. No retries, failures go straight back to
/// the caller.
#[async_trait]
pub trait EmailRelay: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, RelayError>;
}
