use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use spdlog::debug;

use crate::config::Email;
use crate::mailer::{DeliveryReceipt, EmailRelay, OutgoingEmail, RelayError};

/// [`EmailRelay`] backed by the Resend HTTP API.
pub struct ResendRelay {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

fn emails_endpoint(api_base: &str) -> String {
    format!("{}/emails", api_base.trim_end_matches('/'))
}

impl ResendRelay {
    pub fn new(api_base: &str, api_key: Option<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(ResendRelay {
            client,
            endpoint: emails_endpoint(api_base),
            api_key,
        })
    }

    pub fn from_config(email: &Email) -> reqwest::Result<Self> {
        Self::new(
            email.api_base(),
            email.resolve_api_key(),
            Duration::from_secs(email.timeout_secs()),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl EmailRelay for ResendRelay {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, RelayError> {
        let Some(ref api_key) = self.api_key else {
            return Err(RelayError::NotConfigured("missing API key"));
        };

        let response = self.client.post(&self.endpoint)
            .bearer_auth(api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let SendResponse { id } = response.json().await?;
        debug!("Email '{}' accepted by provider, id={}", email.subject, id);
        Ok(DeliveryReceipt { id })
    }
}
