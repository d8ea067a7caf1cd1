use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use spdlog::{error, info};

use crate::mailer::composer::{ContactFields, EmailComposer};
use crate::mailer::{EmailRelay, RelayError};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub const CONTACT_REQUIRED: &str = "Name, email, and message are required.";
pub const CONTACT_FAILED: &str = "Failed to send email. Please try again.";
pub const CONTACT_SENT: &str = "Email sent successfully!";
pub const EMAIL_REQUIRED: &str = "Email address is required.";
pub const EMAIL_INVALID: &str = "Please enter a valid email address.";
pub const SUBSCRIBE_FAILED: &str = "Failed to subscribe. Please try again.";
pub const SUBSCRIBED: &str = "Successfully subscribed to newsletter!";
pub const INVALID_BODY: &str = "Invalid request body.";

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

// Budget arrives as a string from the form select, or as a plain number
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub budget: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsletterSubscription {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ContactReceipt {
    pub message: &'static str,
    pub id: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SubscriptionReceipt {
    pub message: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Bad or missing input. The message is safe to show to the user.
    #[error("{0}")]
    Invalid(&'static str),
    /// The email relay failed. `message` is the user-facing text.
    #[error("{message}: {source}")]
    Upstream {
        message: &'static str,
        #[source]
        source: RelayError,
    },
}

impl FormError {
    pub fn public_message(&self) -> &'static str {
        match self {
            FormError::Invalid(msg) => msg,
            FormError::Upstream { message, .. } => message,
        }
    }
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Validates a contact submission and relays one notification email to the
/// internal inbox.
pub async fn submit_contact(
    relay: &dyn EmailRelay,
    composer: &EmailComposer,
    form: &ContactSubmission) -> Result<ContactReceipt, FormError> {
    let (Some(name), Some(email), Some(message)) =
        (required(&form.name), required(&form.email), required(&form.message)) else {
        return Err(FormError::Invalid(CONTACT_REQUIRED));
    };

    let notification = composer.contact_notification(&ContactFields {
        name,
        email,
        message,
        company: form.company.as_deref(),
        phone: form.phone.as_deref(),
        budget: form.budget.as_deref(),
    });

    match relay.send(&notification).await {
        Ok(receipt) => {
            info!("Contact request from {} relayed, id={}", email, receipt.id);
            Ok(ContactReceipt {
                message: CONTACT_SENT,
                id: receipt.id,
            })
        }
        Err(e) => {
            error!("Error sending contact email from {}: {}", email, e);
            Err(FormError::Upstream {
                message: CONTACT_FAILED,
                source: e,
            })
        }
    }
}

/// Validates the address, then sends the welcome email followed by the
/// internal notification. Stops at the first relay failure.
pub async fn subscribe_newsletter(
    relay: &dyn EmailRelay,
    composer: &EmailComposer,
    form: &NewsletterSubscription) -> Result<SubscriptionReceipt, FormError> {
    let Some(email) = required(&form.email) else {
        return Err(FormError::Invalid(EMAIL_REQUIRED));
    };

    if !is_valid_email(email) {
        return Err(FormError::Invalid(EMAIL_INVALID));
    }

    let now = Utc::now();
    let emails = [
        composer.newsletter_welcome(email, now),
        composer.newsletter_notification(email, now),
    ];

    for outgoing in emails.iter() {
        if let Err(e) = relay.send(outgoing).await {
            error!("Error subscribing {} to the newsletter: {}", email, e);
            return Err(FormError::Upstream {
                message: SUBSCRIBE_FAILED,
                source: e,
            });
        }
    }

    info!("New newsletter subscription: {}", email);
    Ok(SubscriptionReceipt {
        message: SUBSCRIBED,
    })
}

#[cfg(test)]
mod tests {
    use crate::config::parse_config;
    use crate::mailer::memory::MemoryRelay;
    use crate::test_data::CONFIG_DATA;

    use super::*;

    fn composer() -> EmailComposer {
        let cfg = parse_config(CONFIG_DATA).unwrap();
        EmailComposer::new(&cfg.site).unwrap()
    }

    fn contact(name: &str, email: &str, message: &str) -> ContactSubmission {
        ContactSubmission {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane doe@example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_deserialize_contact() {
        let form: ContactSubmission = serde_json::from_str(
            r#"{"name": "Jane", "email": "jane@example.com", "message": "Hi", "budget": 50}"#).unwrap();
        assert_eq!(form.budget.as_deref(), Some("50"));
        assert!(form.company.is_none());

        let form: ContactSubmission = serde_json::from_str(r#"{"budget": "25", "phone": null}"#).unwrap();
        assert_eq!(form.budget.as_deref(), Some("25"));
        assert!(form.name.is_none());
    }

    #[tokio::test]
    async fn test_contact_success_sends_exactly_one_email() {
        let relay = MemoryRelay::default();
        let receipt = submit_contact(&relay, &composer(), &contact("Jane", "jane@example.com", "Hello")).await.unwrap();

        assert_eq!(receipt, ContactReceipt { message: CONTACT_SENT, id: "mem-1".to_string() });
        let sent = relay.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, ["inbox@grizzly-agency.com"]);
        assert_eq!(sent[0].subject, "New Contact Form Submission from Jane");
    }

    #[tokio::test]
    async fn test_contact_missing_fields() {
        let relay = MemoryRelay::default();
        let composer = composer();

        for form in [
            contact("", "jane@example.com", "Hello"),
            contact("Jane", "   ", "Hello"),
            contact("Jane", "jane@example.com", ""),
            ContactSubmission::default(),
        ] {
            let err = submit_contact(&relay, &composer, &form).await.err().unwrap();
            assert!(matches!(err, FormError::Invalid(CONTACT_REQUIRED)));
        }
        assert!(relay.sent().is_empty());
    }

    #[tokio::test]
    async fn test_contact_relay_failure() {
        let relay = MemoryRelay::failing();
        let err = submit_contact(&relay, &composer(), &contact("Jane", "jane@example.com", "Hello")).await.err().unwrap();
        assert!(matches!(err, FormError::Upstream { .. }));
        assert_eq!(err.public_message(), CONTACT_FAILED);
    }

    #[tokio::test]
    async fn test_newsletter_rejects_invalid_email() {
        let relay = MemoryRelay::default();
        let form = NewsletterSubscription { email: Some("not-an-email".to_string()) };
        let err = subscribe_newsletter(&relay, &composer(), &form).await.err().unwrap();
        assert_eq!(err.public_message(), EMAIL_INVALID);
        assert!(relay.sent().is_empty());

        let err = subscribe_newsletter(&relay, &composer(), &NewsletterSubscription::default()).await.err().unwrap();
        assert_eq!(err.public_message(), EMAIL_REQUIRED);
        assert!(relay.sent().is_empty());
    }

    #[tokio::test]
    async fn test_newsletter_sends_welcome_then_notification() {
        let relay = MemoryRelay::default();
        let form = NewsletterSubscription { email: Some(" sub@example.com ".to_string()) };
        let receipt = subscribe_newsletter(&relay, &composer(), &form).await.unwrap();
        assert_eq!(receipt.message, SUBSCRIBED);

        let sent = relay.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, ["sub@example.com"]);
        assert_eq!(sent[1].to, ["inbox@grizzly-agency.com"]);
    }

    #[tokio::test]
    async fn test_newsletter_relay_failure() {
        let relay = MemoryRelay::failing();
        let form = NewsletterSubscription { email: Some("sub@example.com".to_string()) };
        let err = subscribe_newsletter(&relay, &composer(), &form).await.err().unwrap();
        assert_eq!(err.public_message(), SUBSCRIBE_FAILED);
    }
}
