use std::io;

use chrono::{DateTime, Datelike, Utc};
use ramhorns::Template;

use crate::config::Site;
use crate::mailer::OutgoingEmail;
use crate::view::parse_template;

const CONTACT_NOTIFICATION_TPL: &str = include_str!("../../res/email/contact_notification.tpl");
const NEWSLETTER_WELCOME_TPL: &str = include_str!("../../res/email/newsletter_welcome.tpl");
const NEWSLETTER_NOTIFICATION_TPL: &str = include_str!("../../res/email/newsletter_notification.tpl");

/// Contact form values, already validated.
pub struct ContactFields<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
    pub company: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub budget: Option<&'a str>,
}

#[derive(ramhorns::Content)]
struct ContactView<'a> {
    site_name: &'a str,
    name: &'a str,
    email: &'a str,
    message: &'a str,
    has_company: bool,
    company: &'a str,
    has_phone: bool,
    phone: &'a str,
    has_budget: bool,
    budget: &'a str,
}

#[derive(ramhorns::Content)]
struct WelcomeView<'a> {
    site_name: &'a str,
    site_url: &'a str,
    year: i32,
}

#[derive(ramhorns::Content)]
struct SubscriptionView<'a> {
    site_name: &'a str,
    email: &'a str,
    subscribed_at: String,
}

/// Builds the outgoing emails of the contact and newsletter forms.
///
/// User input is HTML-escaped by the templates.
pub struct EmailComposer {
    site_name: String,
    site_url: String,
    inbox: String,
    contact_sender: String,
    newsletter_sender: String,
    contact_notification: Template<'static>,
    newsletter_welcome: Template<'static>,
    newsletter_notification: Template<'static>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl EmailComposer {
    pub fn new(site: &Site) -> io::Result<Self> {
        Ok(EmailComposer {
            site_name: site.name.clone(),
            site_url: site.url().to_string(),
            inbox: site.contact_inbox.clone(),
            contact_sender: site.contact_sender.clone(),
            newsletter_sender: site.newsletter_sender.clone(),
            contact_notification: parse_template(CONTACT_NOTIFICATION_TPL, "contact notification")?,
            newsletter_welcome: parse_template(NEWSLETTER_WELCOME_TPL, "newsletter welcome")?,
            newsletter_notification: parse_template(NEWSLETTER_NOTIFICATION_TPL, "newsletter notification")?,
        })
    }

    pub fn contact_notification(&self, fields: &ContactFields) -> OutgoingEmail {
        let company = non_empty(fields.company);
        let phone = non_empty(fields.phone);
        let budget = non_empty(fields.budget);

        let html = self.contact_notification.render(&ContactView {
            site_name: &self.site_name,
            name: fields.name,
            email: fields.email,
            message: fields.message,
            has_company: company.is_some(),
            company: company.unwrap_or_default(),
            has_phone: phone.is_some(),
            phone: phone.unwrap_or_default(),
            has_budget: budget.is_some(),
            budget: budget.unwrap_or_default(),
        });

        OutgoingEmail {
            from: self.contact_sender.clone(),
            to: vec![self.inbox.clone()],
            subject: format!("New Contact Form Submission from {}", fields.name),
            html,
        }
    }

    pub fn newsletter_welcome(&self, subscriber: &str, now: DateTime<Utc>) -> OutgoingEmail {
        let html = self.newsletter_welcome.render(&WelcomeView {
            site_name: &self.site_name,
            site_url: &self.site_url,
            year: now.year(),
        });

        OutgoingEmail {
            from: self.newsletter_sender.clone(),
            to: vec![subscriber.to_string()],
            subject: format!("Welcome to {} Newsletter!", self.site_name),
            html,
        }
    }

    pub fn newsletter_notification(&self, subscriber: &str, now: DateTime<Utc>) -> OutgoingEmail {
        let html = self.newsletter_notification.render(&SubscriptionView {
            site_name: &self.site_name,
            email: subscriber,
            subscribed_at: now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        });

        OutgoingEmail {
            from: self.newsletter_sender.clone(),
            to: vec![self.inbox.clone()],
            subject: "New Newsletter Subscription".to_string(),
            html,
        }
    }
}
