use std::collections::HashMap;
use std::io;
use std::io::ErrorKind;

use serde::Deserialize;

use crate::locale::Locale;

const FALLBACK_CODE: &str = "en";

const BUNDLES: [(&str, &str); 2] = [
    ("en", include_str!("../../res/i18n/en.toml")),
    ("de", include_str!("../../res/i18n/de.toml")),
];

/// A bare string in the bundle, exposed to templates as `{{text}}`.
#[derive(Debug, Clone, Deserialize, ramhorns::Content)]
#[serde(transparent)]
pub struct Text {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, ramhorns::Content)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize, ramhorns::Content)]
pub struct NavMessages {
    pub home: String,
    pub about: String,
    pub work: String,
    pub blog: String,
    pub contact: String,
    pub language: String,
}

#[derive(Debug, Clone, Deserialize, ramhorns::Content)]
pub struct FooterMessages {
    pub tagline: String,
    pub newsletter_title: String,
    pub newsletter_description: String,
    pub newsletter_placeholder: String,
    pub newsletter_button: String,
}

#[derive(Debug, Clone, Deserialize, ramhorns::Content)]
pub struct HomeMessages {
    pub title: String,
    pub description: String,
    pub hero_title: String,
    pub hero_description: String,
    pub featured_title: String,
    pub latest_title: String,
    pub view_all_work: String,
    pub view_all_posts: String,
}

#[derive(Debug, Clone, Deserialize, ramhorns::Content)]
pub struct AboutMessages {
    pub title: String,
    pub description: String,
    pub eyebrow: String,
    pub heading: String,
    pub paragraphs: Vec<Text>,
    #[serde(default)]
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, Deserialize, ramhorns::Content)]
pub struct WorkMessages {
    pub title: String,
    pub description: String,
    pub eyebrow: String,
    pub heading: String,
    pub intro: String,
    pub all_categories: String,
    pub visit_site: String,
    pub empty: String,
}

#[derive(Debug, Clone, Deserialize, ramhorns::Content)]
pub struct BlogMessages {
    pub title: String,
    pub description: String,
    pub eyebrow: String,
    pub heading: String,
    pub intro: String,
    pub all_categories: String,
    pub read_more: String,
    pub related_title: String,
    pub back_to_blog: String,
    pub empty: String,
}

#[derive(Debug, Clone, Deserialize, ramhorns::Content)]
pub struct ContactMessages {
    pub title: String,
    pub description: String,
    pub eyebrow: String,
    pub heading: String,
    pub intro: String,
    pub points: Vec<Text>,
    pub form_title: String,
    pub name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
    pub budget: String,
    pub message: String,
    pub submit: String,
}

#[derive(Debug, Clone, Deserialize, ramhorns::Content)]
pub struct NotFoundMessages {
    pub title: String,
    pub heading: String,
    pub text: String,
    pub back_home: String,
}

/// UI strings of one language.
#[derive(Debug, Clone, Deserialize)]
pub struct Messages {
    pub nav: NavMessages,
    pub footer: FooterMessages,
    pub home: HomeMessages,
    pub about: AboutMessages,
    pub work: WorkMessages,
    pub blog: BlogMessages,
    pub contact: ContactMessages,
    pub not_found: NotFoundMessages,
}

/// Built-in message bundles, keyed by language code.
pub struct MessageCatalog {
    bundles: HashMap<String, Messages>,
    fallback: String,
}

impl MessageCatalog {
    /// Parses the embedded bundles. Locales without a bundle of their own use
    /// the default locale's, or English when the default has none either.
    pub fn new(default_locale: &Locale) -> io::Result<Self> {
        let mut bundles = HashMap::with_capacity(BUNDLES.len());
        for (code, src) in BUNDLES {
            let messages: Messages = toml::from_str(src)
                .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("Error parsing '{}' messages: {}", code, e)))?;
            bundles.insert(code.to_string(), messages);
        }

        let fallback = [default_locale.code(), primary_subtag(default_locale.code())]
            .into_iter()
            .find(|code| bundles.contains_key(*code))
            .unwrap_or(FALLBACK_CODE)
            .to_string();

        Ok(MessageCatalog { bundles, fallback })
    }

    pub fn has_bundle(&self, code: &str) -> bool {
        self.bundles.contains_key(code)
    }

    pub fn for_locale(&self, locale: &Locale) -> &Messages {
        self.bundles.get(locale.code())
            .or_else(|| self.bundles.get(primary_subtag(locale.code())))
            .unwrap_or_else(|| &self.bundles[&self.fallback])
    }
}

fn primary_subtag(code: &str) -> &str {
    code.split('-').next().unwrap_or(code)
}
