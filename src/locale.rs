use std::cmp::Ordering;
use std::fmt;
use std::fmt::Formatter;

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::Locales;

// Legacy path of the home page
const HOME_ALIAS: &str = "home";

lazy_static! {
    static ref LOCALE_SHAPE: Regex = Regex::new(r"^[a-z]{2}(-[a-zA-Z]{2})?$").unwrap();
}

/// Returns true when `token` looks like a locale code (`en`, `de`, `pt-BR`).
pub fn is_locale_shaped(token: &str) -> bool {
    LOCALE_SHAPE.is_match(token)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    pub fn code(&self) -> &str {
        self.0.as_str()
    }

    fn primary(&self) -> &str {
        primary_subtag(&self.0)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum LocaleConfigError {
    #[error("at least one locale must be supported")]
    Empty,
    #[error("'{0}' is not a valid locale code")]
    InvalidCode(String),
    #[error("locale '{0}' is listed more than once")]
    Duplicate(String),
    #[error("default locale '{0}' is not in the supported set")]
    DefaultNotSupported(String),
}

/// Ordered set of supported locales with one designated default.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    supported: Vec<Locale>,
    default_index: usize,
    detect_from_browser: bool,
    exempt_prefixes: Vec<String>,
}

impl LocaleConfig {
    pub fn new<S: AsRef<str>>(supported: &[S], default: &str) -> Result<Self, LocaleConfigError> {
        if supported.is_empty() {
            return Err(LocaleConfigError::Empty);
        }

        let mut locales: Vec<Locale> = Vec::with_capacity(supported.len());
        for code in supported {
            let code = code.as_ref();
            if !is_locale_shaped(code) {
                return Err(LocaleConfigError::InvalidCode(code.to_string()));
            }
            if locales.iter().any(|l| l.code() == code) {
                return Err(LocaleConfigError::Duplicate(code.to_string()));
            }
            locales.push(Locale(code.to_string()));
        }

        let default_index = locales.iter()
            .position(|l| l.code() == default)
            .ok_or_else(|| LocaleConfigError::DefaultNotSupported(default.to_string()))?;

        Ok(LocaleConfig {
            supported: locales,
            default_index,
            detect_from_browser: false,
            exempt_prefixes: vec![],
        })
    }

    pub fn from_config(cfg: &Locales) -> Result<Self, LocaleConfigError> {
        Ok(Self::new(cfg.supported.as_slice(), &cfg.default)?
            .with_browser_detection(cfg.detect_from_browser)
            .with_exempt_prefixes(cfg.exempt_prefixes.clone()))
    }

    pub fn with_browser_detection(mut self, enabled: bool) -> Self {
        self.detect_from_browser = enabled;
        self
    }

    pub fn with_exempt_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.exempt_prefixes = prefixes.into_iter()
            .map(|p| p.trim_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        self
    }

    pub fn supported(&self) -> &[Locale] {
        &self.supported
    }

    pub fn default_locale(&self) -> &Locale {
        &self.supported[self.default_index]
    }

    pub fn find(&self, code: &str) -> Option<&Locale> {
        self.supported.iter().find(|l| l.code() == code)
    }

    fn find_ignore_case(&self, code: &str) -> Option<&Locale> {
        self.supported.iter().find(|l| l.code().eq_ignore_ascii_case(code))
    }

    /// Picks the first supported locale from an `Accept-Language` value.
    ///
    /// Tags are tried by weight; a tag matches a supported locale by full code
    /// first, then by primary subtag (`de-AT` matches `de`).
    pub fn negotiate(&self, accept_language: &str) -> Option<&Locale> {
        for tag in parse_accept_language(accept_language) {
            let exact = self.supported.iter().find(|l| l.code().eq_ignore_ascii_case(&tag));
            if exact.is_some() {
                return exact;
            }

            let primary = primary_subtag(&tag);
            let partial = self.supported.iter().find(|l| l.primary().eq_ignore_ascii_case(primary));
            if partial.is_some() {
                return partial;
            }
        }
        None
    }
}

/// Language tags from an `Accept-Language` header, most preferred first.
///
/// Tags with `q=0` and the `*` wildcard are dropped. Equal weights keep the
/// header order.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut tags: Vec<(String, f32)> = header.split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }

            let mut weight = 1.0f32;
            for param in pieces {
                if let Some(q) = param.trim().strip_prefix("q=") {
                    weight = q.trim().parse().unwrap_or(0.0);
                }
            }

            if weight > 0.0 {
                Some((tag.to_string(), weight))
            } else {
                None
            }
        })
        .collect();

    tags.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    tags.into_iter().map(|(tag, _)| tag).collect()
}

/// Outcome of running a request path through the [`LocaleResolver`].
#[derive(Debug, Clone, PartialEq)]
pub enum RouteDecision {
    /// Asset, api or file path. Locale logic does not apply.
    Exempt,
    /// Path already carries a supported locale.
    PassThrough(Locale),
    /// Path lacks a locale prefix. Holds the redirect location.
    Redirect(String),
    /// Non-canonical spelling of a page (trailing slash, upper-case locale,
    /// legacy alias). Holds the canonical location.
    PermanentRedirect(String),
    /// Leading segment is locale-shaped but not supported.
    NotFound,
}

pub struct LocaleResolver {
    config: LocaleConfig,
}

impl LocaleResolver {
    pub fn new(config: LocaleConfig) -> Self {
        LocaleResolver {
            config,
        }
    }

    pub fn config(&self) -> &LocaleConfig {
        &self.config
    }

    fn is_exempt(&self, path: &str, first_segment: &str) -> bool {
        if path.contains('.') {
            return true;
        }
        self.config.exempt_prefixes.iter().any(|p| p == first_segment)
    }

    pub fn resolve(&self, path: &str, query: Option<&str>, accept_language: Option<&str>) -> RouteDecision {
        let trimmed = path.trim_start_matches('/');
        let first_segment = trimmed.split('/').next().unwrap_or("");

        if self.is_exempt(path, first_segment) {
            return RouteDecision::Exempt;
        }

        let canonical = trimmed.trim_end_matches('/');
        if canonical.is_empty() {
            let location = format!("/{}", self.config.default_locale());
            return RouteDecision::Redirect(with_query(location, query));
        }

        if canonical == HOME_ALIAS {
            let location = format!("/{}", self.config.default_locale());
            return RouteDecision::PermanentRedirect(with_query(location, query));
        }

        let (segment, rest) = match canonical.split_once('/') {
            Some((segment, rest)) => (segment, Some(rest)),
            None => (canonical, None),
        };

        if let Some(locale) = self.config.find(segment) {
            if canonical.len() == trimmed.len() {
                return RouteDecision::PassThrough(locale.clone());
            }
            let location = format!("/{}", canonical);
            return RouteDecision::PermanentRedirect(with_query(location, query));
        }

        if let Some(locale) = self.config.find_ignore_case(segment) {
            let location = match rest {
                Some(rest) => format!("/{}/{}", locale, rest),
                None => format!("/{}", locale),
            };
            return RouteDecision::PermanentRedirect(with_query(location, query));
        }

        if is_locale_shaped(&segment.to_ascii_lowercase()) {
            return RouteDecision::NotFound;
        }

        let locale = self.preferred_locale(accept_language);
        let location = format!("/{}/{}", locale, canonical);
        RouteDecision::Redirect(with_query(location, query))
    }

    fn preferred_locale(&self, accept_language: Option<&str>) -> &Locale {
        if self.config.detect_from_browser {
            if let Some(locale) = accept_language.and_then(|h| self.config.negotiate(h)) {
                return locale;
            }
        }
        self.config.default_locale()
    }
}

fn with_query(location: String, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{}?{}", location, q),
        _ => location,
    }
}

/// Same path with the leading locale segment replaced by `locale`.
pub fn switch_locale_path(path: &str, locale: &Locale) -> String {
    let trimmed = path.trim_start_matches('/');
    match trimmed.split_once('/') {
        Some((_, rest)) => format!("/{}/{}", locale, rest),
        None => format!("/{}", locale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(detect: bool) -> LocaleResolver {
        let config = LocaleConfig::new(&["en", "de"], "en").unwrap()
            .with_browser_detection(detect)
            .with_exempt_prefixes(vec!["api".to_string(), "/public/".to_string(), "_assets".to_string()]);
        LocaleResolver::new(config)
    }

    #[test]
    fn test_supported_locales_pass_through() {
        let r = resolver(true);
        for locale in r.config().supported() {
            let path = format!("/{}", locale);
            assert_eq!(r.resolve(&path, None, None), RouteDecision::PassThrough(locale.clone()));
        }
        assert_eq!(r.resolve("/de/blog/some-post", None, Some("en")),
                   RouteDecision::PassThrough(Locale("de".to_string())));
    }

    #[test]
    fn test_root_redirects_to_default() {
        let r = resolver(true);
        assert_eq!(r.resolve("/", None, None), RouteDecision::Redirect("/en".to_string()));
        // Browser preference is ignored for the root
        assert_eq!(r.resolve("/", None, Some("de")), RouteDecision::Redirect("/en".to_string()));
        assert_eq!(r.resolve("", None, None), RouteDecision::Redirect("/en".to_string()));
        assert_eq!(r.resolve("/", Some("ref=x"), None), RouteDecision::Redirect("/en?ref=x".to_string()));
    }

    #[test]
    fn test_unsupported_locale_is_not_found() {
        let r = resolver(true);
        assert_eq!(r.resolve("/fr", None, None), RouteDecision::NotFound);
        assert_eq!(r.resolve("/fr/about", None, Some("fr")), RouteDecision::NotFound);
        assert_eq!(r.resolve("/pt-BR/blog", None, None), RouteDecision::NotFound);
    }

    #[test]
    fn test_unprefixed_path_redirects() {
        let r = resolver(true);
        assert_eq!(r.resolve("/about", None, None), RouteDecision::Redirect("/en/about".to_string()));
        assert_eq!(r.resolve("/blog/post-a", Some("page=2"), Some("de-DE,de;q=0.9,en;q=0.8")),
                   RouteDecision::Redirect("/de/blog/post-a?page=2".to_string()));
        assert_eq!(r.resolve("/work", None, Some("fr-FR, fr;q=0.9")),
                   RouteDecision::Redirect("/en/work".to_string()));
    }

    #[test]
    fn test_trailing_slash_is_canonicalized() {
        let r = resolver(true);
        assert_eq!(r.resolve("/en/", None, None), RouteDecision::PermanentRedirect("/en".to_string()));
        assert_eq!(r.resolve("/en/about/", None, None), RouteDecision::PermanentRedirect("/en/about".to_string()));
        assert_eq!(r.resolve("/de/blog/post-b//", Some("x=1"), None),
                   RouteDecision::PermanentRedirect("/de/blog/post-b?x=1".to_string()));
        assert_eq!(r.resolve("/about/", None, None), RouteDecision::Redirect("/en/about".to_string()));
        assert_eq!(r.resolve("/blog/post-a/", None, Some("de")), RouteDecision::Redirect("/de/blog/post-a".to_string()));
        assert_eq!(r.resolve("/fr/", None, None), RouteDecision::NotFound);
    }

    #[test]
    fn test_home_alias_moves_to_default_locale() {
        let r = resolver(true);
        assert_eq!(r.resolve("/home", None, Some("de")), RouteDecision::PermanentRedirect("/en".to_string()));
        assert_eq!(r.resolve("/home/", Some("ref=x"), None), RouteDecision::PermanentRedirect("/en?ref=x".to_string()));
        // Only the top-level alias
        assert_eq!(r.resolve("/en/home", None, None), RouteDecision::PassThrough(Locale("en".to_string())));
    }

    #[test]
    fn test_locale_case_is_canonicalized() {
        let r = resolver(true);
        assert_eq!(r.resolve("/EN/about", None, None), RouteDecision::PermanentRedirect("/en/about".to_string()));
        assert_eq!(r.resolve("/De", None, None), RouteDecision::PermanentRedirect("/de".to_string()));
        assert_eq!(r.resolve("/DE/blog/", None, None), RouteDecision::PermanentRedirect("/de/blog".to_string()));
        assert_eq!(r.resolve("/FR/about", None, None), RouteDecision::NotFound);
    }

    #[test]
    fn test_browser_detection_disabled() {
        let r = resolver(false);
        assert_eq!(r.resolve("/about", None, Some("de")), RouteDecision::Redirect("/en/about".to_string()));
    }

    #[test]
    fn test_exempt_paths() {
        let r = resolver(true);
        assert_eq!(r.resolve("/api/contact", None, None), RouteDecision::Exempt);
        assert_eq!(r.resolve("/public/logo", None, None), RouteDecision::Exempt);
        assert_eq!(r.resolve("/_assets/app", None, None), RouteDecision::Exempt);
        assert_eq!(r.resolve("/favicon.ico", None, None), RouteDecision::Exempt);
        assert_eq!(r.resolve("/en/robots.txt", None, None), RouteDecision::Exempt);
        // Prefix match is on the whole segment
        assert_eq!(r.resolve("/apiary", None, None), RouteDecision::Redirect("/en/apiary".to_string()));
    }

    #[test]
    fn test_invalid_config() {
        assert_eq!(LocaleConfig::new::<&str>(&[], "en").err(), Some(LocaleConfigError::Empty));
        assert_eq!(LocaleConfig::new(&["en", "de"], "fr").err(),
                   Some(LocaleConfigError::DefaultNotSupported("fr".to_string())));
        assert_eq!(LocaleConfig::new(&["en", "en"], "en").err(),
                   Some(LocaleConfigError::Duplicate("en".to_string())));
        assert_eq!(LocaleConfig::new(&["english"], "english").err(),
                   Some(LocaleConfigError::InvalidCode("english".to_string())));
    }

    #[test]
    fn test_parse_accept_language() {
        assert_eq!(parse_accept_language("de-DE,de;q=0.9,en;q=0.8"), ["de-DE", "de", "en"]);
        assert_eq!(parse_accept_language("en;q=0.5, fr, *;q=0.1"), ["fr", "en"]);
        assert_eq!(parse_accept_language("de;q=0, en"), ["en"]);
        assert!(parse_accept_language("").is_empty());
    }

    #[test]
    fn test_negotiate() {
        let config = LocaleConfig::new(&["en", "de"], "en").unwrap();
        assert_eq!(config.negotiate("de-AT").map(Locale::code), Some("de"));
        assert_eq!(config.negotiate("fr, EN-gb;q=0.7").map(Locale::code), Some("en"));
        assert_eq!(config.negotiate("fr, it"), None);
    }

    #[test]
    fn test_switch_locale_path() {
        let de = Locale("de".to_string());
        assert_eq!(switch_locale_path("/en/blog/post-a", &de), "/de/blog/post-a");
        assert_eq!(switch_locale_path("/en", &de), "/de");
        assert_eq!(switch_locale_path("/", &de), "/de");
    }
}
