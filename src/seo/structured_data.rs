use serde_json::{json, Value};

use crate::config::Site;
use crate::content::ContentRecord;
use crate::locale::Locale;
use crate::text_utils::format_iso_date;

const SCHEMA_CONTEXT: &str = "https://schema.org";
const BLOG_POSTING_LIMIT: usize = 10;

fn absolute(site: &Site, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}/{}", site.url(), path.trim_start_matches('/'))
    }
}

pub fn organization(site: &Site) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Organization",
        "name": site.name,
        "description": site.description,
        "url": site.url(),
        "logo": absolute(site, &site.logo),
        "sameAs": site.same_as,
    })
}

pub fn website(site: &Site, locale: &Locale) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "WebSite",
        "name": site.name,
        "url": format!("{}/{}", site.url(), locale),
        "inLanguage": locale.code(),
        "publisher": {
            "@type": "Organization",
            "name": site.name,
        },
    })
}

pub fn article(site: &Site, locale: &Locale, post: &ContentRecord) -> Value {
    let url = format!("{}/{}/blog/{}", site.url(), locale, post.slug);
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Article",
        "headline": post.title,
        "description": post.excerpt,
        "image": {
            "@type": "ImageObject",
            "url": absolute(site, &post.image),
            "width": 1200,
            "height": 630,
        },
        "author": {
            "@type": "Person",
            "name": post.author,
            "url": format!("{}/{}/about", site.url(), locale),
        },
        "publisher": {
            "@type": "Organization",
            "name": site.name,
            "logo": {
                "@type": "ImageObject",
                "url": absolute(site, &site.logo),
            },
        },
        "datePublished": format_iso_date(post.date()),
        "mainEntityOfPage": {
            "@type": "WebPage",
            "@id": url,
        },
        "articleSection": post.category,
        "keywords": post.tags.join(", "),
        "inLanguage": locale.code(),
    })
}

/// Blog index with its newest postings, at most ten.
pub fn blog(site: &Site, locale: &Locale, name: &str, description: &str, posts: &[&ContentRecord]) -> Value {
    let postings: Vec<Value> = posts.iter()
        .take(BLOG_POSTING_LIMIT)
        .map(|post| json!({
            "@type": "BlogPosting",
            "headline": post.title,
            "description": post.excerpt,
            "url": format!("{}/{}/blog/{}", site.url(), locale, post.slug),
            "datePublished": format_iso_date(post.date()),
            "author": {
                "@type": "Person",
                "name": post.author,
            },
            "image": {
                "@type": "ImageObject",
                "url": absolute(site, &post.image),
            },
            "articleSection": post.category,
            "keywords": post.tags.join(", "),
        }))
        .collect();

    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Blog",
        "name": name,
        "description": description,
        "url": format!("{}/{}/blog", site.url(), locale),
        "inLanguage": locale.code(),
        "publisher": {
            "@type": "Organization",
            "name": site.name,
            "url": site.url(),
            "logo": {
                "@type": "ImageObject",
                "url": absolute(site, &site.logo),
            },
        },
        "blogPost": postings,
    })
}

/// `trail` holds (name, site-relative path) pairs from the root down.
pub fn breadcrumbs(site: &Site, trail: &[(&str, String)]) -> Value {
    let items: Vec<Value> = trail.iter()
        .enumerate()
        .map(|(i, (name, path))| json!({
            "@type": "ListItem",
            "position": i + 1,
            "name": name,
            "item": absolute(site, path),
        }))
        .collect();

    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "BreadcrumbList",
        "itemListElement": items,
    })
}

/// Serializes values for a `<script type="application/ld+json">` block.
///
/// `</` is escaped so text fields cannot close the script element.
pub fn to_json_ld(values: &[Value]) -> String {
    let json = match values {
        [single] => single.to_string(),
        many => Value::Array(many.to_vec()).to_string(),
    };
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use crate::config::parse_config;
    use crate::locale::LocaleConfig;
    use crate::test_data::{record, CONFIG_DATA};

    use super::*;

    fn site() -> Site {
        parse_config(CONFIG_DATA).unwrap().site
    }

    fn de() -> Locale {
        LocaleConfig::new(&["en", "de"], "en").unwrap().find("de").unwrap().clone()
    }

    #[test]
    fn test_organization() {
        let org = organization(&site());
        assert_eq!(org["@type"], "Organization");
        assert_eq!(org["url"], "https://grizzly-agency.com");
        assert_eq!(org["logo"], "https://grizzly-agency.com/public/agency.png");
    }

    #[test]
    fn test_article() {
        let mut post = record("post-a", "2025-01-15", "DevOps");
        post.tags = vec!["CI/CD".to_string(), "Docker".to_string()];
        post.image = "https://images.example.com/a.png".to_string();

        let value = article(&site(), &de(), &post);
        assert_eq!(value["@type"], "Article");
        assert_eq!(value["headline"], "Title of post-a");
        assert_eq!(value["datePublished"], "2025-01-15");
        assert_eq!(value["image"]["url"], "https://images.example.com/a.png");
        assert_eq!(value["mainEntityOfPage"]["@id"], "https://grizzly-agency.com/de/blog/post-a");
        assert_eq!(value["keywords"], "CI/CD, Docker");
        assert_eq!(value["inLanguage"], "de");
    }

    #[test]
    fn test_blog_lists_at_most_ten_postings() {
        let posts: Vec<ContentRecord> = (1..=12)
            .map(|i| record(&format!("post-{}", i), "2025-01-15", "Web Development"))
            .collect();
        let refs: Vec<&ContentRecord> = posts.iter().collect();

        let value = blog(&site(), &de(), "Blog", "Insights", &refs);
        assert_eq!(value["@type"], "Blog");
        assert_eq!(value["url"], "https://grizzly-agency.com/de/blog");
        let postings = value["blogPost"].as_array().unwrap();
        assert_eq!(postings.len(), 10);
        assert_eq!(postings[0]["@type"], "BlogPosting");
        assert_eq!(postings[0]["url"], "https://grizzly-agency.com/de/blog/post-1");
        assert_eq!(postings[0]["datePublished"], "2025-01-15");

        let value = blog(&site(), &de(), "Blog", "Insights", &[]);
        assert!(value["blogPost"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_breadcrumbs() {
        let trail = [("Home", "/de".to_string()), ("Blog", "/de/blog".to_string())];
        let value = breadcrumbs(&site(), &trail);
        let items = value["itemListElement"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["position"], 2);
        assert_eq!(items[1]["item"], "https://grizzly-agency.com/de/blog");
    }

    #[test]
    fn test_to_json_ld_escapes_script_end() {
        let value = json!({"name": "</script><b>"});
        let out = to_json_ld(&[value]);
        assert!(!out.contains("</script>"));
        assert!(out.contains("<\\/script>"));

        let out = to_json_ld(&[json!({"a": 1}), json!({"b": 2})]);
        assert!(out.starts_with('['));
    }
}
