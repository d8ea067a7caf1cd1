use std::io::Cursor;

use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::content::repository::ContentRepository;
use crate::locale::Locale;
use crate::text_utils::format_iso_date;

/* Example
<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://grizzly-agency.com/en/blog/devops-best-practices</loc>
    <lastmod>2024-01-22</lastmod>
    <changefreq>weekly</changefreq>
    <priority>0.6</priority>
  </url>
</urlset>
*/

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: NaiveDate,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

struct StaticPage {
    path: &'static str,
    change_frequency: ChangeFrequency,
    priority: f32,
}

const STATIC_PAGES: [StaticPage; 5] = [
    StaticPage { path: "", change_frequency: ChangeFrequency::Weekly, priority: 1.0 },
    StaticPage { path: "/about", change_frequency: ChangeFrequency::Monthly, priority: 0.8 },
    StaticPage { path: "/work", change_frequency: ChangeFrequency::Weekly, priority: 0.9 },
    StaticPage { path: "/blog", change_frequency: ChangeFrequency::Daily, priority: 0.8 },
    StaticPage { path: "/contact", change_frequency: ChangeFrequency::Monthly, priority: 0.6 },
];

const POST_CHANGE_FREQUENCY: ChangeFrequency = ChangeFrequency::Weekly;
const POST_PRIORITY: f32 = 0.6;

/// Static pages first, then one entry per blog post, each for every locale.
///
/// Static pages are stamped with `today`, posts with their own date.
pub fn build_sitemap(base_url: &str, locales: &[Locale], posts: &ContentRepository, today: NaiveDate) -> Vec<SitemapEntry> {
    let base_url = base_url.trim_end_matches('/');
    let mut entries = Vec::with_capacity(locales.len() * (STATIC_PAGES.len() + posts.len()));

    for page in STATIC_PAGES.iter() {
        for locale in locales {
            entries.push(SitemapEntry {
                url: format!("{}/{}{}", base_url, locale, page.path),
                last_modified: today,
                change_frequency: page.change_frequency,
                priority: page.priority,
            });
        }
    }

    for post in posts.get_all() {
        for locale in locales {
            entries.push(SitemapEntry {
                url: format!("{}/{}/blog/{}", base_url, locale, post.slug),
                last_modified: post.date(),
                change_frequency: POST_CHANGE_FREQUENCY,
                priority: POST_PRIORITY,
            });
        }
    }

    entries
}

pub fn render_sitemap(entries: &[SitemapEntry]) -> quick_xml::Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(urlset))?;

    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        push_text(&mut writer, "loc", &entry.url)?;
        push_text(&mut writer, "lastmod", &format_iso_date(entry.last_modified))?;
        push_text(&mut writer, "changefreq", entry.change_frequency.as_str())?;
        push_text(&mut writer, "priority", &format!("{:.1}", entry.priority))?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    Ok(writer.into_inner().into_inner())
}

fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
