use std::io;

use chrono::{Datelike, Utc};
use ramhorns::Template;
use serde_json::Value;

use crate::config::Site;
use crate::content::ContentRecord;
use crate::locale::{switch_locale_path, Locale, LocaleConfig};
use crate::seo::structured_data;
use crate::text_utils::{format_iso_date, format_long_date};
use crate::view::messages::{AboutMessages, ContactMessages, FooterMessages, HomeMessages, Messages, NotFoundMessages};
use crate::view::parse_template;

const LAYOUT_TPL: &str = include_str!("../../res/templates/layout.tpl");
const HOME_TPL: &str = include_str!("../../res/templates/home.tpl");
const ABOUT_TPL: &str = include_str!("../../res/templates/about.tpl");
const WORK_TPL: &str = include_str!("../../res/templates/work.tpl");
const BLOG_LIST_TPL: &str = include_str!("../../res/templates/blog_list.tpl");
const BLOG_POST_TPL: &str = include_str!("../../res/templates/blog_post.tpl");
const CONTACT_TPL: &str = include_str!("../../res/templates/contact.tpl");
const NOT_FOUND_TPL: &str = include_str!("../../res/templates/not_found.tpl");

const CARD_TAG_LIMIT: usize = 3;

/// Everything a page needs to know about the request it answers.
pub struct PageContext<'a> {
    pub site: &'a Site,
    pub locales: &'a LocaleConfig,
    pub locale: &'a Locale,
    /// Request path, including the locale segment
    pub path: &'a str,
    pub messages: &'a Messages,
}

impl PageContext<'_> {
    fn href(&self, section: &str) -> String {
        format!("/{}{}", self.locale, section)
    }

    fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.site.url(), path)
    }
}

#[derive(ramhorns::Content)]
struct NavLink<'a> {
    href: String,
    label: &'a str,
    active: bool,
}

#[derive(ramhorns::Content)]
struct LocaleLink {
    href: String,
    code: String,
    label: String,
    active: bool,
}

#[derive(ramhorns::Content)]
struct Alternate {
    code: String,
    href: String,
}

#[derive(ramhorns::Content)]
struct LayoutPage<'a> {
    lang: &'a str,
    title: String,
    description: &'a str,
    canonical: String,
    alternates: Vec<Alternate>,
    has_structured_data: bool,
    structured_data: String,
    site_name: &'a str,
    home_href: String,
    nav: Vec<NavLink<'a>>,
    language_label: &'a str,
    locale_links: Vec<LocaleLink>,
    body: String,
    footer: &'a FooterMessages,
    year: i32,
}

#[derive(ramhorns::Content)]
struct TagItem<'a> {
    tag: &'a str,
}

#[derive(ramhorns::Content)]
struct PostCard<'a> {
    href: String,
    title: &'a str,
    excerpt: &'a str,
    category: &'a str,
    image: &'a str,
    date: String,
    iso_date: String,
    read_time: &'a str,
    tags: Vec<TagItem<'a>>,
    read_more: &'a str,
}

#[derive(ramhorns::Content)]
struct MetricItem<'a> {
    label: &'a str,
    value: &'a str,
}

#[derive(ramhorns::Content)]
struct WorkCard<'a> {
    slug: &'a str,
    title: &'a str,
    excerpt: &'a str,
    category: &'a str,
    image: &'a str,
    year: i32,
    iso_date: String,
    tags: Vec<TagItem<'a>>,
    has_project: bool,
    url: &'a str,
    visit_site: &'a str,
    metrics: Vec<MetricItem<'a>>,
    has_quote: bool,
    quote_text: &'a str,
    quote_author: &'a str,
    quote_title: &'a str,
}

#[derive(ramhorns::Content)]
struct CategoryLink<'a> {
    href: String,
    label: &'a str,
    active: bool,
}

#[derive(ramhorns::Content)]
struct HomePage<'a> {
    t: &'a HomeMessages,
    featured_title: &'a str,
    view_all_work: &'a str,
    work_href: String,
    has_featured: bool,
    featured: Vec<WorkCard<'a>>,
    latest_title: &'a str,
    view_all_posts: &'a str,
    blog_href: String,
    has_posts: bool,
    posts: Vec<PostCard<'a>>,
}

#[derive(ramhorns::Content)]
struct AboutPage<'a> {
    t: &'a AboutMessages,
}

#[derive(ramhorns::Content)]
struct WorkPage<'a> {
    t: ListIntro<'a>,
    categories: Vec<CategoryLink<'a>>,
    has_entries: bool,
    entries: Vec<WorkCard<'a>>,
    empty: &'a str,
}

#[derive(ramhorns::Content)]
struct BlogListPage<'a> {
    t: ListIntro<'a>,
    categories: Vec<CategoryLink<'a>>,
    has_posts: bool,
    posts: Vec<PostCard<'a>>,
    empty: &'a str,
}

#[derive(ramhorns::Content)]
struct ListIntro<'a> {
    eyebrow: &'a str,
    heading: &'a str,
    intro: &'a str,
}

#[derive(ramhorns::Content)]
struct BlogPostPage<'a> {
    back_href: String,
    back_label: &'a str,
    title: &'a str,
    excerpt: &'a str,
    category: &'a str,
    author: &'a str,
    image: &'a str,
    date: String,
    iso_date: String,
    read_time: &'a str,
    tags: Vec<TagItem<'a>>,
    has_body: bool,
    body: &'a str,
    related_title: &'a str,
    has_related: bool,
    related: Vec<PostCard<'a>>,
}

#[derive(ramhorns::Content)]
struct ContactPage<'a> {
    t: &'a ContactMessages,
}

#[derive(ramhorns::Content)]
struct NotFoundPage<'a> {
    t: &'a NotFoundMessages,
    home_href: String,
    back_label: &'a str,
}

/// Renders the localized HTML pages from the embedded templates.
pub struct PageRenderer {
    layout: Template<'static>,
    home: Template<'static>,
    about: Template<'static>,
    work: Template<'static>,
    blog_list: Template<'static>,
    blog_post: Template<'static>,
    contact: Template<'static>,
    not_found: Template<'static>,
}

fn tag_items(record: &ContentRecord, limit: usize) -> Vec<TagItem<'_>> {
    record.display_tags(limit).iter().map(|t| TagItem { tag: t.as_str() }).collect()
}

fn post_card<'a>(ctx: &PageContext, post: &'a ContentRecord, read_more: &'a str) -> PostCard<'a> {
    PostCard {
        href: ctx.href(&format!("/blog/{}", post.slug)),
        title: &post.title,
        excerpt: &post.excerpt,
        category: &post.category,
        image: &post.image,
        date: format_long_date(post.date(), ctx.locale.code()),
        iso_date: format_iso_date(post.date()),
        read_time: &post.read_time,
        tags: tag_items(post, CARD_TAG_LIMIT),
        read_more,
    }
}

fn work_card<'a>(entry: &'a ContentRecord, visit_site: &'a str) -> WorkCard<'a> {
    let project = entry.project.as_ref();
    let quote = project.and_then(|p| p.quote.as_ref());
    WorkCard {
        slug: &entry.slug,
        title: &entry.title,
        excerpt: &entry.excerpt,
        category: &entry.category,
        image: &entry.image,
        year: entry.date().year(),
        iso_date: format_iso_date(entry.date()),
        tags: tag_items(entry, entry.tags.len()),
        has_project: project.is_some(),
        url: project.map(|p| p.url.as_str()).unwrap_or_default(),
        visit_site,
        metrics: project.map(|p| p.metrics.iter()
            .map(|m| MetricItem { label: &m.label, value: &m.value })
            .collect())
            .unwrap_or_default(),
        has_quote: quote.is_some(),
        quote_text: quote.map(|q| q.text.as_str()).unwrap_or_default(),
        quote_author: quote.map(|q| q.author.as_str()).unwrap_or_default(),
        quote_title: quote.map(|q| q.title.as_str()).unwrap_or_default(),
    }
}

/// "All" first, then one link per category carrying `?category=`.
fn category_links<'a>(base: &str, all_label: &'a str, categories: &[&'a str], active: Option<&str>) -> Vec<CategoryLink<'a>> {
    let mut links = Vec::with_capacity(categories.len() + 1);
    links.push(CategoryLink {
        href: base.to_string(),
        label: all_label,
        active: active.is_none(),
    });
    for &category in categories {
        let query = serde_urlencoded::to_string(&[("category", category)]).unwrap_or_default();
        links.push(CategoryLink {
            href: format!("{}?{}", base, query),
            label: category,
            active: active == Some(category),
        });
    }
    links
}

fn page_title(title: &str, site: &Site) -> String {
    format!("{} | {}", title, site.name)
}

impl PageRenderer {
    pub fn new() -> io::Result<Self> {
        Ok(PageRenderer {
            layout: parse_template(LAYOUT_TPL, "layout")?,
            home: parse_template(HOME_TPL, "home")?,
            about: parse_template(ABOUT_TPL, "about")?,
            work: parse_template(WORK_TPL, "work")?,
            blog_list: parse_template(BLOG_LIST_TPL, "blog list")?,
            blog_post: parse_template(BLOG_POST_TPL, "blog post")?,
            contact: parse_template(CONTACT_TPL, "contact")?,
            not_found: parse_template(NOT_FOUND_TPL, "not found")?,
        })
    }

    fn render_layout(&self, ctx: &PageContext, title: String, description: &str, structured: &[Value], body: String) -> String {
        let nav = &ctx.messages.nav;
        let home_href = ctx.href("");
        let nav_links = [
            ("", nav.home.as_str()),
            ("/about", nav.about.as_str()),
            ("/work", nav.work.as_str()),
            ("/blog", nav.blog.as_str()),
            ("/contact", nav.contact.as_str()),
        ].into_iter()
            .map(|(section, label)| {
                let href = ctx.href(section);
                let active = ctx.path == href
                    || (!section.is_empty() && ctx.path.starts_with(&format!("{}/", href)));
                NavLink { href, label, active }
            })
            .collect();

        let supported = ctx.locales.supported();
        let locale_links = supported.iter()
            .map(|l| LocaleLink {
                href: switch_locale_path(ctx.path, l),
                code: l.code().to_string(),
                label: l.code().to_uppercase(),
                active: l == ctx.locale,
            })
            .collect();
        let alternates = supported.iter()
            .map(|l| Alternate {
                code: l.code().to_string(),
                href: ctx.absolute(&switch_locale_path(ctx.path, l)),
            })
            .collect();

        self.layout.render(&LayoutPage {
            lang: ctx.locale.code(),
            title,
            description,
            canonical: ctx.absolute(ctx.path),
            alternates,
            has_structured_data: !structured.is_empty(),
            structured_data: structured_data::to_json_ld(structured),
            site_name: &ctx.site.name,
            home_href,
            nav: nav_links,
            language_label: &nav.language,
            locale_links,
            body,
            footer: &ctx.messages.footer,
            year: Utc::now().year(),
        })
    }

    fn breadcrumbs(&self, ctx: &PageContext, trail: &[(&str, &str)]) -> Value {
        let mut items = vec![(ctx.messages.nav.home.as_str(), ctx.href(""))];
        items.extend(trail.iter().map(|&(name, section)| (name, ctx.href(section))));
        structured_data::breadcrumbs(ctx.site, &items)
    }

    pub fn home(&self, ctx: &PageContext, featured: &[&ContentRecord], latest: &[&ContentRecord]) -> String {
        let m = &ctx.messages;
        let body = self.home.render(&HomePage {
            t: &m.home,
            featured_title: &m.home.featured_title,
            view_all_work: &m.home.view_all_work,
            work_href: ctx.href("/work"),
            has_featured: !featured.is_empty(),
            featured: featured.iter().map(|&e| work_card(e, &m.work.visit_site)).collect(),
            latest_title: &m.home.latest_title,
            view_all_posts: &m.home.view_all_posts,
            blog_href: ctx.href("/blog"),
            has_posts: !latest.is_empty(),
            posts: latest.iter().map(|&p| post_card(ctx, p, &m.blog.read_more)).collect(),
        });

        let structured = [
            structured_data::organization(ctx.site),
            structured_data::website(ctx.site, ctx.locale),
        ];
        self.render_layout(ctx, m.home.title.clone(), &m.home.description, &structured, body)
    }

    pub fn about(&self, ctx: &PageContext) -> String {
        let m = &ctx.messages;
        let body = self.about.render(&AboutPage { t: &m.about });
        let structured = [self.breadcrumbs(ctx, &[(m.nav.about.as_str(), "/about")])];
        self.render_layout(ctx, page_title(&m.about.title, ctx.site), &m.about.description, &structured, body)
    }

    /// Work entries are expected already filtered, `active` is the selected category.
    pub fn work(&self, ctx: &PageContext, entries: &[&ContentRecord], categories: &[&str], active: Option<&str>) -> String {
        let m = &ctx.messages;
        let body = self.work.render(&WorkPage {
            t: ListIntro {
                eyebrow: &m.work.eyebrow,
                heading: &m.work.heading,
                intro: &m.work.intro,
            },
            categories: category_links(&ctx.href("/work"), &m.work.all_categories, categories, active),
            has_entries: !entries.is_empty(),
            entries: entries.iter().map(|&e| work_card(e, &m.work.visit_site)).collect(),
            empty: &m.work.empty,
        });
        let structured = [self.breadcrumbs(ctx, &[(m.nav.work.as_str(), "/work")])];
        self.render_layout(ctx, page_title(&m.work.title, ctx.site), &m.work.description, &structured, body)
    }

    pub fn blog_list(&self, ctx: &PageContext, posts: &[&ContentRecord], categories: &[&str], active: Option<&str>) -> String {
        let m = &ctx.messages;
        let body = self.blog_list.render(&BlogListPage {
            t: ListIntro {
                eyebrow: &m.blog.eyebrow,
                heading: &m.blog.heading,
                intro: &m.blog.intro,
            },
            categories: category_links(&ctx.href("/blog"), &m.blog.all_categories, categories, active),
            has_posts: !posts.is_empty(),
            posts: posts.iter().map(|&p| post_card(ctx, p, &m.blog.read_more)).collect(),
            empty: &m.blog.empty,
        });
        let structured = [
            structured_data::blog(ctx.site, ctx.locale, &m.blog.title, &m.blog.description, posts),
            self.breadcrumbs(ctx, &[(m.nav.blog.as_str(), "/blog")]),
        ];
        self.render_layout(ctx, page_title(&m.blog.title, ctx.site), &m.blog.description, &structured, body)
    }

    pub fn blog_post(&self, ctx: &PageContext, post: &ContentRecord, related: &[&ContentRecord]) -> String {
        let m = &ctx.messages;
        let body_html = post.body_html.as_deref().unwrap_or_default();
        let body = self.blog_post.render(&BlogPostPage {
            back_href: ctx.href("/blog"),
            back_label: &m.blog.back_to_blog,
            title: &post.title,
            excerpt: &post.excerpt,
            category: &post.category,
            author: &post.author,
            image: &post.image,
            date: format_long_date(post.date(), ctx.locale.code()),
            iso_date: format_iso_date(post.date()),
            read_time: &post.read_time,
            tags: tag_items(post, post.tags.len()),
            has_body: !body_html.is_empty(),
            body: body_html,
            related_title: &m.blog.related_title,
            has_related: !related.is_empty(),
            related: related.iter().map(|&p| post_card(ctx, p, &m.blog.read_more)).collect(),
        });

        let post_section = format!("/blog/{}", post.slug);
        let structured = [
            structured_data::article(ctx.site, ctx.locale, post),
            self.breadcrumbs(ctx, &[(m.nav.blog.as_str(), "/blog"), (post.title.as_str(), post_section.as_str())]),
        ];
        self.render_layout(ctx, page_title(&post.title, ctx.site), &post.excerpt, &structured, body)
    }

    pub fn contact(&self, ctx: &PageContext) -> String {
        let m = &ctx.messages;
        let body = self.contact.render(&ContactPage { t: &m.contact });
        let structured = [self.breadcrumbs(ctx, &[(m.nav.contact.as_str(), "/contact")])];
        self.render_layout(ctx, page_title(&m.contact.title, ctx.site), &m.contact.description, &structured, body)
    }

    pub fn not_found(&self, ctx: &PageContext) -> String {
        let m = &ctx.messages;
        let body = self.not_found.render(&NotFoundPage {
            t: &m.not_found,
            home_href: ctx.href(""),
            back_label: &m.not_found.back_home,
        });
        self.render_layout(ctx, page_title(&m.not_found.title, ctx.site), &m.not_found.text, &[], body)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{parse_config, Config};
    use crate::content::catalog::parse_catalog;
    use crate::content::repository::ContentRepository;
    use crate::test_data::{BLOG_DATA, CONFIG_DATA, WORK_DATA};
    use crate::view::messages::MessageCatalog;

    use super::*;

    struct Fixture {
        config: Config,
        locales: LocaleConfig,
        catalog: MessageCatalog,
        blog: ContentRepository,
        work: ContentRepository,
        renderer: PageRenderer,
    }

    fn fixture() -> Fixture {
        let config = parse_config(CONFIG_DATA).unwrap();
        let locales = LocaleConfig::from_config(&config.locales).unwrap();
        let catalog = MessageCatalog::new(locales.default_locale()).unwrap();
        Fixture {
            config,
            catalog,
            blog: ContentRepository::new(parse_catalog(BLOG_DATA).unwrap()).unwrap(),
            work: ContentRepository::new(parse_catalog(WORK_DATA).unwrap()).unwrap(),
            renderer: PageRenderer::new().unwrap(),
            locales,
        }
    }

    fn context<'a>(f: &'a Fixture, code: &str, path: &'a str) -> PageContext<'a> {
        let locale = f.locales.find(code).unwrap();
        PageContext {
            site: &f.config.site,
            locales: &f.locales,
            locale,
            path,
            messages: f.catalog.for_locale(locale),
        }
    }

    #[test]
    fn test_home() {
        let f = fixture();
        let ctx = context(&f, "en", "/en");
        let html = f.renderer.home(&ctx, &f.work.get_featured(3), &f.blog.get_all());

        assert!(html.contains("<html lang=\"en\">"));
        assert!(html.contains("We build websites that actually make you money"));
        assert!(html.contains("Chantelle International"));
        assert!(html.contains("<a href=\"/en/blog/post-b\">Post B &lt;fast&gt;</a>"));
        assert!(html.contains("\"@type\":\"Organization\""));
        assert!(html.contains("<a href=\"/en\" aria-current=\"page\">Home</a>"));
        assert!(html.contains("<a href=\"/de\" hreflang=\"de\">DE</a>"));
    }

    #[test]
    fn test_blog_post() {
        let f = fixture();
        let ctx = context(&f, "de", "/de/blog/post-b");
        let post = f.blog.get_by_slug("post-b").unwrap();
        let html = f.renderer.blog_post(&ctx, post, &f.blog.get_related("post-b", 3));

        assert!(html.contains("<title>Post B &lt;fast&gt; | Grizzly Agency</title>"));
        assert!(html.contains("<h2>Intro</h2>"));
        assert!(html.contains("15. Januar 2025"));
        assert!(html.contains("Ähnliche Artikel"));
        assert!(html.contains("href=\"/de/blog/post-a\""));
        assert!(html.contains("\"@type\":\"Article\""));
        assert!(html.contains("<a href=\"/de/blog\" aria-current=\"page\">Blog</a>"));
        assert!(html.contains("<a href=\"/en/blog/post-b\" hreflang=\"en\">EN</a>"));
        assert!(html.contains("href=\"https://grizzly-agency.com/en/blog/post-b\""));
    }

    #[test]
    fn test_blog_list_categories() {
        let f = fixture();
        let ctx = context(&f, "en", "/en/blog");
        let posts = f.blog.get_by_category("Web Development");
        let html = f.renderer.blog_list(&ctx, &posts, &f.blog.get_all_categories(), Some("Web Development"));

        assert!(html.contains("<a href=\"/en/blog?category=Web+Development\" aria-current=\"true\">Web Development</a>"));
        assert!(html.contains("<a href=\"/en/blog\">All</a>"));
        assert!(html.contains("Post A"));
        assert!(!html.contains("Post B"));
        assert!(html.contains("\"@type\":\"Blog\""));
        assert!(html.contains("\"url\":\"https://grizzly-agency.com/en/blog/post-a\""));

        let html = f.renderer.blog_list(&ctx, &[], &[], Some("Nothing"));
        assert!(html.contains("No articles in this category yet."));
    }

    #[test]
    fn test_work() {
        let f = fixture();
        let ctx = context(&f, "en", "/en/work");
        let html = f.renderer.work(&ctx, &f.work.get_all(), &f.work.get_all_categories(), None);

        assert!(html.contains("<dd>10+ Countries</dd>"));
        assert!(html.contains("Marie Dubois, Digital Director, Chantelle"));
        assert!(html.contains("<a href=\"https://chantelle.com/\" rel=\"noopener\">Visit site</a>"));
    }

    #[test]
    fn test_static_pages() {
        let f = fixture();
        let html = f.renderer.about(&context(&f, "en", "/en/about"));
        assert!(html.contains("Client retention rate"));
        assert!(html.contains("\"@type\":\"BreadcrumbList\""));

        let html = f.renderer.contact(&context(&f, "de", "/de/contact"));
        assert!(html.contains("data-endpoint=\"/api/contact\""));
        assert!(html.contains("Bereit, etwas Großartiges zu bauen?"));

        let html = f.renderer.not_found(&context(&f, "en", "/en/nowhere"));
        assert!(html.contains("Page not found"));
        assert!(!html.contains("application/ld+json"));
    }
}
