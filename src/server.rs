use std::io;
use std::io::ErrorKind;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use ntex::util::Bytes;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use serde::Serialize;
use spdlog::{debug, error, info, warn};

use crate::config::Config;
use crate::content::repository::ContentRepository;
use crate::forms;
use crate::forms::{ContactSubmission, FormError, NewsletterSubscription};
use crate::locale::{Locale, LocaleConfig, LocaleResolver, RouteDecision};
use crate::mailer::composer::EmailComposer;
use crate::mailer::resend::ResendRelay;
use crate::mailer::EmailRelay;
use crate::query_string::QueryString;
use crate::seo::sitemap::{build_sitemap, render_sitemap};
use crate::view::messages::MessageCatalog;
use crate::view::page_renderer::{PageContext, PageRenderer};

const HOME_FEATURED: usize = 3;
const HOME_LATEST: usize = 3;
const RELATED_POSTS: usize = 3;

const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("X-Frame-Options", "DENY"),
    ("X-Content-Type-Options", "nosniff"),
    ("Referrer-Policy", "strict-origin-when-cross-origin"),
    ("X-DNS-Prefetch-Control", "on"),
];

/// Shared, read-only state of every worker.
pub struct AppState {
    pub config: Config,
    pub resolver: LocaleResolver,
    pub blog: ContentRepository,
    pub work: ContentRepository,
    pub messages: MessageCatalog,
    pub pages: PageRenderer,
    pub composer: EmailComposer,
    pub relay: Arc<dyn EmailRelay>,
}

impl AppState {
    pub fn new(config: Config, blog: ContentRepository, work: ContentRepository, relay: Arc<dyn EmailRelay>) -> anyhow::Result<Self> {
        let locales = LocaleConfig::from_config(&config.locales)
            .context("Invalid [locales] configuration")?;
        let messages = MessageCatalog::new(locales.default_locale())?;
        for locale in locales.supported() {
            if !messages.has_bundle(locale.code()) {
                debug!("No messages for '{}', using the closest available bundle", locale);
            }
        }

        Ok(AppState {
            resolver: LocaleResolver::new(locales),
            messages,
            pages: PageRenderer::new()?,
            composer: EmailComposer::new(&config.site)?,
            config,
            blog,
            work,
            relay,
        })
    }

    /// Loads both catalogs and connects the production email relay.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let blog = ContentRepository::load(&config.paths.blog_data)
            .with_context(|| format!("Error loading blog catalog {}", config.paths.blog_data.display()))?;
        let work = ContentRepository::load(&config.paths.work_data)
            .with_context(|| format!("Error loading work catalog {}", config.paths.work_data.display()))?;

        let relay = ResendRelay::from_config(&config.email)?;
        if !relay.is_configured() {
            warn!("No email API key configured. Contact and newsletter forms will fail");
        }

        Self::new(config, blog, work, Arc::new(relay))
    }

    fn page_context<'a>(&'a self, locale: &'a Locale, path: &'a str) -> PageContext<'a> {
        PageContext {
            site: &self.config.site,
            locales: self.resolver.config(),
            locale,
            path,
            messages: self.messages.for_locale(locale),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

fn html_response(mut builder: web::HttpResponseBuilder, html: String) -> web::HttpResponse {
    builder
        .content_type("text/html; charset=utf-8")
        .body(html)
}

fn not_found_page(state: &AppState, locale: &Locale, path: &str) -> web::HttpResponse {
    let ctx = state.page_context(locale, path);
    html_response(web::HttpResponse::NotFound(), state.pages.not_found(&ctx))
}

/// Runs the locale resolver for a page request and renders the page when the
/// path already carries a supported locale. `render` returning `None` means
/// the requested item does not exist.
fn render_page<F>(req: &HttpRequest, state: &AppState, render: F) -> web::HttpResponse
    where
        F: FnOnce(&PageContext) -> Option<String>,
{
    let path = req.path();
    let accept_language = req.headers()
        .get("accept-language")
        .and_then(|v| v.to_str().ok());

    match state.resolver.resolve(path, req.uri().query(), accept_language) {
        RouteDecision::PassThrough(locale) => {
            let ctx = state.page_context(&locale, path);
            match render(&ctx) {
                Some(html) => html_response(web::HttpResponse::Ok(), html),
                None => not_found_page(state, &locale, path),
            }
        }
        RouteDecision::Redirect(location) => {
            debug!("Redirecting {} to {}", path, location);
            web::HttpResponse::TemporaryRedirect()
                .header("Location", location)
                .finish()
        }
        RouteDecision::PermanentRedirect(location) => {
            debug!("Moving {} to {}", path, location);
            web::HttpResponse::PermanentRedirect()
                .header("Location", location)
                .finish()
        }
        RouteDecision::NotFound => {
            not_found_page(state, state.resolver.config().default_locale(), path)
        }
        RouteDecision::Exempt => web::HttpResponse::NotFound().finish(),
    }
}

fn category_filter(req: &HttpRequest) -> QueryString {
    QueryString::from(req.uri().query().unwrap_or(""))
}

#[web::get("/{locale}")]
async fn home_page(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    render_page(&req, &state, |ctx| {
        let featured = state.work.get_featured(HOME_FEATURED);
        let latest: Vec<_> = state.blog.get_all().into_iter().take(HOME_LATEST).collect();
        Some(state.pages.home(ctx, &featured, &latest))
    })
}

#[web::get("/{locale}/about")]
async fn about_page(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    render_page(&req, &state, |ctx| Some(state.pages.about(ctx)))
}

#[web::get("/{locale}/work")]
async fn work_page(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let qs = category_filter(&req);
    let category = qs.get_category();
    render_page(&req, &state, |ctx| {
        let entries = match category {
            Some(c) => state.work.get_by_category(c),
            None => state.work.get_all(),
        };
        Some(state.pages.work(ctx, &entries, &state.work.get_all_categories(), category))
    })
}

#[web::get("/{locale}/blog")]
async fn blog_list(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let qs = category_filter(&req);
    let category = qs.get_category();
    render_page(&req, &state, |ctx| {
        let posts = match category {
            Some(c) => state.blog.get_by_category(c),
            None => state.blog.get_all(),
        };
        Some(state.pages.blog_list(ctx, &posts, &state.blog.get_all_categories(), category))
    })
}

#[web::get("/{locale}/blog/{slug}")]
async fn blog_post(
    req: HttpRequest,
    path: web::types::Path<(String, String)>,
    state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let (_, slug) = path.into_inner();
    render_page(&req, &state, |ctx| {
        let post = state.blog.get_by_slug(&slug)?;
        let related = state.blog.get_related(&post.slug, RELATED_POSTS);
        Some(state.pages.blog_post(ctx, post, &related))
    })
}

#[web::get("/{locale}/contact")]
async fn contact_page(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    render_page(&req, &state, |ctx| Some(state.pages.contact(ctx)))
}

/// Everything no route matched, `/` included.
async fn fallback(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    render_page(&req, &state, |_| None)
}

fn form_error_response(err: &FormError) -> web::HttpResponse {
    let body = ErrorBody { error: err.public_message() };
    match err {
        FormError::Invalid(_) => web::HttpResponse::BadRequest().json(&body),
        FormError::Upstream { .. } => web::HttpResponse::InternalServerError().json(&body),
    }
}

fn parse_body<'a, T: serde::Deserialize<'a>>(body: &'a Bytes) -> Result<T, web::HttpResponse> {
    serde_json::from_slice(body).map_err(|e| {
        debug!("Rejecting malformed form body: {}", e);
        web::HttpResponse::BadRequest().json(&ErrorBody { error: forms::INVALID_BODY })
    })
}

#[web::post("/api/contact")]
async fn api_contact(body: Bytes, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let form: ContactSubmission = match parse_body(&body) {
        Ok(form) => form,
        Err(response) => return response,
    };

    match forms::submit_contact(state.relay.as_ref(), &state.composer, &form).await {
        Ok(receipt) => web::HttpResponse::Ok().json(&receipt),
        Err(e) => form_error_response(&e),
    }
}

#[web::post("/api/newsletter")]
async fn api_newsletter(body: Bytes, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let form: NewsletterSubscription = match parse_body(&body) {
        Ok(form) => form,
        Err(response) => return response,
    };

    match forms::subscribe_newsletter(state.relay.as_ref(), &state.composer, &form).await {
        Ok(receipt) => web::HttpResponse::Ok().json(&receipt),
        Err(e) => form_error_response(&e),
    }
}

#[web::get("/sitemap.xml")]
async fn sitemap(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let entries = build_sitemap(
        state.config.site.url(),
        state.resolver.config().supported(),
        &state.blog,
        Utc::now().date_naive());

    match render_sitemap(&entries) {
        Ok(xml) => web::HttpResponse::Ok()
            .content_type("application/xml; charset=utf-8")
            .body(xml),
        Err(e) => {
            error!("Error rendering sitemap: {}", e);
            web::HttpResponse::InternalServerError().finish()
        }
    }
}

#[web::get("/robots.txt")]
async fn robots(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let body = format!("User-agent: *\nAllow: /\n\nSitemap: {}/sitemap.xml\n", state.config.site.url());
    web::HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(body)
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    let file_name = path.into_inner();
    if file_name.contains("..") || file_name.contains(['/', '\\']) {
        return Err(io::Error::new(ErrorKind::PermissionDenied, "Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(file_name);
    Ok(NamedFile::open(file_path)?)
}

/// Registers every route. Fixed paths come before the `/{locale}` patterns.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(sitemap)
        .service(robots)
        .service(public_files)
        .service(api_contact)
        .service(api_newsletter)
        .service(home_page)
        .service(about_page)
        .service(work_page)
        .service(blog_list)
        .service(blog_post)
        .service(contact_page);
}

pub fn security_headers() -> web::middleware::DefaultHeaders {
    SECURITY_HEADERS.iter()
        .fold(web::middleware::DefaultHeaders::new(), |headers, &(name, value)| headers.header(name, value))
}

pub async fn server_run(config: Config) -> anyhow::Result<()> {
    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;

    let app_state = Arc::new(AppState::from_config(config)?);
    info!("Loaded {} blog posts and {} work entries", app_state.blog.len(), app_state.work.len());

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .wrap(security_headers())
            .configure(configure_routes)
            .default_service(web::route().to(fallback))
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await?;

    Ok(())
}
