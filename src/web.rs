use crate::analyzer::{AnalysisInput, AnalysisState, Analyzer, ImageUpload, SessionBoard, SubmitError};
use crate::content::{self, Step, Testimonial};
use crate::gemini::AnalysisBackend;
use crate::page::{Navigation, Page, navigate};
use crate::response::WellnessResponse;
use askama::Html as HtmlEscaper;
use askama::{MarkupDisplay, Template};
use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use cookie::{Cookie, SameSite};
use markdown::{Options as MarkdownOptions, to_html_with_options};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rand::{Rng, distributions::Alphanumeric, thread_rng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn};

type SharedState = Arc<AppState>;
type SafeJson = MarkupDisplay<HtmlEscaper, String>;

const SESSION_COOKIE: &str = "dermai_session";
const SESSION_ID_LEN: usize = 32;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const MAPS_QUERY: &str = "dermatologists near me";
const NOT_AN_IMAGE_MESSAGE: &str = "Please upload an image file (JPG or PNG).";
const TOO_LARGE_MESSAGE: &str = "That photo is too large. Please upload a smaller image.";
const MALFORMED_MESSAGE: &str = "We could not read your submission. Please try again.";

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub base_url: String,
}

#[derive(Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
    pub base_url: String,
    pub max_upload_bytes: usize,
    pub session_capacity: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            base_url: "http://127.0.0.1:8080".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_capacity: crate::analyzer::DEFAULT_SESSION_CAPACITY,
        }
    }
}

#[derive(Debug)]
pub enum WebError {
    Io(std::io::Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for WebError {}

impl From<std::io::Error> for WebError {
    fn from(value: std::io::Error) -> Self {
        WebError::Io(value)
    }
}

pub async fn serve(config: WebConfig, backend: Arc<dyn AnalysisBackend>) -> Result<(), WebError> {
    let state = Arc::new(AppState {
        analyzer: Analyzer::new(backend, SessionBoard::new(config.session_capacity)),
        base_url: config.base_url.trim_end_matches('/').to_string(),
    });
    let router = build_router(state, config.max_upload_bytes);
    info!(
        %config.addr,
        base = %config.base_url,
        max_upload_bytes = config.max_upload_bytes,
        "Binding HTTP listener"
    );
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        Self::new(submit_status(&err), err.user_message())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::new(rejection.status(), rejection.message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

fn submit_status(err: &SubmitError) -> StatusCode {
    match err {
        SubmitError::MissingInput => StatusCode::BAD_REQUEST,
        SubmitError::InFlight => StatusCode::CONFLICT,
        SubmitError::Busy => StatusCode::SERVICE_UNAVAILABLE,
        SubmitError::Service(_) | SubmitError::TaskFailed => StatusCode::BAD_GATEWAY,
    }
}

fn build_router(state: SharedState, max_upload_bytes: usize) -> Router {
    let mut router = Router::new();
    for page in Page::ALL {
        router = match page {
            Page::Contact => router.route(page.path(), get(page_html).post(contact_submit)),
            _ => router.route(page.path(), get(page_html)),
        };
    }
    router
        .route("/analyze", post(analyze_form))
        .route("/api/analyze", post(api_analyze))
        .route("/api/pages", get(api_pages))
        .route("/healthz", get(health))
        .route("/sitemap.xml", get(sitemap_xml))
        .fallback(page_html)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Browser session identified by the `dermai_session` cookie.
struct Session {
    id: String,
    fresh: bool,
}

impl Session {
    fn existing(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|id| is_valid_session_id(id))
            .map(|id| Self { id, fresh: false })
    }

    fn resume_or_start(headers: &HeaderMap) -> Self {
        Self::existing(headers).unwrap_or_else(|| Self {
            id: new_session_id(),
            fresh: true,
        })
    }

    fn state(&self, board: &SessionBoard) -> AnalysisState {
        board.state(&self.id)
    }

    fn attach_cookie(&self, response: &mut Response) {
        if !self.fresh {
            return;
        }
        let cookie = Cookie::build((SESSION_COOKIE, self.id.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
}

fn new_session_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

fn is_valid_session_id(id: &str) -> bool {
    id.len() == SESSION_ID_LEN && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

async fn page_html(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    let page = Page::from_path(uri.path());
    let analyzer = match (page, Session::existing(&headers)) {
        (Page::Home, Some(session)) => {
            AnalyzerView::from_state(&session.state(state.analyzer.board()))
        }
        _ => AnalyzerView::default(),
    };
    Html(render_page(&state, page, analyzer, ContactView::default())).into_response()
}

async fn analyze_form(
    State(state): State<SharedState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let session = Session::resume_or_start(&headers);
    let board = state.analyzer.board();
    let (status, analyzer) = match read_analysis_form(multipart).await {
        Err(rejection) => (
            rejection.status(),
            AnalyzerView::from_state(&session.state(board)).with_error(rejection.message()),
        ),
        Ok(input) => {
            let text = input.text.clone();
            let outcome = state.analyzer.submit(&session.id, input).await;
            let view = AnalyzerView::from_state(&session.state(board)).with_text(text);
            match outcome {
                Ok(_) => (StatusCode::OK, view),
                Err(err) => (submit_status(&err), view.with_error(err.user_message())),
            }
        }
    };
    let body = render_page(&state, Page::Home, analyzer, ContactView::default());
    let mut response = (status, Html(body)).into_response();
    session.attach_cookie(&mut response);
    response
}

async fn api_analyze(
    State(state): State<SharedState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let session = Session::resume_or_start(&headers);
    let mut response = match analyze_for_session(&state, &session, multipart).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => err.into_response(),
    };
    session.attach_cookie(&mut response);
    response
}

async fn analyze_for_session(
    state: &AppState,
    session: &Session,
    multipart: Multipart,
) -> Result<WellnessResponse, ApiError> {
    let input = read_analysis_form(multipart).await?;
    Ok(state.analyzer.submit(&session.id, input).await?)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContactForm {
    name: String,
    email: String,
    message: String,
}

async fn contact_submit(
    State(state): State<SharedState>,
    Form(form): Form<ContactForm>,
) -> Response {
    let missing = form.name.trim().is_empty()
        || form.message.trim().is_empty()
        || !form.email.contains('@');
    let contact = if missing {
        ContactView {
            sent: false,
            error: "Please fill in your name, a valid email, and a message.".to_string(),
            name: form.name,
            email: form.email,
            message: form.message,
        }
    } else {
        info!(message_len = form.message.len(), "Contact message received");
        ContactView {
            sent: true,
            ..ContactView::default()
        }
    };
    let status = if missing {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    let body = render_page(&state, Page::Contact, AnalyzerView::default(), contact);
    (status, Html(body)).into_response()
}

#[derive(Debug, Clone, Serialize)]
struct PagePayload {
    page: Page,
    path: String,
    title: String,
}

async fn api_pages() -> Json<Vec<PagePayload>> {
    Json(
        Page::ALL
            .iter()
            .map(|page| PagePayload {
                page: *page,
                path: page.path().to_string(),
                title: page.title().to_string(),
            })
            .collect(),
    )
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "dermai-coach" }))
}

async fn sitemap_xml(State(state): State<SharedState>) -> impl IntoResponse {
    let mut body = String::with_capacity(1024);
    body.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    body.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    for page in Page::ALL {
        let priority = if page == Page::Home { "0.8" } else { "0.5" };
        body.push_str("<url><loc>");
        body.push_str(&xml_escape(&absolute_url(&state.base_url, page)));
        body.push_str("</loc><changefreq>monthly</changefreq><priority>");
        body.push_str(priority);
        body.push_str("</priority></url>");
    }
    body.push_str("</urlset>");
    ([(header::CONTENT_TYPE, "application/xml")], body)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormRejection {
    NotAnImage,
    TooLarge,
    Malformed,
}

impl FormRejection {
    fn status(self) -> StatusCode {
        match self {
            FormRejection::NotAnImage | FormRejection::Malformed => StatusCode::BAD_REQUEST,
            FormRejection::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn message(self) -> &'static str {
        match self {
            FormRejection::NotAnImage => NOT_AN_IMAGE_MESSAGE,
            FormRejection::TooLarge => TOO_LARGE_MESSAGE,
            FormRejection::Malformed => MALFORMED_MESSAGE,
        }
    }
}

impl From<MultipartError> for FormRejection {
    fn from(err: MultipartError) -> Self {
        warn!(error = %err, "Rejected analysis upload");
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            FormRejection::TooLarge
        } else {
            FormRejection::Malformed
        }
    }
}

/// Reads the `symptoms` text and optional `photo` file from the analyzer form.
async fn read_analysis_form(mut multipart: Multipart) -> Result<AnalysisInput, FormRejection> {
    let mut input = AnalysisInput::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("symptoms") => input.text = field.text().await?,
            Some("photo") => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was picked.
                if bytes.is_empty() {
                    continue;
                }
                if let Some(declared) = content_type.as_deref() {
                    let is_image = declared
                        .parse::<mime::Mime>()
                        .map(|parsed| parsed.type_() == mime::IMAGE)
                        .unwrap_or(false);
                    if !is_image {
                        return Err(FormRejection::NotAnImage);
                    }
                }
                input.image = Some(ImageUpload::new(content_type.as_deref(), bytes.to_vec()));
            }
            _ => {}
        }
    }
    Ok(input)
}

#[derive(Debug, Clone)]
struct NavLink {
    label: &'static str,
    href: String,
    active: bool,
}

impl NavLink {
    fn to(page: Page, current: Page) -> Self {
        Self {
            label: page.nav_label(),
            href: navigate(page).href(),
            active: page == current,
        }
    }
}

#[derive(Debug, Clone)]
struct FooterGroup {
    heading: &'static str,
    links: Vec<NavLink>,
}

#[derive(Debug, Clone)]
struct ResourceLink {
    title: String,
    host: String,
    href: String,
    linkable: bool,
}

#[derive(Debug, Clone)]
struct ResultView {
    visual_interpretation: String,
    symptom_summary: String,
    suggestions: Vec<String>,
    trackable_summary: String,
    disclaimer: String,
    resources: Vec<ResourceLink>,
}

impl ResultView {
    fn from_response(response: &WellnessResponse) -> Self {
        Self {
            visual_interpretation: response.visual_interpretation.clone(),
            symptom_summary: response.symptom_summary.clone(),
            suggestions: response.wellness_suggestions.clone(),
            trackable_summary: response.trackable_summary.clone(),
            disclaimer: response.disclaimer_or_default().to_string(),
            resources: response
                .resources()
                .iter()
                .map(|resource| ResourceLink {
                    title: resource.title.clone(),
                    host: resource.host(),
                    href: resource.url.clone(),
                    linkable: resource.is_linkable(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct AnalyzerView {
    text: String,
    error: String,
    busy: bool,
    result: Option<ResultView>,
}

impl AnalyzerView {
    fn from_state(state: &AnalysisState) -> Self {
        Self {
            text: String::new(),
            error: state.error_message().unwrap_or_default().to_string(),
            busy: state.is_analyzing(),
            result: state.result().map(ResultView::from_response),
        }
    }

    fn with_text(mut self, text: String) -> Self {
        self.text = text;
        self
    }

    fn with_error(mut self, message: &str) -> Self {
        self.error = message.to_string();
        self
    }
}

#[derive(Debug, Clone, Default)]
struct ContactView {
    sent: bool,
    error: String,
    name: String,
    email: String,
    message: String,
}

fn render_page(
    state: &AppState,
    page: Page,
    analyzer: AnalyzerView,
    contact: ContactView,
) -> String {
    let canonical_url = absolute_url(&state.base_url, page);
    let json_ld = MarkupDisplay::new_safe(web_page_json_ld(page, &canonical_url, &state.base_url), HtmlEscaper);
    let content_html = render_markdown_str(content::page_markdown(page)).unwrap_or_default();
    let template = PageTemplate {
        page_title: page.title(),
        canonical_url,
        json_ld,
        nav_links: vec![
            NavLink::to(Page::Home, page),
            NavLink::to(Page::About, page),
            NavLink::to(Page::Features, page),
        ],
        footer_groups: footer_groups(page),
        is_home: page == Page::Home,
        is_contact: page == Page::Contact,
        is_testimonials: page == Page::Testimonials,
        content_html,
        start_href: Navigation::to_analyzer().href(),
        how_href: navigate(Page::HowItWorks).href(),
        hero_lede: content::HERO_LEDE,
        tagline: content::TAGLINE,
        sticky_disclaimer: content::STICKY_DISCLAIMER,
        steps: &content::HOME_STEPS,
        testimonials: &content::TESTIMONIALS,
        maps_url: dermatologist_search_url(),
        analyzer,
        contact,
    };
    template
        .render()
        .unwrap_or_else(|err| render_error_page(err.to_string()))
}

fn footer_groups(current: Page) -> Vec<FooterGroup> {
    vec![
        FooterGroup {
            heading: "Product",
            links: vec![
                NavLink::to(Page::Features, current),
                NavLink {
                    label: "Analyzer",
                    href: Navigation::to_analyzer().href(),
                    active: false,
                },
                NavLink::to(Page::Testimonials, current),
            ],
        },
        FooterGroup {
            heading: "Company",
            links: vec![
                NavLink::to(Page::About, current),
                NavLink::to(Page::Contact, current),
            ],
        },
        FooterGroup {
            heading: "Legal",
            links: vec![
                NavLink::to(Page::Privacy, current),
                NavLink::to(Page::Terms, current),
                NavLink::to(Page::CookiePolicy, current),
                NavLink::to(Page::Disclaimer, current),
            ],
        },
    ]
}

fn render_error_page(message: impl Into<String>) -> String {
    let message = xml_escape(&message.into());
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>DermAI Coach • Error</title>
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
  </head>
  <body class="bg-slate-50 text-slate-900">
    <main class="min-h-screen flex flex-col items-center justify-center py-10 px-4">
      <h1 class="text-4xl font-bold tracking-tight">Something went wrong</h1>
      <p class="text-lg text-slate-600">{message}</p>
      <a href="/" class="mt-6 inline-flex rounded-xl bg-teal-600 px-6 py-3 text-white font-semibold">Back to home</a>
    </main>
  </body>
</html>"#
    )
}

fn dermatologist_search_url() -> String {
    format!(
        "https://www.google.com/maps/search/{}",
        utf8_percent_encode(MAPS_QUERY, NON_ALPHANUMERIC)
    )
}

fn absolute_url(base_url: &str, page: Page) -> String {
    match page {
        Page::Home => format!("{base_url}/"),
        _ => format!("{base_url}{}", page.path()),
    }
}

fn web_page_json_ld(page: Page, canonical_url: &str, base_url: &str) -> String {
    let payload = json!({
        "@context": "https://schema.org",
        "@type": "WebPage",
        "name": page.title(),
        "url": canonical_url,
        "isPartOf": {
            "@type": "WebSite",
            "name": "DermAI Coach",
            "url": format!("{base_url}/"),
        },
    });
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn render_markdown_str(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let html = to_html_with_options(trimmed, &MarkdownOptions::gfm())
        .unwrap_or_else(|_| xml_escape(trimmed));
    Some(html)
}

#[derive(Template)]
#[template(
    source = r##"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>DermAI Coach • {{ page_title }}</title>
    {% if analyzer.busy %}
    <meta http-equiv="refresh" content="5; url=/#results">
    {% endif %}
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
    <link rel="canonical" href="{{ canonical_url }}">
    <script type="application/ld+json">
    {{ json_ld }}
    </script>
  </head>
  <body class="bg-slate-50 text-slate-900 min-h-screen flex flex-col">
    <header class="fixed top-0 left-0 right-0 z-50 border-b bg-white/95 backdrop-blur-md shadow-sm border-slate-200">
      <div class="max-w-6xl mx-auto px-4 sm:px-6 lg:px-8 flex items-center justify-between h-20">
        <a href="/" class="text-xl font-bold text-slate-900">DermAI Coach</a>
        <nav class="hidden md:flex items-center gap-8" aria-label="Main navigation">
          {% for link in nav_links %}
          <a href="{{ link.href }}" class="text-sm font-medium {% if link.active %}text-teal-600{% else %}text-slate-600 hover:text-teal-600{% endif %}">{{ link.label }}</a>
          {% endfor %}
          <a href="{{ start_href }}" class="bg-teal-600 hover:bg-teal-700 text-white px-5 py-2.5 rounded-xl text-sm font-semibold shadow">Get Started</a>
        </nav>
      </div>
    </header>

    <main class="flex-1 pt-20" role="main">
    {% if is_home %}
      <section class="bg-white py-20 px-4" aria-label="Introduction">
        <div class="max-w-6xl mx-auto">
          <p class="text-teal-700 text-sm font-semibold uppercase tracking-wide">AI-Powered Wellness</p>
          <h1 class="text-5xl font-extrabold tracking-tight mt-4">Clarity for your <span class="text-teal-600">Skin Journey</span></h1>
          <p class="text-lg text-slate-600 mt-6 max-w-2xl">{{ hero_lede }}</p>
          <div class="flex flex-wrap gap-4 mt-8">
            <a href="{{ start_href }}" class="bg-teal-600 hover:bg-teal-700 text-white px-8 py-4 rounded-xl font-bold shadow-lg" aria-label="Start your free skin check-in analysis">Start Free Check-in</a>
            <a href="{{ how_href }}" class="border border-slate-200 bg-white px-8 py-4 rounded-xl font-semibold text-slate-700">How it works</a>
          </div>
        </div>
      </section>

      <section id="how-it-works" class="bg-slate-100 border-y border-slate-200 py-20 px-4">
        <div class="max-w-6xl mx-auto">
          <div class="text-center max-w-3xl mx-auto mb-16">
            <span class="text-teal-600 font-semibold tracking-wide text-sm uppercase">Simple Process</span>
            <h2 class="text-3xl font-bold text-slate-900 mt-2">How DermAI Coach Works</h2>
          </div>
          <div class="grid md:grid-cols-3 gap-8 text-center">
            {% for step in steps %}
            <div class="p-8 rounded-2xl bg-white border border-slate-100 shadow-sm">
              <h3 class="text-xl font-bold mb-3">{{ step.title }}</h3>
              <p class="text-slate-600">{{ step.body }}</p>
            </div>
            {% endfor %}
          </div>
        </div>
      </section>

      <section id="testimonials" class="bg-white py-20 px-4">
        <div class="max-w-6xl mx-auto">
          <div class="text-center max-w-3xl mx-auto mb-16">
            <span class="text-teal-600 font-semibold tracking-wide text-sm uppercase">Community</span>
            <h2 class="text-3xl font-bold text-slate-900 mt-2">Trusted by Users</h2>
          </div>
          <div class="grid md:grid-cols-3 gap-8">
            {% for person in testimonials %}
            <figure class="bg-slate-50 p-8 rounded-2xl border border-slate-100">
              <blockquote class="text-slate-600 mb-6 italic leading-relaxed">&ldquo;{{ person.text }}&rdquo;</blockquote>
              <figcaption class="flex items-center gap-4">
                <img src="{{ person.image }}" alt="{{ person.name }}" class="w-12 h-12 rounded-full object-cover" loading="lazy">
                <div>
                  <p class="font-bold text-slate-900 text-sm">{{ person.name }}</p>
                  <p class="text-teal-600 text-xs font-medium">{{ person.role }}</p>
                </div>
              </figcaption>
            </figure>
            {% endfor %}
          </div>
        </div>
      </section>

      <section id="analyzer" class="bg-teal-50/60 py-20 px-4">
        <div class="max-w-3xl mx-auto">
          <div class="text-center mb-10">
            <h2 class="text-3xl font-bold text-slate-800 mb-3">Daily Skin Check-in</h2>
            <p class="text-slate-600 text-lg">Your private space to log and analyze symptoms.</p>
          </div>
          <form method="post" action="/analyze#results" enctype="multipart/form-data"
                class="bg-white rounded-3xl shadow-xl border border-slate-100 p-6 sm:p-10 space-y-8"
                onsubmit="this.querySelector('button[type=submit]').disabled = true;">
            <div>
              <label for="photo" class="block text-sm font-bold text-slate-700 mb-3">Upload Photo</label>
              <input id="photo" name="photo" type="file" accept="image/*" class="block w-full text-sm text-slate-600">
              <p class="text-xs mt-1.5 text-slate-400">Supports JPG, PNG</p>
            </div>
            <div>
              <label for="symptoms" class="block text-sm font-bold text-slate-700 mb-3">How are you feeling today?</label>
              <textarea id="symptoms" name="symptoms" rows="4"
                        class="w-full bg-slate-50 border border-slate-200 rounded-xl p-4 text-slate-800"
                        placeholder="E.g., Itching increased after swimming, redness is fading...">{{ analyzer.text }}</textarea>
            </div>
            <div class="flex flex-col sm:flex-row items-center justify-between gap-4">
              <a href="{{ maps_url }}" target="_blank" rel="noopener noreferrer"
                 class="text-indigo-600 border border-indigo-200 font-semibold py-3 px-6 rounded-xl"
                 aria-label="Find dermatologists near you on Google Maps">Find Dermatologist</a>
              {% if analyzer.busy %}
              <button type="submit" disabled aria-busy="true" class="bg-slate-100 text-slate-400 cursor-not-allowed px-8 py-3 rounded-xl font-bold">Analyzing...</button>
              {% else %}
              <button type="submit" aria-label="Submit for AI analysis" class="bg-teal-600 hover:bg-teal-700 text-white px-8 py-3 rounded-xl font-bold shadow-lg">Check In Now</button>
              {% endif %}
            </div>
          </form>

          <div id="results" class="mt-12 space-y-6" aria-live="polite">
            {% if !analyzer.error.is_empty() %}
            <div class="p-4 bg-rose-50 border border-rose-100 text-rose-600 rounded-xl text-sm font-medium" role="alert">{{ analyzer.error }}</div>
            {% endif %}
            {% if let Some(result) = analyzer.result %}
            <div class="bg-white rounded-2xl shadow-sm border border-slate-100 p-6">
              <h3 class="font-semibold text-slate-800 mb-3">Visual Observations</h3>
              <p class="text-slate-600 leading-relaxed">{{ result.visual_interpretation }}</p>
            </div>
            <div class="bg-white rounded-2xl shadow-sm border border-slate-100 p-6">
              <h3 class="font-semibold text-slate-800 mb-3">Symptom Summary</h3>
              <p class="text-slate-600 leading-relaxed">{{ result.symptom_summary }}</p>
            </div>
            <div class="bg-teal-50 rounded-2xl border border-teal-100 p-6">
              <h3 class="font-semibold text-teal-900 mb-4">Wellness Suggestions</h3>
              <ol class="space-y-3">
                {% for tip in result.suggestions %}
                <li class="flex items-start gap-3 bg-white/60 p-3 rounded-lg">
                  <span class="w-6 h-6 flex items-center justify-center bg-teal-100 text-teal-700 text-xs font-bold rounded-full">{{ loop.index }}</span>
                  <p class="text-teal-800 text-sm">{{ tip }}</p>
                </li>
                {% endfor %}
              </ol>
            </div>
            {% if result.resources.len() > 0 %}
            <div class="bg-blue-50/50 rounded-2xl border border-blue-100 p-6">
              <h3 class="font-semibold text-blue-900 mb-4">Trusted Resources</h3>
              <div class="grid gap-3 sm:grid-cols-2">
                {% for resource in result.resources %}
                {% if resource.linkable %}
                <a href="{{ resource.href }}" target="_blank" rel="noopener noreferrer" class="block p-3 bg-white rounded-lg border border-blue-100 hover:border-blue-300">
                  <p class="text-sm font-medium text-slate-700 truncate">{{ resource.title }}</p>
                  <p class="text-xs text-slate-400 truncate">{{ resource.host }}</p>
                </a>
                {% else %}
                <div class="block p-3 bg-white rounded-lg border border-blue-100">
                  <p class="text-sm font-medium text-slate-700 truncate">{{ resource.title }}</p>
                  <p class="text-xs text-slate-400 truncate">{{ resource.host }}</p>
                </div>
                {% endif %}
                {% endfor %}
              </div>
            </div>
            {% endif %}
            <div class="bg-indigo-50 rounded-2xl border border-indigo-100 p-6 flex flex-col sm:flex-row items-center justify-between gap-4">
              <div>
                <h3 class="font-semibold text-indigo-900 mb-2">Need Professional Advice?</h3>
                <p class="text-slate-600 text-sm">Our AI is a support tool. For medical diagnosis and prescription treatment, please consult a specialist.</p>
              </div>
              <a href="{{ maps_url }}" target="_blank" rel="noopener noreferrer" class="bg-indigo-600 hover:bg-indigo-700 text-white font-semibold py-3 px-6 rounded-xl">Find Dermatologist</a>
            </div>
            <div class="bg-slate-50 rounded-2xl border border-slate-200 p-6">
              <h3 class="font-semibold text-slate-700 mb-3">Daily Log Summary</h3>
              <p class="text-slate-500 text-sm italic border-l-4 border-slate-300 pl-4 py-1">&ldquo;{{ result.trackable_summary }}&rdquo;</p>
            </div>
            <div class="flex items-start gap-3 p-4 bg-amber-50 text-amber-800 rounded-lg text-xs">
              <p>{{ result.disclaimer }}</p>
            </div>
            {% endif %}
          </div>
        </div>
      </section>
    {% else %}
      <div class="pt-8 pb-20 bg-white">
        <div class="max-w-4xl mx-auto px-6">
          <div class="border-b border-slate-100 pb-8 mb-8">
            <h1 class="text-4xl font-bold text-slate-900 tracking-tight">{{ page_title }}</h1>
          </div>
          <div class="prose prose-slate prose-lg max-w-none text-slate-600">{{ content_html|safe }}</div>
          {% if is_testimonials %}
          <div class="mt-12"><div class="grid md:grid-cols-3 gap-8">
            {% for person in testimonials %}
            <figure class="bg-slate-50 p-8 rounded-2xl border border-slate-100">
              <blockquote class="text-slate-600 mb-6 italic leading-relaxed">&ldquo;{{ person.text }}&rdquo;</blockquote>
              <figcaption class="flex items-center gap-4">
                <img src="{{ person.image }}" alt="{{ person.name }}" class="w-12 h-12 rounded-full object-cover" loading="lazy">
                <div>
                  <p class="font-bold text-slate-900 text-sm">{{ person.name }}</p>
                  <p class="text-teal-600 text-xs font-medium">{{ person.role }}</p>
                </div>
              </figcaption>
            </figure>
            {% endfor %}
          </div></div>
          {% endif %}
          {% if is_contact %}
          <form method="post" action="/contact" class="mt-12 space-y-6 bg-slate-50 p-8 rounded-2xl border border-slate-100">
            {% if !contact.error.is_empty() %}
            <div class="p-4 bg-rose-50 border border-rose-100 text-rose-600 rounded-xl text-sm" role="alert">{{ contact.error }}</div>
            {% endif %}
            <div>
              <label for="name" class="block text-sm font-semibold text-slate-700 mb-2">Name</label>
              <input id="name" name="name" type="text" required placeholder="Your name" value="{{ contact.name }}" class="w-full rounded-xl border border-slate-200 p-3">
            </div>
            <div>
              <label for="email" class="block text-sm font-semibold text-slate-700 mb-2">Email</label>
              <input id="email" name="email" type="email" required placeholder="you@example.com" value="{{ contact.email }}" class="w-full rounded-xl border border-slate-200 p-3">
            </div>
            <div>
              <label for="message" class="block text-sm font-semibold text-slate-700 mb-2">Message</label>
              <textarea id="message" name="message" rows="4" required placeholder="How can we help?" class="w-full rounded-xl border border-slate-200 p-3">{{ contact.message }}</textarea>
            </div>
            {% if contact.sent %}
            <button type="submit" disabled class="w-full font-bold py-4 px-6 rounded-xl bg-green-600 text-white">Message Sent!</button>
            {% else %}
            <button type="submit" class="w-full font-bold py-4 px-6 rounded-xl bg-teal-600 hover:bg-teal-700 text-white">Send Message</button>
            {% endif %}
          </form>
          {% endif %}
          {% if !is_contact %}
          <div class="mt-16 p-8 bg-slate-50 rounded-2xl border border-slate-100 text-center">
            <h3 class="text-xl font-bold text-slate-900 mb-4">Ready to try it?</h3>
            <a href="{{ start_href }}" class="inline-flex bg-teal-600 hover:bg-teal-700 text-white px-8 py-3 rounded-xl font-semibold">Start Analysis</a>
          </div>
          {% endif %}
        </div>
      </div>
    {% endif %}
    </main>

    <footer class="bg-white border-t border-slate-200 pt-16 pb-24">
      <div class="max-w-6xl mx-auto px-4 grid md:grid-cols-4 gap-12">
        <div>
          <span class="text-lg font-bold text-slate-900">DermAI Coach</span>
          <p class="text-slate-500 text-sm mt-4">{{ tagline }}</p>
        </div>
        {% for group in footer_groups %}
        <div>
          <h3 class="font-semibold text-slate-900 mb-4">{{ group.heading }}</h3>
          <ul class="space-y-3 text-sm">
            {% for link in group.links %}
            <li><a href="{{ link.href }}" class="{% if link.active %}text-teal-600{% else %}text-slate-500 hover:text-teal-600{% endif %}">{{ link.label }}</a></li>
            {% endfor %}
          </ul>
        </div>
        {% endfor %}
      </div>
      <p class="max-w-6xl mx-auto px-4 mt-12 text-slate-400 text-sm">&copy; DermAI Coach. All rights reserved.</p>
    </footer>

    <div class="fixed bottom-0 left-0 right-0 bg-amber-50 border-t border-amber-200 py-2 px-4 text-center text-xs text-amber-800" role="contentinfo">
      <strong>Disclaimer:</strong> {{ sticky_disclaimer }}
    </div>
  </body>
</html>"##,
    ext = "html"
)]
struct PageTemplate {
    page_title: &'static str,
    canonical_url: String,
    json_ld: SafeJson,
    nav_links: Vec<NavLink>,
    footer_groups: Vec<FooterGroup>,
    is_home: bool,
    is_contact: bool,
    is_testimonials: bool,
    content_html: String,
    start_href: String,
    how_href: String,
    hero_lede: &'static str,
    tagline: &'static str,
    sticky_disclaimer: &'static str,
    steps: &'static [Step],
    testimonials: &'static [Testimonial],
    maps_url: String,
    analyzer: AnalyzerView,
    contact: ContactView,
}
