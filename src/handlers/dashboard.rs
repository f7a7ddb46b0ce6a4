use crate::{directory::CodeChoice, error::LinkError, models::Link, AppState};
use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

const TARGET_DISPLAY_LEN: usize = 40;

// ── Template structs ───────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    rows: Vec<LinkRow>,
    query: String,
    flash_success: Option<String>,
    flash_error: Option<String>,
}

#[derive(Template)]
#[template(path = "stats.html")]
struct StatsTemplate {
    row: LinkRow,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate;

/// A link pre-formatted for display.
struct LinkRow {
    code: String,
    short_url: String,
    target_url: String,
    target_display: String,
    total_clicks: i64,
    last_clicked: String,
    created_at: String,
    updated_at: String,
}

impl LinkRow {
    fn new(link: Link, base_url: &str) -> Self {
        Self {
            short_url: link.short_url(base_url),
            target_display: truncate_url(&link.target_url, TARGET_DISPLAY_LEN),
            total_clicks: link.total_clicks,
            last_clicked: format_timestamp(link.last_clicked),
            created_at: format_timestamp(Some(link.created_at)),
            updated_at: format_timestamp(Some(link.updated_at)),
            code: link.code,
            target_url: link.target_url,
        }
    }
}

// ── Form types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DashboardQuery {
    q: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateLinkForm {
    #[serde(default)]
    target_url: String,
    code: Option<String>,
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// GET /?q=term
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardQuery>,
    jar: CookieJar,
) -> Response {
    // Read and clear flash cookies
    let flash_success = jar.get("flash_success").map(|c| c.value().to_owned());
    let flash_error = jar.get("flash_error").map(|c| c.value().to_owned());

    let links = match state.directory.list_links().await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to load links: {:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load links").into_response();
        }
    };

    let query = params.q.unwrap_or_default().trim().to_owned();
    let rows = links
        .into_iter()
        .filter(|link| matches_search(link, &query))
        .map(|link| LinkRow::new(link, &state.config.base_url))
        .collect();

    let tmpl = DashboardTemplate {
        rows,
        query,
        flash_success,
        flash_error,
    };

    let jar = jar
        .remove(flash_cookie("flash_success", String::new()))
        .remove(flash_cookie("flash_error", String::new()));

    (jar, tmpl).into_response()
}

/// POST /links
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<CreateLinkForm>,
) -> Response {
    let choice = CodeChoice::from_optional(form.code.as_deref());

    match state.directory.create_link(&form.target_url, choice).await {
        Ok(link) => {
            let msg = format!("Link created: {}", link.short_url(&state.config.base_url));
            set_flash_and_redirect(jar, Some(&msg), None, "/")
        }
        Err(e) => set_flash_and_redirect(jar, None, Some(&e.public_message()), "/"),
    }
}

/// POST /links/:code/delete
pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(code): Path<String>,
) -> Response {
    match state.directory.delete_link(&code).await {
        Ok(()) => set_flash_and_redirect(jar, Some(&format!("Link '{code}' deleted.")), None, "/"),
        Err(e) => set_flash_and_redirect(jar, None, Some(&e.public_message()), "/"),
    }
}

/// GET /code/:code
///
/// Read-only statistics page. Viewing it never counts as a visit.
pub async fn stats(State(state): State<Arc<AppState>>, Path(code): Path<String>) -> Response {
    match state.directory.get_link(&code).await {
        Ok(link) => StatsTemplate {
            row: LinkRow::new(link, &state.config.base_url),
        }
        .into_response(),
        Err(LinkError::NotFound) => (StatusCode::NOT_FOUND, NotFoundTemplate).into_response(),
        Err(e) => {
            tracing::error!("Failed to load link '{}': {:?}", code, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load link").into_response()
        }
    }
}

// ── Private helpers ────────────────────────────────────────────────────────

/// Set a flash cookie and redirect to the given path.
fn set_flash_and_redirect(
    jar: CookieJar,
    success: Option<&str>,
    error: Option<&str>,
    destination: &str,
) -> Response {
    let mut jar = jar;

    for (name, msg) in [("flash_success", success), ("flash_error", error)] {
        if let Some(msg) = msg {
            jar = jar.add(flash_cookie(name, msg.to_owned()));
        }
    }

    (jar, Redirect::to(destination)).into_response()
}

/// Short-lived flash cookie. Setting and clearing share these attributes.
fn flash_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(30))
        .build()
}

/// Case-insensitive match of `term` against the code or the target URL.
/// An empty term matches everything.
fn matches_search(link: &Link, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    link.code.to_lowercase().contains(&term) || link.target_url.to_lowercase().contains(&term)
}

/// Cut `url` to `max_chars` characters, appending "..." when shortened.
fn truncate_url(url: &str, max_chars: usize) -> String {
    match url.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &url[..cut]),
        None => url.to_owned(),
    }
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "Never".to_owned(),
    }
}
