use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;

mod chunk;
mod clean;
mod config;
mod extract;
mod fetch;
mod llm;
mod models;
mod ui;

use config::Config;
use fetch::{FetchError, Fetcher, PageSource};
use llm::{LlmClient, LlmError, TogetherClient};
use models::{ParseForm, ParseRequest, ParseResponse, ScrapeForm, ScrapeRequest, ScrapeResponse};
use ui::Notice;

const LLM_HINT: &str = "Try rephrasing the description, or check TOGETHER_API_KEY.";

#[derive(Clone)]
struct AppState {
    fetcher: Arc<dyn PageSource>,
    llm: Arc<dyn LlmClient>,
    chunk_size: usize,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env();
    let fetcher = Fetcher::from_settings(&config.browser).map_err(std::io::Error::other)?;
    let llm = TogetherClient::new(config.llm.clone()).map_err(std::io::Error::other)?;
    let state = AppState {
        fetcher: Arc::new(fetcher),
        llm: Arc::new(llm),
        chunk_size: config.chunk_size,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/scrape", post(scrape_submit))
        .route("/parse", post(parse_submit))
        .route("/health", get(health))
        .route("/api/scrape", post(scrape_endpoint))
        .route("/api/parse", post(parse_endpoint))
        .with_state(state)
}

// ── Pipeline ─────────────────────────────────────────────────────────────────

async fn scrape_and_clean(fetcher: &dyn PageSource, url: &str) -> Result<String, FetchError> {
    let html = fetcher.fetch(url).await?;
    Ok(clean::clean_html(&html))
}

/// Returns the extraction result and the number of chunks it was built from.
async fn parse_content(
    state: &AppState,
    content: &str,
    description: &str,
) -> Result<(String, usize), LlmError> {
    let chunks = chunk::split_text(content, state.chunk_size);
    let result = extract::extract_from_chunks(state.llm.as_ref(), &chunks, description).await?;
    Ok((result, chunks.len()))
}

// ── HTML form ────────────────────────────────────────────────────────────────

async fn index() -> Html<String> {
    Html(ui::index_page())
}

async fn scrape_submit(State(state): State<AppState>, Form(form): Form<ScrapeForm>) -> Html<String> {
    let url = form.url.trim();
    if url.is_empty() {
        let warning = Notice::Warning("Please enter a website URL".to_string());
        return Html(ui::scrape_page(url, Some(&warning), None));
    }

    tracing::info!("Scraping the website... {}", url);
    match scrape_and_clean(state.fetcher.as_ref(), url).await {
        Ok(content) => {
            let success = Notice::Success("Website scraped successfully!".to_string());
            Html(ui::scrape_page(url, Some(&success), Some(&content)))
        }
        Err(e) => {
            tracing::error!("scrape failed for {}: {}", url, e);
            let error = Notice::Error {
                message: format!("Error scraping website: {}", e),
                hint: e.hint().to_string(),
            };
            Html(ui::scrape_page(url, Some(&error), None))
        }
    }
}

async fn parse_submit(State(state): State<AppState>, Form(form): Form<ParseForm>) -> Html<String> {
    // Browsers submit textarea and hidden-field line breaks as CRLF.
    let content = form.content.replace("\r\n", "\n");
    let description = form.description.trim();
    if description.is_empty() {
        let warning =
            Notice::Warning("Please enter a description of what you want to parse".to_string());
        return Html(ui::parse_page(&form.url, &content, description, Some(&warning), None));
    }

    tracing::info!("Parsing the content...");
    match parse_content(&state, &content, description).await {
        Ok((result, _)) => {
            let outcome = if result.trim().is_empty() {
                Notice::Warning("No results returned from parsing.".to_string())
            } else {
                Notice::Success("Content parsed successfully!".to_string())
            };
            Html(ui::parse_page(&form.url, &content, description, Some(&outcome), Some(&result)))
        }
        Err(e) => {
            tracing::error!("parse failed: {}", e);
            let error = Notice::Error {
                message: format!("Error parsing content: {}", e),
                hint: LLM_HINT.to_string(),
            };
            Html(ui::parse_page(&form.url, &content, description, Some(&error), None))
        }
    }
}

// ── JSON API ─────────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn scrape_endpoint(State(state): State<AppState>, Json(req): Json<ScrapeRequest>) -> Response {
    match scrape_and_clean(state.fetcher.as_ref(), &req.url).await {
        Ok(content) => {
            let chunk_count = chunk::split_text(&content, state.chunk_size).len();
            let response = ScrapeResponse {
                url: req.url,
                content,
                chunk_count,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let status = match &e {
                FetchError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                FetchError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, Json(json!({"detail": e.to_string(), "hint": e.hint()}))).into_response()
        }
    }
}

async fn parse_endpoint(State(state): State<AppState>, Json(req): Json<ParseRequest>) -> Response {
    if req.description.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "description must not be empty"})),
        )
            .into_response();
    }

    match parse_content(&state, &req.content, &req.description).await {
        Ok((result, chunk_count)) => {
            (StatusCode::OK, Json(ParseResponse { result, chunk_count })).into_response()
        }
        Err(e) => {
            let status = match &e {
                LlmError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, Json(json!({"detail": e.to_string(), "hint": LLM_HINT}))).into_response()
        }
    }
}
