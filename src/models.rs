use serde::{Deserialize, Serialize};

// ── HTML form bodies ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScrapeForm {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ParseForm {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: String,
}

// ── JSON API ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub url: String,
    pub content: String,
    pub chunk_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub content: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParseResponse {
    pub result: String,
    pub chunk_count: usize,
}
