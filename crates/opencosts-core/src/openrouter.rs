//! Regenerates the provider CSV from the public OpenRouter API.

use std::path::Path;
use std::sync::OnceLock;

use futures::{StreamExt, TryStreamExt};
use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use crate::csv;
use crate::error::{CatalogError, Result};

pub const OPENROUTER_BASE: &str = "https://openrouter.ai";

/// Requests in flight while expanding models.
const CONCURRENCY: usize = 8;

/// A listed model that matched one of the search terms.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHit {
    pub name: String,
    pub model_id: String,
    pub canonical_slug: String,
    pub creation_date: Option<String>,
}

impl ModelHit {
    /// Public page for this model: `{base}/{author}/{slug}` with the part
    /// after the author percent-encoded.
    pub fn url(&self, base: &str) -> String {
        match self.canonical_slug.split_once('/') {
            Some((author, slug)) => format!("{base}/{author}/{}", urlencoding::encode(slug)),
            None => format!("{base}/{}", urlencoding::encode(&self.canonical_slug)),
        }
    }
}

/// One provider endpoint of a model, with raw per-token prices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRow {
    pub model_name: String,
    pub model_url: String,
    pub model_id: String,
    pub provider: String,
    pub context_length: Option<u64>,
    pub input_price: Option<String>,
    pub output_price: Option<String>,
    pub latency: Option<f64>,
    pub throughput: Option<f64>,
    pub creation_date: Option<String>,
}

impl CatalogRow {
    /// Fields in [`csv::HEADER`] order; missing values are empty.
    pub fn to_record(&self) -> Vec<String> {
        let num = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        vec![
            self.model_name.clone(),
            self.model_url.clone(),
            self.model_id.clone(),
            self.provider.clone(),
            self.context_length.map(|c| c.to_string()).unwrap_or_default(),
            self.input_price.clone().unwrap_or_default(),
            self.output_price.clone().unwrap_or_default(),
            num(self.latency),
            num(self.throughput),
            self.creation_date.clone().unwrap_or_default(),
        ]
    }
}

/// Free variants are listed separately on OpenRouter and skipped.
pub fn is_free(model: &Value) -> bool {
    let name = model.get("name").and_then(|v| v.as_str()).unwrap_or("").to_lowercase();
    let id = model.get("id").and_then(|v| v.as_str()).unwrap_or("").to_lowercase();
    id.contains(":free") || name.contains("(free")
}

/// Case-insensitive substring match against any term.
pub fn name_matches<S: AsRef<str>>(name: &str, terms: &[S]) -> bool {
    let name = name.to_lowercase();
    terms.iter().any(|t| name.contains(&t.as_ref().to_lowercase()))
}

/// Pick the paid models whose name matches a term, first occurrence of each
/// id only.
pub fn select_models<S: AsRef<str>>(listing: &[Value], terms: &[S]) -> Vec<ModelHit> {
    let mut seen = std::collections::HashSet::new();
    let mut hits = Vec::new();
    for m in listing {
        if is_free(m) {
            continue;
        }
        let name = m.get("name").and_then(|v| v.as_str()).unwrap_or("");
        if !name_matches(name, terms) {
            continue;
        }
        let Some(id) = m.get("id").and_then(|v| v.as_str()) else {
            tracing::warn!(name, "listed model without id");
            continue;
        };
        if !seen.insert(id.to_string()) {
            continue;
        }
        let slug = m
            .get("canonical_slug")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| id.split(':').next().unwrap_or(id));
        hits.push(ModelHit {
            name: name.to_string(),
            model_id: id.to_string(),
            canonical_slug: slug.to_string(),
            creation_date: None,
        });
    }
    hits
}

fn context_length(ep: &Value) -> Option<u64> {
    let raw = ep
        .get("context_length")
        .filter(|v| !v.is_null())
        .or_else(|| ep.get("max_prompt_tokens"))?;
    match raw {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().ok()
        }
        _ => None,
    }
}

fn price(pricing: Option<&Value>, key: &str) -> Option<String> {
    match pricing?.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Turn a model's endpoint list into CSV rows. Endpoints without a provider
/// name are dropped.
pub fn expand_endpoints(hit: &ModelHit, base: &str, endpoints: &[Value]) -> Vec<CatalogRow> {
    endpoints
        .iter()
        .filter_map(|ep| {
            let provider = ep
                .get("provider_name")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())?;
            let pricing = ep.get("pricing");
            Some(CatalogRow {
                model_name: hit.name.clone(),
                model_url: hit.url(base),
                model_id: hit.model_id.clone(),
                provider: provider.to_string(),
                context_length: context_length(ep),
                input_price: price(pricing, "prompt"),
                output_price: price(pricing, "completion"),
                latency: ep.get("latency").and_then(|v| v.as_f64()),
                throughput: ep.get("throughput").and_then(|v| v.as_f64()),
                creation_date: hit.creation_date.clone(),
            })
        })
        .collect()
}

/// Find "Created Sep 23, 2025" in a model page and return the date part.
pub fn extract_creation_date(html: &str) -> Option<String> {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static CREATED: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"));
    let created = CREATED.get_or_init(|| {
        Regex::new(r"Created\s+([A-Za-z]{3}\s+\d{1,2},\s+\d{4})").expect("valid regex")
    });
    let text = tags.replace_all(html, "");
    created.captures(&text).map(|c| c[1].to_string())
}

/// Header plus one line per row.
pub fn render_csv(rows: &[CatalogRow]) -> String {
    let mut out = csv::write_row(&csv::HEADER);
    out.push('\n');
    for r in rows {
        out.push_str(&csv::write_row(&r.to_record()));
        out.push('\n');
    }
    out
}

pub async fn write_csv(rows: &[CatalogRow], path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| CatalogError::Io(format!("{}: {e}", dir.display())))?;
    }
    tokio::fs::write(path, render_csv(rows))
        .await
        .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))
}

pub struct RefreshResult {
    pub models: Vec<ModelHit>,
    pub rows: Vec<CatalogRow>,
}

pub struct OpenRouterClient {
    http: Client,
    base: String,
}

impl Default for OpenRouterClient {
    fn default() -> Self {
        Self::new(OPENROUTER_BASE)
    }
}

impl OpenRouterClient {
    pub fn new(base: &str) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Api { status, body });
        }
        Ok(resp.json().await?)
    }

    /// All listed models (`data[]` of `/api/v1/models`).
    pub async fn list_models(&self) -> Result<Vec<Value>> {
        let data = self.get_json(&format!("{}/api/v1/models", self.base)).await?;
        data.get("data")
            .and_then(|v| v.as_array())
            .cloned()
            .ok_or_else(|| CatalogError::Other("model listing has no data array".into()))
    }

    /// Provider endpoints for one model.
    pub async fn endpoints(&self, canonical_slug: &str) -> Result<Vec<Value>> {
        let url = format!("{}/api/v1/models/{canonical_slug}/endpoints", self.base);
        let data = self.get_json(&url).await?;
        data.get("data")
            .and_then(|d| d.get("endpoints"))
            .and_then(|v| v.as_array())
            .cloned()
            .ok_or_else(|| CatalogError::Other(format!("no endpoints for {canonical_slug}")))
    }

    /// Creation date scraped from the model page. Failures only log.
    pub async fn creation_date(&self, hit: &ModelHit) -> Option<String> {
        let url = hit.url(&self.base);
        let html = async {
            let resp = self.http.get(&url).send().await?.error_for_status()?;
            Ok::<_, reqwest::Error>(resp.text().await?)
        }
        .await;
        match html {
            Ok(html) => extract_creation_date(&html),
            Err(e) => {
                tracing::warn!(
                    slug = %hit.canonical_slug,
                    error = %e,
                    "could not fetch creation date"
                );
                None
            }
        }
    }

    /// Match models against `terms`, date them, and expand their endpoints.
    pub async fn refresh<S: AsRef<str>>(&self, terms: &[S]) -> Result<RefreshResult> {
        let listing = self.list_models().await?;
        let hits = select_models(&listing, terms);
        tracing::debug!(listed = listing.len(), matched = hits.len(), "selected models");

        let models: Vec<ModelHit> = futures::stream::iter(hits)
            .map(|mut hit| async move {
                hit.creation_date = self.creation_date(&hit).await;
                hit
            })
            .buffered(CONCURRENCY)
            .collect()
            .await;

        let batches: Vec<Vec<CatalogRow>> = futures::stream::iter(&models)
            .map(|hit| async move {
                let endpoints = self.endpoints(&hit.canonical_slug).await?;
                Ok::<_, CatalogError>(expand_endpoints(hit, &self.base, &endpoints))
            })
            .buffered(CONCURRENCY)
            .try_collect()
            .await?;

        Ok(RefreshResult {
            models,
            rows: batches.into_iter().flatten().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn free_models_detected() {
        assert!(is_free(&json!({"id": "x/y:free", "name": "Y"})));
        assert!(is_free(&json!({"id": "x/y", "name": "Y (free)"})));
        assert!(!is_free(&json!({"id": "x/y", "name": "Y"})));
    }

    #[test]
    fn select_filters_and_dedupes() {
        let listing = vec![
            json!({"id": "google/gemini-2.5-pro", "name": "Google: Gemini 2.5 Pro", "canonical_slug": "google/gemini-2.5-pro-preview"}),
            json!({"id": "google/gemini-2.5-pro", "name": "Google: Gemini 2.5 Pro"}),
            json!({"id": "google/gemini-2.5-flash:free", "name": "Google: Gemini 2.5 Flash (free)"}),
            json!({"id": "openai/gpt-4o", "name": "OpenAI: GPT-4o"}),
            json!({"id": "moonshot/kimi-k2:extended", "name": "MoonshotAI: Kimi K2"}),
        ];
        let hits = select_models(&listing, &["gemini 2.5", "Kimi K2"]);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].canonical_slug, "google/gemini-2.5-pro-preview");
        assert_eq!(hits[1].canonical_slug, "moonshot/kimi-k2");
    }

    #[test]
    fn model_url_encodes_slug() {
        let hit = ModelHit {
            name: "X".into(),
            model_id: "a/b".into(),
            canonical_slug: "author/model:beta".into(),
            creation_date: None,
        };
        assert_eq!(hit.url(OPENROUTER_BASE), "https://openrouter.ai/author/model%3Abeta");
    }

    #[test]
    fn endpoints_expand_to_rows() {
        let hit = ModelHit {
            name: "Google: Gemini 2.5 Pro".into(),
            model_id: "google/gemini-2.5-pro".into(),
            canonical_slug: "google/gemini-2.5-pro".into(),
            creation_date: Some("Jun 17, 2025".into()),
        };
        let endpoints = vec![
            json!({"provider_name": "Google Vertex", "context_length": 1048576,
                   "pricing": {"prompt": "0.00000125", "completion": "0.00001"}}),
            json!({"provider_name": "Google AI Studio", "max_prompt_tokens": "65536",
                   "pricing": {"prompt": "0.00000125"}, "latency": 1.5}),
            json!({"context_length": 10}),
        ];
        let rows = expand_endpoints(&hit, OPENROUTER_BASE, &endpoints);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].context_length, Some(1_048_576));
        assert_eq!(rows[0].output_price.as_deref(), Some("0.00001"));
        assert_eq!(rows[1].context_length, Some(65_536));
        assert_eq!(rows[1].output_price, None);
        assert_eq!(rows[1].latency, Some(1.5));
        assert_eq!(rows[1].creation_date.as_deref(), Some("Jun 17, 2025"));
    }

    #[test]
    fn creation_date_from_html() {
        let html = "<div><span>Created</span> <span>Sep 23, 2025</span></div>";
        assert_eq!(extract_creation_date(html).as_deref(), Some("Sep 23, 2025"));
        assert_eq!(extract_creation_date("<p>nothing here</p>"), None);
    }

    #[test]
    fn rendered_csv_round_trips_through_catalog() {
        let row = CatalogRow {
            model_name: "Acme: Rocket, Large".into(),
            model_id: "acme/rocket".into(),
            provider: "Acme".into(),
            context_length: Some(8192),
            input_price: Some("0.000002".into()),
            output_price: Some("0.000004".into()),
            ..Default::default()
        };
        let text = render_csv(&[row]);
        assert!(text.starts_with("Model name,Model URL,"));
        let authors = crate::catalog::from_csv(&text);
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].name, "Acme");
        let p = &authors[0].models[0].providers[0];
        assert_eq!(p.model_name, "Acme: Rocket, Large");
        assert_eq!(p.context_length, "8192");
        assert_eq!(p.input_price, "$2.00");
        assert_eq!(p.output_price, "$4.00");
    }
}
