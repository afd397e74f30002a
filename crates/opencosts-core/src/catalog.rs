//! Normalization of raw provider data into the Author → Model → Provider tree.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::csv;
use crate::error::Result;
use crate::model::{sort_by_recency, Author, Model};
use crate::provider::Provider;

/// Where a catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Backend,
    Csv,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend => write!(f, "backend"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub source: DataSource,
    pub authors: Vec<Author>,
}

impl Catalog {
    pub fn model_count(&self) -> usize {
        tally(&self.authors).models
    }

    pub fn provider_count(&self) -> usize {
        tally(&self.authors).providers
    }
}

/// Family, model and provider-offering counts over a set of authors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub authors: usize,
    pub models: usize,
    pub providers: usize,
}

pub fn tally<'a>(authors: impl IntoIterator<Item = &'a Author>) -> Tally {
    authors.into_iter().fold(Tally::default(), |mut t, a| {
        t.authors += 1;
        t.models += a.models.len();
        t.providers += a.models.iter().map(|m| m.providers.len()).sum::<usize>();
        t
    })
}

/// Decode a `/models` payload and format its prices.
///
/// Author order is kept as sent; models are sorted newest first.
pub fn from_backend_json(payload: &str) -> Result<Vec<Author>> {
    let authors: Vec<Author> = serde_json::from_str(payload)?;
    Ok(normalize_backend(authors))
}

/// Same as [`from_backend_json`] for an already decoded value.
pub fn from_backend_value(payload: serde_json::Value) -> Result<Vec<Author>> {
    let authors: Vec<Author> = serde_json::from_value(payload)?;
    Ok(normalize_backend(authors))
}

fn normalize_backend(authors: Vec<Author>) -> Vec<Author> {
    authors
        .into_iter()
        .map(|author| {
            let mut models: Vec<Model> = author
                .models
                .into_iter()
                .map(|m| Model {
                    providers: m
                        .providers
                        .into_iter()
                        .map(Provider::with_formatted_prices)
                        .collect(),
                    ..m
                })
                .collect();
            sort_by_recency(&mut models);
            Author { name: author.name, models }
        })
        .collect()
}

/// Parse the CSV export (header line first) into a catalog tree.
pub fn from_csv(text: &str) -> Vec<Author> {
    let providers: Vec<Provider> = csv::data_lines(text)
        .map(|line| Provider::from_fields(&csv::parse_row(line)))
        .collect();
    group_providers(providers)
}

/// Group flat provider rows by author, then by exact model name.
///
/// Rows without a model name are dropped. Groups keep the order in which
/// they were first seen, and a model's url, id and creation date come from
/// its first row.
pub fn group_providers(providers: Vec<Provider>) -> Vec<Author> {
    let mut authors: Vec<Author> = Vec::new();
    let mut author_idx: HashMap<String, usize> = HashMap::new();
    let mut model_idx: HashMap<(usize, String), usize> = HashMap::new();

    for p in providers {
        if p.model_name.is_empty() {
            tracing::debug!(provider = %p.provider, "skipping row without model name");
            continue;
        }

        let ai = *author_idx
            .entry(p.author_name().to_string())
            .or_insert_with(|| {
                authors.push(Author {
                    name: p.author_name().to_string(),
                    models: Vec::new(),
                });
                authors.len() - 1
            });
        let author = &mut authors[ai];

        let mi = *model_idx
            .entry((ai, p.model_name.clone()))
            .or_insert_with(|| {
                author.models.push(Model {
                    name: p.model_name.clone(),
                    url: p.model_url.clone(),
                    id: p.model_id.clone(),
                    creation_date: (!p.creation_date.is_empty())
                        .then(|| p.creation_date.clone()),
                    providers: Vec::new(),
                });
                author.models.len() - 1
            });
        author.models[mi].providers.push(p);
    }

    for author in &mut authors {
        sort_by_recency(&mut author.models);
    }
    authors
}

/// Alphabetical by name, case-insensitive first.
pub fn sort_authors(authors: &mut [Author]) {
    authors.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Look up a model the way the comparison picker does: family by name,
/// then model by id.
pub fn find_model<'a>(authors: &'a [Author], author: &str, model_id: &str) -> Option<&'a Model> {
    authors
        .iter()
        .find(|a| a.name == author)?
        .models
        .iter()
        .find(|m| m.id == model_id)
}

/// Resolve a free-form query: exact id, then exact name, then the first
/// model whose name contains the query (case-insensitive).
pub fn search_model<'a>(authors: &'a [Author], query: &str) -> Option<&'a Model> {
    let models = || authors.iter().flat_map(|a| &a.models);
    let q = query.to_lowercase();
    models()
        .find(|m| m.id == query)
        .or_else(|| models().find(|m| m.name == query))
        .or_else(|| models().find(|m| m.name.to_lowercase().contains(&q)))
}
