use reqwest::Client;

use crate::catalog::{self, Catalog, DataSource};
use crate::config::{Config, CsvSource};
use crate::error::{CatalogError, Result};
use crate::model::Author;

/// Loads the catalog from the backend, or from the CSV export when the
/// backend can't be used.
pub struct CatalogClient {
    http: Client,
    models_url: String,
    csv_source: CsvSource,
}

impl CatalogClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::builder()
                .build()
                .expect("failed to build HTTP client"),
            models_url: config.models_url(),
            csv_source: config.csv_source.clone(),
        }
    }

    /// One attempt at the backend; any failure falls back to the CSV.
    ///
    /// An empty but well-formed backend answer counts as success.
    pub async fn load(&self) -> Result<Catalog> {
        match self.fetch_backend().await {
            Ok(authors) => {
                tracing::debug!(
                    url = %self.models_url,
                    authors = authors.len(),
                    "loaded from backend"
                );
                Ok(Catalog {
                    source: DataSource::Backend,
                    authors,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "backend API not available, falling back to CSV");
                let authors = self.fetch_csv().await?;
                tracing::debug!(
                    source = %self.csv_source,
                    authors = authors.len(),
                    "loaded from CSV"
                );
                Ok(Catalog {
                    source: DataSource::Csv,
                    authors,
                })
            }
        }
    }

    /// GET `{api_url}/models` and normalize the payload.
    pub async fn fetch_backend(&self) -> Result<Vec<Author>> {
        let resp = self.http.get(&self.models_url).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Api { status, body });
        }
        let body = resp.text().await?;
        catalog::from_backend_json(&body)
    }

    /// Read the CSV export from its URL or file and normalize it.
    pub async fn fetch_csv(&self) -> Result<Vec<Author>> {
        let text = match &self.csv_source {
            CsvSource::Url(url) => {
                let resp = self.http.get(url).send().await?;
                if !resp.status().is_success() {
                    let status = resp.status().as_u16();
                    let body = resp.text().await.unwrap_or_default();
                    return Err(CatalogError::Api { status, body });
                }
                resp.text().await?
            }
            CsvSource::Path(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))?,
        };
        Ok(catalog::from_csv(&text))
    }
}
