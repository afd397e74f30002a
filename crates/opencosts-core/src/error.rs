#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),

    /// Well-formed JSON that does not match the expected catalog shape.
    #[error("unexpected payload shape: {0}")]
    Schema(serde_json::Error),

    #[error("bad config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "network")]
impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        match e.classify() {
            serde_json::error::Category::Data => Self::Schema(e),
            _ => Self::Json(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
