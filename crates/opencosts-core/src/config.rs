use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:44400";
pub const DEFAULT_CSV: &str = "openrouter_models_providers.csv";
pub const DEFAULT_SEARCH_TERMS: &str = "data/input/models_strings.txt";

/// Environment override for the backend base URL.
pub const API_URL_ENV: &str = "OPENCOSTS_API_URL";

/// Search terms used when no terms file is available.
pub const FALLBACK_SEARCH_TERMS: &[&str] =
    &["Gemini 2.5", "Sonnet 4", "Opus 4", "Kimi K2", "Deepseek R1"];

/// Where the fallback CSV lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvSource {
    Url(String),
    Path(PathBuf),
}

impl CsvSource {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::Path(PathBuf::from(s))
        }
    }
}

impl std::fmt::Display for CsvSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(u) => write!(f, "{u}"),
            Self::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, without the `/models` suffix.
    pub api_url: String,
    pub csv_source: CsvSource,
    pub search_terms: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            csv_source: CsvSource::Path(PathBuf::from(DEFAULT_CSV)),
            search_terms: PathBuf::from(DEFAULT_SEARCH_TERMS),
        }
    }
}

/// On-disk form; every key optional.
#[derive(Debug, Default, Deserialize, Serialize)]
struct ConfigFile {
    api_url: Option<String>,
    csv: Option<String>,
    search_terms: Option<String>,
}

impl Config {
    /// Layer a TOML document over the current values.
    pub fn merge_toml(mut self, toml_str: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(toml_str).map_err(|e| CatalogError::Config(e.to_string()))?;
        if let Some(url) = file.api_url {
            self.api_url = url;
        }
        if let Some(csv) = file.csv {
            self.csv_source = CsvSource::parse(&csv);
        }
        if let Some(terms) = file.search_terms {
            self.search_terms = PathBuf::from(terms);
        }
        Ok(self)
    }

    pub fn merge_file(self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))?;
        self.merge_toml(&content)
    }

    /// Apply `OPENCOSTS_API_URL` if set and non-empty.
    pub fn merge_env(self) -> Self {
        self.merge_api_url(std::env::var(API_URL_ENV).ok())
    }

    fn merge_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        self
    }

    /// Defaults, then the config file, then the environment.
    ///
    /// An explicit `path` must exist; the per-user file is optional.
    #[cfg(feature = "network")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = Self::default();
        match path {
            Some(p) => cfg = cfg.merge_file(p)?,
            None => {
                if let Some(p) = user_config_path().filter(|p| p.exists()) {
                    tracing::debug!(path = %p.display(), "loading user config");
                    cfg = cfg.merge_file(&p)?;
                }
            }
        }
        Ok(cfg.merge_env())
    }

    /// `{api_url}/models`, tolerating a trailing slash on the base.
    pub fn models_url(&self) -> String {
        format!("{}/models", self.api_url.trim_end_matches('/'))
    }
}

/// `<config dir>/opencosts/config.toml`.
#[cfg(feature = "network")]
pub fn user_config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("opencosts").join("config.toml"))
}

/// Parse a search terms file: one term per non-blank line.
pub fn parse_search_terms(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Read search terms, falling back to [`FALLBACK_SEARCH_TERMS`] when the
/// file can't be read.
pub fn load_search_terms(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_search_terms(&text),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "search terms file unreadable, using defaults"
            );
            FALLBACK_SEARCH_TERMS.iter().map(|s| s.to_string()).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.models_url(), "http://localhost:44400/models");
        assert_eq!(cfg.csv_source, CsvSource::Path(PathBuf::from(DEFAULT_CSV)));
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let cfg = Config::default()
            .merge_toml(r#"csv = "https://example.com/models.csv""#)
            .unwrap();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.csv_source, CsvSource::Url("https://example.com/models.csv".into()));
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = Config::default().merge_toml("api_url = ").unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn api_url_override_ignores_blank() {
        let cfg = Config::default().merge_api_url(Some("  ".into()));
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        let cfg = Config::default().merge_api_url(Some("http://api:9000/".into()));
        assert_eq!(cfg.models_url(), "http://api:9000/models");
    }

    #[test]
    fn search_terms_skip_blank_lines() {
        assert_eq!(parse_search_terms("Gemini 2.5\n\n  Opus 4  \n"), vec!["Gemini 2.5", "Opus 4"]);
    }

    #[test]
    fn missing_terms_file_uses_defaults() {
        let terms = load_search_terms(Path::new("/definitely/not/here.txt"));
        assert_eq!(terms.len(), FALLBACK_SEARCH_TERMS.len());
        assert_eq!(terms[0], "Gemini 2.5");
    }

    #[test]
    fn merge_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"http://backend:1\"\nsearch_terms = \"terms.txt\"\n",
        )
        .unwrap();
        let cfg = Config::default().merge_file(&path).unwrap();
        assert_eq!(cfg.api_url, "http://backend:1");
        assert_eq!(cfg.search_terms, PathBuf::from("terms.txt"));
    }
}
