use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::pricing::{average_prices, AveragePrices};
use crate::provider::Provider;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub providers: Vec<Provider>,
}

/// A model family, e.g. everything named "Google: ...".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub models: Vec<Model>,
}

impl Model {
    /// Parsed creation date, `None` when missing or unreadable.
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.creation_date.as_deref().and_then(parse_creation_date)
    }

    pub fn average_prices(&self) -> AveragePrices {
        average_prices(&self.providers)
    }

    /// Provider with the lowest output price, ignoring unpriced entries.
    pub fn cheapest(&self) -> Option<&Provider> {
        self.providers
            .iter()
            .filter_map(|p| {
                let out = crate::pricing::parse_display_price(&p.output_price)?;
                (out > 0.0).then_some((p, out))
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(p, _)| p)
    }
}

/// Parse the date formats we see in the wild: RFC 3339, local ISO datetimes
/// (`2025-06-17T10:00:00`, optional fraction), `2025-06-17`,
/// `2025-06-17 10:00:00` and the `Jun 17, 2025` form from model pages.
pub fn parse_creation_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Newest first. Undated models sink to the bottom, ties keep their order.
pub fn sort_by_recency(models: &mut [Model]) {
    models.sort_by_cached_key(|m| std::cmp::Reverse(m.created_at()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(name: &str, date: Option<&str>) -> Model {
        Model {
            name: name.to_string(),
            creation_date: date.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn parses_known_formats() {
        let want = NaiveDate::from_ymd_opt(2025, 9, 23).unwrap().and_hms_opt(0, 0, 0);
        assert_eq!(parse_creation_date("Sep 23, 2025"), want);
        assert_eq!(parse_creation_date("2025-09-23"), want);
        assert_eq!(parse_creation_date("2025-09-23T00:00:00Z"), want);
        assert_eq!(parse_creation_date("September 23, 2025"), want);
        assert!(parse_creation_date("2025-09-23 08:30:00").is_some());
    }

    #[test]
    fn parses_local_iso_datetimes() {
        let want = NaiveDate::from_ymd_opt(2025, 6, 17).unwrap().and_hms_opt(10, 0, 0);
        assert_eq!(parse_creation_date("2025-06-17T10:00:00"), want);
        assert_eq!(parse_creation_date("2025-06-17T10:00:00.000"), want);
        assert_eq!(parse_creation_date("2025-06-17 10:00:00.000"), want);
    }

    #[test]
    fn junk_dates_are_none() {
        assert_eq!(parse_creation_date(""), None);
        assert_eq!(parse_creation_date("soon"), None);
        assert_eq!(parse_creation_date("2025-13-45"), None);
    }

    #[test]
    fn recency_sort_puts_undated_last() {
        let mut models = vec![
            dated("none", None),
            dated("old", Some("Jan 10, 2024")),
            dated("junk", Some("not a date")),
            dated("new", Some("2025-06-01")),
            dated("empty", Some("")),
        ];
        sort_by_recency(&mut models);
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["new", "old", "none", "junk", "empty"]);
    }

    #[test]
    fn cheapest_skips_unpriced() {
        let p = |name: &str, out: &str| Provider {
            provider: name.into(),
            output_price: out.into(),
            ..Default::default()
        };
        let m = Model {
            providers: vec![
                p("free", "$0.00"),
                p("pricey", "$9.00"),
                p("cheap", "$2.00"),
                p("odd", "n/a"),
            ],
            ..Default::default()
        };
        assert_eq!(m.cheapest().map(|p| p.provider.as_str()), Some("cheap"));
        assert!(Model::default().cheapest().is_none());
    }
}
