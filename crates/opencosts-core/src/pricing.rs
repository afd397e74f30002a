// Price formatting and comparison.
//
// Raw prices are USD per token as decimal strings. Display prices are USD per
// million tokens, e.g. "$1.25". Formatting happens once, when rows are
// ingested; everything downstream works on display strings.

use serde::{Deserialize, Serialize};

use crate::provider::Provider;

const TOKENS_PER_DISPLAY_UNIT: f64 = 1_000_000.0;

/// Turn a per-token price into a per-million display string.
///
/// Empty and `"0"` become `"$0.00"`. Anything that doesn't parse as a finite
/// number is returned unchanged, which also makes already formatted values
/// like `"$1.23"` pass through untouched.
pub fn format_price(raw: &str) -> String {
    if raw.is_empty() || raw == "0" {
        return "$0.00".to_string();
    }
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => format!("${:.2}", v * TOKENS_PER_DISPLAY_UNIT),
        _ => raw.to_string(),
    }
}

/// Parse a display price back into a number, ignoring `$` and `,`.
pub fn parse_display_price(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    let cleaned: String = s.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AveragePrices {
    pub average_input_price: f64,
    pub average_output_price: f64,
}

/// Mean input and output price over the providers that have both prices set
/// and strictly positive. Providers failing either side count for neither.
pub fn average_prices(providers: &[Provider]) -> AveragePrices {
    let priced: Vec<(f64, f64)> = providers
        .iter()
        .filter_map(|p| {
            let input = parse_display_price(&p.input_price)?;
            let output = parse_display_price(&p.output_price)?;
            (input > 0.0 && output > 0.0).then_some((input, output))
        })
        .collect();

    if priced.is_empty() {
        return AveragePrices::default();
    }

    let n = priced.len() as f64;
    AveragePrices {
        average_input_price: priced.iter().map(|(i, _)| i).sum::<f64>() / n,
        average_output_price: priced.iter().map(|(_, o)| o).sum::<f64>() / n,
    }
}

/// How many times more (or less) one model costs than another.
/// `None` means the comparison model has no usable price on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRatios {
    pub input: Option<f64>,
    pub output: Option<f64>,
}

impl PriceRatios {
    /// Numeric pair with a missing ratio reported as `0`.
    pub fn as_sentinel(&self) -> (f64, f64) {
        (self.input.unwrap_or(0.0), self.output.unwrap_or(0.0))
    }

    /// "2.50x", or "N/A" when there is nothing to compare against.
    pub fn fmt_ratio(r: Option<f64>) -> String {
        match r {
            Some(v) => format!("{v:.2}x"),
            None => "N/A".to_string(),
        }
    }
}

pub fn price_ratios(current: &AveragePrices, against: &AveragePrices) -> PriceRatios {
    let ratio = |a: f64, b: f64| (b != 0.0).then(|| a / b);
    PriceRatios {
        input: ratio(current.average_input_price, against.average_input_price),
        output: ratio(current.average_output_price, against.average_output_price),
    }
}
