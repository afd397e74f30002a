use wasm_bindgen::prelude::*;

use opencosts_core::catalog;
use opencosts_core::csv;
use opencosts_core::model::Author;
use opencosts_core::pricing::{self, AveragePrices};
use opencosts_core::provider::Provider;

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Per-token price string to "$x.xx" per million tokens.
#[wasm_bindgen]
pub fn format_price(raw: &str) -> String {
    pricing::format_price(raw)
}

/// Split one CSV line into fields. Returns string[].
#[wasm_bindgen]
pub fn parse_csv_row(line: &str) -> JsValue {
    serde_wasm_bindgen::to_value(&csv::parse_row(line)).unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Build Author[] from the CSV export text.
#[wasm_bindgen]
pub fn catalog_from_csv(text: &str) -> JsValue {
    serde_wasm_bindgen::to_value(&catalog::from_csv(text)).unwrap_or(JsValue::NULL)
}

/// Build Author[] from a `/models` response body.
/// Returns null when the body isn't a valid catalog, so the caller can
/// fall back to the CSV.
#[wasm_bindgen]
pub fn catalog_from_backend(body: &str) -> JsValue {
    match catalog::from_backend_json(body) {
        Ok(authors) => serde_wasm_bindgen::to_value(&authors).unwrap_or(JsValue::NULL),
        Err(_) => JsValue::NULL,
    }
}

/// Sort Author[] alphabetically by name.
#[wasm_bindgen]
pub fn sort_authors(authors: JsValue) -> JsValue {
    let mut authors: Vec<Author> = match serde_wasm_bindgen::from_value(authors) {
        Ok(a) => a,
        Err(_) => return JsValue::NULL,
    };
    catalog::sort_authors(&mut authors);
    serde_wasm_bindgen::to_value(&authors).unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Pick the comparison model from Author[] by family name and model id.
/// Returns the Model or null.
#[wasm_bindgen]
pub fn find_model(authors: JsValue, author: &str, model_id: &str) -> JsValue {
    let authors: Vec<Author> = match serde_wasm_bindgen::from_value(authors) {
        Ok(a) => a,
        Err(_) => return JsValue::NULL,
    };
    match catalog::find_model(&authors, author, model_id) {
        Some(m) => serde_wasm_bindgen::to_value(m).unwrap_or(JsValue::NULL),
        None => JsValue::NULL,
    }
}

/// Average prices over Provider[].
/// Returns {averageInputPrice, averageOutputPrice} or null.
#[wasm_bindgen]
pub fn average_prices(providers: JsValue) -> JsValue {
    let providers: Vec<Provider> = match serde_wasm_bindgen::from_value(providers) {
        Ok(p) => p,
        Err(_) => return JsValue::NULL,
    };
    serde_wasm_bindgen::to_value(&pricing::average_prices(&providers)).unwrap_or(JsValue::NULL)
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RatiosJs {
    input_ratio: Option<f64>,
    output_ratio: Option<f64>,
    input_label: String,
    output_label: String,
}

/// Ratios between two AveragePrices objects. A side with nothing to
/// compare against is null, labelled "N/A".
#[wasm_bindgen]
pub fn price_ratios(current: JsValue, against: JsValue) -> JsValue {
    let parse = |v: JsValue| serde_wasm_bindgen::from_value::<AveragePrices>(v).ok();
    let (Some(current), Some(against)) = (parse(current), parse(against)) else {
        return JsValue::NULL;
    };
    let r = pricing::price_ratios(&current, &against);
    let out = RatiosJs {
        input_ratio: r.input,
        output_ratio: r.output,
        input_label: pricing::PriceRatios::fmt_ratio(r.input),
        output_label: pricing::PriceRatios::fmt_ratio(r.output),
    };
    serde_wasm_bindgen::to_value(&out).unwrap_or(JsValue::NULL)
}
