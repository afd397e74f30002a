use serde::{Deserialize, Deserializer, Serialize};

use crate::pricing::format_price;

/// One provider's offering of a model, as shown in the provider table.
///
/// Field names on the wire match the CSV header. Inside a normalized catalog
/// both price fields hold display strings (see [`format_price`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Provider {
    #[serde(rename = "Model name", deserialize_with = "null_as_empty")]
    pub model_name: String,
    #[serde(rename = "Model URL", deserialize_with = "null_as_empty")]
    pub model_url: String,
    #[serde(rename = "OpenRouter model ID", deserialize_with = "null_as_empty")]
    pub model_id: String,
    #[serde(rename = "Provider", deserialize_with = "null_as_empty")]
    pub provider: String,
    #[serde(rename = "Context length", deserialize_with = "null_as_empty")]
    pub context_length: String,
    #[serde(rename = "Price/input token", deserialize_with = "null_as_empty")]
    pub input_price: String,
    #[serde(rename = "Price/output token", deserialize_with = "null_as_empty")]
    pub output_price: String,
    #[serde(rename = "Latency", deserialize_with = "null_as_empty")]
    pub latency: String,
    #[serde(rename = "Throughput", deserialize_with = "null_as_empty")]
    pub throughput: String,
    #[serde(rename = "Creation date", deserialize_with = "null_as_empty")]
    pub creation_date: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

impl Provider {
    /// Build a provider from positional CSV fields, formatting both prices.
    /// Missing trailing fields read as empty.
    pub fn from_fields(fields: &[String]) -> Self {
        let field = |i: usize| fields.get(i).cloned().unwrap_or_default();
        let price = |i: usize| {
            let raw = field(i);
            format_price(if raw.is_empty() { "0" } else { &raw })
        };
        Self {
            model_name: field(0),
            model_url: field(1),
            model_id: field(2),
            provider: field(3),
            context_length: field(4),
            input_price: price(5),
            output_price: price(6),
            latency: field(7),
            throughput: field(8),
            creation_date: field(9),
        }
    }

    /// Same provider with raw per-token prices turned into display prices.
    pub fn with_formatted_prices(self) -> Self {
        Self {
            input_price: format_price(&self.input_price),
            output_price: format_price(&self.output_price),
            ..self
        }
    }

    /// Family this provider's model belongs to: the model name up to the
    /// first `:`, or the whole name.
    pub fn author_name(&self) -> &str {
        author_of(&self.model_name)
    }
}

pub fn author_of(model_name: &str) -> &str {
    model_name.split(':').next().unwrap_or(model_name)
}
