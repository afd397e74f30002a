use opencosts_core::catalog::{from_csv, sort_authors};
use opencosts_core::pricing::{average_prices, parse_display_price};

const HEADER: &str = "Model name,Model URL,OpenRouter model ID,Provider,Context length,Price/input token,Price/output token,Latency,Throughput,Creation date";

fn csv(rows: &[&str]) -> String {
    let mut text = String::from(HEADER);
    for r in rows {
        text.push('\n');
        text.push_str(r);
    }
    text.push('\n');
    text
}

#[test]
fn same_model_two_providers() {
    let text = csv(&[
        "Anthropic: Claude Sonnet 4,https://openrouter.ai/anthropic/claude-sonnet-4,anthropic/claude-sonnet-4,Anthropic,200000,0.000003,0.000015,,,May 22, 2025",
        "Anthropic: Claude Sonnet 4,https://openrouter.ai/anthropic/claude-sonnet-4,anthropic/claude-sonnet-4,Amazon Bedrock,200000,0.000004,0.000016,,,",
    ]);
    let authors = from_csv(&text);
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].name, "Anthropic");

    let model = &authors[0].models[0];
    assert_eq!(model.providers.len(), 2);
    assert_eq!(model.providers[0].input_price, "$3.00");
    assert_eq!(model.providers[1].input_price, "$4.00");
    assert_eq!(model.providers[1].output_price, "$16.00");

    let avg = average_prices(&model.providers);
    let want_in =
        (parse_display_price("$3.00").unwrap() + parse_display_price("$4.00").unwrap()) / 2.0;
    assert!((avg.average_input_price - want_in).abs() < 1e-9);
    assert!((avg.average_output_price - 15.5).abs() < 1e-9);
}

#[test]
fn unquoted_date_with_comma_splits_into_extra_field() {
    // "May 22, 2025" unquoted lands as "May 22" in the date column.
    let text = csv(&["A: B,,a/b,P,1,0.000001,0.000001,,,May 22, 2025"]);
    let authors = from_csv(&text);
    assert_eq!(authors[0].models[0].creation_date.as_deref(), Some("May 22"));
}

#[test]
fn families_and_solo_models() {
    let text = csv(&[
        "Foo: Bar,,foo/bar,P1,,,,,,",
        "Foo: Baz,,foo/baz,P1,,,,,,",
        "Solo,,solo,P2,,,,,,",
    ]);
    let mut authors = from_csv(&text);
    sort_authors(&mut authors);
    assert_eq!(authors.len(), 2);
    assert_eq!(authors[0].name, "Foo");
    assert_eq!(authors[0].models.len(), 2);
    assert_eq!(authors[1].name, "Solo");
    assert_eq!(authors[1].models.len(), 1);
    assert_eq!(authors[1].models[0].name, "Solo");
}

#[test]
fn quoted_fields_and_blank_lines() {
    let text = format!(
        "{HEADER}\n\"Meta: Llama 3.3, Instruct\",\"https://x\",meta/llama,\"Together\",\"131,072\",0.00000088,0.00000088,,,\n\n   \n"
    );
    let authors = from_csv(&text);
    assert_eq!(authors.len(), 1);
    let model = &authors[0].models[0];
    assert_eq!(model.name, "Meta: Llama 3.3, Instruct");
    assert_eq!(model.providers[0].context_length, "131,072");
    assert_eq!(model.providers[0].input_price, "$0.88");
}

#[test]
fn rows_without_model_name_are_dropped() {
    let text = csv(&[",,,Orphan,,,,,,", "X: Y,,x/y,P,,,,,,"]);
    let authors = from_csv(&text);
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].models[0].providers.len(), 1);
}

#[test]
fn short_legacy_rows_fill_empty() {
    // Nine-column export from before creation dates existed.
    let text = csv(&["X: Y,https://x,x/y,P,4096,0.000001,0.000002,0.5,40"]);
    let authors = from_csv(&text);
    let model = &authors[0].models[0];
    assert_eq!(model.creation_date, None);
    assert_eq!(model.providers[0].throughput, "40");
    assert_eq!(model.providers[0].creation_date, "");
}

#[test]
fn models_newest_first_within_family() {
    let text = csv(&[
        "G: Old,,g/old,P,,,,,,2024-01-01",
        "G: Undated,,g/undated,P,,,,,,",
        "G: New,,g/new,P,,,,,,2025-06-01",
    ]);
    let authors = from_csv(&text);
    let names: Vec<&str> = authors[0].models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["G: New", "G: Old", "G: Undated"]);
}

#[test]
fn header_only_is_empty() {
    assert!(from_csv(HEADER).is_empty());
    assert!(from_csv("").is_empty());
}
