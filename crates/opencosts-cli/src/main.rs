use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use opencosts_core::{
    api::CatalogClient,
    catalog::{self, Catalog, DataSource},
    config::{self, Config, CsvSource},
    model::{Author, Model},
    openrouter::OpenRouterClient,
    pricing::{price_ratios, AveragePrices, PriceRatios},
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Palette ──────────────────────────────────────────────────────────

fn s_header() -> Style { Style::new().color256(252).bold() }  // bright gray, bold
fn s_dim() -> Style    { Style::new().color256(248) }         // light gray
fn s_tree() -> Style   { Style::new().color256(245) }         // mid gray
fn s_hint() -> Style   { Style::new().color256(243) }         // soft gray
fn s_ok() -> Style     { Style::new().color256(114) }         // green
fn s_err() -> Style    { Style::new().color256(167) }         // red
fn s_price() -> Style  { Style::new().color256(109) }         // teal
fn s_bold() -> Style   { Style::new().bold() }
fn s_label() -> Style  { Style::new().color256(146) }         // muted lavender

fn sep(width: usize) -> String {
    s_tree().apply_to("\u{2500}".repeat(width)).to_string()
}

// ── CLI Args ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "opencosts",
    about = "Browse LLM models by family, see per-provider pricing, compare two models",
    version,
    after_help = "examples:\n  \
        opencosts                                   (whole catalog)\n  \
        opencosts --author Google                   (one family)\n  \
        opencosts --against \"Claude Sonnet 4\"       (ratios vs a comparison model)\n  \
        opencosts compare \"Gemini 2.5 Pro\" \"Sonnet 4\"\n  \
        opencosts refresh --terms models_strings.txt\n  \
        opencosts --json > catalog.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Only show this family (case-insensitive).
    #[arg(long)]
    author: Option<String>,

    /// Comparison model: show each model's average price relative to it.
    #[arg(long)]
    against: Option<String>,

    #[arg(long, short)]
    json: bool,

    /// Backend base URL (overrides config and $OPENCOSTS_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Fallback CSV, a file path or http(s) URL.
    #[arg(long, global = true)]
    csv: Option<String>,

    /// Config file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Provider table of one model, priced against another.
    Compare {
        model: String,
        against: String,
    },
    /// Rebuild the CSV from the OpenRouter API.
    Refresh {
        /// Search terms, one per line.
        #[arg(long)]
        terms: Option<PathBuf>,
        /// Output CSV path (defaults to the configured CSV location).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut cfg = Config::load(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        cfg.api_url = url.clone();
    }
    if let Some(csv) = &cli.csv {
        cfg.csv_source = CsvSource::parse(csv);
    }
    tracing::debug!(api_url = %cfg.api_url, csv = %cfg.csv_source, "resolved config");
    Ok(cfg)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = resolve_config(&cli)?;

    match &cli.command {
        Some(Commands::Compare { model, against }) => {
            cmd_compare(&cfg, model, against).await?;
        }
        Some(Commands::Refresh { terms, out }) => {
            cmd_refresh(&cfg, terms.as_deref(), out.as_deref()).await?;
        }
        None => {
            cmd_catalog(&cfg, &cli).await?;
        }
    }
    Ok(())
}

// ── Loading ──────────────────────────────────────────────────────────

async fn load_catalog(cfg: &Config) -> anyhow::Result<Catalog> {
    let term = Term::stderr();
    let show_spinner = term.is_term();
    if show_spinner {
        term.write_line(&format!("{}", s_dim().apply_to("loading...")))?;
    }

    let result = CatalogClient::new(cfg).load().await;

    if show_spinner {
        term.clear_last_lines(1)?;
    }
    let mut catalog = result?;
    catalog::sort_authors(&mut catalog.authors);
    Ok(catalog)
}

fn source_hint(catalog: &Catalog, cfg: &Config) -> String {
    match catalog.source {
        DataSource::Backend => format!("from {}", cfg.models_url()),
        DataSource::Csv => format!("from {} (backend unavailable)", cfg.csv_source),
    }
}

// ── Catalog ──────────────────────────────────────────────────────────

async fn cmd_catalog(cfg: &Config, opts: &Cli) -> anyhow::Result<()> {
    let catalog = load_catalog(cfg).await?;

    let authors: Vec<&Author> = match &opts.author {
        Some(name) => {
            let name = name.to_lowercase();
            catalog
                .authors
                .iter()
                .filter(|a| a.name.to_lowercase() == name)
                .collect()
        }
        None => catalog.authors.iter().collect(),
    };

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&authors)?);
        return Ok(());
    }

    if authors.is_empty() {
        eprintln!("{}", s_err().apply_to("no models found"));
        eprintln!("{}", s_dim().apply_to(format!("  {}", source_hint(&catalog, cfg))));
        return Ok(());
    }

    let comparison = match &opts.against {
        Some(q) => Some(
            catalog::search_model(&catalog.authors, q)
                .ok_or_else(|| anyhow::anyhow!("comparison model not found: {q}"))?,
        ),
        None => None,
    };

    let shown = catalog::tally(authors.iter().copied());
    println!();
    println!(
        "{}  {}",
        s_header().apply_to("models"),
        s_hint().apply_to(format!(
            "{} families \u{00b7} {} models \u{00b7} {} offerings",
            shown.authors, shown.models, shown.providers
        ))
    );
    if let Some(c) = comparison {
        println!("  {} {}", s_dim().apply_to("compared against"), s_bold().apply_to(&c.name));
    }

    for author in authors {
        println!();
        println!("{}", s_header().apply_to(&author.name));
        println!("{}", sep(64));
        for model in &author.models {
            print_model(model, comparison);
        }
    }

    println!();
    println!("{}", s_hint().apply_to(source_hint(&catalog, cfg)));
    Ok(())
}

fn print_model(model: &Model, comparison: Option<&Model>) {
    println!();
    let date = model.creation_date.as_deref().unwrap_or("");
    println!("  {}  {}", s_bold().apply_to(&model.name), s_label().apply_to(date));
    if !model.url.is_empty() {
        println!("  {}", s_hint().apply_to(&model.url));
    }

    println!("{}", provider_table(model));

    if let Some(c) = comparison {
        let avg = model.average_prices();
        let ratios = price_ratios(&avg, &c.average_prices());
        print_averages(&avg, Some(&ratios));
    }
}

fn provider_table(model: &Model) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("  Provider").fg(Color::AnsiValue(248)),
            Cell::new("Context").fg(Color::AnsiValue(248)),
            Cell::new("In $/1M").fg(Color::AnsiValue(248)),
            Cell::new("Out $/1M").fg(Color::AnsiValue(248)),
        ]);

    let dash = "\u{2500}";
    let or_dash = |s: &str| if s.is_empty() { dash.to_string() } else { s.to_string() };
    let cheapest = model.cheapest().map(|p| p.provider.as_str());

    for p in &model.providers {
        let name_color = if Some(p.provider.as_str()) == cheapest {
            Color::AnsiValue(114)
        } else {
            Color::AnsiValue(109)
        };
        table.add_row(vec![
            Cell::new(format!("  {}", or_dash(&p.provider))).fg(name_color),
            Cell::new(or_dash(&p.context_length)).fg(Color::AnsiValue(248)),
            Cell::new(&p.input_price).fg(Color::AnsiValue(109)),
            Cell::new(&p.output_price).fg(Color::AnsiValue(109)),
        ]);
    }
    table
}

fn print_averages(avg: &AveragePrices, ratios: Option<&PriceRatios>) {
    let ratio_str = |r: Option<f64>| {
        let text = PriceRatios::fmt_ratio(r);
        match r {
            Some(v) if v > 1.0 => s_err().apply_to(text).to_string(),
            Some(_) => s_ok().apply_to(text).to_string(),
            None => s_dim().apply_to(text).to_string(),
        }
    };
    match ratios {
        Some(r) => println!(
            "  {} {}  {}   {} {}  {}",
            s_dim().apply_to("avg in"),
            s_price().apply_to(format!("${:.2}", avg.average_input_price)),
            ratio_str(r.input),
            s_dim().apply_to("avg out"),
            s_price().apply_to(format!("${:.2}", avg.average_output_price)),
            ratio_str(r.output),
        ),
        None => println!(
            "  {} {}   {} {}",
            s_dim().apply_to("avg in"),
            s_price().apply_to(format!("${:.2}", avg.average_input_price)),
            s_dim().apply_to("avg out"),
            s_price().apply_to(format!("${:.2}", avg.average_output_price)),
        ),
    }
}

// ── Compare ──────────────────────────────────────────────────────────

async fn cmd_compare(cfg: &Config, query: &str, against: &str) -> anyhow::Result<()> {
    let catalog = load_catalog(cfg).await?;
    let find = |q: &str| {
        catalog::search_model(&catalog.authors, q)
            .ok_or_else(|| anyhow::anyhow!("model not found: {q}"))
    };
    let model = find(query)?;
    let other = find(against)?;

    let avg = model.average_prices();
    let other_avg = other.average_prices();
    let ratios = price_ratios(&avg, &other_avg);

    println!();
    println!("{}", s_header().apply_to(&model.name));
    println!("{}", sep(64));
    println!("{}", provider_table(model));
    print_averages(&avg, Some(&ratios));

    println!();
    println!("{}", s_header().apply_to(&other.name));
    println!("{}", sep(64));
    print_averages(&other_avg, None);
    println!();
    println!("{}", s_hint().apply_to(source_hint(&catalog, cfg)));
    Ok(())
}

// ── Refresh ──────────────────────────────────────────────────────────

async fn cmd_refresh(
    cfg: &Config,
    terms: Option<&std::path::Path>,
    out: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let out = match (out, &cfg.csv_source) {
        (Some(p), _) => p.to_path_buf(),
        (None, CsvSource::Path(p)) => p.clone(),
        (None, CsvSource::Url(u)) => {
            anyhow::bail!("configured CSV is a URL ({u}); pass --out to choose a file")
        }
    };
    let terms = config::load_search_terms(terms.unwrap_or(&cfg.search_terms));

    let term = Term::stderr();
    term.write_line(&format!(
        "{}",
        s_dim().apply_to(format!("querying OpenRouter for {} terms...", terms.len()))
    ))?;

    let result = OpenRouterClient::default().refresh(&terms).await?;
    opencosts_core::openrouter::write_csv(&result.rows, &out).await?;

    term.clear_last_lines(1)?;
    println!();
    println!("  {}", s_ok().apply_to("refreshed"));
    println!(
        "  {}",
        s_dim().apply_to(format!(
            "{} models \u{00b7} {} provider rows",
            result.models.len(),
            result.rows.len()
        ))
    );
    println!("  {}", s_hint().apply_to(format!("written to {}", out.display())));
    println!();
    Ok(())
}
