//! CLI definition and dispatch.

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvUniverseAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::ScreenerError;
use crate::domain::filter_parser;
use crate::domain::market::MarketCode;
use crate::domain::pipeline;
use crate::domain::schema::{normalize, schema_for};
use crate::ports::config_port::ConfigPort;
use crate::ports::universe_port::UniversePort;

#[derive(Parser, Debug)]
#[command(name = "finscreen", about = "Natural-language stock screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a screen and print matching tickers
    Screen {
        /// Free-text query, e.g. "tech companies with market cap above 1 billion"
        query: String,
        #[arg(short, long, default_value = "US")]
        market: MarketCode,
        #[arg(short, long)]
        config: PathBuf,
        /// Override the configured universe CSV for the chosen market
        #[arg(short, long)]
        universe: Option<PathBuf>,
    },
    /// Compile a query and print its canonical filter expression
    Explain {
        query: String,
        #[arg(short, long, default_value = "US")]
        market: MarketCode,
    },
    /// List the screenable fields for a market
    Fields {
        #[arg(short, long, default_value = "US")]
        market: MarketCode,
    },
    /// Validate a canonical filter expression against a market schema
    Validate {
        expression: String,
        #[arg(short, long, default_value = "US")]
        market: MarketCode,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Screen {
            query,
            market,
            config,
            universe,
        } => run_screen(&query, market, &config, universe),
        Command::Explain { query, market } => run_explain(&query, market),
        Command::Fields { market } => run_fields(market),
        Command::Validate { expression, market } => run_validate(&expression, market),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = ScreenerError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Resolve the universe adapter for a market from config plus an optional
/// path override.
pub fn build_universe_adapter(
    market: MarketCode,
    config: &dyn ConfigPort,
    path_override: Option<PathBuf>,
) -> Result<CsvUniverseAdapter, ScreenerError> {
    let key = market.as_str().to_lowercase();
    let path = match path_override {
        Some(p) => p,
        None => config
            .get_string("universe", &key)
            .map(PathBuf::from)
            .ok_or_else(|| ScreenerError::ConfigMissing {
                section: "universe".into(),
                key,
            })?,
    };

    let as_of = match config.get_string("universe", "as_of") {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
            ScreenerError::ConfigParse {
                file: "[universe] as_of".into(),
                reason: format!("invalid date '{}' (expected YYYY-MM-DD)", s),
            }
        })?,
        None => Utc::now().date_naive(),
    };

    Ok(CsvUniverseAdapter::new(as_of).with_market(market, path))
}

fn run_screen(
    query: &str,
    market: MarketCode,
    config_path: &PathBuf,
    universe_override: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let adapter = match build_universe_adapter(market, &config, universe_override) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let universe = match adapter.securities_for(market) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!(
        "Screening {} securities on {} (as of {})",
        universe.len(),
        market,
        universe.as_of
    );

    let tickers = match pipeline::screen(query, market, &universe) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for ticker in &tickers {
        println!("{}", ticker);
    }
    eprintln!("{} matches", tickers.len());
    ExitCode::SUCCESS
}

fn run_explain(query: &str, market: MarketCode) -> ExitCode {
    match pipeline::compile(query, market) {
        Ok(expr) => {
            println!("{}", expr);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_fields(market: MarketCode) -> ExitCode {
    let schema = schema_for(market);
    for field in schema.fields() {
        let Some(spec) = schema.spec(field) else {
            continue;
        };
        match spec.currency {
            Some(currency) => println!("{}  {} ({})", field.name(), spec.kind, currency),
            None => println!("{}  {}", field.name(), spec.kind),
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(expression: &str, market: MarketCode) -> ExitCode {
    let expr = match filter_parser::parse(expression) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("error: {}", e.display_with_context(expression));
            return (&ScreenerError::from(e)).into();
        }
    };

    match normalize(&expr, schema_for(market)) {
        Ok(normalized) => {
            eprintln!("Expression is valid for {}", market);
            println!("{}", normalized);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
