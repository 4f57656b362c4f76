//! Basket Report Binary
//!
//! Run with: `cargo run --bin basket-report -- prices.csv [--json]`

use basket_analytics::{
    format_basket_table, format_stats_table, run_from_source, FileFeedSource, PipelineConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level:
    //   RUST_LOG=debug cargo run --bin basket-report -- prices.csv
    //   RUST_LOG=basket_analytics::interpolation=trace ...  (gap filling decisions)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut path = None;
    let mut json = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            _ => path = Some(arg),
        }
    }

    let Some(path) = path else {
        print_usage();
        std::process::exit(2);
    };

    let config = PipelineConfig::from_env()?;
    let source = FileFeedSource::new(&path);
    let output = run_from_source(&source, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "Read {} rows from {} ({} kept, {} dropped)",
        output.summary.rows_read, path, output.summary.rows_kept, output.summary.rows_dropped
    );
    println!();
    println!("{}", format_stats_table(&output.stats));
    println!("Basket by {} (* = estimated)", config.granularity);
    println!("{}", format_basket_table(&output.basket));

    if let Some((period, total)) = output.aggregate().latest() {
        println!("Latest basket total: {} = {:.2}", period, total);
    }

    Ok(())
}

fn print_usage() {
    eprintln!("Usage: basket-report <prices.csv> [--json]");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  BASKET_GRANULARITY       quarter | year (default: quarter)");
    eprintln!("  BASKET_MODE              curated | threshold (default: curated)");
    eprintln!("  BASKET_MIN_OBSERVATIONS  threshold for threshold mode (default: 5)");
    eprintln!("  BASKET_PRODUCTS_FILE     JSON array of product names for curated mode");
}
