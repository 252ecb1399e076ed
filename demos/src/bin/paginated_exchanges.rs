//! Demo 2: Paginated Exchange Crawl
//!
//! Showcases: open page ranges resolved from response headers, progress hooks
//!
//! Run: cargo run --bin paginated_exchanges

use coingecko_sdk::prelude::*;
use colored::*;
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "═".repeat(60).cyan());
    println!("{}", "  PAGINATED EXCHANGE CRAWL".cyan().bold());
    println!("{}", "  CoinGecko SDK Demo - Header-driven Pagination".cyan());
    println!("{}", "═".repeat(60).cyan());
    println!();

    let hooks = Hooks::new()
        .on_page_range_resolved(|info| {
            println!(
                "  {} {}: {} items at {} per page, pages {}..={}",
                "→".blue(),
                info.qid,
                info.total,
                info.per_page,
                info.page_start,
                info.page_end
            );
        })
        .on_progress(|progress| {
            println!(
                "  {} {:>3}% ({}/{})",
                "…".dimmed(),
                progress.percent,
                progress.completed,
                progress.total
            );
        });

    let mut client = CoinGeckoClient::builder()
        .with_exp_limit(6)
        .with_progress_interval(20)
        .with_hooks(hooks)
        .build()?;

    // page_end omitted: the last page is read from the Per-Page/Total headers
    client
        .exchanges(CallArgs::new().qid("exchanges").kwarg("per_page", 250).page_start(1))
        .await?;

    let start = Instant::now();
    let results = client.execute_queued().await?;
    let pages = results.pages("exchanges").unwrap_or_default();

    let exchanges: Vec<&Value> = pages.iter().filter_map(Value::as_array).flatten().collect();
    println!();
    println!(
        "{} Fetched {} exchanges over {} pages in {:.1}s",
        "✓".green(),
        exchanges.len(),
        pages.len(),
        start.elapsed().as_secs_f64()
    );

    let mut ranked: Vec<(&str, f64)> = exchanges
        .iter()
        .filter_map(|e| Some((e["name"].as_str()?, e["trade_volume_24h_btc"].as_f64()?)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    println!("\n{}", "  TOP 10 BY 24H VOLUME (BTC)".yellow().bold());
    for (name, volume) in ranked.iter().take(10) {
        println!("  {:<30} {:>14.2}", name, volume);
    }

    Ok(())
}
