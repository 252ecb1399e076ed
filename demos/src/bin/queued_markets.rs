//! Demo 1: Queued Market Snapshot
//!
//! Showcases: qid queueing, bounded page ranges, one batch for many calls
//!
//! Run: cargo run --bin queued_markets

use coingecko_sdk::prelude::*;
use colored::*;

const COINS: [&str; 4] = ["bitcoin", "ethereum", "solana", "cardano"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "═".repeat(60).cyan());
    println!("{}", "  QUEUED MARKET SNAPSHOT".cyan().bold());
    println!("{}", "  CoinGecko SDK Demo - Batched Requests".cyan());
    println!("{}", "═".repeat(60).cyan());
    println!();

    let hooks = Hooks::new().on_rate_limited(|attempt, delay| {
        println!("  {} rate limited (attempt {}), waiting {:?}", "!".yellow(), attempt, delay);
    });
    let mut client = CoinGeckoClient::builder()
        .with_log_level(tracing::Level::INFO)
        .with_hooks(hooks)
        .build()?;

    client
        .simple_price(&COINS, &["usd", "eur"], CallArgs::new().qid("prices"))
        .await?;
    client
        .coins_markets(
            "usd",
            CallArgs::new()
                .qid("top")
                .kwarg("per_page", 10)
                .page_start(1)
                .page_end(2),
        )
        .await?;
    for coin in COINS {
        client
            .coin_tickers(coin, CallArgs::new().qid(format!("tickers:{}", coin)))
            .await?;
    }

    println!("{} Queued {} calls", "✓".green(), client.queued_calls());
    let results = client.execute_queued().await?;
    println!("{} Batch finished, {} results\n", "✓".green(), results.len());

    if let Some(prices) = results.single("prices") {
        println!("{}", "  SPOT PRICES".yellow().bold());
        for coin in COINS {
            let usd = prices[coin]["usd"].as_f64().unwrap_or_default();
            let eur = prices[coin]["eur"].as_f64().unwrap_or_default();
            println!("  {:<10} ${:>12.2}  €{:>12.2}", coin, usd, eur);
        }
        println!();
    }

    if let Some(pages) = results.pages("top") {
        println!("{}", "  TOP 20 BY MARKET CAP".yellow().bold());
        let rows = pages.iter().filter_map(Value::as_array).flatten();
        for row in rows {
            println!(
                "  {:>3}. {:<12} ${:>12.2}",
                row["market_cap_rank"].as_u64().unwrap_or_default(),
                row["symbol"].as_str().unwrap_or("?").to_uppercase(),
                row["current_price"].as_f64().unwrap_or_default()
            );
        }
        println!();
    }

    println!("{}", "  TICKER COUNTS".yellow().bold());
    for coin in COINS {
        let count = results
            .single(&format!("tickers:{}", coin))
            .and_then(|body| body["tickers"].as_array())
            .map_or(0, Vec::len);
        println!("  {:<10} {} tickers", coin, count);
    }

    Ok(())
}
