use std::time::Duration;

use yafin::{
    Backoff, CacheMode, ChartEvent, ChartQuery, Interval, QuoteSummaryModule, Range, YfClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1. A client with a short timeout and a gentler backoff than the default.
    let client = YfClient::builder()
        .timeout(Duration::from_secs(10))
        .max_retries(3)
        .backoff(Backoff::Fixed(Duration::from_millis(500)))
        .build()?;

    // 2. Batched quotes. The crumb is fetched on first use.
    let quotes = client
        .get_quote("AAPL,MSFT,NVDA", None, CacheMode::Use)
        .await?;
    println!("--- Quotes ---");
    if let Some(rows) = quotes["quoteResponse"]["result"].as_array() {
        for q in rows {
            println!("  {}: {}", q["symbol"], q["regularMarketPrice"]);
        }
    }
    println!();

    // 3. Six months of daily bars with dividends.
    let query = ChartQuery::new(Interval::D1)
        .range(Range::M6)
        .events([ChartEvent::Dividends]);
    let chart = client.get_chart("AAPL", &query, CacheMode::Use).await?;
    let bars = chart["chart"]["result"][0]["timestamp"]
        .as_array()
        .map_or(0, Vec::len);
    println!("--- AAPL chart: {bars} daily bars ---");

    // The same call again is served from the result cache.
    client.get_chart("AAPL", &query, CacheMode::Use).await?;
    println!("cached results: {}", client.cached_results());
    println!();

    // 4. A couple of quoteSummary modules.
    let summary = client
        .get_quote_summary(
            "MSFT",
            &[QuoteSummaryModule::Price, QuoteSummaryModule::SummaryDetail],
            CacheMode::Use,
        )
        .await?;
    let price = &summary["quoteSummary"]["result"][0]["price"];
    println!("--- MSFT ---");
    println!("Name: {}", price["longName"]);
    println!("Exchange: {}", price["exchangeName"]);

    client.close().await;
    Ok(())
}
