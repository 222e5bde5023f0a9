use yafin::{ChartQuery, ClientRegistry, Frequency, Interval, Range, Ticker, Tickers};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Every facade built on this registry shares one client, one cookie jar
    // and one crumb.
    let registry = ClientRegistry::default();

    let mut aapl = Ticker::with_registry(&registry, "AAPL");
    let price = aapl.price().await?;
    println!(
        "{} ({}): {}",
        price["symbol"], price["currency"], price["regularMarketPrice"]
    );

    let trend = aapl.recommendation_trend().await?;
    println!("recommendation periods: {}", trend.as_array().map_or(0, Vec::len));

    let income = aapl.income_statement(Frequency::Annual, None, None).await?;
    println!("income statement series: {}", income.len());
    println!("live leases: {}", registry.refcount().await);
    println!();

    // Quotes are batched into one request; charts fan out concurrently.
    let mut big_tech = Tickers::with_registry(&registry, "MSFT, GOOG, AMZN")?;
    for q in big_tech.quote(None).await? {
        println!("  {:<5} {}", q["symbol"].as_str().unwrap_or("?"), q["regularMarketPrice"]);
    }

    let query = ChartQuery::new(Interval::W1).range(Range::Y1);
    let charts = big_tech.chart(&query).await?;
    for (sym, chart) in big_tech.symbols().zip(&charts) {
        let closes = chart["indicators"]["quote"][0]["close"]
            .as_array()
            .map_or(0, Vec::len);
        println!("  {sym}: {closes} weekly closes");
    }
    println!("live leases: {}", registry.refcount().await);

    // The client is closed once the last lease is given back.
    aapl.close().await;
    big_tech.close().await;
    println!("live leases after close: {}", registry.refcount().await);
    Ok(())
}
