use yafin::blocking::{Ticker, Tickers};
use yafin::{CacheMode, ChartQuery, Interval, Range, YfClient};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // A blocking client from the same builder the async client uses.
    let client = YfClient::builder().max_retries(3).build_blocking()?;
    {
        // The session stays open for the guard's lifetime.
        let session = client.session()?;
        let trending = session.get_trending(CacheMode::Use)?;
        println!("--- Trending ---");
        if let Some(quotes) = trending["finance"]["result"][0]["quotes"].as_array() {
            for q in quotes.iter().take(5) {
                println!("  {}", q["symbol"]);
            }
        }
    }
    println!("session open after guard: {}", client.is_open());
    println!();

    // Facades backed by the process-wide blocking registry.
    let mut spy = Ticker::new("SPY");
    let chart = spy.chart(&ChartQuery::new(Interval::D1).range(Range::M1))?;
    println!("SPY currency: {}", chart["meta"]["currency"]);
    spy.close();

    let mut pair = Tickers::new("KO,PEP")?;
    for q in pair.quote(None)? {
        println!("  {}: {}", q["symbol"], q["regularMarketPrice"]);
    }
    pair.close();
    Ok(())
}
