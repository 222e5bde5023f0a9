use httpmock::Method::GET;
use yafin::{
    CacheMode, CalendarModule, ChartEvent, ChartQuery, Interval, QuoteSummaryModule, Range, YfError,
};

use crate::common::{self, CRUMB};

const EMPTY: &str = "{}";

#[tokio::test]
async fn chart_sends_query_parameters() {
    let server = common::setup_server();
    let chart = server.mock(|when, then| {
        when.method(GET)
            .path("/v8/finance/chart/MSFT")
            .query_param("interval", "1wk")
            .query_param("range", "1y")
            .query_param("events", "div,split")
            .query_param("includePrePost", "true")
            .query_param("region", "US")
            .query_param("lang", "en-US")
            .query_param("corsDomain", "finance.yahoo.com");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::CHART_OK);
    });

    let q = ChartQuery::new(Interval::W1)
        .range(Range::Y1)
        .include_pre_post(true)
        .events([ChartEvent::Dividends, ChartEvent::Splits]);
    common::client(&server)
        .get_chart("MSFT", &q, CacheMode::Bypass)
        .await
        .unwrap();
    chart.assert();
}

#[tokio::test]
async fn chart_window_must_be_ordered() {
    let server = common::setup_server();
    let q = ChartQuery::new(Interval::D1).between(200, 100);
    let err = common::client(&server)
        .get_chart("AAPL", &q, CacheMode::Bypass)
        .await
        .unwrap_err();
    assert!(matches!(err, YfError::InvalidParams(_)));
}

#[tokio::test]
async fn quote_type_uses_trailing_slash() {
    let server = common::setup_server();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/finance/quoteType/")
            .query_param("symbol", "AAPL,MSFT");
        then.status(200).body(EMPTY);
    });

    common::client(&server)
        .get_quote_type("AAPL,MSFT", CacheMode::Bypass)
        .await
        .unwrap();
    m.assert();
}

#[tokio::test]
async fn quote_summary_joins_modules_and_attaches_crumb() {
    let server = common::setup_server();
    common::mock_cookie_crumb(&server);
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/AAPL")
            .query_param("modules", "price,summaryDetail")
            .query_param("crumb", CRUMB);
        then.status(200).body(EMPTY);
    });

    let modules = [
        QuoteSummaryModule::Price,
        QuoteSummaryModule::SummaryDetail,
        QuoteSummaryModule::Price,
    ];
    common::client(&server)
        .get_quote_summary("AAPL", &modules, CacheMode::Bypass)
        .await
        .unwrap();
    m.assert();
}

#[tokio::test]
async fn timeseries_defaults_its_window() {
    let server = common::setup_server();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/ws/fundamentals-timeseries/v1/finance/timeseries/AAPL")
            .query_param("type", "annualTotalRevenue,quarterlyNetIncome")
            .query_param("period1", "1577836800")
            .query_param_exists("period2");
        then.status(200).body(EMPTY);
    });

    common::client(&server)
        .get_timeseries(
            "AAPL",
            "annualTotalRevenue, quarterlyNetIncome",
            None,
            None,
            CacheMode::Bypass,
        )
        .await
        .unwrap();
    m.assert();
}

#[tokio::test]
async fn options_and_search() {
    let server = common::setup_server();
    common::mock_cookie_crumb(&server);
    let options = server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/options/AAPL")
            .query_param("crumb", CRUMB);
        then.status(200).body(EMPTY);
    });
    let search = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/finance/search")
            .query_param("q", "apple");
        then.status(200).body(EMPTY);
    });

    let client = common::client(&server);
    client.get_options("AAPL", CacheMode::Bypass).await.unwrap();
    client.get_search(" apple ", CacheMode::Bypass).await.unwrap();
    options.assert();
    search.assert();

    let err = client.get_search("  ", CacheMode::Bypass).await.unwrap_err();
    assert!(matches!(err, YfError::InvalidParams(_)));
}

#[tokio::test]
async fn recommendations_insights_and_ratings() {
    let server = common::setup_server();
    let recs = server.mock(|when, then| {
        when.method(GET)
            .path("/v6/finance/recommendationsbysymbol/AAPL,MSFT");
        then.status(200).body(EMPTY);
    });
    let insights = server.mock(|when, then| {
        when.method(GET)
            .path("/ws/insights/v3/finance/insights")
            .query_param("symbols", "AAPL");
        then.status(200).body(EMPTY);
    });
    let ratings = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/ratings/top/AAPL")
            .query_param("exclude_noncurrent", "true");
        then.status(200).body(EMPTY);
    });

    let client = common::client(&server);
    client
        .get_recommendations("AAPL,MSFT", CacheMode::Bypass)
        .await
        .unwrap();
    client.get_insights("AAPL", CacheMode::Bypass).await.unwrap();
    client.get_ratings("AAPL", CacheMode::Bypass).await.unwrap();
    recs.assert();
    insights.assert();
    ratings.assert();
}

#[tokio::test]
async fn market_wide_endpoints() {
    let server = common::setup_server();
    let summaries = common::mock_json(&server, "/v6/finance/quote/marketSummary", EMPTY);
    let trending = common::mock_json(&server, "/v1/finance/trending/US", EMPTY);
    let currencies = common::mock_json(&server, "/v1/finance/currencies", EMPTY);

    let client = common::client(&server);
    client.get_market_summaries(CacheMode::Bypass).await.unwrap();
    client.get_trending(CacheMode::Bypass).await.unwrap();
    client.get_currencies(CacheMode::Bypass).await.unwrap();
    summaries.assert();
    trending.assert();
    currencies.assert();
}

#[tokio::test]
async fn calendar_events_window() {
    let server = common::setup_server();
    let end: i64 = 1_700_000_000_000;
    let start = end - 149 * 86_400_000;
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/ws/screeners/v1/finance/calendar-events")
            .query_param("modules", "earnings,ipoEvents")
            .query_param("startDate", start.to_string())
            .query_param("endDate", end.to_string());
        then.status(200).body(EMPTY);
    });

    let client = common::client(&server);
    client
        .get_calendar_events(
            &[CalendarModule::Earnings, CalendarModule::IpoEvents],
            None,
            Some(end),
            CacheMode::Bypass,
        )
        .await
        .unwrap();
    m.assert();

    let too_long = end - 151 * 86_400_000;
    let err = client
        .get_calendar_events(&[], Some(too_long), Some(end), CacheMode::Bypass)
        .await
        .unwrap_err();
    assert!(matches!(err, YfError::InvalidParams(_)));
}

#[tokio::test]
async fn invalid_symbols_are_rejected_before_sending() {
    let server = common::setup_server();
    let any = server.mock(|when, then| {
        when.method(GET);
        then.status(200).body(EMPTY);
    });

    let client = common::client(&server);
    let q = ChartQuery::new(Interval::D1);
    assert!(client.get_chart("", &q, CacheMode::Bypass).await.is_err());
    assert!(client.get_chart("A,B", &q, CacheMode::Bypass).await.is_err());
    assert!(client.get_quote(" , ", None, CacheMode::Bypass).await.is_err());
    any.assert_calls(0);
}

#[tokio::test]
async fn non_json_body_is_a_json_error() {
    let server = common::setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/v1/finance/currencies");
        then.status(200).body("<html>oops</html>");
    });

    let err = common::client(&server)
        .get_currencies(CacheMode::Bypass)
        .await
        .unwrap_err();
    assert!(matches!(err, YfError::Json(_)));
}
