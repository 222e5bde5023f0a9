use httpmock::Method::GET;
use yafin::{
    CacheMode, ChartQuery, ClientRegistry, Frequency, Interval, QuoteSummaryModule, Ticker,
    YfError,
};

use crate::common::{self, CRUMB};

const SUMMARY: &str = r#"{
  "quoteSummary": {
    "result": [{
      "price": { "symbol": "AAPL", "regularMarketPrice": 190.5 },
      "recommendationTrend": { "trend": [{ "period": "0m", "strongBuy": 11 }], "maxAge": 86400 },
      "insiderHolders": { "holders": [] }
    }],
    "error": null
  }
}"#;

fn registry(server: &httpmock::MockServer) -> ClientRegistry {
    ClientRegistry::new(common::config(server))
}

#[tokio::test]
async fn chart_unwraps_the_first_result() {
    let server = common::setup_server();
    common::mock_json(&server, "/v8/finance/chart/AAPL", common::CHART_OK);
    let reg = registry(&server);

    let t = Ticker::with_registry(&reg, "AAPL");
    assert!(!t.is_attached());
    let chart = t.chart(&ChartQuery::new(Interval::D1)).await.unwrap();

    assert_eq!(chart["meta"]["symbol"], "AAPL");
    assert!(t.is_attached());
    assert_eq!(reg.refcount().await, 1);
}

#[tokio::test]
async fn quote_summary_module_strips_list_wrappers() {
    let server = common::setup_server();
    common::mock_cookie_crumb(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/AAPL")
            .query_param("crumb", CRUMB);
        then.status(200)
            .header("content-type", "application/json")
            .body(SUMMARY);
    });
    let reg = registry(&server);
    let t = Ticker::with_registry(&reg, "AAPL");

    let trend = t.recommendation_trend().await.unwrap();
    assert_eq!(trend[0]["strongBuy"], 11);

    let price = t.price().await.unwrap();
    assert_eq!(price["regularMarketPrice"], 190.5);

    let holders = t.insider_holders().await.unwrap();
    assert_eq!(holders, serde_json::json!([]));

    let err = t.asset_profile().await.unwrap_err();
    assert!(matches!(err, YfError::MissingData(_)), "{err:?}");
}

#[tokio::test]
async fn empty_module_list_requests_every_module() {
    let server = common::setup_server();
    common::mock_cookie_crumb(&server);
    let all = QuoteSummaryModule::ALL
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/AAPL")
            .query_param("modules", all);
        then.status(200)
            .header("content-type", "application/json")
            .body(SUMMARY);
    });
    let reg = registry(&server);

    let summary = Ticker::with_registry(&reg, "AAPL")
        .quote_summary(&[])
        .await
        .unwrap();
    m.assert();
    assert!(summary.get("price").is_some());
}

#[tokio::test]
async fn yahoo_error_description_is_surfaced() {
    let server = common::setup_server();
    common::mock_json(
        &server,
        "/v8/finance/chart/NOPE",
        r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
    );
    let reg = registry(&server);

    let err = Ticker::with_registry(&reg, "NOPE")
        .chart(&ChartQuery::new(Interval::D1))
        .await
        .unwrap_err();
    match err {
        YfError::MissingData(msg) => assert!(msg.contains("delisted"), "{msg}"),
        other => panic!("expected MissingData, got {other:?}"),
    }
}

#[tokio::test]
async fn statements_go_through_the_timeseries_endpoint() {
    let server = common::setup_server();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/ws/fundamentals-timeseries/v1/finance/timeseries/AAPL")
            .query_param("period1", "1600000000")
            .query_param("period2", "1700000000");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"timeseries":{"result":[{"meta":{"type":["annualTotalRevenue"]}}],"error":null}}"#);
    });
    let reg = registry(&server);
    let t = Ticker::with_registry(&reg, "AAPL");

    let rows = t
        .income_statement(Frequency::Annual, Some(1_600_000_000), Some(1_700_000_000))
        .await
        .unwrap();
    m.assert();
    assert_eq!(rows.len(), 1);

    let err = t
        .balance_sheet(Frequency::Trailing, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, YfError::InvalidParams(_)));
}

#[tokio::test]
async fn close_releases_the_lease_and_later_calls_reattach() {
    let server = common::setup_server();
    let chart = common::mock_json(&server, "/v8/finance/chart/AAPL", common::CHART_OK);
    let reg = registry(&server);

    let mut t = Ticker::with_registry(&reg, "AAPL").cache_mode(CacheMode::Bypass);
    let q = ChartQuery::new(Interval::D1);
    t.chart(&q).await.unwrap();

    t.close().await;
    t.close().await;
    assert!(!t.is_attached());
    assert_eq!(reg.refcount().await, 0);

    t.chart(&q).await.unwrap();
    assert_eq!(reg.refcount().await, 1);
    chart.assert_calls(2);
}

#[tokio::test]
async fn tickers_on_one_registry_share_the_client_cache() {
    let server = common::setup_server();
    let chart = common::mock_json(&server, "/v8/finance/chart/AAPL", common::CHART_OK);
    let reg = registry(&server);

    let a = Ticker::with_registry(&reg, "AAPL");
    let b = Ticker::with_registry(&reg, "AAPL");
    let q = ChartQuery::new(Interval::D1);
    a.chart(&q).await.unwrap();
    b.chart(&q).await.unwrap();

    chart.assert_calls(1);
    assert_eq!(reg.refcount().await, 2);
}

#[tokio::test]
async fn raw_endpoints_are_returned_as_is() {
    let server = common::setup_server();
    common::mock_json(
        &server,
        "/v2/ratings/top/AAPL",
        r#"{"AAPL":{"dir":{"score":0.5}}}"#,
    );
    common::mock_json(
        &server,
        "/ws/insights/v3/finance/insights",
        r#"{"finance":{"result":[{"symbol":"AAPL","instrumentInfo":{}}],"error":null}}"#,
    );
    let reg = registry(&server);
    let t = Ticker::with_registry(&reg, "AAPL");

    let ratings = t.ratings().await.unwrap();
    assert_eq!(ratings["AAPL"]["dir"]["score"], 0.5);

    let insights = t.insights().await.unwrap();
    assert_eq!(insights["symbol"], "AAPL");
}

#[tokio::test]
async fn closing_one_ticker_leaves_the_other_open() {
    let server = common::setup_server();
    common::mock_json(&server, "/v8/finance/chart/AAPL", common::CHART_OK);
    common::mock_json(&server, "/v8/finance/chart/MSFT", common::CHART_OK);
    let reg = registry(&server);
    let q = ChartQuery::new(Interval::D1);

    let mut a = Ticker::with_registry(&reg, "AAPL");
    let mut b = Ticker::with_registry(&reg, "MSFT");
    a.chart(&q).await.unwrap();
    b.chart(&q).await.unwrap();
    let shared = reg.current().await.unwrap();

    a.close().await;
    assert!(shared.is_open().await);
    b.chart(&q).await.unwrap();

    b.close().await;
    assert!(!shared.is_open().await);
    assert!(reg.current().await.is_none());
}
