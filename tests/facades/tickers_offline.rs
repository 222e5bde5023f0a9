use httpmock::Method::GET;
use yafin::{ChartQuery, ClientRegistry, Frequency, Interval, Tickers, YfError};

use crate::common::{self, CRUMB};

#[tokio::test]
async fn symbols_are_normalized() {
    let reg = ClientRegistry::default();
    let t = Tickers::with_registry(&reg, " aapl , MSFT,, ").unwrap();
    assert_eq!(t.symbols().collect::<Vec<_>>(), ["aapl", "MSFT"]);
    assert_eq!(t.tickers().len(), 2);

    let err = Tickers::with_registry(&reg, " , ").unwrap_err();
    assert!(matches!(err, YfError::InvalidParams(_)));
}

#[tokio::test]
async fn quote_is_one_batched_request() {
    let server = common::setup_server();
    common::mock_cookie_crumb(&server);
    let quote = server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/quote")
            .query_param("symbols", "AAPL,MSFT")
            .query_param("crumb", CRUMB);
        then.status(200)
            .header("content-type", "application/json")
            .body(common::QUOTE_OK);
    });
    let reg = ClientRegistry::new(common::config(&server));

    let t = Tickers::with_registry(&reg, "AAPL,MSFT").unwrap();
    let quotes = t.quote(None).await.unwrap();

    quote.assert();
    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[1]["regularMarketPrice"], 410.25);
}

#[tokio::test]
async fn chart_fans_out_in_symbol_order() {
    let server = common::setup_server();
    let aapl = common::mock_json(&server, "/v8/finance/chart/AAPL", common::CHART_OK);
    let msft = common::mock_json(
        &server,
        "/v8/finance/chart/MSFT",
        r#"{"chart":{"result":[{"meta":{"symbol":"MSFT"}}],"error":null}}"#,
    );
    let reg = ClientRegistry::new(common::config(&server));

    let t = Tickers::with_registry(&reg, "AAPL,MSFT").unwrap();
    let charts = t.chart(&ChartQuery::new(Interval::D1)).await.unwrap();

    aapl.assert();
    msft.assert();
    let symbols: Vec<_> = charts.iter().map(|c| c["meta"]["symbol"].clone()).collect();
    assert_eq!(symbols, ["AAPL", "MSFT"]);
}

#[tokio::test]
async fn fan_out_fails_if_any_member_fails() {
    let server = common::setup_server();
    common::mock_json(&server, "/v8/finance/chart/AAPL", common::CHART_OK);
    server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/NOPE");
        then.status(404);
    });
    let reg = ClientRegistry::new(common::config(&server));

    let t = Tickers::with_registry(&reg, "AAPL,NOPE").unwrap();
    let err = t
        .chart(&ChartQuery::new(Interval::D1))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn statements_per_symbol() {
    let server = common::setup_server();
    for sym in ["AAPL", "MSFT"] {
        common::mock_json(
            &server,
            &format!("/ws/fundamentals-timeseries/v1/finance/timeseries/{sym}"),
            r#"{"timeseries":{"result":[{"meta":{}},{"meta":{}}],"error":null}}"#,
        );
    }
    let reg = ClientRegistry::new(common::config(&server));

    let t = Tickers::with_registry(&reg, "AAPL,MSFT").unwrap();
    let rows = t
        .cash_flow(Frequency::Quarterly, None, None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.len() == 2));
}

#[tokio::test]
async fn close_releases_every_lease() {
    let server = common::setup_server();
    common::mock_json(&server, "/v8/finance/chart/AAPL", common::CHART_OK);
    common::mock_json(&server, "/v8/finance/chart/MSFT", common::CHART_OK);
    common::mock_cookie_crumb(&server);
    common::mock_json(&server, "/v7/finance/quote", common::QUOTE_OK);
    let reg = ClientRegistry::new(common::config(&server));

    let mut t = Tickers::with_registry(&reg, "AAPL,MSFT").unwrap();
    t.quote(None).await.unwrap();
    t.chart(&ChartQuery::new(Interval::D1)).await.unwrap();
    // One lease for the batch handle, one per member.
    assert_eq!(reg.refcount().await, 3);

    t.close().await;
    assert_eq!(reg.refcount().await, 0);
    assert!(reg.current().await.is_none());
}
