use httpmock::Method::GET;
use url::Url;
use yafin::{CacheMode, YfClient, YfError};

use crate::common::{self, CRUMB, RecordingSleeper};

#[tokio::test]
async fn fetches_cookie_and_crumb_before_crumbed_call() {
    let server = common::setup_server();
    let (cookie, crumb) = common::mock_cookie_crumb(&server);
    let api = server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/quote")
            .query_param("symbols", "AAPL,MSFT")
            .query_param("crumb", CRUMB);
        then.status(200)
            .header("content-type", "application/json")
            .body(common::QUOTE_OK);
    });

    let client = common::client(&server);
    let body = client
        .get_quote("AAPL, MSFT", None, CacheMode::Bypass)
        .await
        .unwrap();

    cookie.assert();
    crumb.assert();
    api.assert();
    assert_eq!(body["quoteResponse"]["result"][1]["symbol"], "MSFT");
    assert!(client.has_crumb().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_crumb_fetch() {
    let server = common::setup_server();
    let (_cookie, crumb) = common::mock_cookie_crumb(&server);
    let api = server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/AAPL")
            .query_param("crumb", CRUMB);
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"quoteSummary":{"result":[{"price":{"symbol":"AAPL"}}],"error":null}}"#);
    });

    let client = common::client(&server);
    let calls = (0..8).map(|_| {
        let c = client.clone();
        tokio::spawn(async move {
            c.get_quote_summary("AAPL", &[yafin::QuoteSummaryModule::Price], CacheMode::Bypass)
                .await
        })
    });
    for joined in futures::future::join_all(calls).await {
        joined.unwrap().unwrap();
    }

    crumb.assert_calls(1);
    api.assert_calls(8);
}

#[tokio::test]
async fn crumb_is_reused_until_close() {
    let server = common::setup_server();
    let (_cookie, crumb) = common::mock_cookie_crumb(&server);

    let client = common::client(&server);
    assert_eq!(client.crumb().await.unwrap(), CRUMB);
    assert_eq!(client.crumb().await.unwrap(), CRUMB);
    crumb.assert_calls(1);

    client.close().await;
    assert!(!client.has_crumb().await);
    assert_eq!(client.crumb().await.unwrap(), CRUMB);
    crumb.assert_calls(2);
}

#[tokio::test]
async fn html_crumb_is_an_auth_error() {
    let server = common::setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/v1/test/getcrumb");
        then.status(200)
            .body("<html><body>Too Many Requests</body></html>");
    });
    let api = server.mock(|when, then| {
        when.method(GET).path("/v7/finance/quote");
        then.status(200).body(common::QUOTE_OK);
    });

    let client = YfClient::builder()
        .base_url(Url::parse(&server.base_url()).unwrap())
        .no_cookie_bootstrap()
        .sleeper(RecordingSleeper::new())
        .build()
        .unwrap();

    let err = client
        .get_quote("AAPL", None, CacheMode::Bypass)
        .await
        .unwrap_err();

    assert!(matches!(err, YfError::Auth(_)), "{err:?}");
    assert!(!err.to_string().contains("Too Many"));
    api.assert_calls(0);
    assert!(!client.has_crumb().await);
}

#[tokio::test]
async fn cookie_bootstrap_failure_is_not_fatal() {
    let server = common::setup_server();
    let crumb = server.mock(|when, then| {
        when.method(GET).path("/v1/test/getcrumb");
        then.status(200).body(CRUMB);
    });

    // Nothing listens here, so the bootstrap request fails.
    let client = YfClient::builder()
        .base_url(Url::parse(&server.base_url()).unwrap())
        .cookie_url(Url::parse("http://127.0.0.1:1/consent").unwrap())
        .sleeper(RecordingSleeper::new())
        .build()
        .unwrap();

    assert_eq!(client.crumb().await.unwrap(), CRUMB);
    crumb.assert();
}

#[tokio::test]
async fn crumb_endpoint_errors_propagate() {
    let server = common::setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/v1/test/getcrumb");
        then.status(401);
    });

    let client = common::client(&server);
    let err = client.crumb().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn crumbless_endpoints_never_fetch_a_crumb() {
    let server = common::setup_server();
    let (cookie, crumb) = common::mock_cookie_crumb(&server);
    let chart = server.mock(|when, then| {
        when.method(GET)
            .path("/v8/finance/chart/AAPL")
            .is_true(|req| !req.query_params().iter().any(|(k, _)| k == "crumb"));
        then.status(200)
            .header("content-type", "application/json")
            .body(common::CHART_OK);
    });

    let client = common::client(&server);
    client
        .get_chart("AAPL", &yafin::ChartQuery::new(yafin::Interval::D1), CacheMode::Bypass)
        .await
        .unwrap();

    chart.assert();
    cookie.assert_calls(0);
    crumb.assert_calls(0);
}
