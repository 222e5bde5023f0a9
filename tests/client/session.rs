use httpmock::Method::GET;
use yafin::{CacheMode, ChartQuery, Interval, YfError};

use crate::common;

#[tokio::test]
async fn session_opens_lazily_and_reopens_after_close() {
    let server = common::setup_server();
    let chart = common::mock_json(&server, "/v8/finance/chart/AAPL", common::CHART_OK);

    let client = common::client(&server);
    assert!(!client.is_open().await);

    let q = ChartQuery::new(Interval::D1);
    client.get_chart("AAPL", &q, CacheMode::Bypass).await.unwrap();
    assert!(client.is_open().await);

    client.close().await;
    client.close().await;
    assert!(!client.is_open().await);

    client.get_chart("AAPL", &q, CacheMode::Bypass).await.unwrap();
    assert!(client.is_open().await);
    chart.assert_calls(2);
}

#[tokio::test]
async fn scoped_closes_on_success_and_on_error() {
    let server = common::setup_server();
    common::mock_json(&server, "/v8/finance/chart/AAPL", common::CHART_OK);
    server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/GONE");
        then.status(404);
    });

    let client = common::client(&server);
    let q = ChartQuery::new(Interval::D1);

    let body = client
        .scoped(|c| async move { c.get_chart("AAPL", &q, CacheMode::Bypass).await })
        .await
        .unwrap();
    assert_eq!(body["chart"]["result"][0]["meta"]["currency"], "USD");
    assert!(!client.is_open().await);

    let q = ChartQuery::new(Interval::D1);
    let err = client
        .scoped(|c| async move { c.get_chart("GONE", &q, CacheMode::Bypass).await })
        .await
        .unwrap_err();
    assert!(matches!(err, YfError::Status { status: 404, .. }));
    assert!(!client.is_open().await);
}

#[tokio::test]
async fn clones_share_one_session() {
    let server = common::setup_server();
    let client = common::client(&server);
    let other = client.clone();

    client.ensure_open().await.unwrap();
    assert!(other.is_open().await);

    other.close().await;
    assert!(!client.is_open().await);
    assert!(client.ptr_eq(&other));
}

#[tokio::test]
async fn invalid_builder_settings_are_rejected() {
    let err = yafin::YfClient::builder().max_retries(0).build().unwrap_err();
    assert!(matches!(err, YfError::InvalidParams(_)));

    let err = yafin::YfClient::builder()
        .timeout(std::time::Duration::ZERO)
        .build()
        .unwrap_err();
    assert!(matches!(err, YfError::InvalidParams(_)));
}
