use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::GET;
use url::Url;
use yafin::{Backoff, CacheMode, ChartQuery, Interval, RetryConfig, YfClient, YfError};

use crate::common::{self, RecordingSleeper};

fn daily() -> ChartQuery {
    ChartQuery::new(Interval::D1)
}

#[tokio::test]
async fn recovers_after_two_server_errors() {
    let server = Arc::new(common::setup_server());

    server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/AAPL");
        then.status(500).body("Internal Server Error");
    });

    // After the second backoff, swap the failing mock for a healthy one.
    let swap = server.clone();
    let sleeper = RecordingSleeper::with_hook(move |n| {
        if n == 2 {
            swap.reset();
            swap.mock(|when, then| {
                when.method(GET).path("/v8/finance/chart/AAPL");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(common::CHART_OK);
            });
        }
    });

    let client = common::builder(&server, &sleeper).build().unwrap();
    let body = client
        .get_chart("AAPL", &daily(), CacheMode::Bypass)
        .await
        .unwrap();

    assert_eq!(body["chart"]["result"][0]["meta"]["symbol"], "AAPL");
    assert_eq!(sleeper.secs(), [2, 4]);
}

#[tokio::test]
async fn persistent_5xx_exhausts_budget_with_exponential_delays() {
    let server = common::setup_server();
    let fail = server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/AAPL");
        then.status(503).body("Service Unavailable");
    });

    let sleeper = RecordingSleeper::new();
    let client = common::builder(&server, &sleeper).build().unwrap();

    let err = client
        .get_chart("AAPL", &daily(), CacheMode::Bypass)
        .await
        .unwrap_err();

    fail.assert_calls(5);
    // No wait after the final attempt.
    assert_eq!(sleeper.secs(), [2, 4, 8, 16]);
    match &err {
        YfError::RetriesExhausted {
            attempts,
            last_status,
        } => {
            assert_eq!(*attempts, 5);
            assert_eq!(*last_status, Some(503));
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
    assert_eq!(err.to_string(), "All 5 requests failed.");
    assert!(err.is_http());
}

#[tokio::test]
async fn rate_limit_is_retried() {
    let server = common::setup_server();
    let limited = server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/AAPL");
        then.status(429).body("Too Many Requests");
    });

    let sleeper = RecordingSleeper::new();
    let client = common::builder(&server, &sleeper)
        .max_retries(3)
        .build()
        .unwrap();

    let err = client
        .get_chart("AAPL", &daily(), CacheMode::Bypass)
        .await
        .unwrap_err();

    limited.assert_calls(3);
    assert_eq!(err.status(), Some(429));
    assert_eq!(sleeper.secs(), [2, 4]);
}

#[tokio::test]
async fn not_found_fails_at_once() {
    let server = common::setup_server();
    let missing = server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/NOPE");
        then.status(404).body("Not Found");
    });

    let sleeper = RecordingSleeper::new();
    let client = common::builder(&server, &sleeper).build().unwrap();

    let err = client
        .get_chart("NOPE", &daily(), CacheMode::Bypass)
        .await
        .unwrap_err();

    missing.assert_calls(1);
    assert!(sleeper.delays().is_empty());
    match err {
        YfError::Status { status, url } => {
            assert_eq!(status, 404);
            assert!(url.contains("/v8/finance/chart/NOPE"), "{url}");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn timeouts_are_retried() {
    let server = common::setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/SLOW");
        then.status(200)
            .delay(Duration::from_millis(500))
            .body(common::CHART_OK);
    });

    let sleeper = RecordingSleeper::new();
    let client = common::builder(&server, &sleeper)
        .timeout(Duration::from_millis(50))
        .max_retries(2)
        .build()
        .unwrap();

    let err = client
        .get_chart("SLOW", &daily(), CacheMode::Bypass)
        .await
        .unwrap_err();

    match err {
        YfError::RetriesExhausted {
            attempts,
            last_status,
        } => {
            assert_eq!(attempts, 2);
            assert_eq!(last_status, None);
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
    assert_eq!(sleeper.delays().len(), 1);
}

#[tokio::test]
async fn connect_errors_fail_fast_unless_opted_in() {
    let dead = Url::parse("http://127.0.0.1:1/").unwrap();

    let sleeper = RecordingSleeper::new();
    let client = YfClient::builder()
        .base_url(dead.clone())
        .sleeper(sleeper.clone())
        .build()
        .unwrap();
    let err = client
        .get_chart("AAPL", &daily(), CacheMode::Bypass)
        .await
        .unwrap_err();
    assert!(matches!(err, YfError::Http(_)), "{err:?}");
    assert!(sleeper.delays().is_empty());

    let sleeper = RecordingSleeper::new();
    let client = YfClient::builder()
        .base_url(dead)
        .retry_on_connect(true)
        .max_retries(3)
        .sleeper(sleeper.clone())
        .build()
        .unwrap();
    let err = client
        .get_chart("AAPL", &daily(), CacheMode::Bypass)
        .await
        .unwrap_err();
    assert!(matches!(err, YfError::RetriesExhausted { attempts: 3, .. }), "{err:?}");
    assert_eq!(sleeper.delays().len(), 2);
}

#[tokio::test]
async fn custom_retry_config_is_honoured() {
    let server = common::setup_server();
    let fail = server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/AAPL");
        then.status(502);
    });

    let cfg = RetryConfig {
        max_retries: 3,
        backoff: Backoff::Fixed(Duration::from_millis(7)),
        ..RetryConfig::default()
    };
    let sleeper = RecordingSleeper::new();
    let client = common::builder(&server, &sleeper)
        .retry_config(cfg)
        .build()
        .unwrap();

    let _ = client.get_chart("AAPL", &daily(), CacheMode::Bypass).await;

    fail.assert_calls(3);
    assert_eq!(sleeper.delays(), [Duration::from_millis(7); 2]);
}
