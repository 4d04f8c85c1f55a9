//! Request metrics keep a bounded label set under hostile paths.
//!
//! Installs the global recorder, so it lives in its own test binary.

use axum::http::StatusCode;
use faas_controller::lifecycle::startup::build_registry;
use faas_controller::Supervisor;
use metrics_exporter_prometheus::PrometheusBuilder;

mod common;

#[tokio::test]
async fn test_rejected_function_names_share_one_series() {
    let handle = PrometheusBuilder::new().install_recorder().unwrap();

    let knative = common::start_mock_knative().await;
    let port = common::free_port();
    let config = faas_controller::config::loader::parse_config(&format!(
        r#"
[[objects]]
name = "demo"
kind = "faas"

[objects.httpServer]
port = {port}
address = "127.0.0.1"
clientMaxBodySize = 16

[objects.knative]
networkLayerURL = "http://{knative}"
"#
    ))
    .unwrap();

    let mut supervisor = Supervisor::new(build_registry());
    assert!(supervisor.reconcile(&config.objects).await.is_empty());

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    for i in 0..50 {
        let res = client
            .get(format!("http://127.0.0.1:{}/Bad_Name_{}", port, i))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
    for i in 0..5 {
        let res = client
            .post(format!("http://127.0.0.1:{}/upload-{}", port, i))
            .body("x".repeat(64))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
    let res = client
        .get(format!("http://127.0.0.1:{}/hello", port))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let rendered = handle.render();
    let series: Vec<&str> = rendered
        .lines()
        .filter(|line| line.starts_with("faas_requests_total{"))
        .collect();

    assert_eq!(series.len(), 3, "{:#?}", series);
    assert!(series
        .iter()
        .any(|l| l.contains(r#"function="_invalid""#) && l.contains(r#"status="400""#) && l.ends_with(" 50")));
    assert!(series
        .iter()
        .any(|l| l.contains(r#"function="_invalid""#) && l.contains(r#"status="413""#) && l.ends_with(" 5")));
    assert!(series
        .iter()
        .any(|l| l.contains(r#"function="hello""#) && l.contains(r#"status="200""#)));
    assert!(!rendered.contains("Bad_Name"));
    assert!(!rendered.contains("upload-"));

    supervisor.close_all().await;
}
