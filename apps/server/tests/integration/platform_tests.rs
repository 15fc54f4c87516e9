//! Public platform endpoints through the actix service.

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::json;

use finsight_lib::api::{UploadLimit, configure_platform_routes};

macro_rules! platform_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(UploadLimit(10 * 1024 * 1024)))
                .service(web::scope("/api/v1").configure(configure_platform_routes)),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_capabilities_report_limit_and_types() {
    let app = platform_app!();
    let req = test::TestRequest::get()
        .uri("/api/v1/platform/capabilities")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["ingestion"]["recommendedSingleUploadLimitMb"], 10);
    let types = body["ingestion"]["acceptedTypes"].as_array().unwrap();
    assert!(types.contains(&json!("application/pdf")));
    assert!(types.contains(&json!("text/csv")));
}

#[actix_rt::test]
async fn test_providers_are_listed() {
    let app = platform_app!();
    let req = test::TestRequest::get()
        .uri("/api/v1/platform/providers")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let providers = body.as_array().unwrap();
    assert!(!providers.is_empty());
    assert!(providers.iter().all(|p| p["id"].is_string() && p["category"].is_string()));
}

#[actix_rt::test]
async fn test_statistics_over_mixed_rows() {
    let app = platform_app!();
    let req = test::TestRequest::post()
        .uri("/api/v1/platform/statistics")
        .set_json(json!({
            "rows": [
                {"revenue": 10, "region": "EU"},
                {"revenue": "20", "region": "US"},
                {"revenue": "n/a"},
                {"revenue": null},
                {"revenue": 30}
            ],
            "numericColumns": ["revenue", "region"]
        }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let stats = body["statistics"].as_array().unwrap();
    assert_eq!(stats.len(), 2);

    assert_eq!(stats[0]["column"], "revenue");
    assert_eq!(stats[0]["count"], 3);
    assert_eq!(stats[0]["min"], 10.0);
    assert_eq!(stats[0]["max"], 30.0);
    assert_eq!(stats[0]["mean"], 20.0);
    assert_eq!(stats[0]["median"], 20.0);
    assert_eq!(stats[0]["standardDeviation"], 10.0);

    assert_eq!(stats[1]["column"], "region");
    assert_eq!(stats[1]["count"], 0);
    assert_eq!(stats[1]["mean"], 0.0);

    assert!(!body["suggestedVisuals"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_statistics_requires_columns() {
    let app = platform_app!();
    let req = test::TestRequest::post()
        .uri("/api/v1/platform/statistics")
        .set_json(json!({"rows": [{"revenue": 1}], "numericColumns": []}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
