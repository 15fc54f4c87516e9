//! Public platform endpoints: capabilities, provider catalog, statistics.

use actix_web::{HttpResponse, web};

use crate::api::documents::UploadLimit;
use crate::error::AppResult;
use crate::models::{Capabilities, ProviderInfo, StatisticsRequest, StatisticsResponse};
use crate::services::{platform, statistics};

/// Describe what the platform ingests, exports and visualizes.
#[utoipa::path(
    get,
    path = "/api/v1/platform/capabilities",
    tag = "Platform",
    responses(
        (status = 200, description = "Platform capabilities", body = Capabilities)
    )
)]
pub async fn get_capabilities(limit: web::Data<UploadLimit>) -> HttpResponse {
    HttpResponse::Ok().json(platform::capabilities(limit.0))
}

/// List the external providers the platform can integrate with.
#[utoipa::path(
    get,
    path = "/api/v1/platform/providers",
    tag = "Platform",
    responses(
        (status = 200, description = "Provider catalog", body = Vec<ProviderInfo>)
    )
)]
pub async fn get_providers() -> HttpResponse {
    HttpResponse::Ok().json(platform::providers())
}

/// Compute descriptive statistics over tabular rows.
#[utoipa::path(
    post,
    path = "/api/v1/platform/statistics",
    tag = "Platform",
    request_body = StatisticsRequest,
    responses(
        (status = 200, description = "Per-column statistics", body = StatisticsResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse)
    )
)]
pub async fn compute_statistics(body: web::Json<StatisticsRequest>) -> AppResult<HttpResponse> {
    let response = statistics::generate_statistics(&body)?;
    Ok(HttpResponse::Ok().json(response))
}

/// Configure platform routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/platform/capabilities").route(web::get().to(get_capabilities)))
        .service(web::resource("/platform/providers").route(web::get().to(get_providers)))
        .service(web::resource("/platform/statistics").route(web::post().to(compute_statistics)));
}
