use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::database::UserRepository;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and database are healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(repo: web::Data<dyn UserRepository>) -> impl Responder {
    let database_up = match repo.ping().await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("⚠️  Health check: {}", e);
            false
        }
    };

    let body = HealthResponse {
        status: if database_up { "healthy" } else { "degraded" }.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database_up { "up" } else { "down" }.to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    };

    if database_up {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
