//! HTTP handlers. Each one is a thin shim over [`Registry`].

use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Result;
use crate::job::{StressList, StressRequest, StressResponse};
use crate::registry::Registry;

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// GET / - single page UI
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

/// GET /health - liveness probe, independent of registry state
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    })
}

/// POST /stress
pub async fn start_stress(
    registry: web::Data<Registry>,
    params: web::Json<StressRequest>,
) -> Result<HttpResponse> {
    let job = registry.start(&params)?;
    Ok(HttpResponse::Ok().json(StressResponse::from(&job)))
}

/// GET /stress
pub async fn list_stress(registry: web::Data<Registry>) -> impl Responder {
    HttpResponse::Ok().json(StressList::from(registry.list()))
}

/// DELETE /stress/{process_id}
pub async fn stop_stress(
    registry: web::Data<Registry>,
    path: web::Path<u32>,
) -> Result<HttpResponse> {
    let message = registry.stop(path.into_inner())?;
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}
