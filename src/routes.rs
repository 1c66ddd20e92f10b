//! Route table and extractor configuration.
//!
//! - GET    /                      - UI
//! - GET    /health                - health check
//! - POST   /stress                - start a stress job
//! - GET    /stress                - list running jobs
//! - DELETE /stress/{process_id}   - stop a job

use actix_web::{error, web, HttpRequest};

use crate::error::StressError;
use crate::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health))
        .service(
            web::resource("/stress")
                .route(web::post().to(handlers::start_stress))
                .route(web::get().to(handlers::list_stress)),
        )
        .route("/stress/{process_id}", web::delete().to(handlers::stop_stress));
}

/// Malformed bodies answer with the same JSON shape as every other error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        StressError::Validation(format!("Invalid request body: {}", err)).into()
    })
}

/// A process id that is not an integer cannot name a registered job.
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: error::PathError, req: &HttpRequest| {
        let raw = req.match_info().get("process_id").unwrap_or_default();
        tracing::debug!(raw, error = %err, "Rejected process id");
        StressError::Validation(format!("Invalid process id: {}", raw)).into()
    })
}
