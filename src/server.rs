use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};

use crate::config::Config;
use crate::process::CommandSpawner;
use crate::registry::{spawn_reaper, Registry};
use crate::routes::configure_routes;

/// Runs the service until the server receives SIGINT or SIGTERM.
///
/// The registry lives exactly as long as this call: it is created here,
/// handed to every worker, and torn down after the server stops.
pub async fn run(config: Config) -> std::io::Result<()> {
    let registry = Arc::new(Registry::new(Arc::new(CommandSpawner::new(
        config.stress_bin.clone(),
    ))));
    let reaper = spawn_reaper(Arc::clone(&registry), config.reap_interval());

    tracing::info!(
        host = %config.host,
        port = config.port,
        stress_bin = %config.stress_bin,
        host_cpus = num_cpus::get(),
        "Starting CPU stresser"
    );

    let data = web::Data::from(Arc::clone(&registry));
    let result = HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(middleware::Logger::default())
            .app_data(data.clone())
            .configure(configure_routes)
    })
    .bind(config.bind_addr())?
    .run()
    .await;

    reaper.abort();
    if config.keep_jobs_on_shutdown {
        tracing::info!(remaining = registry.len(), "Leaving stress jobs running");
    } else {
        registry.shutdown();
    }
    tracing::info!("CPU stresser stopped");

    result
}
