use clap::Parser;

use cpu_stresser::config::Config;
use cpu_stresser::{server, telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::parse();
    telemetry::init();

    server::run(config).await
}
