use std::time::Duration;

use clap::Parser;

/// Runtime configuration, from flags or the matching environment variables.
#[derive(Parser, Debug, Clone)]
#[command(name = "cpu-stresser")]
#[command(version)]
#[command(about = "HTTP service that starts, lists and stops CPU stress tests")]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "STRESSER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "STRESSER_PORT", default_value = "8080")]
    pub port: u16,

    /// Stress tool invoked for every job (must accept --cpu and --timeout)
    #[arg(long, env = "STRESSER_BIN", default_value = "stress-ng")]
    pub stress_bin: String,

    /// Seconds between background sweeps for finished jobs
    #[arg(
        long,
        env = "STRESSER_REAP_INTERVAL_SECS",
        default_value = "5",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub reap_interval_secs: u64,

    /// Keep stress jobs running after the server exits
    #[arg(long, env = "STRESSER_KEEP_JOBS_ON_SHUTDOWN")]
    pub keep_jobs_on_shutdown: bool,
}

impl Config {
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            stress_bin: "stress-ng".to_string(),
            reap_interval_secs: 5,
            keep_jobs_on_shutdown: false,
        }
    }
}
