pub mod config;
pub mod error;
pub mod handlers;
pub mod job;
pub mod process;
pub mod registry;
pub mod routes;
pub mod server;
pub mod telemetry;
