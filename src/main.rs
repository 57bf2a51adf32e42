//! XML-RPC server entry point.
//!
//! Environment variables:
//! - `HOST`: bind address (default: "0.0.0.0")
//! - `PORT`: port number (default: 3000)
//! - `WORKER_THREADS`: HTTP worker count (default: CPU count, capped at 16)
//! - `RPCENABLE_LOG_INCOMING`: log every inbound call (default: false)
//! - `RPCENABLE_LOG_OUTGOING`: log every outbound call (default: false)
//! - `RPCENABLE_ALLOW_NONE`: permit `<nil/>` in responses (default: true)
//! - `RPCENABLE_ENCODING`: encoding named in XML declarations (default: unset)
//! - `RUST_LOG`: tracing filter (default: "info")

use std::env;
use std::sync::Arc;

use rpcenable::RpcConfig;
use rpcenable::core::server;
use rpcenable::log::{RequestLog, TracingRequestLog};
use rpcenable::methods;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RpcConfig::from_env();
    let log: Arc<dyn RequestLog> = Arc::new(TracingRequestLog);
    let registry = methods::initialize_methods(config, log);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or(3000);

    server::run_server_http(registry, host, port).await
}
