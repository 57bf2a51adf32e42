//! HTTP surface for the XML-RPC registry.
//!
//! Routes `/xmlrpc` and `/xmlrpc/{prefix}` accept every HTTP method and
//! answer non-POST requests with a plain-text 400, matching the contract of
//! the endpoint rather than the framework's default 405 handling.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::Method;
use actix_web::middleware::{Compress, DefaultHeaders, Logger};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, Result, web};

use crate::core::error::RpcError;
use crate::core::registry::RpcRegistry;

/// Health check endpoint for load balancers and monitoring.
async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "rpcenable"
    })))
}

/// XML-RPC endpoint handler.
///
/// POST only; the prefix is taken from the path (absent on `/xmlrpc`).
/// Handler faults come back as HTTP 200 with a fault body — only unknown
/// prefixes and non-POST methods are HTTP-level errors.
async fn rpc_endpoint(
    req: HttpRequest,
    body: web::Bytes,
    registry: web::Data<Arc<RpcRegistry>>,
) -> HttpResponse {
    if req.method() != Method::POST {
        return HttpResponse::BadRequest()
            .content_type("text/plain")
            .body("This method is only available via POST.");
    }
    let prefix = req.match_info().get("prefix").unwrap_or("").to_owned();
    let caller_ip = req
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default();
    let body = String::from_utf8_lossy(&body);

    match registry.handle(&prefix, &body, &caller_ip) {
        Ok(response) => HttpResponse::Ok()
            .content_type(registry.content_type())
            .body(response),
        Err(RpcError::UnknownPrefix) => HttpResponse::BadRequest()
            .content_type("text/plain")
            .body("Unknown XMLRPC prefix"),
        Err(err) => {
            // Response serialization failed; nothing sensible to send as a
            // fault body.
            tracing::error!(error = %err, prefix = %prefix, "XML-RPC dispatch failed");
            HttpResponse::InternalServerError()
                .content_type("text/plain")
                .body(err.to_string())
        }
    }
}

/// Route table shared between the production server and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/xmlrpc", web::route().to(rpc_endpoint))
        .route("/xmlrpc/{prefix}", web::route().to(rpc_endpoint));
}

/// Run the XML-RPC server over HTTP.
///
/// Worker count defaults to the CPU count capped at 16 and can be overridden
/// via `WORKER_THREADS`. Connection limits and timeouts are tuned for
/// sustained production traffic.
pub async fn run_server_http(
    registry: Arc<RpcRegistry>,
    host: String,
    port: u16,
) -> std::io::Result<()> {
    let bind_addr = format!("{host}:{port}");
    let prefixes: Vec<String> = registry.prefixes().map(str::to_owned).collect();
    let registry = web::Data::new(registry);

    let workers = std::env::var("WORKER_THREADS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| num_cpus::get().clamp(1, 16));

    tracing::info!(%bind_addr, workers, ?prefixes, "XML-RPC server starting");

    HttpServer::new(move || {
        App::new()
            .app_data(registry.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY")),
            )
            .wrap(Logger::new("%r %s %Dms"))
            .configure(configure)
    })
    .workers(workers)
    .max_connections(10_000)
    .max_connection_rate(1_000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}
