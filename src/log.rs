//! Call log records and the sinks they are persisted through.
//!
//! The records mirror a relational model owned elsewhere: the adapter fills
//! one in per call and hands it to a [`RequestLog`] exactly once. Elapsed
//! time is stored as a fixed-point decimal (microsecond scale) so persisted
//! timings do not pick up binary floating-point round-off.

use std::sync::Mutex;
use std::time::Instant;

use dxr::Value;
use rust_decimal::Decimal;
use serde::Serialize;

/// One inbound XML-RPC call, success or failure.
#[derive(Debug, Clone, Serialize)]
pub struct IncomingRequest {
    /// Method name parsed from the request body; empty when the body did not
    /// parse.
    pub method: String,
    /// Positional call arguments as parsed from the body.
    pub params: Vec<Value>,
    /// Prefix the call was routed through.
    pub prefix: String,
    /// Remote address of the caller.
    pub caller_ip: String,
    /// Fault text or dispatch error, when the call did not succeed.
    pub exception: Option<String>,
    /// Wall-clock seconds spent handling the call.
    pub completion_time: Decimal,
}

impl IncomingRequest {
    /// Fresh record at the start of inbound dispatch.
    pub fn started(prefix: &str, caller_ip: &str) -> Self {
        Self {
            method: String::new(),
            params: Vec::new(),
            prefix: prefix.to_owned(),
            caller_ip: caller_ip.to_owned(),
            exception: None,
            completion_time: Decimal::ZERO,
        }
    }
}

/// One outbound XML-RPC call, success or failure.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingRequest {
    pub method: String,
    /// Arguments as transmitted, after the parameter hook ran.
    pub params: Vec<Value>,
    /// Target endpoint URL.
    pub url: String,
    /// Decoded response value on success.
    pub response: Option<Value>,
    /// Error text on failure, including decoded faults.
    pub exception: Option<String>,
    /// Wall-clock seconds up to completion or failure.
    pub completion_time: Decimal,
}

impl OutgoingRequest {
    /// Fresh record constructed before transmission.
    pub fn started(method: &str, params: Vec<Value>, url: &str) -> Self {
        Self {
            method: method.to_owned(),
            params,
            url: url.to_owned(),
            response: None,
            exception: None,
            completion_time: Decimal::ZERO,
        }
    }
}

/// Append-only sink for call records.
///
/// Implementations persist a fully-populated record and return nothing;
/// the adapter never reads records back.
pub trait RequestLog: Send + Sync {
    fn save_incoming(&self, record: IncomingRequest);
    fn save_outgoing(&self, record: OutgoingRequest);
}

/// Sink that emits each record as a structured tracing event.
pub struct TracingRequestLog;

impl RequestLog for TracingRequestLog {
    fn save_incoming(&self, record: IncomingRequest) {
        tracing::info!(
            target: "rpcenable::incoming",
            method = %record.method,
            prefix = %record.prefix,
            caller_ip = %record.caller_ip,
            params = ?record.params,
            exception = record.exception.as_deref().unwrap_or(""),
            completion_time = %record.completion_time,
            "incoming XML-RPC call"
        );
    }

    fn save_outgoing(&self, record: OutgoingRequest) {
        tracing::info!(
            target: "rpcenable::outgoing",
            method = %record.method,
            url = %record.url,
            params = ?record.params,
            exception = record.exception.as_deref().unwrap_or(""),
            completion_time = %record.completion_time,
            "outgoing XML-RPC call"
        );
    }
}

/// In-memory sink for tests and embedders that inspect records directly.
#[derive(Default)]
pub struct MemoryRequestLog {
    incoming: Mutex<Vec<IncomingRequest>>,
    outgoing: Mutex<Vec<OutgoingRequest>>,
}

impl MemoryRequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incoming(&self) -> Vec<IncomingRequest> {
        self.incoming
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn outgoing(&self) -> Vec<OutgoingRequest> {
        self.outgoing
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl RequestLog for MemoryRequestLog {
    fn save_incoming(&self, record: IncomingRequest) {
        if let Ok(mut records) = self.incoming.lock() {
            records.push(record);
        }
    }

    fn save_outgoing(&self, record: OutgoingRequest) {
        if let Ok(mut records) = self.outgoing.lock() {
            records.push(record);
        }
    }
}

/// Wall-clock seconds since `start` as a fixed-point decimal with
/// microsecond resolution.
pub fn elapsed_seconds(start: Instant) -> Decimal {
    Decimal::new(start.elapsed().as_micros() as i64, 6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_seconds_is_non_negative_with_fixed_scale() {
        let elapsed = elapsed_seconds(Instant::now());
        assert!(elapsed >= Decimal::ZERO);
        assert_eq!(elapsed.scale(), 6);
    }

    #[test]
    fn memory_log_keeps_records_in_order() {
        let log = MemoryRequestLog::new();
        log.save_incoming(IncomingRequest {
            method: "first".to_owned(),
            ..IncomingRequest::started("", "127.0.0.1")
        });
        log.save_incoming(IncomingRequest {
            method: "second".to_owned(),
            ..IncomingRequest::started("", "127.0.0.1")
        });
        let records = log.incoming();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].method, "first");
        assert_eq!(records[1].method, "second");
    }
}
