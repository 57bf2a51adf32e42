//! Prefix-to-dispatcher routing and the inbound logging wrapper.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::core::config::RpcConfig;
use crate::core::dispatch::{Dispatcher, RpcHandler, RpcMethod};
use crate::core::error::RpcError;
use crate::core::wire;
use crate::log::{IncomingRequest, RequestLog, elapsed_seconds};

/// Registry of XML-RPC dispatchers, keyed by prefix.
///
/// The empty prefix exists from construction with introspection registered;
/// further prefixes are created lazily on first registration and are never
/// removed. The registry is built mutably during startup, then shared with
/// the server behind an `Arc` — registration after that point is not
/// possible, which is how the no-registration-during-traffic constraint is
/// enforced.
pub struct RpcRegistry {
    config: RpcConfig,
    log: Arc<dyn RequestLog>,
    dispatchers: HashMap<String, Dispatcher>,
}

impl RpcRegistry {
    pub fn new(config: RpcConfig, log: Arc<dyn RequestLog>) -> Self {
        let mut dispatchers = HashMap::new();
        dispatchers.insert(
            String::new(),
            Dispatcher::new(config.allow_none, config.encoding.clone()),
        );
        Self {
            config,
            log,
            dispatchers,
        }
    }

    /// Register `handler` under `prefix`, creating the prefix's dispatcher
    /// with the registry-wide options on first use.
    pub fn register_function(&mut self, prefix: &str, method: RpcMethod, handler: RpcHandler) {
        let dispatcher = self
            .dispatchers
            .entry(prefix.to_owned())
            .or_insert_with(|| Dispatcher::new(self.config.allow_none, self.config.encoding.clone()));
        dispatcher.register(method, handler);
    }

    /// Route a request body to its prefix's dispatcher.
    ///
    /// Unknown prefixes fail with [`RpcError::UnknownPrefix`] before any
    /// record is made. When incoming logging is enabled the dispatch is
    /// wrapped in timing and exception capture, persisting exactly one
    /// record per call.
    pub fn handle(&self, prefix: &str, body: &str, caller_ip: &str) -> Result<String, RpcError> {
        let dispatcher = self.dispatchers.get(prefix).ok_or(RpcError::UnknownPrefix)?;
        if self.config.log_incoming {
            self.dispatch_logged(dispatcher, prefix, body, caller_ip)
        } else {
            dispatcher.dispatch(body)
        }
    }

    fn dispatch_logged(
        &self,
        dispatcher: &Dispatcher,
        prefix: &str,
        body: &str,
        caller_ip: &str,
    ) -> Result<String, RpcError> {
        let start = Instant::now();
        let mut record = IncomingRequest::started(prefix, caller_ip);
        // Parsed independently of dispatch. A body the parser rejects leaves
        // method and params empty; the record is still persisted with the
        // resulting fault text.
        if let Ok(call) = wire::decode_call(body) {
            record.method = call.name().to_owned();
            record.params = call.params().to_vec();
        }
        match dispatcher.dispatch(body) {
            Ok(response) => {
                record.exception = wire::fault_string(&response);
                record.completion_time = elapsed_seconds(start);
                self.log.save_incoming(record);
                Ok(response)
            }
            Err(err) => {
                record.exception = Some(err.to_string());
                record.completion_time = elapsed_seconds(start);
                self.log.save_incoming(record);
                Err(err)
            }
        }
    }

    /// Dispatcher for a given prefix, if one exists.
    pub fn dispatcher(&self, prefix: &str) -> Option<&Dispatcher> {
        self.dispatchers.get(prefix)
    }

    /// Registered prefixes, for startup diagnostics.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.dispatchers.keys().map(String::as_str)
    }

    /// Content type for serialized response bodies.
    pub fn content_type(&self) -> String {
        match &self.config.encoding {
            Some(encoding) => format!("text/xml; charset={encoding}"),
            None => String::from("text/xml"),
        }
    }
}
