//! Outbound XML-RPC calls with optional parameter rewriting and logging.
//!
//! [`RpcClient`] is an explicit stand-in for a remote XML-RPC service: one
//! `call(method, params)` operation instead of dynamic method dispatch. A
//! parameter hook, when configured, rewrites the outgoing argument list
//! before transmission (token injection and the like); the persisted record
//! always reflects the hook's output.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dxr::Value;
use reqwest::header::CONTENT_TYPE;

use crate::core::config::RpcConfig;
use crate::core::error::RpcError;
use crate::core::wire;
use crate::log::{OutgoingRequest, RequestLog, elapsed_seconds};

/// Default timeout applied to every outbound call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pure transform applied to the outgoing argument list before transmission.
pub type ParamHook = Box<dyn Fn(Vec<Value>) -> Vec<Value> + Send + Sync>;

/// Client handle for one remote XML-RPC endpoint.
pub struct RpcClient {
    url: String,
    http: reqwest::Client,
    param_hook: Option<ParamHook>,
    encoding: Option<String>,
    log: Option<Arc<dyn RequestLog>>,
}

impl RpcClient {
    pub fn builder(url: impl Into<String>) -> RpcClientBuilder {
        RpcClientBuilder {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
            param_hook: None,
            encoding: None,
            log: None,
        }
    }

    /// Builder preconfigured from `RPCENABLE_*` settings: the sink is
    /// attached only when outgoing logging is enabled.
    pub fn from_config(
        url: impl Into<String>,
        config: &RpcConfig,
        log: Arc<dyn RequestLog>,
    ) -> RpcClientBuilder {
        let mut builder = Self::builder(url);
        builder.encoding = config.encoding.clone();
        if config.log_outgoing {
            builder.log = Some(log);
        }
        builder
    }

    /// Perform a remote call.
    ///
    /// The hook runs first; without a log sink the transformed call is
    /// forwarded directly. With one, a record is constructed before
    /// transmission and persisted exactly once — on failure it carries the
    /// error text and the elapsed time up to the point of failure, and the
    /// error is still returned to the caller.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let params = match &self.param_hook {
            Some(hook) => hook(params),
            None => params,
        };
        let Some(log) = &self.log else {
            return self.transport(method, &params).await;
        };

        let mut record = OutgoingRequest::started(method, params.clone(), &self.url);
        let start = Instant::now();
        match self.transport(method, &params).await {
            Ok(value) => {
                record.response = Some(value.clone());
                record.completion_time = elapsed_seconds(start);
                log.save_outgoing(record);
                Ok(value)
            }
            Err(err) => {
                record.exception = Some(err.to_string());
                record.completion_time = elapsed_seconds(start);
                log.save_outgoing(record);
                Err(err)
            }
        }
    }

    async fn transport(&self, method: &str, params: &[Value]) -> Result<Value, RpcError> {
        let body = wire::encode_call(method, params, self.encoding.as_deref())?;
        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status(status.as_u16()));
        }
        let text = response.text().await?;
        wire::decode_response(&text)
    }
}

/// Builder for [`RpcClient`].
pub struct RpcClientBuilder {
    url: String,
    timeout: Duration,
    param_hook: Option<ParamHook>,
    encoding: Option<String>,
    log: Option<Arc<dyn RequestLog>>,
}

impl RpcClientBuilder {
    /// Call timeout, covering connect, send and response read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn param_hook(
        mut self,
        hook: impl Fn(Vec<Value>) -> Vec<Value> + Send + Sync + 'static,
    ) -> Self {
        self.param_hook = Some(Box::new(hook));
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn log(mut self, log: Arc<dyn RequestLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn build(self) -> Result<RpcClient, RpcError> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(RpcClient {
            url: self.url,
            http,
            param_hook: self.param_hook,
            encoding: self.encoding,
            log: self.log,
        })
    }
}
