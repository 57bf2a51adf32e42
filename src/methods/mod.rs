//! Built-in method registrations.
//!
//! Each submodule exports a `register` function that adds its methods to the
//! registry. Registration happens here, explicitly and in a fixed order,
//! during application initialization — add new modules to
//! [`initialize_methods`] following the same pattern.

pub mod math;
pub mod util;

use std::sync::Arc;

use crate::core::config::RpcConfig;
use crate::core::registry::RpcRegistry;
use crate::log::RequestLog;

/// Build the registry and register all built-in methods.
pub fn initialize_methods(config: RpcConfig, log: Arc<dyn RequestLog>) -> Arc<RpcRegistry> {
    let mut registry = RpcRegistry::new(config, log);

    math::register(&mut registry);
    util::register(&mut registry);

    Arc::new(registry)
}
