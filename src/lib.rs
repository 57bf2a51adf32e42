//! XML-RPC endpoints for Actix Web services, with optional call logging.
//!
//! `rpcenable` is a thin adapter between registered Rust functions and the
//! XML-RPC wire format. The crate does not implement the protocol itself:
//! wire types come from `dxr` and are (de)serialized through `quick-xml`,
//! HTTP is Actix Web on the way in and `reqwest` on the way out.
//!
//! * [`core::dispatch`] — the per-prefix method table with built-in
//!   introspection (`system.listMethods` and friends).
//! * [`core::registry`] — routes requests to a dispatcher by prefix and wraps
//!   dispatch in timing/exception capture when incoming logging is enabled.
//! * [`core::server`] — the HTTP surface (`/xmlrpc`, `/xmlrpc/{prefix}`).
//! * [`client`] — an explicit outbound call proxy with an optional parameter
//!   hook and the same logging convention on the client side.
//! * [`log`] — call log records and the append-only sink trait they are
//!   persisted through.

pub mod client;
pub mod core;
pub mod log;
pub mod methods;

pub use crate::client::{RpcClient, RpcClientBuilder};
pub use crate::core::config::RpcConfig;
pub use crate::core::dispatch::{RpcHandler, RpcMethod};
pub use crate::core::error::RpcError;
pub use crate::core::registry::RpcRegistry;

// Re-exported so embedders build parameters and decode results without
// depending on dxr directly.
pub use dxr::{Fault, Value};
