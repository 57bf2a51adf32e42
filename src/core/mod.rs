//! Core server framework.
//!
//! - `config`: runtime settings, read once at startup
//! - `dispatch`: per-prefix XML-RPC method table
//! - `registry`: prefix routing and the inbound logging wrapper
//! - `server`: HTTP endpoint setup with Actix Web
//! - `wire`: encode/decode glue over the dxr wire types
//! - `error`: unified error type

pub mod config;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod server;
pub mod wire;
