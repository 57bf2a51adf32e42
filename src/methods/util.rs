//! Utility methods under the `util` prefix.

use dxr::{TryFromParams, TryToValue};

use crate::core::dispatch::{RpcMethod, invalid_params, marshal_fault};
use crate::core::registry::RpcRegistry;

pub fn register(registry: &mut RpcRegistry) {
    registry.register_function(
        "util",
        RpcMethod::new("echo")
            .signature("(string) -> string")
            .help("Return the message unchanged."),
        Box::new(|params| {
            let (message,) = <(String,)>::try_from_params(params).map_err(invalid_params)?;
            message.try_to_value().map_err(marshal_fault)
        }),
    );
}
