//! Arithmetic methods under the empty prefix.

use dxr::{TryFromParams, TryToValue};

use crate::core::dispatch::{RpcMethod, invalid_params, marshal_fault};
use crate::core::registry::RpcRegistry;

pub fn register(registry: &mut RpcRegistry) {
    registry.register_function(
        "",
        RpcMethod::new("add")
            .signature("(int, int) -> int")
            .help("Add two integers."),
        Box::new(|params| {
            let (a, b) = <(i32, i32)>::try_from_params(params).map_err(invalid_params)?;
            (a + b).try_to_value().map_err(marshal_fault)
        }),
    );

    registry.register_function(
        "",
        RpcMethod::new("mul")
            .signature("(int, int) -> int")
            .help("Multiply two integers."),
        Box::new(|params| {
            let (a, b) = <(i32, i32)>::try_from_params(params).map_err(invalid_params)?;
            (a * b).try_to_value().map_err(marshal_fault)
        }),
    );
}
