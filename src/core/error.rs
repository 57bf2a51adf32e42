use thiserror::Error;

/// Unified error type for rpcenable.
///
/// Protocol-level faults inside a successful dispatch are *not* errors; they
/// are serialized into the response body. `RpcError::Fault` only appears on
/// the client side, where a decoded fault response surfaces to the caller the
/// way any other call failure does.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Unknown XMLRPC prefix")]
    UnknownPrefix,

    #[error("Malformed XML-RPC payload: {0}")]
    Parse(String),

    #[error("Cannot serialize XML-RPC message: {0}")]
    Serialize(String),

    #[error("XML-RPC fault {code}: {message}")]
    Fault { code: i32, message: String },

    #[error("HTTP status {0} from XML-RPC endpoint")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
