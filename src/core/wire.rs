//! Encode/decode glue over the dxr XML-RPC wire types.
//!
//! Everything that touches `quick_xml` lives here so the rest of the crate
//! deals in `MethodCall`s and `Value`s only.

use dxr::{Fault, FaultResponse, MethodCall, MethodResponse, Value};

use crate::core::error::RpcError;

/// XML declaration prepended to every serialized message.
pub fn xml_declaration(encoding: Option<&str>) -> String {
    match encoding {
        Some(enc) => format!("<?xml version=\"1.0\" encoding=\"{enc}\"?>"),
        None => String::from("<?xml version=\"1.0\"?>"),
    }
}

/// Serialize a `methodCall` body.
pub fn encode_call(
    method: &str,
    params: &[Value],
    encoding: Option<&str>,
) -> Result<String, RpcError> {
    let call = MethodCall::new(method.to_owned(), params.to_vec());
    let xml = quick_xml::se::to_string(&call).map_err(|err| RpcError::Serialize(err.to_string()))?;
    Ok(format!("{}{}", xml_declaration(encoding), xml))
}

/// Serialize a successful `methodResponse` body.
pub fn encode_response(value: Value, encoding: Option<&str>) -> Result<String, RpcError> {
    let response = MethodResponse::new(value);
    let xml =
        quick_xml::se::to_string(&response).map_err(|err| RpcError::Serialize(err.to_string()))?;
    Ok(format!("{}{}", xml_declaration(encoding), xml))
}

/// Serialize a fault response body.
pub fn encode_fault(
    code: i32,
    message: String,
    encoding: Option<&str>,
) -> Result<String, RpcError> {
    let response = FaultResponse::from(Fault::new(code, message));
    let xml =
        quick_xml::se::to_string(&response).map_err(|err| RpcError::Serialize(err.to_string()))?;
    Ok(format!("{}{}", xml_declaration(encoding), xml))
}

/// Parse a request body as a `methodCall`.
pub fn decode_call(body: &str) -> Result<MethodCall, RpcError> {
    quick_xml::de::from_str(body).map_err(|err| RpcError::Parse(err.to_string()))
}

/// Decode a `methodResponse` body into its value, or the fault it carries.
pub fn decode_response(body: &str) -> Result<Value, RpcError> {
    if let Ok(response) = quick_xml::de::from_str::<MethodResponse>(body) {
        return Ok(response.inner());
    }
    let response: FaultResponse =
        quick_xml::de::from_str(body).map_err(|err| RpcError::Parse(err.to_string()))?;
    let fault = Fault::try_from(response).map_err(|err| RpcError::Parse(err.to_string()))?;
    Err(RpcError::Fault {
        code: fault.code(),
        message: fault.string().to_owned(),
    })
}

/// Fault text carried by a serialized response body, if it is a fault.
pub fn fault_string(body: &str) -> Option<String> {
    let response: FaultResponse = quick_xml::de::from_str(body).ok()?;
    let fault = Fault::try_from(response).ok()?;
    Some(fault.string().to_owned())
}

#[cfg(test)]
mod tests {
    use dxr::TryFromValue;

    use super::*;

    #[test]
    fn call_bodies_round_trip() {
        let body = encode_call("add", &[Value::i4(2), Value::i4(3)], None).unwrap();
        assert!(body.starts_with("<?xml version=\"1.0\"?>"));
        let call = decode_call(&body).unwrap();
        assert_eq!(call.name(), "add");
        let params = call.params().to_vec();
        assert_eq!(params.len(), 2);
        assert_eq!(i32::try_from_value(&params[0]).unwrap(), 2);
        assert_eq!(i32::try_from_value(&params[1]).unwrap(), 3);
    }

    #[test]
    fn encoding_lands_in_the_declaration() {
        let body = encode_call("ping", &[], Some("utf-8")).unwrap();
        assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    }

    #[test]
    fn fault_bodies_are_recognized() {
        let body = encode_fault(-32500, "boom".to_owned(), None).unwrap();
        assert_eq!(fault_string(&body).as_deref(), Some("boom"));
        match decode_response(&body) {
            Err(RpcError::Fault { code, message }) => {
                assert_eq!(code, -32500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn success_bodies_carry_no_fault_string() {
        let body = encode_response(Value::string("ok".to_owned()), None).unwrap();
        assert!(fault_string(&body).is_none());
        assert!(decode_response(&body).is_ok());
    }
}
