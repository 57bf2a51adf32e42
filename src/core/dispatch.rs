//! Per-prefix XML-RPC method table and call-serving logic.
//!
//! A `Dispatcher` owns the mapping from method name to handler for one
//! prefix. Everything that goes wrong inside a call — unparsable body,
//! unknown method, handler fault — is reported as a well-formed XML-RPC
//! fault response. The single exception is a failure to serialize the
//! response itself, which propagates to the caller as `RpcError::Serialize`.

use std::collections::HashMap;

use dxr::{DxrError, Fault, TryFromValue, TryToValue, Value};

use crate::core::error::RpcError;
use crate::core::wire;

/// Fault code for bodies that do not parse as a `methodCall`.
pub const FAULT_PARSE: i32 = -32700;
/// Fault code for calls naming a method that is not registered.
pub const FAULT_METHOD_NOT_FOUND: i32 = -32601;
/// Fault code for parameters a handler cannot accept.
pub const FAULT_INVALID_PARAMS: i32 = -32602;
/// Fault code for application-level handler failures.
pub const FAULT_APPLICATION: i32 = -32500;

/// Introspection methods every dispatcher answers without registration.
const SYSTEM_METHODS: &[&str] = &[
    "system.listMethods",
    "system.methodSignature",
    "system.methodHelp",
];

/// Metadata for a registered method.
///
/// The signature string is what `system.methodSignature` reports; it is
/// free-form and purely descriptive.
#[derive(Debug, Clone)]
pub struct RpcMethod {
    pub name: String,
    pub signature: Option<String>,
    pub help: Option<String>,
}

impl RpcMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: None,
            help: None,
        }
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Handler function type for registered methods.
///
/// Handlers receive the positional call parameters and either return a value
/// to serialize or a fault to report. They must be `Send + Sync` to be shared
/// across server worker threads.
pub type RpcHandler = Box<dyn Fn(&[Value]) -> Result<Value, Fault> + Send + Sync>;

struct MethodEntry {
    meta: RpcMethod,
    handler: RpcHandler,
}

/// Per-prefix method table.
pub struct Dispatcher {
    methods: HashMap<String, MethodEntry>,
    allow_none: bool,
    encoding: Option<String>,
}

impl Dispatcher {
    pub fn new(allow_none: bool, encoding: Option<String>) -> Self {
        Self {
            methods: HashMap::new(),
            allow_none,
            encoding,
        }
    }

    /// Add a method to the table. The last registration for a name wins.
    pub fn register(&mut self, method: RpcMethod, handler: RpcHandler) {
        self.methods
            .insert(method.name.clone(), MethodEntry { meta: method, handler });
    }

    /// Parse `body` as an XML-RPC call, invoke the named method, and
    /// serialize the result or fault.
    pub fn dispatch(&self, body: &str) -> Result<String, RpcError> {
        let call = match wire::decode_call(body) {
            Ok(call) => call,
            Err(err) => return self.fault_body(FAULT_PARSE, err.to_string()),
        };
        let name = call.name().to_owned();
        let params = call.params().to_vec();
        match self.invoke(&name, &params) {
            Ok(value) => self.response_body(value),
            Err(fault) => self.fault_body(fault.code(), fault.string().to_owned()),
        }
    }

    /// Human-readable parameter list for a registered method, if one was
    /// provided at registration.
    pub fn describe(&self, name: &str) -> Option<&str> {
        self.methods
            .get(name)
            .and_then(|entry| entry.meta.signature.as_deref())
    }

    /// Help text for a registered method.
    pub fn help(&self, name: &str) -> Option<&str> {
        self.methods
            .get(name)
            .and_then(|entry| entry.meta.help.as_deref())
    }

    /// Registered method names plus the built-in introspection methods,
    /// sorted for deterministic output.
    pub fn list_methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.extend(SYSTEM_METHODS.iter().map(|name| (*name).to_owned()));
        names.sort();
        names
    }

    fn invoke(&self, name: &str, params: &[Value]) -> Result<Value, Fault> {
        match name {
            "system.listMethods" => self.list_methods().try_to_value().map_err(marshal_fault),
            "system.methodSignature" => {
                let target = single_string(params)?;
                Ok(self
                    .describe(&target)
                    .map(|signature| Value::string(signature.to_owned()))
                    .unwrap_or_else(Value::nil))
            }
            "system.methodHelp" => {
                let target = single_string(params)?;
                Ok(Value::string(
                    self.help(&target).unwrap_or_default().to_owned(),
                ))
            }
            _ => match self.methods.get(name) {
                Some(entry) => (entry.handler)(params),
                None => Err(Fault::new(
                    FAULT_METHOD_NOT_FOUND,
                    format!("method \"{name}\" is not supported"),
                )),
            },
        }
    }

    fn response_body(&self, value: Value) -> Result<String, RpcError> {
        let body = wire::encode_response(value, self.encoding.as_deref())?;
        // xmlrpclib raises a TypeError when marshalling None without
        // allow_none; the equivalent here is an application fault.
        if !self.allow_none && (body.contains("<nil/>") || body.contains("<nil></nil>")) {
            return self.fault_body(
                FAULT_APPLICATION,
                String::from("cannot marshal <nil> unless allow_none is enabled"),
            );
        }
        Ok(body)
    }

    fn fault_body(&self, code: i32, message: String) -> Result<String, RpcError> {
        wire::encode_fault(code, message, self.encoding.as_deref())
    }
}

/// Map a parameter decoding error to an invalid-params fault.
pub fn invalid_params(err: DxrError) -> Fault {
    Fault::new(FAULT_INVALID_PARAMS, format!("invalid parameters: {err}"))
}

/// Map a value marshalling error to an application fault.
pub fn marshal_fault(err: DxrError) -> Fault {
    Fault::new(FAULT_APPLICATION, format!("cannot marshal value: {err}"))
}

fn single_string(params: &[Value]) -> Result<String, Fault> {
    match params.first() {
        Some(value) => String::try_from_value(value).map_err(invalid_params),
        None => Err(Fault::new(
            FAULT_INVALID_PARAMS,
            String::from("expected a method name argument"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use dxr::TryFromParams;

    use super::*;

    fn demo_dispatcher(allow_none: bool) -> Dispatcher {
        let mut dispatcher = Dispatcher::new(allow_none, None);
        dispatcher.register(
            RpcMethod::new("add")
                .signature("(int, int) -> int")
                .help("Add two integers."),
            Box::new(|params| {
                let (a, b) = <(i32, i32)>::try_from_params(params).map_err(invalid_params)?;
                (a + b).try_to_value().map_err(marshal_fault)
            }),
        );
        dispatcher.register(RpcMethod::new("nothing"), Box::new(|_params| Ok(Value::nil())));
        dispatcher
    }

    fn call(dispatcher: &Dispatcher, method: &str, params: &[Value]) -> Result<Value, RpcError> {
        let body = wire::encode_call(method, params, None).unwrap();
        let response = dispatcher.dispatch(&body).unwrap();
        wire::decode_response(&response)
    }

    #[test]
    fn dispatch_returns_the_handler_result() {
        let dispatcher = demo_dispatcher(true);
        let value = call(&dispatcher, "add", &[Value::i4(2), Value::i4(3)]).unwrap();
        assert_eq!(i32::try_from_value(&value).unwrap(), 5);
    }

    #[test]
    fn unknown_method_is_a_fault_not_an_error() {
        let dispatcher = demo_dispatcher(true);
        match call(&dispatcher, "missing", &[]) {
            Err(RpcError::Fault { code, message }) => {
                assert_eq!(code, FAULT_METHOD_NOT_FOUND);
                assert!(message.contains("missing"));
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn last_registration_wins() {
        let mut dispatcher = demo_dispatcher(true);
        dispatcher.register(
            RpcMethod::new("add"),
            Box::new(|_params| 42i32.try_to_value().map_err(marshal_fault)),
        );
        let value = call(&dispatcher, "add", &[Value::i4(2), Value::i4(3)]).unwrap();
        assert_eq!(i32::try_from_value(&value).unwrap(), 42);
    }

    #[test]
    fn malformed_body_is_a_parse_fault() {
        let dispatcher = demo_dispatcher(true);
        let response = dispatcher.dispatch("this is not xml").unwrap();
        match wire::decode_response(&response) {
            Err(RpcError::Fault { code, .. }) => assert_eq!(code, FAULT_PARSE),
            other => panic!("expected parse fault, got {other:?}"),
        }
    }

    #[test]
    fn bad_parameters_fault_instead_of_panicking() {
        let dispatcher = demo_dispatcher(true);
        match call(&dispatcher, "add", &[Value::string("two".to_owned())]) {
            Err(RpcError::Fault { code, .. }) => assert_eq!(code, FAULT_INVALID_PARAMS),
            other => panic!("expected invalid-params fault, got {other:?}"),
        }
    }

    #[test]
    fn nil_is_rejected_without_allow_none() {
        let dispatcher = demo_dispatcher(false);
        match call(&dispatcher, "nothing", &[]) {
            Err(RpcError::Fault { code, message }) => {
                assert_eq!(code, FAULT_APPLICATION);
                assert!(message.contains("allow_none"));
            }
            other => panic!("expected marshalling fault, got {other:?}"),
        }
    }

    #[test]
    fn nil_passes_with_allow_none() {
        let dispatcher = demo_dispatcher(true);
        let value = call(&dispatcher, "nothing", &[]).unwrap();
        assert!(Option::<i32>::try_from_value(&value).unwrap().is_none());
    }

    #[test]
    fn introspection_lists_registered_and_system_methods() {
        let dispatcher = demo_dispatcher(true);
        let value = call(&dispatcher, "system.listMethods", &[]).unwrap();
        let names = Vec::<String>::try_from_value(&value).unwrap();
        assert!(names.contains(&"add".to_owned()));
        assert!(names.contains(&"system.methodHelp".to_owned()));
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn method_signature_reports_what_was_registered() {
        let dispatcher = demo_dispatcher(true);
        let value = call(
            &dispatcher,
            "system.methodSignature",
            &[Value::string("add".to_owned())],
        )
        .unwrap();
        assert_eq!(
            String::try_from_value(&value).unwrap(),
            "(int, int) -> int"
        );
        assert_eq!(dispatcher.describe("add"), Some("(int, int) -> int"));
        assert!(dispatcher.describe("missing").is_none());
    }

    #[test]
    fn method_help_defaults_to_empty() {
        let dispatcher = demo_dispatcher(true);
        let value = call(
            &dispatcher,
            "system.methodHelp",
            &[Value::string("nothing".to_owned())],
        )
        .unwrap();
        assert_eq!(String::try_from_value(&value).unwrap(), "");
    }
}
