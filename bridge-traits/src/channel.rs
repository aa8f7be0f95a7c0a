//! Method Channel Contract
//!
//! Host frameworks talk to native plugins through named channels carrying a
//! method name plus a loosely-typed argument map. Each call gets exactly one
//! reply: a value, an error envelope, or the "not implemented" sentinel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single incoming call on a method channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments: Some(arguments),
        }
    }

    pub fn without_arguments(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: None,
        }
    }

    /// Arguments as a string-keyed map, if the caller sent one
    pub fn argument_map(&self) -> Option<&Map<String, Value>> {
        self.arguments.as_ref().and_then(Value::as_object)
    }
}

/// Reply delivered for a [`MethodCall`]
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
    /// The handler does not know the requested method
    NotImplemented,
}

impl MethodResponse {
    /// Serialize `value` into a success reply.
    ///
    /// Falls back to an error envelope if `value` cannot be represented.
    pub fn success<T: Serialize>(value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::Success(value),
            Err(e) => Self::error("SERIALIZATION_FAILED", e.to_string()),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented)
    }

    /// Boolean payload of a success reply
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Success(value) => value.as_bool(),
            _ => None,
        }
    }

    /// Payload of a success reply
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// Handler bound to a method channel
///
/// Implemented by plugins; the host routes every call on
/// [`channel_name`](MethodCallHandler::channel_name) to [`handle`](MethodCallHandler::handle).
#[async_trait]
pub trait MethodCallHandler: Send + Sync {
    /// Name of the channel this handler listens on
    fn channel_name(&self) -> &str;

    /// Handle one call and produce its single reply
    async fn handle(&self, call: MethodCall) -> MethodResponse;

    /// Release platform resources when the plugin is torn down
    async fn dispose(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_argument_map() {
        let call = MethodCall::new("getCookies", json!({ "url": "https://example.com" }));
        let args = call.argument_map().unwrap();
        assert_eq!(args["url"], "https://example.com");

        assert!(MethodCall::without_arguments("getAllCookies")
            .argument_map()
            .is_none());
        assert!(MethodCall::new("x", json!([1, 2])).argument_map().is_none());
    }

    #[test]
    fn test_method_call_deserializes_without_arguments() {
        let call: MethodCall = serde_json::from_str(r#"{"method":"deleteAllCookies"}"#).unwrap();
        assert_eq!(call.method, "deleteAllCookies");
        assert!(call.arguments.is_none());
    }

    #[test]
    fn test_response_helpers() {
        assert_eq!(MethodResponse::success(true).as_bool(), Some(true));
        assert_eq!(MethodResponse::success(vec![1, 2]).value(), Some(&json!([1, 2])));
        assert!(MethodResponse::NotImplemented.is_not_implemented());
        assert_eq!(MethodResponse::NotImplemented.as_bool(), None);

        let err = MethodResponse::error("E", "boom");
        assert!(!err.is_not_implemented());
        assert!(err.value().is_none());
    }
}
