//! Method Channel Abstraction
//!
//! Models the request/response channel the application layer uses to invoke
//! native commands (a Flutter `MethodChannel`, a JNI shim, a local IPC
//! socket). Each call names a method and carries a JSON map of arguments;
//! each call receives exactly one [`MethodResponse`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A single command invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Call without arguments.
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }

    /// Typed argument lookup.
    ///
    /// Returns `None` when the key is missing, explicitly `null`, or cannot be
    /// converted to `T`.
    pub fn argument<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.arguments.get(key)?;
        if value.is_null() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// Terminal answer to a [`MethodCall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success {
        value: Value,
    },
    /// The receiving side has no handler for the method.
    NotImplemented,
}

impl MethodResponse {
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success {
            value: value.into(),
        }
    }

    /// The success payload as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Success { value } => value.as_bool(),
            _ => None,
        }
    }
}

/// Handles calls arriving on one channel.
#[async_trait::async_trait]
pub trait MethodCallHandler: Send + Sync {
    async fn on_method_call(&self, call: MethodCall) -> MethodResponse;
}

/// Host-side channel registry.
pub trait BinaryMessenger: Send + Sync {
    /// Install `handler` for `channel`, or remove the current one with `None`.
    fn set_method_call_handler(
        &self,
        channel: &str,
        handler: Option<Arc<dyn MethodCallHandler>>,
    ) -> Result<()>;
}
