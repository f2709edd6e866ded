//! In-process command channel

use bridge_traits::{
    channel::{BinaryMessenger, MethodCall, MethodCallHandler, MethodResponse},
    error::Result,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Messenger that dispatches calls to handlers registered in the same process.
///
/// Stands in for the host engine's channel when the core runs headless
/// (desktop tools, integration tests).
#[derive(Default)]
pub struct InProcessMessenger {
    handlers: RwLock<HashMap<String, Arc<dyn MethodCallHandler>>>,
}

impl InProcessMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a handler is currently registered on `channel`.
    pub fn has_handler(&self, channel: &str) -> bool {
        self.handlers.read().contains_key(channel)
    }

    /// Deliver `call` to the handler on `channel`.
    ///
    /// Unregistered channels answer [`MethodResponse::NotImplemented`].
    pub async fn invoke(&self, channel: &str, call: MethodCall) -> MethodResponse {
        let handler = self.handlers.read().get(channel).cloned();

        match handler {
            Some(handler) => handler.on_method_call(call).await,
            None => {
                warn!(channel = channel, method = %call.method, "No handler registered");
                MethodResponse::NotImplemented
            }
        }
    }
}

impl BinaryMessenger for InProcessMessenger {
    fn set_method_call_handler(
        &self,
        channel: &str,
        handler: Option<Arc<dyn MethodCallHandler>>,
    ) -> Result<()> {
        let mut handlers = self.handlers.write();
        match handler {
            Some(handler) => {
                debug!(channel = channel, "Registered method call handler");
                handlers.insert(channel.to_string(), handler);
            }
            None => {
                debug!(channel = channel, "Removed method call handler");
                handlers.remove(channel);
            }
        }
        Ok(())
    }
}
