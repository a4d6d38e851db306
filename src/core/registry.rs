use crate::domain::error::LanComResult;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Module-side callback invoked for every packet addressed to the
/// subscribed identifier.
///
/// Implementations must tolerate concurrent invocation: the two receive
/// workers may call different handlers at the same time.
pub trait NotificationHandler: Send + Sync {
    fn handle(&self, message: &str, source_address: Option<&str>) -> LanComResult<()>;
}

impl<F> NotificationHandler for F
where
    F: Fn(&str, Option<&str>) -> LanComResult<()> + Send + Sync,
{
    fn handle(&self, message: &str, source_address: Option<&str>) -> LanComResult<()> {
        self(message, source_address)
    }
}

/// Identifier-to-handler map shared between the subscription API and the
/// receive workers.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Arc<RwLock<HashMap<String, Arc<dyn NotificationHandler>>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an identifier, replacing any previous one.
    pub async fn subscribe(&self, identifier: String, handler: Arc<dyn NotificationHandler>) {
        let mut handlers = self.handlers.write().await;
        handlers.insert(identifier, handler);
    }

    /// Look up the current handler for an identifier. The returned clone
    /// lets the caller invoke the handler without holding the map lock.
    pub async fn lookup(&self, identifier: &str) -> Option<Arc<dyn NotificationHandler>> {
        let handlers = self.handlers.read().await;
        handlers.get(identifier).cloned()
    }

    pub async fn count(&self) -> usize {
        let handlers = self.handlers.read().await;
        handlers.len()
    }
}
