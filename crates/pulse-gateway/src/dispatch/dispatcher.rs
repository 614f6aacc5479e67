//! Event dispatcher
//!
//! Fans named events out to consumer-registered handlers. The session and
//! reconciler are the only producers; consumers only register.

use crate::events::Entity;
use crate::interactions::InteractionContext;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

/// Value delivered to handlers of a named event
#[derive(Debug, Clone)]
pub enum EventPayload {
    /// A decoded domain entity (create/delete variants)
    Entity(Entity),
    /// Previous and merged entity snapshots (update variants)
    Pair {
        before: Box<Entity>,
        after: Box<Entity>,
    },
    /// A contextualized interaction
    Interaction(Box<InteractionContext>),
    /// Raw event payload, for uncached notices and raw socket events
    Raw(Value),
    /// Lifecycle events carrying no payload
    None,
}

/// Handler registered for a named event
pub type EventHandler = Arc<dyn Fn(&EventPayload) + Send + Sync>;

/// Fan-out of named events to consumer-registered handlers
#[derive(Default)]
pub struct Dispatcher {
    handlers: DashMap<String, Vec<EventHandler>>,
}

impl Dispatcher {
    /// Create an empty dispatcher
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a named event
    pub fn register<F>(&self, event: impl Into<String>, handler: F)
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        self.handlers
            .entry(event.into())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Dispatch a named event to every registered handler
    ///
    /// Dispatch never fails; events without handlers are dropped silently.
    pub fn dispatch(&self, event: &str, payload: &EventPayload) {
        // Clone the handler list out so callbacks can re-register without
        // holding a map guard.
        let handlers: Vec<EventHandler> = match self.handlers.get(event) {
            Some(list) => list.clone(),
            None => return,
        };

        tracing::trace!(event = %event, handlers = handlers.len(), "Dispatching event");

        for handler in handlers {
            handler(payload);
        }
    }

    /// Number of handlers registered for a named event
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, |list| list.len())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("events", &self.handlers.len())
            .finish()
    }
}
