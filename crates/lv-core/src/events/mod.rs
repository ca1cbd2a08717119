use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

/// Event bus connecting the controller to whoever follows the linked view
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Events published by the linked view controller
pub mod events {
    use super::Event;
    use crate::model::LinkKey;

    /// The highlighted point moved to another key
    #[derive(Debug, Clone, PartialEq)]
    pub struct HighlightChanged {
        pub previous: Option<usize>,
        pub point: usize,
        pub key: LinkKey,
    }

    /// Label text replaced
    #[derive(Debug, Clone, PartialEq)]
    pub struct LabelChanged {
        pub text: String,
    }

    /// Histogram switched to another bucket
    #[derive(Debug, Clone, PartialEq)]
    pub struct HistogramChanged {
        pub key: LinkKey,
        pub bar_count: usize,
    }

    /// Surface size reported by the host
    #[derive(Debug, Clone, PartialEq)]
    pub struct ViewResized {
        pub width: f64,
        pub height: f64,
        pub relaid_out: bool,
    }

    // Implement Event trait for all event types
    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        HighlightChanged,
        LabelChanged,
        HistogramChanged,
        ViewResized
    );
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("event_types", &self.handlers.lock().len())
            .finish()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

/// Handler that only sees events of type `E`
pub fn typed_handler<E, F>(mut f: F) -> Box<dyn EventHandler>
where
    E: Event,
    F: FnMut(&E) + Send + Sync + 'static,
{
    handler_from_fn(move |event| {
        if let Some(event) = event.as_any().downcast_ref::<E>() {
            f(event);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::events::LabelChanged;

    #[test]
    fn test_publish_reaches_typed_subscribers_only() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe::<LabelChanged>(typed_handler::<LabelChanged, _>(move |e| {
            sink.lock().push(e.text.clone());
        }));

        bus.publish(LabelChanged { text: "ID: 7".to_string() });
        bus.publish(events::ViewResized { width: 1.0, height: 1.0, relaid_out: false });

        assert_eq!(*seen.lock(), vec!["ID: 7".to_string()]);
    }
}
