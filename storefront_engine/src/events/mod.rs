mod broadcaster;
mod channel;
mod event_types;
mod hooks;

pub use broadcaster::EventBroadcaster;
pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
