//! Consumer-facing event fan-out

mod dispatcher;

pub use dispatcher::{Dispatcher, EventHandler, EventPayload};
