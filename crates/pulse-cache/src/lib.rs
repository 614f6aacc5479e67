//! # pulse-cache
//!
//! In-process entity cache shared by the gateway session and all consumers.
//!
//! Write discipline is a contract, not an accident: the event reconciler is
//! the only writer; every other holder of the cache is read-only. The store
//! is injected explicitly (`Arc<EntityCache>`), never reached through a
//! global.

mod entity_cache;
mod error;
mod key;
mod merge;
mod store;

pub use entity_cache::EntityCache;
pub use error::CacheError;
pub use key::CacheKey;
pub use merge::merge_value;
pub use store::{MergeOutcome, Store};
