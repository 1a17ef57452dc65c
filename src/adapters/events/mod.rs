//! Event bus adapters.
//!
//! - `LocalEventBus` - in-process pub/sub; handlers run inline on publish

mod local;

pub use local::LocalEventBus;
