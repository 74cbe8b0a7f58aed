pub mod event_store;
pub mod seed;
pub mod storage;

pub use event_store::{create_shared_event_store, EventStore, SharedEventStore};
pub use storage::Storage;
