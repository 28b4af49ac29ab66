pub mod entry_store;
pub mod listener;
pub mod mutation;
pub mod view_sync;
