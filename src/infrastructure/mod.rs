pub mod change_feed;
pub mod config;
pub mod error;
pub mod postgrest_client;
pub mod remote_store;
