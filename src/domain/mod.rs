pub mod aggregate;
pub mod interval;
pub mod models;
