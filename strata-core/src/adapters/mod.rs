//! Adapters - concrete implementations of the ports

pub mod duckdb;

pub use duckdb::DuckDbStore;
