pub mod api;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod store;
pub mod vector;
