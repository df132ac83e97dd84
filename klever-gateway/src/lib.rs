// Export modules for the binary and the integration tests
pub mod account;
pub mod api;
pub mod asset;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod network;
pub mod relay;
pub mod transaction;
