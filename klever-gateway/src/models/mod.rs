//! Data models used throughout the application
//!
//! This module contains the inbound request shapes and the JSON envelopes
//! returned by the gateway endpoints.

// Gateway request/response structures
pub mod gateway;
