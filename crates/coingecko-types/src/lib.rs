//! Shared types for the CoinGecko API client
//!
//! This crate provides the core type definitions used across the workspace.
//! It has minimal dependencies and can be used independently, for example to
//! implement a custom [`Endpoint`] on top of another HTTP stack.
//!
//! # Key Types
//!
//! - [`CallArgs`] - Positional path arguments and keyword query arguments
//! - [`Payload`], [`ResponseMeta`] - Decoded response body and HTTP metadata
//! - [`Endpoint`] - The seam between the request engine and the transport
//! - [`InvokeError`] - Failures raised by a single endpoint invocation

pub mod args;
pub mod endpoint;
pub mod error;
pub mod response;

// Re-export commonly used types
pub use args::*;
pub use endpoint::*;
pub use error::*;
pub use response::*;

// Re-export serde_json's value type, the currency of every endpoint
pub use serde_json::Value;
