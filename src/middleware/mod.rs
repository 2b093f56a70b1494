//! Middleware module
//!
//! This module describes the request processing pipeline the web
//! framework is configured with.

pub mod chain;

pub use chain::{Middleware, MiddlewareChain};
