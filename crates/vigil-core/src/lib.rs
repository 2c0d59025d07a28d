//! Core types and trait definitions for the Vigil incident pipeline.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends, the HTTP layer and the command-line client all depend on
//! it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod attachment;
pub mod error;
pub mod form;
pub mod geocode;
pub mod record;
pub mod service;
pub mod store;

pub use error::{Error, Result};
