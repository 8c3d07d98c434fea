//! Core domain + application logic for the chanlog IRC activity logger.
//!
//! This crate is transport-agnostic. The TCP connection lives behind the
//! [`ports::Connection`] port, implemented in the `chanlog-irc` adapter crate.

pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod framer;
pub mod handlers;
pub mod ingest;
pub mod logging;
pub mod ports;
pub mod protocol;
pub mod query;
pub mod render;
pub mod snapshot;
pub mod store;

pub use errors::{Error, Result};
