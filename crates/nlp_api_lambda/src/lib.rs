//! AWS-oriented adapters and handlers for the NLP API.
//!
//! This crate owns runtime integration details (Lambda handlers, the managed
//! NLP provider seam and its AWS adapter, runtime configuration and logging).
//! Request/response contracts and the deployment plan live in `nlp_api_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod logging;
