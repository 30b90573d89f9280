//! Shared NLP API domain primitives.
//!
//! This crate owns the operation catalogue, request/response contracts and the
//! deployment plan (route table, provisioner, template rendering). It
//! intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod contract;
pub mod envelope;
pub mod provisioning;
pub mod requests;
pub mod template;
