//! API models for request and response payloads

pub mod document;
pub mod profile;
