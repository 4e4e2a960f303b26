//! Data models shared by the extraction pipeline and its callers.

pub mod config;
pub mod lab;
