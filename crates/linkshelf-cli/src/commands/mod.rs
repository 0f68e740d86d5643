//! Command handlers

pub mod config;
pub mod import;
pub mod link;
pub mod status;
