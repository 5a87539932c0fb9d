//! Shared types for the Wayfinder workspace: conversation messages, stream
//! events, error taxonomy, configuration, and structured trace events.

pub mod config;
pub mod error;
pub mod message;
pub mod stream;
pub mod trace;
