//! Shared domain types for Converse.
//!
//! This crate contains the core domain types used across the Converse
//! service: conversation turns, completion request/response shapes,
//! session summaries, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod error;
pub mod inference;
pub mod session;
pub mod turn;
