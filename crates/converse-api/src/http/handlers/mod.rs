//! HTTP request handlers.

pub mod chat;
pub mod models;
pub mod session;
