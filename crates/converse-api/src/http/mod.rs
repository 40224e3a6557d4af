//! HTTP adapter: router, handlers, and error mapping.
//!
//! A thin translation layer -- handlers map transport shapes onto the
//! registry/session operations and map results and errors back onto
//! status codes. No conversation logic lives here.

pub mod error;
pub mod handlers;
pub mod router;
