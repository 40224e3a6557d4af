//! Conversation core and collaborator trait definitions for Converse.
//!
//! This crate defines the "ports" (the [`inference::InferenceClient`] and
//! [`history::HistoryStore`] traits) that the infrastructure layer
//! implements, plus the two stateful pieces of the system: the
//! per-session [`session::ConversationSession`] and the process-wide
//! [`registry::SessionRegistry`]. It depends only on `converse-types` --
//! never on `converse-infra` or any database/HTTP crate.

pub mod history;
pub mod inference;
pub mod registry;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
