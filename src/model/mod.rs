//! Core data structures for conversation logs.
//!
//! A JSONL line deserializes into a [`Conversation`], an ordered list of
//! [`Message`] values. Both types carry an `extra` map that preserves any keys
//! the editor does not interpret, so an import followed by an export keeps them.

mod conversation;
mod message;

pub use conversation::*;
pub use message::*;
