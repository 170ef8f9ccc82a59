//! Data models for the contact search engine.
//!
//! This module contains the collaborator records (contacts, conversations), the
//! documents stored in the vector index, and the ranked results returned to callers.

pub mod contact;
pub mod conversation;
pub mod document;
pub mod result;

pub use contact::{Contact, ContactUpdate};
pub use conversation::Conversation;
pub use document::{Document, DocumentKind};
pub use result::{DebugRow, MatchedField, ResultSource, SearchResult};
