use crate::error::DirectoryResult;
use crate::models::{Contact, Conversation};
use async_trait::async_trait;

/// Read access to the contact directory.
///
/// The search engine never writes contacts; it reads names for enrichment and
/// enumerates contacts for keyword search and index rebuilds.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Retrieve a single contact by ID, `None` if it does not exist.
    async fn get(&self, id: &str) -> DirectoryResult<Option<Contact>>;

    /// Retrieve every contact, in a stable order.
    async fn list_all(&self) -> DirectoryResult<Vec<Contact>>;
}

/// Read access to processed conversations.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Retrieve every conversation, in a stable order.
    async fn list_all(&self) -> DirectoryResult<Vec<Conversation>>;
}
