use super::traits::ConversationRepository;
use crate::error::DirectoryResult;
use crate::models::Conversation;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Conversation store loaded from a JSON array file and held in memory.
#[derive(Clone, Default)]
pub struct JsonConversationRepository {
    conversations: Arc<RwLock<Vec<Conversation>>>,
}

impl JsonConversationRepository {
    /// Load conversations from a JSON file containing an array.
    pub fn from_path(path: impl AsRef<Path>) -> DirectoryResult<Self> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path)?;
        let conversations: Vec<Conversation> = serde_json::from_str(&body)?;
        tracing::info!(
            "Loaded {} conversations from {}",
            conversations.len(),
            path.display()
        );
        Ok(Self::from_conversations(conversations))
    }

    pub fn from_conversations(conversations: Vec<Conversation>) -> Self {
        Self {
            conversations: Arc::new(RwLock::new(conversations)),
        }
    }

    /// Store with no conversations.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Insert or replace a conversation by id.
    pub async fn upsert(&self, conversation: Conversation) {
        let mut conversations = self.conversations.write().await;
        match conversations.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => *existing = conversation,
            None => conversations.push(conversation),
        }
    }

    /// Remove a conversation, returning it if it existed.
    pub async fn remove(&self, id: &str) -> Option<Conversation> {
        let mut conversations = self.conversations.write().await;
        let pos = conversations.iter().position(|c| c.id == id)?;
        Some(conversations.remove(pos))
    }
}

#[async_trait]
impl ConversationRepository for JsonConversationRepository {
    async fn list_all(&self) -> DirectoryResult<Vec<Conversation>> {
        Ok(self.conversations.read().await.clone())
    }
}
