use async_trait::async_trait;
use contact_hybrid_search::error::{DirectoryError, DirectoryResult};
use contact_hybrid_search::models::Conversation;
use contact_hybrid_search::repositories::ConversationRepository;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Mock conversation repository for testing.
#[derive(Clone, Default)]
pub struct MockConversationRepository {
    conversations: Arc<Mutex<Vec<Conversation>>>,
    fail_list: Arc<AtomicBool>,
}

impl MockConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_conversation(&self, conversation: Conversation) {
        let mut conversations = self.conversations.lock().unwrap();
        conversations.retain(|c| c.id != conversation.id);
        conversations.push(conversation);
    }

    pub fn remove_conversation(&self, id: &str) {
        self.conversations.lock().unwrap().retain(|c| c.id != id);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConversationRepository for MockConversationRepository {
    async fn list_all(&self) -> DirectoryResult<Vec<Conversation>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(DirectoryError::Other("mock list failure".to_string()));
        }
        Ok(self.conversations.lock().unwrap().clone())
    }
}
