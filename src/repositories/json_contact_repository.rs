use super::traits::ContactRepository;
use crate::error::DirectoryResult;
use crate::models::Contact;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Contact directory loaded from a JSON array file and held in memory.
///
/// Contacts keep file order; `upsert` appends new ids at the end.
#[derive(Clone, Default)]
pub struct JsonContactRepository {
    contacts: Arc<RwLock<Vec<Contact>>>,
}

impl JsonContactRepository {
    /// Load contacts from a JSON file containing an array of contacts.
    pub fn from_path(path: impl AsRef<Path>) -> DirectoryResult<Self> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path)?;
        let contacts: Vec<Contact> = serde_json::from_str(&body)?;
        tracing::info!("Loaded {} contacts from {}", contacts.len(), path.display());
        Ok(Self::from_contacts(contacts))
    }

    pub fn from_contacts(contacts: Vec<Contact>) -> Self {
        Self {
            contacts: Arc::new(RwLock::new(contacts)),
        }
    }

    /// Insert or replace a contact by id.
    pub async fn upsert(&self, contact: Contact) {
        let mut contacts = self.contacts.write().await;
        match contacts.iter_mut().find(|c| c.id == contact.id) {
            Some(existing) => *existing = contact,
            None => contacts.push(contact),
        }
    }

    /// Remove a contact. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        let mut contacts = self.contacts.write().await;
        let before = contacts.len();
        contacts.retain(|c| c.id != id);
        contacts.len() != before
    }
}

#[async_trait]
impl ContactRepository for JsonContactRepository {
    async fn get(&self, id: &str) -> DirectoryResult<Option<Contact>> {
        let contacts = self.contacts.read().await;
        Ok(contacts.iter().find(|c| c.id == id).cloned())
    }

    async fn list_all(&self) -> DirectoryResult<Vec<Contact>> {
        Ok(self.contacts.read().await.clone())
    }
}
