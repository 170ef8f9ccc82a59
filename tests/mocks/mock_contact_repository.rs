use async_trait::async_trait;
use contact_hybrid_search::error::{DirectoryError, DirectoryResult};
use contact_hybrid_search::models::Contact;
use contact_hybrid_search::repositories::ContactRepository;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Mock contact repository for testing.
///
/// Keeps contacts in insertion order, tracks method calls, and can be told to
/// fail `get` or `list_all`.
#[derive(Clone, Default)]
pub struct MockContactRepository {
    contacts: Arc<Mutex<Vec<Contact>>>,
    call_counts: Arc<Mutex<HashMap<String, usize>>>,
    fail_get: Arc<AtomicBool>,
    fail_list: Arc<AtomicBool>,
}

impl MockContactRepository {
    /// Create a new empty MockContactRepository.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        let repo = Self::new();
        repo.add_contacts(contacts);
        repo
    }

    /// Add or replace a contact.
    pub fn add_contact(&self, contact: Contact) {
        let mut contacts = self.contacts.lock().unwrap();
        match contacts.iter_mut().find(|c| c.id == contact.id) {
            Some(existing) => *existing = contact,
            None => contacts.push(contact),
        }
    }

    pub fn add_contacts(&self, contacts: Vec<Contact>) {
        for contact in contacts {
            self.add_contact(contact);
        }
    }

    pub fn remove_contact(&self, id: &str) {
        self.contacts.lock().unwrap().retain(|c| c.id != id);
    }

    /// Replace a contact's tags.
    pub fn set_tags(&self, id: &str, tags: Vec<&str>) {
        let mut contacts = self.contacts.lock().unwrap();
        if let Some(contact) = contacts.iter_mut().find(|c| c.id == id) {
            contact.tags = tags.into_iter().map(str::to_string).collect();
        }
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Get the number of times a method was called.
    pub fn get_call_count(&self, method: &str) -> usize {
        let counts = self.call_counts.lock().unwrap();
        *counts.get(method).unwrap_or(&0)
    }

    pub fn reset_call_counts(&self) {
        self.call_counts.lock().unwrap().clear();
    }

    fn track_call(&self, method: &str) {
        let mut counts = self.call_counts.lock().unwrap();
        *counts.entry(method.to_string()).or_insert(0) += 1;
    }
}

#[async_trait]
impl ContactRepository for MockContactRepository {
    async fn get(&self, id: &str) -> DirectoryResult<Option<Contact>> {
        self.track_call("get");
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(DirectoryError::Other("mock get failure".to_string()));
        }

        let contacts = self.contacts.lock().unwrap();
        Ok(contacts.iter().find(|c| c.id == id).cloned())
    }

    async fn list_all(&self) -> DirectoryResult<Vec<Contact>> {
        self.track_call("list_all");
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(DirectoryError::Other("mock list failure".to_string()));
        }

        Ok(self.contacts.lock().unwrap().clone())
    }
}
