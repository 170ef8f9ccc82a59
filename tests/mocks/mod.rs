//! In-memory collaborators for integration tests.

#![allow(dead_code)]

pub mod mock_contact_repository;
pub mod mock_conversation_repository;
pub mod mock_embedding_provider;

pub use mock_contact_repository::MockContactRepository;
pub use mock_conversation_repository::MockConversationRepository;
pub use mock_embedding_provider::MockEmbeddingProvider;
