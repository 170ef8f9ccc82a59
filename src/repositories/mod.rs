mod json_contact_repository;
mod json_conversation_repository;
mod traits;

pub use json_contact_repository::JsonContactRepository;
pub use json_conversation_repository::JsonConversationRepository;
pub use traits::{ContactRepository, ConversationRepository};
