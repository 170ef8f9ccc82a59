//! Index maintenance for the hybrid search service.
//!
//! Embeddings are computed before the index write lock is taken, so searches
//! only wait for the insertion itself. A contact's tag document carries its
//! own tags followed by the tags extracted from its conversations.

use super::hybrid_search_service::HybridSearchService;
use crate::error::PipelineResult;
use crate::models::contact::clean_tags;
use crate::models::{Contact, ContactUpdate, Conversation, Document, DocumentKind};
use crate::observability::Timer;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;

/// Tag document for a contact, if it has any usable tags.
fn tag_document(contact_id: &str, tags: &[String]) -> Option<Document> {
    let tags = clean_tags(tags);
    if tags.is_empty() {
        return None;
    }
    Some(Document::Tag {
        contact_id: contact_id.to_string(),
        tags,
    })
}

/// Transcript and summary documents for a conversation. Blank text is skipped.
fn conversation_documents(conversation: &Conversation) -> Vec<Document> {
    let mut documents = Vec::new();
    if !conversation.transcript.trim().is_empty() {
        documents.push(Document::Conversation {
            conversation_id: conversation.id.clone(),
            contact_id: conversation.contact_id.clone(),
            transcript: conversation.transcript.clone(),
        });
    }
    if let Some(summary) = conversation
        .summary
        .as_ref()
        .filter(|s| !s.trim().is_empty())
    {
        documents.push(Document::Summary {
            conversation_id: conversation.id.clone(),
            contact_id: conversation.contact_id.clone(),
            summary: summary.clone(),
        });
    }
    documents
}

/// Tags extracted from conversations, grouped by contact in conversation order.
fn conversation_tags_by_contact(conversations: &[Conversation]) -> HashMap<&str, Vec<String>> {
    let mut grouped: HashMap<&str, Vec<String>> = HashMap::new();
    for conversation in conversations {
        grouped
            .entry(conversation.contact_id.as_str())
            .or_default()
            .extend(conversation.tags.iter().cloned());
    }
    grouped
}

/// One tag document per contact, from its own tags followed by the tags of
/// its conversations.
fn contact_tag_documents(contacts: &[Contact], conversations: &[Conversation]) -> Vec<Document> {
    let extracted = conversation_tags_by_contact(conversations);
    contacts
        .iter()
        .filter_map(|contact| {
            let mut tags = contact.tags.clone();
            if let Some(more) = extracted.get(contact.id.as_str()) {
                tags.extend(more.iter().cloned());
            }
            tag_document(&contact.id, &tags)
        })
        .collect()
}

impl HybridSearchService {
    pub(super) async fn apply_contact_update(
        &self,
        contact_id: &str,
        update: ContactUpdate,
    ) -> PipelineResult<()> {
        self.keyword_index.update_contact(contact_id);

        if let Some(tags) = update.tags {
            let tags = self.merged_tags(contact_id, &tags, None).await?;
            self.reindex_contact_tags(contact_id, &tags).await?;
        }
        Ok(())
    }

    pub(super) async fn index_new_contact(&self, contact: &Contact) -> PipelineResult<bool> {
        self.keyword_index.add_contact(contact);
        let tags = self.merged_tags(&contact.id, &contact.tags, None).await?;
        self.reindex_contact_tags(&contact.id, &tags).await
    }

    /// A contact's own tags followed by those of its stored conversations,
    /// leaving out conversation `skip`.
    async fn merged_tags(
        &self,
        contact_id: &str,
        own: &[String],
        skip: Option<&str>,
    ) -> PipelineResult<Vec<String>> {
        let conversations = self.conversations.list_all().await?;
        let mut tags = own.to_vec();
        tags.extend(
            conversations
                .iter()
                .filter(|c| c.contact_id == contact_id && Some(c.id.as_str()) != skip)
                .flat_map(|c| c.tags.iter().cloned()),
        );
        Ok(tags)
    }

    /// Embedded tag document for `tags`, `None` when no usable tag remains.
    async fn embed_tag_document(
        &self,
        contact_id: &str,
        tags: &[String],
    ) -> PipelineResult<Option<(Document, Vec<f32>)>> {
        let Some(document) = tag_document(contact_id, tags) else {
            return Ok(None);
        };
        let embedding = self.embed_cached(&document.content()).await?;
        Ok(Some((document, embedding)))
    }

    /// Tag document of a contact after conversation `changed` was added or
    /// removed. `added` is the new version, if any.
    ///
    /// `None` when the contact is gone from the directory or has no tags left.
    async fn refreshed_tag_document(
        &self,
        contact_id: &str,
        changed: &str,
        added: Option<&Conversation>,
    ) -> PipelineResult<Option<(Document, Vec<f32>)>> {
        let Some(contact) = self.contacts.get(contact_id).await? else {
            return Ok(None);
        };
        let mut tags = self.merged_tags(contact_id, &contact.tags, Some(changed)).await?;
        if let Some(conversation) = added {
            tags.extend(conversation.tags.iter().cloned());
        }
        self.embed_tag_document(contact_id, &tags).await
    }

    /// Replace the tag document of one contact.
    ///
    /// On error the previous document stays in place. Returns whether a tag
    /// document was inserted.
    pub(super) async fn reindex_contact_tags(
        &self,
        contact_id: &str,
        tags: &[String],
    ) -> PipelineResult<bool> {
        let embedded = self.embed_tag_document(contact_id, tags).await?;
        let inserted = self
            .vector_index
            .write()
            .await
            .replace(&[Document::tag_id(contact_id)], embedded.into_iter().collect())?;
        self.metrics.track_documents_indexed(inserted);

        if inserted == 0 {
            tracing::debug!(contact_id = %contact_id, "Contact has no tags, tag document dropped");
        } else {
            tracing::debug!(contact_id = %contact_id, "Tag document reindexed");
        }
        Ok(inserted > 0)
    }

    pub(super) async fn rebuild_tags(&self) -> PipelineResult<usize> {
        let timer = Timer::new("rebuild_tag_index");

        let contacts = self.contacts.list_all().await?;
        let conversations = self.conversations.list_all().await?;
        let embedded = self
            .embed_documents(contact_tag_documents(&contacts, &conversations))
            .await;

        let (removed, inserted) = {
            let mut index = self.vector_index.write().await;
            let removed = index.remove_where(|doc| doc.kind() == DocumentKind::Tag);
            (removed, index.add_batch(embedded))
        };
        self.metrics.track_documents_indexed(inserted);

        tracing::info!(
            contacts = contacts.len(),
            removed = removed,
            inserted = inserted,
            duration_ms = timer.finish(),
            "Tag index rebuilt"
        );
        Ok(inserted)
    }

    pub(super) async fn rebuild_all(&self) -> PipelineResult<usize> {
        let timer = Timer::new("rebuild_index");

        let contacts = self.contacts.list_all().await?;
        let conversations = self.conversations.list_all().await?;

        let mut documents = contact_tag_documents(&contacts, &conversations);
        documents.extend(conversations.iter().flat_map(conversation_documents));
        let total = documents.len();
        let embedded = self.embed_documents(documents).await;

        let inserted = {
            let mut index = self.vector_index.write().await;
            index.clear();
            index.add_batch(embedded)
        };
        self.metrics.track_documents_indexed(inserted);

        tracing::info!(
            contacts = contacts.len(),
            conversations = conversations.len(),
            skipped = total - inserted,
            inserted = inserted,
            duration_ms = timer.finish(),
            "Index rebuilt"
        );
        Ok(inserted)
    }

    /// Index a conversation, replacing any documents it produced before, and
    /// refresh its contact's tag document.
    ///
    /// Nothing changes in the index on error. Returns the number of transcript
    /// and summary documents inserted.
    pub(super) async fn index_conversation_documents(
        &self,
        conversation: &Conversation,
    ) -> PipelineResult<usize> {
        let documents = conversation_documents(conversation);

        let mut embedded = Vec::with_capacity(documents.len() + 1);
        for document in documents {
            let embedding = self.embed_cached(&document.content()).await?;
            embedded.push((document, embedding));
        }
        let indexed = embedded.len();

        let contact_id = conversation.contact_id.as_str();
        let tag = self
            .refreshed_tag_document(contact_id, &conversation.id, Some(conversation))
            .await?;
        embedded.extend(tag);

        let replaced = [
            Document::conversation_id(&conversation.id),
            Document::summary_id(&conversation.id),
            Document::tag_id(contact_id),
        ];
        let inserted = self.vector_index.write().await.replace(&replaced, embedded)?;
        self.metrics.track_documents_indexed(inserted);

        tracing::debug!(
            conversation_id = %conversation.id,
            contact_id = %contact_id,
            documents = indexed,
            tag_document = inserted > indexed,
            "Conversation indexed"
        );
        Ok(indexed)
    }

    /// Remove a conversation's documents and drop its tags from the contact's
    /// tag document. Returns how many transcript and summary documents were
    /// removed.
    pub(super) async fn remove_conversation_documents(&self, conversation_id: &str) -> usize {
        let ids = [
            Document::conversation_id(conversation_id),
            Document::summary_id(conversation_id),
        ];
        let contact_id = self.conversation_contact(conversation_id, &ids).await;

        let removed = {
            let mut index = self.vector_index.write().await;
            ids.iter().filter(|id| index.remove(id)).count()
        };

        if let Some(contact_id) = contact_id {
            if let Err(e) = self.drop_conversation_tags(&contact_id, conversation_id).await {
                tracing::warn!(
                    contact_id = %contact_id,
                    conversation_id = %conversation_id,
                    "Failed to refresh tag document after conversation removal: {}",
                    e
                );
            }
        }
        removed
    }

    async fn drop_conversation_tags(&self, contact_id: &str, conversation_id: &str) -> PipelineResult<usize> {
        let tag = self
            .refreshed_tag_document(contact_id, conversation_id, None)
            .await?;
        let inserted = self
            .vector_index
            .write()
            .await
            .replace(&[Document::tag_id(contact_id)], tag.into_iter().collect())?;
        Ok(inserted)
    }

    /// Contact a conversation belongs to, from its indexed documents or else
    /// the conversation store.
    async fn conversation_contact(&self, conversation_id: &str, document_ids: &[String]) -> Option<String> {
        let indexed = {
            let index = self.vector_index.read().await;
            document_ids
                .iter()
                .find_map(|id| index.get(id))
                .map(|entry| entry.document.contact_id().to_string())
        };
        if indexed.is_some() {
            return indexed;
        }

        match self.conversations.list_all().await {
            Ok(conversations) => conversations
                .into_iter()
                .find(|c| c.id == conversation_id)
                .map(|c| c.contact_id),
            Err(e) => {
                tracing::warn!(conversation_id = %conversation_id, "Conversation lookup failed: {}", e);
                None
            }
        }
    }

    /// Embed documents with bounded concurrency, keeping their order.
    ///
    /// Documents whose embedding fails are logged and left out.
    async fn embed_documents(&self, documents: Vec<Document>) -> Vec<(Document, Vec<f32>)> {
        let results: Vec<Option<(Document, Vec<f32>)>> = stream::iter(documents)
            .map(|document| async move {
                match self.embed_cached(&document.content()).await {
                    Ok(embedding) => Some((document, embedding)),
                    Err(e) => {
                        tracing::warn!(document_id = %document.id(), "Failed to embed document, skipping: {}", e);
                        None
                    }
                }
            })
            .buffered(self.rebuild_concurrency)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }
}
