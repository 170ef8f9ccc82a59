//! Keyword index over contact fields.
//!
//! The index is a live view over the contact directory: every query scans the
//! current contact list instead of keeping a second copy in sync. Results are
//! therefore never stale, and the maintenance hooks have nothing to do.

use crate::error::DirectoryResult;
use crate::models::{Contact, MatchedField};
use crate::repositories::ContactRepository;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Score for a name equal to the whole query.
const EXACT_NAME_SCORE: f64 = 1.0;

/// Score when every term prefixes some word of the name.
const NAME_PREFIX_SCORE: f64 = 0.95;

/// Per-term credits.
const NAME_EXACT_TERM_CREDIT: f64 = 0.9;
const NAME_SUBSTRING_CREDIT: f64 = 0.7;
const EMAIL_CREDIT: f64 = 0.4;
const PHONE_CREDIT: f64 = 0.5;
const TAG_CREDIT: f64 = 0.3;

/// Separator between fields in the snippet source text.
const FIELD_SEPARATOR: &str = " | ";

/// Lexical view of a contact.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordDocument {
    pub contact_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tags: BTreeSet<String>,
}

impl From<&Contact> for KeywordDocument {
    fn from(contact: &Contact) -> Self {
        Self {
            contact_id: contact.id.clone(),
            name: contact.name.clone(),
            email: contact.email.clone().filter(|e| !e.trim().is_empty()),
            phone: contact.phone.clone().filter(|p| !p.trim().is_empty()),
            tags: contact.clean_tags().into_iter().collect(),
        }
    }
}

impl KeywordDocument {
    /// Fields concatenated for snippet extraction.
    fn snippet_source(&self) -> String {
        let mut parts: Vec<String> = vec![self.name.clone()];
        parts.extend(self.email.clone());
        parts.extend(self.phone.clone());
        if !self.tags.is_empty() {
            parts.push(self.tags.iter().cloned().collect::<Vec<_>>().join(", "));
        }
        parts.join(FIELD_SEPARATOR)
    }
}

/// A normalized query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerms {
    /// Lowercased query with whitespace collapsed
    pub full: String,

    /// Lowercased whitespace-separated terms
    pub terms: Vec<String>,
}

impl QueryTerms {
    pub fn parse(query: &str) -> Self {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        Self {
            full: terms.join(" "),
            terms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// A keyword match for one contact.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordHit {
    pub contact_id: String,
    pub name: String,

    /// Score in `[0, 1]`
    pub score: f64,

    /// Highest display-priority field that matched
    pub matched_field: MatchedField,

    pub snippet: String,
}

/// Keyword search over the live contact directory.
#[derive(Clone)]
pub struct KeywordIndex {
    directory: Arc<dyn ContactRepository>,
    max_snippet_length: usize,
}

impl KeywordIndex {
    /// Create a keyword index reading from `directory`.
    pub fn new(directory: Arc<dyn ContactRepository>, max_snippet_length: usize) -> Self {
        Self {
            directory,
            max_snippet_length,
        }
    }

    /// Search contacts for a query string.
    ///
    /// Returns at most `limit` hits sorted by score (highest first), then by name.
    pub async fn search(&self, query: &str, limit: usize) -> DirectoryResult<Vec<KeywordHit>> {
        let terms = QueryTerms::parse(query);
        if terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let contacts = self.directory.list_all().await?;
        let mut hits: Vec<KeywordHit> = contacts
            .iter()
            .map(KeywordDocument::from)
            .filter_map(|doc| self.match_document(&doc, &terms))
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.contact_id.cmp(&b.contact_id))
        });
        hits.truncate(limit);

        tracing::debug!(query = %terms.full, hits = hits.len(), "Keyword search completed");
        Ok(hits)
    }

    /// Score one document and build its snippet.
    pub fn match_document(&self, doc: &KeywordDocument, terms: &QueryTerms) -> Option<KeywordHit> {
        let (score, matched_field) = score_document(doc, terms)?;
        Some(KeywordHit {
            contact_id: doc.contact_id.clone(),
            name: doc.name.clone(),
            score,
            matched_field,
            snippet: generate_snippet(&doc.snippet_source(), &terms.terms, self.max_snippet_length),
        })
    }

    /// Maintenance hook; the live view has nothing to update.
    pub fn add_contact(&self, contact: &Contact) {
        tracing::trace!(contact_id = %contact.id, "Keyword index is a live view, add is a no-op");
    }

    /// Maintenance hook; the live view has nothing to update.
    pub fn update_contact(&self, contact_id: &str) {
        tracing::trace!(contact_id = %contact_id, "Keyword index is a live view, update is a no-op");
    }

    /// Maintenance hook; the live view has nothing to update.
    pub fn remove_contact(&self, contact_id: &str) {
        tracing::trace!(contact_id = %contact_id, "Keyword index is a live view, remove is a no-op");
    }
}

/// Score a document against a query.
///
/// Returns `None` when nothing matched.
pub fn score_document(doc: &KeywordDocument, terms: &QueryTerms) -> Option<(f64, MatchedField)> {
    if terms.is_empty() {
        return None;
    }

    let name = doc.name.to_lowercase();
    let name_words: Vec<&str> = name.split_whitespace().collect();

    if name_words.join(" ") == terms.full {
        return Some((EXACT_NAME_SCORE, MatchedField::Name));
    }

    if !name_words.is_empty()
        && terms
            .terms
            .iter()
            .all(|term| name_words.iter().any(|word| word.starts_with(term.as_str())))
    {
        return Some((NAME_PREFIX_SCORE, MatchedField::Name));
    }

    let email = doc.email.as_deref().map(str::to_lowercase);
    let phone = doc.phone.as_deref().map(str::to_lowercase);
    let phone_digits = doc.phone.as_deref().map(digits_only);
    let tags: Vec<String> = doc.tags.iter().map(|t| t.to_lowercase()).collect();

    let mut total = 0.0;
    let (mut name_hit, mut email_hit, mut phone_hit, mut tag_hit) = (false, false, false, false);

    for term in &terms.terms {
        if name.contains(term.as_str()) {
            name_hit = true;
            total += if name_words.contains(&term.as_str()) {
                NAME_EXACT_TERM_CREDIT
            } else {
                NAME_SUBSTRING_CREDIT
            };
        }

        if email.as_deref().is_some_and(|e| e.contains(term.as_str())) {
            email_hit = true;
            total += EMAIL_CREDIT;
        }

        if phone_matches(phone.as_deref(), phone_digits.as_deref(), term) {
            phone_hit = true;
            total += PHONE_CREDIT;
        }

        if tags.iter().any(|t| t.contains(term.as_str())) {
            tag_hit = true;
            total += TAG_CREDIT;
        }
    }

    let matched_field = if name_hit {
        MatchedField::Name
    } else if email_hit {
        MatchedField::Email
    } else if phone_hit {
        MatchedField::Phone
    } else if tag_hit {
        MatchedField::Tag
    } else {
        return None;
    };

    let score = (total / (terms.terms.len() as f64 * 2.0)).min(1.0);
    Some((score, matched_field))
}

/// Substring match on the raw phone, or on digits only when the term is
/// written entirely in phone characters.
fn phone_matches(phone: Option<&str>, phone_digits: Option<&str>, term: &str) -> bool {
    static PHONE_TERM_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[\d\s+().-]+$").expect("phone term pattern is valid"));

    let Some(phone) = phone else {
        return false;
    };
    if phone.contains(term) {
        return true;
    }
    if !PHONE_TERM_RE.is_match(term) {
        return false;
    }
    let term_digits = digits_only(term);
    !term_digits.is_empty() && phone_digits.is_some_and(|d| d.contains(term_digits.as_str()))
}

fn digits_only(text: &str) -> String {
    static NON_DIGIT_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\D").expect("non-digit pattern is valid"));
    NON_DIGIT_RE.replace_all(text, "").into_owned()
}

/// Pick the `window`-character slice of `text` containing the most distinct terms.
///
/// The first best window wins. `...` marks a cut at either end.
pub fn generate_snippet(text: &str, terms: &[String], window: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= window || window == 0 {
        return text.to_string();
    }

    let mut best_start = 0;
    let mut best_count = 0;
    for start in 0..=(chars.len() - window) {
        let slice: String = chars[start..start + window].iter().collect::<String>().to_lowercase();
        let count = terms.iter().filter(|t| slice.contains(t.as_str())).count();
        if count > best_count {
            best_count = count;
            best_start = start;
            if count == terms.len() {
                break;
            }
        }
    }

    let end = best_start + window;
    let mut snippet: String = chars[best_start..end].iter().collect();
    if best_start > 0 {
        snippet = format!("...{}", snippet);
    }
    if end < chars.len() {
        snippet.push_str("...");
    }
    snippet
}
