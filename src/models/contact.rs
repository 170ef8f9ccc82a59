//! Contact model as exposed by the contact directory.

use serde::{Deserialize, Serialize};

/// A contact in the user's address book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Contact {
    /// Unique identifier for the contact
    pub id: String,

    /// Display name
    pub name: String,

    /// Primary email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Primary phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Tags set on the contact itself
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Contact {
    /// Create a new contact with minimal required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style helper to attach tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Tags with surrounding whitespace removed and blanks dropped, in original order.
    pub fn clean_tags(&self) -> Vec<String> {
        clean_tags(&self.tags)
    }
}

/// Partial update for a contact, as sent by the editing layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactUpdate {
    /// New complete tag set, when tags changed
    pub tags: Option<Vec<String>>,
}

impl ContactUpdate {
    /// Update carrying a replacement tag set.
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: Some(tags.into_iter().map(Into::into).collect()),
        }
    }
}

/// Trim tags and drop empty entries and case-insensitive duplicates.
pub fn clean_tags(tags: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_deserialize_minimal() {
        let contact: Contact = serde_json::from_str(r#"{"id": "c1", "name": "Ada"}"#).unwrap();
        assert_eq!(contact.id, "c1");
        assert_eq!(contact.name, "Ada");
        assert!(contact.email.is_none());
        assert!(contact.tags.is_empty());
    }

    #[test]
    fn test_contact_serialize_skips_empty() {
        let contact = Contact::new("c1", "Ada");
        let json = serde_json::to_string(&contact).unwrap();
        assert!(!json.contains("email"));
        assert!(!json.contains("tags"));
    }

    #[test]
    fn test_clean_tags() {
        let contact = Contact::new("c1", "Ada").with_tags(["  AI ", "", "ai", "math"]);
        assert_eq!(contact.clean_tags(), vec!["AI", "math"]);
    }
}
