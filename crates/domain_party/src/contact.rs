//! Contact entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{PartyId, TagId};

/// Whether a contact buys from us, sells to us, or both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactType {
    Customer,
    Vendor,
    Both,
}

/// A customer or vendor contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// Unique identifier
    pub id: PartyId,
    /// Display name
    pub name: String,
    /// Email address; required for portal provisioning
    pub email: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Customer, vendor, or both
    pub contact_type: ContactType,
    /// Tags used by analytical auto-assignment rules
    pub tag_ids: Vec<TagId>,
    /// Soft-delete flag
    pub is_archived: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Creates a new active contact
    pub fn new(name: impl Into<String>, contact_type: ContactType) -> Self {
        let now = Utc::now();
        Self {
            id: PartyId::new_v7(),
            name: name.into(),
            email: None,
            phone: None,
            contact_type,
            tag_ids: Vec::new(),
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Adds a tag
    pub fn with_tag(mut self, tag_id: TagId) -> Self {
        self.tag_ids.push(tag_id);
        self
    }

    /// Whether this contact can appear on sales documents
    pub fn is_customer(&self) -> bool {
        matches!(self.contact_type, ContactType::Customer | ContactType::Both)
    }

    /// Whether this contact can appear on purchase documents
    pub fn is_vendor(&self) -> bool {
        matches!(self.contact_type, ContactType::Vendor | ContactType::Both)
    }

    /// First whitespace-separated token of the name
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    /// Archives the contact
    pub fn archive(&mut self) {
        self.is_archived = true;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_roles() {
        let customer = Contact::new("Sharma Residence", ContactType::Customer);
        assert!(customer.is_customer());
        assert!(!customer.is_vendor());

        let both = Contact::new("Acme Trading", ContactType::Both);
        assert!(both.is_customer());
        assert!(both.is_vendor());
    }

    #[test]
    fn test_first_name() {
        let contact = Contact::new("Sharma Residence", ContactType::Customer);
        assert_eq!(contact.first_name(), "Sharma");

        let single = Contact::new("Mono", ContactType::Customer);
        assert_eq!(single.first_name(), "Mono");
    }

    #[test]
    fn test_tags_and_archive() {
        use core_kernel::TagId;

        let mut contact = Contact::new("Verma Interiors", ContactType::Customer)
            .with_tag(TagId::new())
            .with_tag(TagId::new());
        assert_eq!(contact.tag_ids.len(), 2);

        contact.archive();
        assert!(contact.is_archived);
    }
}
