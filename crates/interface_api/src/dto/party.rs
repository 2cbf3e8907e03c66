//! Contact DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_party::{Contact, ContactType};

/// Request to create a contact
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    #[validate(length(min = 1))]
    pub name: String,
    /// "customer", "vendor", or "both"
    pub contact_type: ContactType,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

/// Contact representation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub contact_type: ContactType,
    pub tag_ids: Vec<Uuid>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: *contact.id.as_uuid(),
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            contact_type: contact.contact_type,
            tag_ids: contact.tag_ids.iter().map(|t| *t.as_uuid()).collect(),
            is_archived: contact.is_archived,
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        }
    }
}
