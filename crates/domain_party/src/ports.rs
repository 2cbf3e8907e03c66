//! Party domain ports

use async_trait::async_trait;

use core_kernel::{PartyId, PortError, PortalUserId};

use crate::contact::Contact;
use crate::portal::PortalUser;

/// Repository interface for contacts
#[async_trait]
pub trait ContactPort: Send + Sync {
    /// Retrieves a contact by id
    async fn get(&self, id: PartyId) -> Result<Contact, PortError>;

    /// Lists all contacts
    async fn list(&self) -> Result<Vec<Contact>, PortError>;

    /// Finds a contact by exact name
    async fn find_by_name(&self, name: &str) -> Result<Option<Contact>, PortError>;

    /// Inserts a new contact
    async fn insert(&self, contact: Contact) -> Result<(), PortError>;

    /// Persists the contact's current state
    async fn save(&self, contact: &Contact) -> Result<(), PortError>;
}

/// Repository interface for portal users
#[async_trait]
pub trait PortalUserPort: Send + Sync {
    /// Finds a portal user by login email
    async fn find_by_email(&self, email: &str) -> Result<Option<PortalUser>, PortError>;

    /// Inserts a new portal user
    async fn insert(&self, user: PortalUser) -> Result<(), PortError>;

    /// Links a portal user to a customer contact
    async fn link_contact(
        &self,
        user_id: PortalUserId,
        contact_id: PartyId,
    ) -> Result<(), PortError>;
}

/// In-memory mock adapters for testing without a database
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory contact store
    #[derive(Debug, Default)]
    pub struct MockContacts {
        contacts: Arc<RwLock<HashMap<PartyId, Contact>>>,
    }

    impl MockContacts {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl ContactPort for MockContacts {
        async fn get(&self, id: PartyId) -> Result<Contact, PortError> {
            self.contacts
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Contact", id))
        }

        async fn list(&self) -> Result<Vec<Contact>, PortError> {
            let mut contacts: Vec<_> = self.contacts.read().await.values().cloned().collect();
            contacts.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(contacts)
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Contact>, PortError> {
            Ok(self
                .contacts
                .read()
                .await
                .values()
                .find(|c| c.name == name)
                .cloned())
        }

        async fn insert(&self, contact: Contact) -> Result<(), PortError> {
            self.contacts.write().await.insert(contact.id, contact);
            Ok(())
        }

        async fn save(&self, contact: &Contact) -> Result<(), PortError> {
            let mut contacts = self.contacts.write().await;
            if !contacts.contains_key(&contact.id) {
                return Err(PortError::not_found("Contact", contact.id));
            }
            contacts.insert(contact.id, contact.clone());
            Ok(())
        }
    }

    /// In-memory portal user store
    #[derive(Debug, Default)]
    pub struct MockPortalUsers {
        users: Arc<RwLock<HashMap<PortalUserId, PortalUser>>>,
    }

    impl MockPortalUsers {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl PortalUserPort for MockPortalUsers {
        async fn find_by_email(&self, email: &str) -> Result<Option<PortalUser>, PortError> {
            Ok(self
                .users
                .read()
                .await
                .values()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn insert(&self, user: PortalUser) -> Result<(), PortError> {
            self.users.write().await.insert(user.id, user);
            Ok(())
        }

        async fn link_contact(
            &self,
            user_id: PortalUserId,
            contact_id: PartyId,
        ) -> Result<(), PortError> {
            let mut users = self.users.write().await;
            let user = users
                .get_mut(&user_id)
                .ok_or_else(|| PortError::not_found("PortalUser", user_id))?;
            user.contact_id = Some(contact_id);
            Ok(())
        }
    }
}
