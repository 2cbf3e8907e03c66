//! Portal account provisioning
//!
//! Every customer contact with an email gets a portal login. Starter
//! passwords are derived from the contact's first name (`First@123`), which
//! keeps bulk provisioning deterministic and lets staff read the credential
//! back to the customer over the phone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use core_kernel::{PartyId, PortError, PortalUserId};

use crate::contact::Contact;
use crate::ports::{ContactPort, PortalUserPort};

/// Fixed demo credential created on request
const DEMO_EMAIL: &str = "portal@shivfurniture.com";
const DEMO_PASSWORD: &str = "Portal@123";
const DEMO_NAME: &str = "Portal Demo User";
const DEMO_CONTACT_NAME: &str = "Sharma Residence";

/// A provisioned portal login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalUser {
    /// Unique identifier
    pub id: PortalUserId,
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Role; portal users only see their own documents
    pub role: String,
    /// Customer contact backing this login
    pub contact_id: Option<PartyId>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl PortalUser {
    /// Creates a portal-role user linked to a contact
    pub fn portal(email: impl Into<String>, name: impl Into<String>, contact_id: Option<PartyId>) -> Self {
        Self {
            id: PortalUserId::new_v7(),
            email: email.into(),
            name: name.into(),
            role: "portal".to_string(),
            contact_id,
            created_at: Utc::now(),
        }
    }
}

/// Generates the starter password for a contact name: `{first name}@123`
pub fn portal_password(name: &str) -> String {
    let first = name.split_whitespace().next().unwrap_or(name);
    format!("{}@123", first)
}

/// Outcome of provisioning one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningStatus {
    Created,
    AlreadyExists,
    Error,
}

/// One row of the provisioning report returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionedAccount {
    pub email: String,
    pub password: String,
    pub name: String,
    pub status: ProvisioningStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Bulk-provisions portal accounts from customer contacts
pub struct PortalProvisioner {
    contacts: Arc<dyn ContactPort>,
    users: Arc<dyn PortalUserPort>,
}

impl PortalProvisioner {
    /// Creates a provisioner over the given ports
    pub fn new(contacts: Arc<dyn ContactPort>, users: Arc<dyn PortalUserPort>) -> Self {
        Self { contacts, users }
    }

    /// Provisions a portal login for every customer contact with an email
    ///
    /// An existing user is linked to its contact when not already linked and
    /// reported as `AlreadyExists`. Individual failures become `Error` rows;
    /// the sweep always completes.
    pub async fn provision_all(&self) -> Result<Vec<ProvisionedAccount>, PortError> {
        let contacts = self.contacts.list().await?;
        let mut results = Vec::new();

        for contact in contacts
            .iter()
            .filter(|c| c.is_customer() && !c.is_archived)
        {
            let Some(email) = contact.email.clone() else {
                continue;
            };
            results.push(self.provision_contact(contact, email).await);
        }

        info!(provisioned = results.len(), "portal provisioning sweep complete");
        Ok(results)
    }

    async fn provision_contact(&self, contact: &Contact, email: String) -> ProvisionedAccount {
        let password = portal_password(&contact.name);

        match self.users.find_by_email(&email).await {
            Ok(Some(existing)) => {
                if existing.contact_id.is_none() {
                    if let Err(error) = self.users.link_contact(existing.id, contact.id).await {
                        warn!(%email, %error, "failed to link existing portal user");
                    }
                }
                ProvisionedAccount {
                    email,
                    password,
                    name: contact.name.clone(),
                    status: ProvisioningStatus::AlreadyExists,
                    error: None,
                }
            }
            Ok(None) => {
                let user = PortalUser::portal(&email, &contact.name, Some(contact.id));
                match self.users.insert(user).await {
                    Ok(()) => ProvisionedAccount {
                        email,
                        password,
                        name: contact.name.clone(),
                        status: ProvisioningStatus::Created,
                        error: None,
                    },
                    Err(error) => ProvisionedAccount {
                        email,
                        password,
                        name: contact.name.clone(),
                        status: ProvisioningStatus::Error,
                        error: Some(error.to_string()),
                    },
                }
            }
            Err(error) => ProvisionedAccount {
                email,
                password,
                name: contact.name.clone(),
                status: ProvisioningStatus::Error,
                error: Some(error.to_string()),
            },
        }
    }

    /// Creates (or reports) the fixed demo portal account
    ///
    /// The demo login is linked to a well-known customer contact when that
    /// contact exists.
    pub async fn provision_demo(&self) -> Result<ProvisionedAccount, PortError> {
        if self.users.find_by_email(DEMO_EMAIL).await?.is_some() {
            return Ok(ProvisionedAccount {
                email: DEMO_EMAIL.to_string(),
                password: DEMO_PASSWORD.to_string(),
                name: DEMO_NAME.to_string(),
                status: ProvisioningStatus::AlreadyExists,
                error: None,
            });
        }

        let linked_contact = self.contacts.find_by_name(DEMO_CONTACT_NAME).await?;
        let user = PortalUser::portal(DEMO_EMAIL, DEMO_NAME, linked_contact.map(|c| c.id));
        self.users.insert(user).await?;

        Ok(ProvisionedAccount {
            email: DEMO_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
            name: DEMO_NAME.to_string(),
            status: ProvisioningStatus::Created,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactType;
    use crate::ports::mock::{MockContacts, MockPortalUsers};

    #[test]
    fn test_password_rule() {
        assert_eq!(portal_password("Sharma Residence"), "Sharma@123");
        assert_eq!(portal_password("Mono"), "Mono@123");
    }

    #[tokio::test]
    async fn test_provision_all_creates_and_skips() {
        let contacts = Arc::new(MockContacts::new());
        let users = Arc::new(MockPortalUsers::new());

        contacts
            .insert(
                Contact::new("Sharma Residence", ContactType::Customer)
                    .with_email("sharma@example.com"),
            )
            .await
            .unwrap();
        contacts
            .insert(Contact::new("No Email", ContactType::Customer))
            .await
            .unwrap();
        contacts
            .insert(
                Contact::new("Wood Works", ContactType::Vendor).with_email("wood@example.com"),
            )
            .await
            .unwrap();

        let provisioner = PortalProvisioner::new(contacts, users.clone());
        let results = provisioner.provision_all().await.unwrap();

        // Only the emailed customer contact produced an account.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ProvisioningStatus::Created);
        assert_eq!(results[0].password, "Sharma@123");

        let user = users.find_by_email("sharma@example.com").await.unwrap();
        assert!(user.is_some());
    }

    #[tokio::test]
    async fn test_provision_all_idempotent() {
        let contacts = Arc::new(MockContacts::new());
        let users = Arc::new(MockPortalUsers::new());

        contacts
            .insert(
                Contact::new("Verma Interiors", ContactType::Both)
                    .with_email("verma@example.com"),
            )
            .await
            .unwrap();

        let provisioner = PortalProvisioner::new(contacts, users);

        let first = provisioner.provision_all().await.unwrap();
        assert_eq!(first[0].status, ProvisioningStatus::Created);

        let second = provisioner.provision_all().await.unwrap();
        assert_eq!(second[0].status, ProvisioningStatus::AlreadyExists);
        assert_eq!(second[0].password, "Verma@123");
    }

    #[tokio::test]
    async fn test_demo_account() {
        let contacts = Arc::new(MockContacts::new());
        let users = Arc::new(MockPortalUsers::new());

        let sharma = Contact::new("Sharma Residence", ContactType::Customer);
        let sharma_id = sharma.id;
        contacts.insert(sharma).await.unwrap();

        let provisioner = PortalProvisioner::new(contacts, users.clone());

        let created = provisioner.provision_demo().await.unwrap();
        assert_eq!(created.status, ProvisioningStatus::Created);

        let user = users.find_by_email("portal@shivfurniture.com").await.unwrap().unwrap();
        assert_eq!(user.contact_id, Some(sharma_id));

        let again = provisioner.provision_demo().await.unwrap();
        assert_eq!(again.status, ProvisioningStatus::AlreadyExists);
    }
}
