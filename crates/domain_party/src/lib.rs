//! Party Domain
//!
//! Contacts are the customers and vendors behind transaction documents.
//! Customer contacts additionally back self-service portal accounts, which
//! are provisioned in bulk with deterministic starter passwords.

pub mod contact;
pub mod portal;
pub mod ports;

pub use contact::{Contact, ContactType};
pub use portal::{
    portal_password, PortalProvisioner, PortalUser, ProvisionedAccount, ProvisioningStatus,
};
pub use ports::{ContactPort, PortalUserPort};
