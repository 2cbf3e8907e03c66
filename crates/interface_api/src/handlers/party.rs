//! Contact handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{PartyId, TagId};
use domain_party::ports::ContactPort;
use domain_party::Contact;

use crate::dto::party::*;
use crate::error::ApiError;
use crate::AppState;

/// Creates a contact
pub async fn create_contact(
    State(state): State<AppState>,
    Json(request): Json<CreateContactRequest>,
) -> Result<Json<ContactResponse>, ApiError> {
    request.validate()?;

    let mut contact = Contact::new(request.name, request.contact_type);
    contact.email = request.email;
    contact.phone = request.phone;
    for tag in request.tag_ids {
        contact = contact.with_tag(TagId::from(tag));
    }

    state.contacts.insert(contact.clone()).await?;
    Ok(Json(contact.into()))
}

/// Lists contacts
pub async fn list_contacts(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactResponse>>, ApiError> {
    let contacts = state.contacts.list().await?;
    Ok(Json(contacts.into_iter().map(Into::into).collect()))
}

/// Gets a contact by id
pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactResponse>, ApiError> {
    let contact = state.contacts.get(PartyId::from(id)).await?;
    Ok(Json(contact.into()))
}

/// Archives a contact
pub async fn archive_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactResponse>, ApiError> {
    let mut contact = state.contacts.get(PartyId::from(id)).await?;
    contact.archive();
    state.contacts.save(&contact).await?;
    Ok(Json(contact.into()))
}
