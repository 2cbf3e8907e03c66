//! Party repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{PartyId, PortError, PortalUserId, TagId};
use domain_party::ports::{ContactPort, PortalUserPort};
use domain_party::{Contact, ContactType, PortalUser};

use crate::error::{corrupt, storage_err};

/// PostgreSQL adapter for the party domain ports
#[derive(Debug, Clone)]
pub struct PgPartyRepository {
    pool: PgPool,
}

impl PgPartyRepository {
    /// Creates a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn tags_for(&self, contact_id: Uuid) -> Result<Vec<TagId>, PortError> {
        let tags: Vec<Uuid> =
            sqlx::query_scalar("SELECT tag_id FROM contact_tags WHERE contact_id = $1")
                .bind(contact_id)
                .fetch_all(&self.pool)
                .await
                .map_err(storage_err)?;

        Ok(tags.into_iter().map(TagId::from).collect())
    }
}

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: Uuid,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    contact_type: String,
    is_archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn contact_from_row(row: ContactRow, tag_ids: Vec<TagId>) -> Result<Contact, PortError> {
    let contact_type = match row.contact_type.as_str() {
        "customer" => ContactType::Customer,
        "vendor" => ContactType::Vendor,
        "both" => ContactType::Both,
        other => return Err(corrupt("contact type", other)),
    };

    let mut contact = Contact::new(row.name, contact_type);
    contact.id = PartyId::from(row.id);
    contact.email = row.email;
    contact.phone = row.phone;
    contact.tag_ids = tag_ids;
    contact.is_archived = row.is_archived;
    contact.created_at = row.created_at;
    contact.updated_at = row.updated_at;
    Ok(contact)
}

fn contact_type_str(contact_type: ContactType) -> &'static str {
    match contact_type {
        ContactType::Customer => "customer",
        ContactType::Vendor => "vendor",
        ContactType::Both => "both",
    }
}

const SELECT_CONTACT: &str = r#"
    SELECT id, name, email, phone, contact_type, is_archived, created_at, updated_at
    FROM contacts
"#;

#[async_trait]
impl ContactPort for PgPartyRepository {
    async fn get(&self, id: PartyId) -> Result<Contact, PortError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!("{} WHERE id = $1", SELECT_CONTACT))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| PortError::not_found("Contact", id))?;

        let tags = self.tags_for(row.id).await?;
        contact_from_row(row, tags)
    }

    async fn list(&self) -> Result<Vec<Contact>, PortError> {
        let rows = sqlx::query_as::<_, ContactRow>(&format!(
            "{} ORDER BY created_at DESC",
            SELECT_CONTACT
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let mut contacts = Vec::with_capacity(rows.len());
        for row in rows {
            let tags = self.tags_for(row.id).await?;
            contacts.push(contact_from_row(row, tags)?);
        }
        Ok(contacts)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Contact>, PortError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "{} WHERE name = $1 LIMIT 1",
            SELECT_CONTACT
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        match row {
            Some(row) => {
                let tags = self.tags_for(row.id).await?;
                Ok(Some(contact_from_row(row, tags)?))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, contact: Contact) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query(
            r#"
            INSERT INTO contacts (
                id, name, email, phone, contact_type, is_archived, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(*contact.id.as_uuid())
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact_type_str(contact.contact_type))
        .bind(contact.is_archived)
        .bind(contact.created_at)
        .bind(contact.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        for tag_id in &contact.tag_ids {
            sqlx::query("INSERT INTO contact_tags (contact_id, tag_id) VALUES ($1, $2)")
                .bind(*contact.id.as_uuid())
                .bind(*tag_id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }

    async fn save(&self, contact: &Contact) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let result = sqlx::query(
            r#"
            UPDATE contacts SET
                name = $2, email = $3, phone = $4, contact_type = $5,
                is_archived = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(*contact.id.as_uuid())
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact_type_str(contact.contact_type))
        .bind(contact.is_archived)
        .bind(contact.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Contact", contact.id));
        }

        sqlx::query("DELETE FROM contact_tags WHERE contact_id = $1")
            .bind(*contact.id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        for tag_id in &contact.tag_ids {
            sqlx::query("INSERT INTO contact_tags (contact_id, tag_id) VALUES ($1, $2)")
                .bind(*contact.id.as_uuid())
                .bind(*tag_id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct PortalUserRow {
    id: Uuid,
    email: String,
    name: String,
    role: String,
    contact_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<PortalUserRow> for PortalUser {
    fn from(row: PortalUserRow) -> Self {
        let mut user = PortalUser::portal(row.email, row.name, row.contact_id.map(PartyId::from));
        user.id = PortalUserId::from(row.id);
        user.role = row.role;
        user.created_at = row.created_at;
        user
    }
}

#[async_trait]
impl PortalUserPort for PgPartyRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<PortalUser>, PortError> {
        let row = sqlx::query_as::<_, PortalUserRow>(
            r#"
            SELECT id, email, name, role, contact_id, created_at
            FROM portal_users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.map(Into::into))
    }

    async fn insert(&self, user: PortalUser) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO portal_users (id, email, name, role, contact_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.role)
        .bind(user.contact_id.map(|c| *c.as_uuid()))
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn link_contact(
        &self,
        user_id: PortalUserId,
        contact_id: PartyId,
    ) -> Result<(), PortError> {
        let result = sqlx::query("UPDATE portal_users SET contact_id = $2 WHERE id = $1")
            .bind(*user_id.as_uuid())
            .bind(*contact_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("PortalUser", user_id));
        }
        Ok(())
    }
}
