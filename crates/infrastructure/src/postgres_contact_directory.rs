//! PostgreSQL-backed contact directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;

use campaign_application::ContactDirectory;
use campaign_core::{AppError, AppResult};
use campaign_domain::{Contact, ContactId, ContactInput, EmailAddress};

/// PostgreSQL implementation of the contact directory port.
#[derive(Clone)]
pub struct PostgresContactDirectory {
    pool: PgPool,
}

impl PostgresContactDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    id: uuid::Uuid,
    cid: String,
    email: String,
    verified_at: Option<DateTime<Utc>>,
    last_activity: Option<DateTime<Utc>>,
    field_values: Value,
    trashed_at: Option<DateTime<Utc>>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = AppError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let field_values = match row.field_values {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Ok(Self::from_input(ContactInput {
            id: ContactId::from_uuid(row.id),
            cid: row.cid,
            email: EmailAddress::new(row.email)?,
            verified_at: row.verified_at,
            last_activity: row.last_activity,
            field_values,
            trashed_at: row.trashed_at,
        }))
    }
}

#[async_trait]
impl ContactDirectory for PostgresContactDirectory {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
        include_trashed: bool,
    ) -> AppResult<Option<Contact>> {
        let row = sqlx::query_as::<_, ContactRow>(
            r#"
            SELECT id, cid, email, verified_at, last_activity, field_values, trashed_at
            FROM contacts
            WHERE email = $1
              AND ($2 OR trashed_at IS NULL)
            "#,
        )
        .bind(email.as_str())
        .bind(include_trashed)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!("failed to find contact by email: {error}"))
        })?;

        row.map(Contact::try_from).transpose()
    }

    async fn find_by_cid(&self, cid: &str) -> AppResult<Option<Contact>> {
        let row = sqlx::query_as::<_, ContactRow>(
            r#"
            SELECT id, cid, email, verified_at, last_activity, field_values, trashed_at
            FROM contacts
            WHERE cid = $1
              AND trashed_at IS NULL
            "#,
        )
        .bind(cid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Persistence(format!("failed to find contact by cid: {error}")))?;

        row.map(Contact::try_from).transpose()
    }

    async fn restore_contact(&self, contact: &Contact) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE contacts
            SET trashed_at = NULL,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(contact.id().as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to restore contact '{}': {error}",
                contact.id()
            ))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn save_contact(&self, contact: &Contact) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contacts (
                id,
                cid,
                email,
                verified_at,
                last_activity,
                field_values,
                trashed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email,
                verified_at = EXCLUDED.verified_at,
                last_activity = EXCLUDED.last_activity,
                field_values = EXCLUDED.field_values,
                trashed_at = EXCLUDED.trashed_at,
                updated_at = now()
            "#,
        )
        .bind(contact.id().as_uuid())
        .bind(contact.cid())
        .bind(contact.email().as_str())
        .bind(contact.verified_at())
        .bind(contact.last_activity())
        .bind(Value::Object(contact.field_values().clone()))
        .bind(contact.trashed_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!("failed to save contact '{}': {error}", contact.id()))
        })?;

        Ok(())
    }

    async fn update_last_activity(
        &self,
        contact_id: ContactId,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE contacts
            SET last_activity = $2
            WHERE id = $1
            "#,
        )
        .bind(contact_id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to update last activity of contact '{contact_id}': {error}"
            ))
        })?;

        Ok(())
    }
}
