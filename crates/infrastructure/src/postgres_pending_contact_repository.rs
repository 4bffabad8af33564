//! PostgreSQL-backed pending contact repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;

use campaign_application::PendingContactRepository;
use campaign_core::{AppError, AppResult};
use campaign_domain::{
    EmailAddress, MailingListId, PendingContact, PendingContactId, PendingContactInput,
    PendingContactKey,
};

/// PostgreSQL implementation of the pending contact repository port.
#[derive(Clone)]
pub struct PostgresPendingContactRepository {
    pool: PgPool,
}

impl PostgresPendingContactRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PendingContactRow {
    id: uuid::Uuid,
    token_hash: String,
    email: String,
    mailing_list_id: uuid::Uuid,
    source: String,
    field_data: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PendingContactRow> for PendingContact {
    type Error = AppError;

    fn try_from(row: PendingContactRow) -> Result<Self, Self::Error> {
        let field_data = match row.field_data {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Ok(Self::from_input(PendingContactInput {
            id: PendingContactId::from_uuid(row.id),
            token_hash: row.token_hash,
            email: EmailAddress::new(row.email)?,
            mailing_list_id: MailingListId::from_uuid(row.mailing_list_id),
            source: row.source,
            field_data,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

fn into_pending_contacts(rows: Vec<PendingContactRow>) -> AppResult<Vec<PendingContact>> {
    rows.into_iter().map(PendingContact::try_from).collect()
}

#[async_trait]
impl PendingContactRepository for PostgresPendingContactRepository {
    async fn insert_pending_contact(&self, pending_contact: &PendingContact) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pending_contacts (
                id,
                token_hash,
                email,
                mailing_list_id,
                source,
                field_data,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(pending_contact.id().as_uuid())
        .bind(pending_contact.token_hash())
        .bind(pending_contact.email().as_str())
        .bind(pending_contact.mailing_list_id().as_uuid())
        .bind(pending_contact.source())
        .bind(Value::Object(pending_contact.field_data().clone()))
        .bind(pending_contact.created_at())
        .bind(pending_contact.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to insert pending contact '{}': {error}",
                pending_contact.id()
            ))
        })?;

        Ok(())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<PendingContact>> {
        let row = sqlx::query_as::<_, PendingContactRow>(
            r#"
            SELECT id, token_hash, email, mailing_list_id, source, field_data, created_at, updated_at
            FROM pending_contacts
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!("failed to find pending contact by token: {error}"))
        })?;

        row.map(PendingContact::try_from).transpose()
    }

    async fn count_for(&self, key: &PendingContactKey) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM pending_contacts
            WHERE email = $1
              AND mailing_list_id = $2
            "#,
        )
        .bind(key.email.as_str())
        .bind(key.mailing_list_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!("failed to count pending contacts: {error}"))
        })?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn oldest_for(
        &self,
        key: &PendingContactKey,
        limit: u64,
    ) -> AppResult<Vec<PendingContact>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, PendingContactRow>(
            r#"
            SELECT id, token_hash, email, mailing_list_id, source, field_data, created_at, updated_at
            FROM pending_contacts
            WHERE email = $1
              AND mailing_list_id = $2
            ORDER BY created_at ASC, id ASC
            LIMIT $3
            "#,
        )
        .bind(key.email.as_str())
        .bind(key.mailing_list_id.as_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!("failed to list oldest pending contacts: {error}"))
        })?;

        into_pending_contacts(rows)
    }

    async fn delete_pending_contact(&self, id: PendingContactId) -> AppResult<bool> {
        let deleted = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            DELETE FROM pending_contacts
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!("failed to delete pending contact '{id}': {error}"))
        })?;

        Ok(deleted.is_some())
    }

    async fn find_updated_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<PendingContact>> {
        let rows = sqlx::query_as::<_, PendingContactRow>(
            r#"
            SELECT id, token_hash, email, mailing_list_id, source, field_data, created_at, updated_at
            FROM pending_contacts
            WHERE updated_at < $1
            ORDER BY updated_at ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!("failed to list expired pending contacts: {error}"))
        })?;

        into_pending_contacts(rows)
    }
}

#[cfg(test)]
mod tests;
