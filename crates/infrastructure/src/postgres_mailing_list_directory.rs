//! PostgreSQL-backed mailing list lookup.

use async_trait::async_trait;
use sqlx::PgPool;

use campaign_application::MailingListDirectory;
use campaign_core::{AppError, AppResult, SiteId};
use campaign_domain::{MailingList, MailingListId, VerificationEmailSettings};

/// PostgreSQL implementation of the mailing list directory port.
#[derive(Clone)]
pub struct PostgresMailingListDirectory {
    pool: PgPool,
}

impl PostgresMailingListDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MailingListRow {
    id: uuid::Uuid,
    site_id: uuid::Uuid,
    title: String,
    subscribe_subject: Option<String>,
    subscribe_template: Option<String>,
    unsubscribe_subject: Option<String>,
    unsubscribe_template: Option<String>,
}

impl TryFrom<MailingListRow> for MailingList {
    type Error = AppError;

    fn try_from(row: MailingListRow) -> Result<Self, Self::Error> {
        Self::new(
            MailingListId::from_uuid(row.id),
            SiteId::from_uuid(row.site_id),
            row.title,
            VerificationEmailSettings {
                subscribe_subject: row.subscribe_subject,
                subscribe_template: row.subscribe_template,
                unsubscribe_subject: row.unsubscribe_subject,
                unsubscribe_template: row.unsubscribe_template,
            },
        )
    }
}

#[async_trait]
impl MailingListDirectory for PostgresMailingListDirectory {
    async fn find_mailing_list(&self, id: MailingListId) -> AppResult<Option<MailingList>> {
        let row = sqlx::query_as::<_, MailingListRow>(
            r#"
            SELECT
                id,
                site_id,
                title,
                subscribe_subject,
                subscribe_template,
                unsubscribe_subject,
                unsubscribe_template
            FROM mailing_lists
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!("failed to find mailing list '{id}': {error}"))
        })?;

        row.map(MailingList::try_from).transpose()
    }
}
