//! PostgreSQL-backed contact mailing list memberships.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use campaign_application::{MembershipInteraction, MembershipLedger};
use campaign_core::{AppError, AppResult};
use campaign_domain::{ContactId, ContactMailingList, InteractionType, MailingListId};

/// PostgreSQL implementation of the membership ledger port.
#[derive(Clone)]
pub struct PostgresMembershipLedger {
    pool: PgPool,
}

impl PostgresMembershipLedger {
    /// Creates a ledger with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    contact_id: uuid::Uuid,
    mailing_list_id: uuid::Uuid,
    subscription_status: String,
    subscribed_at: Option<DateTime<Utc>>,
    unsubscribed_at: Option<DateTime<Utc>>,
    verified_at: Option<DateTime<Utc>>,
    source_type: String,
    source: String,
}

impl TryFrom<MembershipRow> for ContactMailingList {
    type Error = AppError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Self {
            contact_id: ContactId::from_uuid(row.contact_id),
            mailing_list_id: MailingListId::from_uuid(row.mailing_list_id),
            subscription_status: InteractionType::from_str(row.subscription_status.as_str())?,
            subscribed_at: row.subscribed_at,
            unsubscribed_at: row.unsubscribed_at,
            verified_at: row.verified_at,
            source_type: row.source_type,
            source: row.source,
        })
    }
}

#[async_trait]
impl MembershipLedger for PostgresMembershipLedger {
    async fn record_interaction(&self, interaction: MembershipInteraction) -> AppResult<()> {
        let query = match interaction.interaction {
            InteractionType::Subscribed => sqlx::query(
                r#"
                INSERT INTO contact_mailing_lists (
                    contact_id,
                    mailing_list_id,
                    subscription_status,
                    subscribed_at,
                    verified_at,
                    source_type,
                    source
                )
                VALUES ($1, $2, 'subscribed', $3, CASE WHEN $4 THEN $3 ELSE NULL END, $5, $6)
                ON CONFLICT (contact_id, mailing_list_id) DO UPDATE
                SET subscription_status = EXCLUDED.subscription_status,
                    subscribed_at = EXCLUDED.subscribed_at,
                    verified_at = COALESCE(EXCLUDED.verified_at, contact_mailing_lists.verified_at),
                    source_type = EXCLUDED.source_type,
                    source = EXCLUDED.source
                "#,
            )
            .bind(interaction.contact_id.as_uuid())
            .bind(interaction.mailing_list_id.as_uuid())
            .bind(interaction.occurred_at)
            .bind(interaction.verified)
            .bind(interaction.source_type.as_str())
            .bind(interaction.source.as_str()),
            InteractionType::Unsubscribed => sqlx::query(
                r#"
                INSERT INTO contact_mailing_lists (
                    contact_id,
                    mailing_list_id,
                    subscription_status,
                    unsubscribed_at
                )
                VALUES ($1, $2, 'unsubscribed', $3)
                ON CONFLICT (contact_id, mailing_list_id) DO UPDATE
                SET subscription_status = EXCLUDED.subscription_status,
                    unsubscribed_at = EXCLUDED.unsubscribed_at
                "#,
            )
            .bind(interaction.contact_id.as_uuid())
            .bind(interaction.mailing_list_id.as_uuid())
            .bind(interaction.occurred_at),
        };

        query.execute(&self.pool).await.map_err(|error| {
            AppError::Persistence(format!(
                "failed to record '{}' for contact '{}' on mailing list '{}': {error}",
                interaction.interaction.as_str(),
                interaction.contact_id,
                interaction.mailing_list_id
            ))
        })?;

        Ok(())
    }

    async fn find_membership(
        &self,
        contact_id: ContactId,
        mailing_list_id: MailingListId,
    ) -> AppResult<Option<ContactMailingList>> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT
                contact_id,
                mailing_list_id,
                subscription_status,
                subscribed_at,
                unsubscribed_at,
                verified_at,
                source_type,
                source
            FROM contact_mailing_lists
            WHERE contact_id = $1
              AND mailing_list_id = $2
            "#,
        )
        .bind(contact_id.as_uuid())
        .bind(mailing_list_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!("failed to find contact mailing list: {error}"))
        })?;

        row.map(ContactMailingList::try_from).transpose()
    }
}
