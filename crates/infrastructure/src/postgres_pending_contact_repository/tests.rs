use campaign_application::PendingContactRepository;
use campaign_domain::{
    EmailAddress, MailingListId, NewPendingContact, PendingContact, PendingContactKey,
};
use chrono::{Duration, Utc};
use serde_json::{Map, json};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresPendingContactRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for pending contact tests: {error}");
    }

    Some(pool)
}

async fn ensure_mailing_list(pool: &PgPool) -> MailingListId {
    let mailing_list_id = MailingListId::new();
    let insert = sqlx::query(
        r#"
            INSERT INTO mailing_lists (id, site_id, title)
            VALUES ($1, $2, $3)
            "#,
    )
    .bind(mailing_list_id.as_uuid())
    .bind(uuid::Uuid::new_v4())
    .bind("Pending Contact Tests")
    .execute(pool)
    .await;

    assert!(insert.is_ok());
    mailing_list_id
}

fn pending(
    email: &EmailAddress,
    mailing_list_id: MailingListId,
    created_at: chrono::DateTime<Utc>,
) -> PendingContact {
    let mut field_data = Map::new();
    field_data.insert("first_name".to_owned(), json!("Ada"));
    PendingContact::create(
        NewPendingContact {
            token_hash: uuid::Uuid::new_v4().simple().to_string(),
            email: email.clone(),
            mailing_list_id,
            source: "https://example.com/signup".to_owned(),
            field_data,
        },
        created_at,
    )
}

fn unique_email() -> EmailAddress {
    EmailAddress::new(format!("{}@pending.test", uuid::Uuid::new_v4().simple()))
        .unwrap_or_else(|_| panic!("test"))
}

#[tokio::test]
async fn stored_pending_contact_is_found_by_token_hash() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresPendingContactRepository::new(pool.clone());
    let mailing_list_id = ensure_mailing_list(&pool).await;
    let record = pending(&unique_email(), mailing_list_id, Utc::now());

    assert!(repository.insert_pending_contact(&record).await.is_ok());

    let found = repository.find_by_token_hash(record.token_hash()).await;
    let found = found
        .unwrap_or_else(|_| panic!("test"))
        .unwrap_or_else(|| panic!("test"));
    assert_eq!(found.id(), record.id());
    assert_eq!(found.email(), record.email());
    assert_eq!(found.field_data(), record.field_data());
    assert_eq!(found.source(), "https://example.com/signup");

    let missing = repository.find_by_token_hash("no-such-hash").await;
    assert!(matches!(missing, Ok(None)));
}

#[tokio::test]
async fn oldest_for_orders_by_creation_and_counts_per_key() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresPendingContactRepository::new(pool.clone());
    let mailing_list_id = ensure_mailing_list(&pool).await;
    let other_list_id = ensure_mailing_list(&pool).await;
    let email = unique_email();
    let start = Utc::now() - Duration::hours(1);

    let newest = pending(&email, mailing_list_id, start + Duration::minutes(2));
    let oldest = pending(&email, mailing_list_id, start);
    let middle = pending(&email, mailing_list_id, start + Duration::minutes(1));
    let elsewhere = pending(&email, other_list_id, start - Duration::minutes(5));
    for record in [&newest, &oldest, &middle, &elsewhere] {
        assert!(repository.insert_pending_contact(record).await.is_ok());
    }

    let key = PendingContactKey::new(email, mailing_list_id);
    assert!(matches!(repository.count_for(&key).await, Ok(3)));

    let evict = repository
        .oldest_for(&key, 2)
        .await
        .unwrap_or_else(|_| panic!("test"));
    let ids: Vec<_> = evict.iter().map(PendingContact::id).collect();
    assert_eq!(ids, vec![oldest.id(), middle.id()]);
}

#[tokio::test]
async fn delete_reports_only_the_first_removal() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresPendingContactRepository::new(pool.clone());
    let mailing_list_id = ensure_mailing_list(&pool).await;
    let record = pending(&unique_email(), mailing_list_id, Utc::now());
    assert!(repository.insert_pending_contact(&record).await.is_ok());

    assert!(matches!(
        repository.delete_pending_contact(record.id()).await,
        Ok(true)
    ));
    assert!(matches!(
        repository.delete_pending_contact(record.id()).await,
        Ok(false)
    ));
}

#[tokio::test]
async fn updated_before_uses_strict_cutoff() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresPendingContactRepository::new(pool.clone());
    let mailing_list_id = ensure_mailing_list(&pool).await;
    let cutoff = chrono::DateTime::from_timestamp(1_000_000_000, 0).unwrap_or_default();
    let at_cutoff = pending(&unique_email(), mailing_list_id, cutoff);
    let before_cutoff = pending(
        &unique_email(),
        mailing_list_id,
        cutoff - Duration::milliseconds(1),
    );
    assert!(repository.insert_pending_contact(&at_cutoff).await.is_ok());
    assert!(
        repository
            .insert_pending_contact(&before_cutoff)
            .await
            .is_ok()
    );

    let expired = repository
        .find_updated_before(cutoff)
        .await
        .unwrap_or_else(|_| panic!("test"));
    let ids: Vec<_> = expired.iter().map(PendingContact::id).collect();
    assert!(ids.contains(&before_cutoff.id()));
    assert!(!ids.contains(&at_cutoff.id()));
}
