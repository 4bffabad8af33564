//! Campaign maintenance worker: purges expired pending contacts.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use campaign_application::{
    PendingContactCap, PendingContactRetention, PendingContactService, SubscriptionPolicy,
    SystemClock,
};
use campaign_core::{AppError, AppResult};
use campaign_infrastructure::PostgresPendingContactRepository;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    purge_interval_ms: u64,
    policy: SubscriptionPolicy,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;

    if config.policy.pending_contact_retention == PendingContactRetention::Forever {
        info!("PURGE_PENDING_CONTACTS_DURATION is 0, nothing to purge");
        return Ok(());
    }

    let pool = connect_pool(config.database_url.as_str()).await?;
    let pending_contacts = PendingContactService::new(
        Arc::new(PostgresPendingContactRepository::new(pool)),
        Arc::new(SystemClock),
        config.policy,
    );

    info!(
        purge_interval_ms = config.purge_interval_ms,
        retention = ?config.policy.pending_contact_retention,
        "campaign-worker started"
    );

    loop {
        match pending_contacts.purge_expired_pending_contacts().await {
            Ok(report) if report.deleted > 0 || report.failed > 0 => {
                info!(
                    deleted = report.deleted,
                    failed = report.failed,
                    "purged expired pending contacts"
                );
            }
            Ok(_) => {}
            Err(error) => {
                warn!(error = %error, "failed to purge expired pending contacts");
            }
        }

        tokio::time::sleep(Duration::from_millis(config.purge_interval_ms)).await;
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let purge_interval_ms = parse_env_u64("PURGE_INTERVAL_MS", 60_000)?;
        let pending_contact_retention = retention_from_setting(
            env::var("PURGE_PENDING_CONTACTS_DURATION").ok().as_deref(),
        )?;

        if purge_interval_ms == 0 {
            return Err(AppError::Validation(
                "PURGE_INTERVAL_MS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            purge_interval_ms,
            policy: purge_policy(pending_contact_retention),
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

/// Unset or blank means never purge.
fn retention_from_setting(value: Option<&str>) -> AppResult<PendingContactRetention> {
    match value {
        Some(value) if !value.trim().is_empty() => PendingContactRetention::parse(value),
        _ => Ok(PendingContactRetention::Forever),
    }
}

/// The worker never inserts, so only retention matters.
fn purge_policy(pending_contact_retention: PendingContactRetention) -> SubscriptionPolicy {
    SubscriptionPolicy {
        max_pending_contacts: PendingContactCap::Unlimited,
        pending_contact_retention,
    }
}
