use std::sync::Arc;

use campaign_application::{
    Clock, PendingContactService, SubscriptionService, SystemClock, VerificationMailer,
};
use campaign_core::AppError;
use campaign_infrastructure::{
    PostgresContactDirectory, PostgresMailingListDirectory, PostgresMembershipLedger,
    PostgresPendingContactRepository,
};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

use super::email::{build_email_service, build_template_renderer};

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let policy = config.subscription_policy;

    let pending_contacts = PendingContactService::new(
        Arc::new(PostgresPendingContactRepository::new(pool.clone())),
        clock.clone(),
        policy,
    );

    let mut mailer =
        VerificationMailer::new(build_email_service(config), config.public_base_url.as_str())?;
    if let Some(renderer) = build_template_renderer(config)? {
        mailer = mailer.with_template_renderer(renderer);
    }

    info!(
        max_pending_contacts = ?policy.max_pending_contacts,
        pending_contact_retention = ?policy.pending_contact_retention,
        "subscription policy loaded"
    );

    Ok(AppState {
        subscription_service: SubscriptionService::new(
            pending_contacts,
            Arc::new(PostgresContactDirectory::new(pool.clone())),
            Arc::new(PostgresMailingListDirectory::new(pool.clone())),
            Arc::new(PostgresMembershipLedger::new(pool.clone())),
            mailer,
            clock,
        ),
        postgres_pool: Some(pool),
    })
}
