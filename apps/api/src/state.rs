use campaign_application::SubscriptionService;
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub subscription_service: SubscriptionService,
    /// Absent when running on in-memory adapters.
    pub postgres_pool: Option<PgPool>,
}
