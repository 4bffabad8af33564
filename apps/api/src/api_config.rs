use std::collections::HashMap;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use campaign_application::{
    DEFAULT_MAX_PENDING_CONTACTS, PendingContactCap, PendingContactRetention, SubscriptionPolicy,
};
use campaign_core::{AppError, SiteId};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct SmtpRuntimeConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub reply_to: Option<String>,
    pub site_senders: HashMap<SiteId, String>,
}

#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    Console,
    Smtp(SmtpRuntimeConfig),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub public_base_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub email_provider: EmailProviderConfig,
    pub email_template_glob: Option<String>,
    pub subscription_policy: SubscriptionPolicy,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{api_port}"));
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let email_template_glob = optional_non_empty_env("EMAIL_TEMPLATE_GLOB");

        let email_provider = match env::var("EMAIL_PROVIDER")
            .unwrap_or_else(|_| "console".to_owned())
            .as_str()
        {
            "console" => EmailProviderConfig::Console,
            "smtp" => {
                let port = required_non_empty_env("SMTP_PORT")?
                    .parse::<u16>()
                    .map_err(|error| AppError::Validation(format!("invalid SMTP_PORT: {error}")))?;
                let site_senders = optional_non_empty_env("SMTP_SITE_SENDERS")
                    .map(|value| parse_site_senders(value.as_str()))
                    .transpose()?
                    .unwrap_or_default();
                EmailProviderConfig::Smtp(SmtpRuntimeConfig {
                    host: required_non_empty_env("SMTP_HOST")?,
                    port,
                    username: required_non_empty_env("SMTP_USERNAME")?,
                    password: required_non_empty_env("SMTP_PASSWORD")?,
                    from_address: required_non_empty_env("SMTP_FROM_ADDRESS")?,
                    reply_to: optional_non_empty_env("SMTP_REPLY_TO"),
                    site_senders,
                })
            }
            other => {
                return Err(AppError::Validation(format!(
                    "EMAIL_PROVIDER must be either 'console' or 'smtp', got '{other}'"
                )));
            }
        };

        Ok(Self {
            migrate_only,
            database_url,
            public_base_url,
            frontend_url,
            api_host,
            api_port,
            email_provider,
            email_template_glob,
            subscription_policy: subscription_policy_from_env()?,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

/// Reads `MAX_PENDING_CONTACTS` and `PURGE_PENDING_CONTACTS_DURATION`.
pub fn subscription_policy_from_env() -> Result<SubscriptionPolicy, AppError> {
    let max_pending_contacts = match optional_non_empty_env("MAX_PENDING_CONTACTS") {
        Some(value) => value.trim().parse::<i64>().map_err(|error| {
            AppError::Validation(format!("invalid MAX_PENDING_CONTACTS '{value}': {error}"))
        })?,
        None => DEFAULT_MAX_PENDING_CONTACTS,
    };
    let pending_contact_retention = match optional_non_empty_env("PURGE_PENDING_CONTACTS_DURATION")
    {
        Some(value) => PendingContactRetention::parse(value.as_str())?,
        None => PendingContactRetention::Forever,
    };

    Ok(SubscriptionPolicy {
        max_pending_contacts: PendingContactCap::from_setting(max_pending_contacts),
        pending_contact_retention,
    })
}

/// Parses `site-uuid=sender,site-uuid=sender` pairs.
fn parse_site_senders(value: &str) -> Result<HashMap<SiteId, String>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (site_id, sender) = entry.split_once('=').ok_or_else(|| {
                AppError::Validation(format!(
                    "SMTP_SITE_SENDERS entry '{entry}' must look like '<site id>=<address>'"
                ))
            })?;
            let site_id = uuid::Uuid::parse_str(site_id.trim())
                .map(SiteId::from_uuid)
                .map_err(|error| {
                    AppError::Validation(format!("invalid site id in SMTP_SITE_SENDERS: {error}"))
                })?;
            Ok((site_id, sender.trim().to_owned()))
        })
        .collect()
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn optional_non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
