use std::sync::Arc;

use campaign_application::{EmailService, TemplateRenderer};
use campaign_core::AppError;
use campaign_infrastructure::{
    ConsoleEmailService, SmtpEmailConfig, SmtpEmailService, TeraTemplateRenderer,
};

use crate::api_config::{ApiConfig, EmailProviderConfig};

pub(super) fn build_email_service(config: &ApiConfig) -> Arc<dyn EmailService> {
    match &config.email_provider {
        EmailProviderConfig::Console => Arc::new(ConsoleEmailService::new()),
        EmailProviderConfig::Smtp(smtp) => Arc::new(SmtpEmailService::new(SmtpEmailConfig {
            host: smtp.host.clone(),
            port: smtp.port,
            username: smtp.username.clone(),
            password: smtp.password.clone(),
            from_address: smtp.from_address.clone(),
            reply_to: smtp.reply_to.clone(),
            site_senders: smtp.site_senders.clone(),
        })),
    }
}

pub(super) fn build_template_renderer(
    config: &ApiConfig,
) -> Result<Option<Arc<dyn TemplateRenderer>>, AppError> {
    let Some(glob) = config.email_template_glob.as_deref() else {
        return Ok(None);
    };

    let renderer: Arc<dyn TemplateRenderer> = Arc::new(TeraTemplateRenderer::from_glob(glob)?);
    Ok(Some(renderer))
}
