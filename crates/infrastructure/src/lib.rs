//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_email_service;
mod in_memory_contact_directory;
mod in_memory_mailing_list_directory;
mod in_memory_membership_ledger;
mod in_memory_pending_contact_repository;
mod postgres_contact_directory;
mod postgres_mailing_list_directory;
mod postgres_membership_ledger;
mod postgres_pending_contact_repository;
mod smtp_email_service;
mod tera_template_renderer;

pub use console_email_service::ConsoleEmailService;
pub use in_memory_contact_directory::InMemoryContactDirectory;
pub use in_memory_mailing_list_directory::InMemoryMailingListDirectory;
pub use in_memory_membership_ledger::InMemoryMembershipLedger;
pub use in_memory_pending_contact_repository::InMemoryPendingContactRepository;
pub use postgres_contact_directory::PostgresContactDirectory;
pub use postgres_mailing_list_directory::PostgresMailingListDirectory;
pub use postgres_membership_ledger::PostgresMembershipLedger;
pub use postgres_pending_contact_repository::PostgresPendingContactRepository;
pub use smtp_email_service::{SmtpEmailConfig, SmtpEmailService};
pub use tera_template_renderer::TeraTemplateRenderer;
