//! Ports consumed by the subscription workflow.

mod clock;
mod contacts;
mod mailing_lists;
mod memberships;
mod notifications;
mod pending_contacts;

pub use clock::{Clock, SystemClock};
pub use contacts::ContactDirectory;
pub use mailing_lists::MailingListDirectory;
pub use memberships::{MembershipInteraction, MembershipLedger};
pub use notifications::{EmailService, OutgoingEmail, TemplateRenderer};
pub use pending_contacts::PendingContactRepository;
