//! Application services and ports.

#![forbid(unsafe_code)]

mod keyed_locks;
mod pending_contact_service;
mod subscription_hooks;
mod subscription_policy;
mod subscription_ports;
mod subscription_service;
#[cfg(test)]
mod test_support;
mod token_crypto;
mod verification_mailer;

pub use pending_contact_service::{
    IssuedPendingContact, PendingContactRequest, PendingContactService, PurgeReport,
};
pub use subscription_hooks::{
    SubscribeContactEvent, SubscriptionHooks, UnsubscribeContactEvent, UpdateContactEvent,
};
pub use subscription_policy::{
    DEFAULT_MAX_PENDING_CONTACTS, PendingContactCap, PendingContactRetention, SubscriptionPolicy,
};
pub use subscription_ports::{
    Clock, ContactDirectory, EmailService, MailingListDirectory, MembershipInteraction,
    MembershipLedger, OutgoingEmail, PendingContactRepository, SystemClock, TemplateRenderer,
};
pub use subscription_service::{
    ConfirmedSubscription, SubmitSubscription, SubmittedSubscription, SubscriptionService,
};
pub use verification_mailer::VerificationMailer;
