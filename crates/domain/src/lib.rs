//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod contact;
mod email;
mod mailing_list;
mod membership;
mod pending_contact;

pub use contact::{Contact, ContactId, ContactInput};
pub use email::EmailAddress;
pub use mailing_list::{MailingList, MailingListId, VerificationEmailSettings};
pub use membership::{ContactMailingList, InteractionType};
pub use pending_contact::{
    NewPendingContact, PendingContact, PendingContactId, PendingContactInput, PendingContactKey,
};
