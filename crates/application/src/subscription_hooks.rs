//! Before/after extension points around subscription changes.
//!
//! Callbacks run synchronously in registration order. Returning an error from
//! a callback aborts the remaining callbacks and the operation itself; the
//! error reaches the caller unchanged.

use std::sync::Arc;

use campaign_core::AppResult;
use campaign_domain::{Contact, MailingList};

/// Payload for subscribe callbacks.
#[derive(Debug, Clone)]
pub struct SubscribeContactEvent {
    /// Contact being subscribed.
    pub contact: Contact,
    /// Target mailing list.
    pub mailing_list: MailingList,
    /// Origin category.
    pub source_type: String,
    /// Origin detail.
    pub source: String,
}

/// Payload for unsubscribe callbacks.
#[derive(Debug, Clone)]
pub struct UnsubscribeContactEvent {
    /// Contact being unsubscribed.
    pub contact: Contact,
    /// Mailing list being left.
    pub mailing_list: MailingList,
}

/// Payload for contact update callbacks.
#[derive(Debug, Clone)]
pub struct UpdateContactEvent {
    /// Contact being saved.
    pub contact: Contact,
}

type Hook<E> = Arc<dyn Fn(&E) -> AppResult<()> + Send + Sync>;

/// Registered subscription callbacks.
#[derive(Clone, Default)]
pub struct SubscriptionHooks {
    before_subscribe: Vec<Hook<SubscribeContactEvent>>,
    after_subscribe: Vec<Hook<SubscribeContactEvent>>,
    before_unsubscribe: Vec<Hook<UnsubscribeContactEvent>>,
    after_unsubscribe: Vec<Hook<UnsubscribeContactEvent>>,
    before_update: Vec<Hook<UpdateContactEvent>>,
    after_update: Vec<Hook<UpdateContactEvent>>,
}

impl SubscriptionHooks {
    /// Creates an empty hook set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback fired before a contact is subscribed.
    #[must_use]
    pub fn on_before_subscribe(
        mut self,
        hook: impl Fn(&SubscribeContactEvent) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.before_subscribe.push(Arc::new(hook));
        self
    }

    /// Registers a callback fired after a contact is subscribed.
    #[must_use]
    pub fn on_after_subscribe(
        mut self,
        hook: impl Fn(&SubscribeContactEvent) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.after_subscribe.push(Arc::new(hook));
        self
    }

    /// Registers a callback fired before a contact is unsubscribed.
    #[must_use]
    pub fn on_before_unsubscribe(
        mut self,
        hook: impl Fn(&UnsubscribeContactEvent) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.before_unsubscribe.push(Arc::new(hook));
        self
    }

    /// Registers a callback fired after a contact is unsubscribed.
    #[must_use]
    pub fn on_after_unsubscribe(
        mut self,
        hook: impl Fn(&UnsubscribeContactEvent) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.after_unsubscribe.push(Arc::new(hook));
        self
    }

    /// Registers a callback fired before a contact is saved.
    #[must_use]
    pub fn on_before_update(
        mut self,
        hook: impl Fn(&UpdateContactEvent) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.before_update.push(Arc::new(hook));
        self
    }

    /// Registers a callback fired after a contact is saved.
    #[must_use]
    pub fn on_after_update(
        mut self,
        hook: impl Fn(&UpdateContactEvent) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.after_update.push(Arc::new(hook));
        self
    }

    pub(crate) fn before_subscribe(&self, event: &SubscribeContactEvent) -> AppResult<()> {
        fire(&self.before_subscribe, event)
    }

    pub(crate) fn after_subscribe(&self, event: &SubscribeContactEvent) -> AppResult<()> {
        fire(&self.after_subscribe, event)
    }

    pub(crate) fn before_unsubscribe(&self, event: &UnsubscribeContactEvent) -> AppResult<()> {
        fire(&self.before_unsubscribe, event)
    }

    pub(crate) fn after_unsubscribe(&self, event: &UnsubscribeContactEvent) -> AppResult<()> {
        fire(&self.after_unsubscribe, event)
    }

    pub(crate) fn before_update(&self, event: &UpdateContactEvent) -> AppResult<()> {
        fire(&self.before_update, event)
    }

    pub(crate) fn after_update(&self, event: &UpdateContactEvent) -> AppResult<()> {
        fire(&self.after_update, event)
    }
}

fn fire<E>(hooks: &[Hook<E>], event: &E) -> AppResult<()> {
    for hook in hooks {
        hook(event)?;
    }

    Ok(())
}
