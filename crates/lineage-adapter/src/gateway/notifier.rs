//! Notification Sinks
//!
//! `LogNotifier` writes every message to the tracing pipeline.
//! `InboxNotifier` keeps them per participant so the CLI can print them
//! after a command finishes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lineage_domain::Soul;
use lineage_usecase::{Notification, NotificationError, NotificationGateway};
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationGateway for LogNotifier {
    async fn notify(
        &self,
        participant: Soul,
        notification: &Notification,
    ) -> Result<(), NotificationError> {
        info!(
            participant = %participant,
            kind = notification.kind(),
            "{}",
            notification
        );
        Ok(())
    }
}

/// Collects notifications in memory, keyed by recipient
#[derive(Debug, Clone, Default)]
pub struct InboxNotifier {
    inboxes: Arc<Mutex<BTreeMap<Soul, Vec<Notification>>>>,
}

impl InboxNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty one participant's inbox
    pub fn drain(&self, participant: Soul) -> Vec<Notification> {
        self.inboxes
            .lock()
            .ok()
            .and_then(|mut inboxes| inboxes.remove(&participant))
            .unwrap_or_default()
    }

    /// Empty every inbox, in soul order
    pub fn drain_all(&self) -> Vec<(Soul, Notification)> {
        let Ok(mut inboxes) = self.inboxes.lock() else {
            return Vec::new();
        };
        std::mem::take(&mut *inboxes)
            .into_iter()
            .flat_map(|(soul, messages)| messages.into_iter().map(move |n| (soul, n)))
            .collect()
    }
}

#[async_trait]
impl NotificationGateway for InboxNotifier {
    async fn notify(
        &self,
        participant: Soul,
        notification: &Notification,
    ) -> Result<(), NotificationError> {
        let mut inboxes = self.inboxes.lock().map_err(|_| NotificationError::Failed {
            message: "inbox lock poisoned".to_string(),
        })?;
        inboxes
            .entry(participant)
            .or_default()
            .push(notification.clone());
        Ok(())
    }
}
