//! Delivery - Batched, failure-tolerant notification dispatch
//!
//! Use cases queue notifications in an `Outbox` while a transaction is
//! open and deliver them after it commits. Each recipient is handled on
//! its own: one unreachable participant never blocks the rest.

use lineage_domain::Soul;

use crate::port::{Notification, NotificationError, NotificationGateway};

/// One recipient that could not be reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDeliveryFailure {
    pub participant: Soul,
    pub kind: &'static str,
    pub error: NotificationError,
}

/// Outcome of delivering an outbox
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failures: Vec<NotificationDeliveryFailure>,
}

impl DeliveryReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Notifications waiting for their transaction to commit
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    entries: Vec<(Soul, Notification)>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, participant: Soul, notification: Notification) {
        self.entries.push((participant, notification));
    }

    /// Send everything in order, collecting failures per recipient
    pub async fn deliver(self, notifier: &dyn NotificationGateway) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for (participant, notification) in self.entries {
            match notifier.notify(participant, &notification).await {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    tracing::debug!(
                        participant = %participant,
                        kind = notification.kind(),
                        error = %error,
                        "Notification not delivered"
                    );
                    report.failures.push(NotificationDeliveryFailure {
                        participant,
                        kind: notification.kind(),
                        error,
                    });
                }
            }
        }

        if !report.is_clean() {
            tracing::warn!(
                failed = report.failures.len(),
                delivered = report.delivered,
                "Some notifications could not be delivered"
            );
        }

        report
    }
}
