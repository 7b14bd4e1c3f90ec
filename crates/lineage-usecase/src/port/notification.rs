//! Notification Port - Outbound messages to participants

use async_trait::async_trait;
use lineage_domain::{Gene, ProposalKey, Response, Soul};
use thiserror::Error;

/// Everything a participant can be told
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// About to look for an unclaimed offspring
    ClaimingSoul,
    /// An unclaimed offspring is now yours
    Claimed { dominant: Gene },
    /// Nothing was waiting, so a fresh entity was made
    NoHeirsAvailable { dominant: Gene },
    /// One of your offspring was claimed
    Birth { child: Soul, dominant: Gene },
    /// An offspring was put up for adoption
    Adopted,
    /// Someone wants to pair with you
    Proposal {
        proposal: ProposalKey,
        message: String,
        responses: [Response; 2],
    },
    ProposalSent { target: Soul },
    ProposalRejected { by: Soul },
    RejectedProposal { initiator: Soul },
    ProposalAccepted { by: Soul },
    AcceptedProposal { initiator: Soul },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::ClaimingSoul => "claiming-soul",
            Notification::Claimed { .. } => "claimed-soul",
            Notification::NoHeirsAvailable { .. } => "no-new-souls",
            Notification::Birth { .. } => "birth",
            Notification::Adopted => "adopted",
            Notification::Proposal { .. } => "proposal",
            Notification::ProposalSent { .. } => "proposed",
            Notification::ProposalRejected { .. } => "proposal-rejected",
            Notification::RejectedProposal { .. } => "rejected-proposal",
            Notification::ProposalAccepted { .. } => "proposal-accepted",
            Notification::AcceptedProposal { .. } => "accepted-proposal",
        }
    }
}

impl core::fmt::Display for Notification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Notification::ClaimingSoul => write!(f, "Searching for a soul to claim..."),
            Notification::Claimed { dominant } => {
                write!(f, "You claimed a waiting soul. Your genes: {}", dominant)
            }
            Notification::NoHeirsAvailable { dominant } => {
                write!(f, "No souls were waiting, so a new one was made. Your genes: {}", dominant)
            }
            Notification::Birth { child, dominant } => {
                write!(f, "Your child was claimed by {}. Their genes: {}", child, dominant)
            }
            Notification::Adopted => write!(f, "You adopted a child. It awaits a soul."),
            Notification::Proposal { proposal, message, .. } => {
                write!(f, "{} proposes to you: {}", proposal.initiator, message)
            }
            Notification::ProposalSent { target } => {
                write!(f, "Your proposal to {} was sent.", target)
            }
            Notification::ProposalRejected { by } => write!(f, "{} rejected your proposal.", by),
            Notification::RejectedProposal { initiator } => {
                write!(f, "You rejected the proposal from {}.", initiator)
            }
            Notification::ProposalAccepted { by } => write!(f, "{} accepted your proposal!", by),
            Notification::AcceptedProposal { initiator } => {
                write!(f, "You accepted the proposal from {}!", initiator)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("Participant {participant} cannot be reached")]
    Unreachable { participant: Soul },

    #[error("Delivery failed: {message}")]
    Failed { message: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn notify(
        &self,
        participant: Soul,
        notification: &Notification,
    ) -> Result<(), NotificationError>;
}
