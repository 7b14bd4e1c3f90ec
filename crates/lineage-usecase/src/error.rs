//! Error types for Lineage use cases

use lineage_domain::{BreedError, EntityError, GeneError, ProposalError, ProposalKey, Soul};
use thiserror::Error;

use crate::port::StorageError;

/// Everything a use case can fail with.
///
/// Notification failures are not listed here. They never abort an
/// operation and show up in a `DeliveryReport` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineageError {
    #[error("Invalid operands: {reason}")]
    InvalidOperands { reason: String },

    #[error("No soul available: nameless entities cannot reproduce")]
    NoSoulAvailable,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("A proposal {key} is already pending")]
    ProposalAlreadyPending { key: ProposalKey },

    #[error("Soul {soul} cannot propose to itself")]
    SelfProposal { soul: Soul },

    #[error("Invalid proposal transition: {reason}")]
    InvalidTransition { reason: String },
}

impl From<GeneError> for LineageError {
    fn from(e: GeneError) -> Self {
        LineageError::InvalidOperands {
            reason: e.to_string(),
        }
    }
}

impl From<EntityError> for LineageError {
    fn from(e: EntityError) -> Self {
        LineageError::InvalidOperands {
            reason: e.to_string(),
        }
    }
}

impl From<BreedError> for LineageError {
    fn from(e: BreedError) -> Self {
        match e {
            BreedError::NoSoulAvailable => LineageError::NoSoulAvailable,
            other => LineageError::InvalidOperands {
                reason: other.to_string(),
            },
        }
    }
}

impl From<ProposalError> for LineageError {
    fn from(e: ProposalError) -> Self {
        match e {
            ProposalError::SelfProposal { soul } => LineageError::SelfProposal { soul },
            other => LineageError::InvalidTransition {
                reason: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, LineageError>;
