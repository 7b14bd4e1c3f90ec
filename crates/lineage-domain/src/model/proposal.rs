//! Proposal - A two-party pairing handshake
//!
//! ```text
//! Proposed ──accept──▶ Accepted ──pair──▶ Paired
//!     │
//!     └──reject──▶ Rejected
//! ```

use super::entity::Soul;

/// Identity of a proposal: who asked whom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProposalKey {
    pub initiator: Soul,
    pub target: Soul,
}

impl ProposalKey {
    pub fn new(initiator: Soul, target: Soul) -> Self {
        Self { initiator, target }
    }
}

impl core::fmt::Display for ProposalKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}->{}", self.initiator, self.target)
    }
}

/// The two signals a target can answer with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Response {
    Accept,
    Reject,
}

impl Response {
    pub const ALL: [Response; 2] = [Response::Accept, Response::Reject];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalState {
    Proposed,
    Accepted,
    Rejected,
    Paired,
}

impl ProposalState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalState::Rejected | ProposalState::Paired)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    key: ProposalKey,
    message: String,
    state: ProposalState,
}

impl Proposal {
    pub fn new(
        initiator: Soul,
        target: Soul,
        message: impl Into<String>,
    ) -> Result<Self, ProposalError> {
        if initiator == target {
            return Err(ProposalError::SelfProposal { soul: initiator });
        }
        Ok(Self {
            key: ProposalKey::new(initiator, target),
            message: message.into(),
            state: ProposalState::Proposed,
        })
    }

    // ========== Getters ==========

    pub fn key(&self) -> ProposalKey {
        self.key
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn state(&self) -> ProposalState {
        self.state
    }

    /// Only the target may answer
    pub fn accepts_response_from(&self, sender: Soul) -> bool {
        self.state == ProposalState::Proposed && sender == self.key.target
    }

    // ========== State Transitions ==========

    pub fn answer(&mut self, response: Response) -> Result<ProposalState, ProposalError> {
        match self.state {
            ProposalState::Proposed => {
                self.state = match response {
                    Response::Accept => ProposalState::Accepted,
                    Response::Reject => ProposalState::Rejected,
                };
                Ok(self.state)
            }
            from => Err(ProposalError::InvalidTransition {
                from,
                to: match response {
                    Response::Accept => ProposalState::Accepted,
                    Response::Reject => ProposalState::Rejected,
                },
            }),
        }
    }

    pub fn mark_paired(&mut self) -> Result<(), ProposalError> {
        match self.state {
            ProposalState::Accepted => {
                self.state = ProposalState::Paired;
                Ok(())
            }
            from => Err(ProposalError::InvalidTransition {
                from,
                to: ProposalState::Paired,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalError {
    SelfProposal { soul: Soul },
    InvalidTransition { from: ProposalState, to: ProposalState },
}

impl core::fmt::Display for ProposalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProposalError::SelfProposal { soul } => {
                write!(f, "Soul {} cannot propose to itself", soul)
            }
            ProposalError::InvalidTransition { from, to } => {
                write!(f, "Invalid proposal transition: {:?} -> {:?}", from, to)
            }
        }
    }
}

impl std::error::Error for ProposalError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal() -> Proposal {
        Proposal::new(Soul::new(1), Soul::new(2), "hello").unwrap()
    }

    #[test]
    fn test_accept_then_pair() {
        let mut p = proposal();

        assert_eq!(p.answer(Response::Accept).unwrap(), ProposalState::Accepted);
        p.mark_paired().unwrap();

        assert_eq!(p.state(), ProposalState::Paired);
        assert!(p.state().is_terminal());
    }

    #[test]
    fn test_reject_is_terminal() {
        let mut p = proposal();

        p.answer(Response::Reject).unwrap();
        assert!(p.state().is_terminal());

        let err = p.answer(Response::Accept).unwrap_err();
        assert_eq!(
            err,
            ProposalError::InvalidTransition {
                from: ProposalState::Rejected,
                to: ProposalState::Accepted,
            }
        );
        assert!(p.mark_paired().is_err());
    }

    #[test]
    fn test_only_target_may_answer() {
        let p = proposal();

        assert!(p.accepts_response_from(Soul::new(2)));
        assert!(!p.accepts_response_from(Soul::new(1)));
        assert!(!p.accepts_response_from(Soul::new(3)));
    }

    #[test]
    fn test_self_proposal_rejected() {
        let err = Proposal::new(Soul::new(5), Soul::new(5), "me").unwrap_err();
        assert_eq!(err, ProposalError::SelfProposal { soul: Soul::new(5) });
    }
}
