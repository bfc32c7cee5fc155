use thiserror::Error;

use crate::negotiation::NegotiationStatus;
use crate::proposal::ProposalStatus;

/// Structured failures surfaced to the initiating caller. Never panicked,
/// never silently swallowed by the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NegotiationError {
    /// The proposal already left `Pending`; the concurrent loser sees this.
    #[error("proposal already resolved ({from})")]
    InvalidTransition { from: ProposalStatus },

    /// The negotiation already closed (or was cancelled); no further
    /// proposal can be resolved in it.
    #[error("negotiation is no longer open ({status})")]
    NegotiationNotOpen { status: NegotiationStatus },

    /// Self-response, or acting on a negotiation the caller is not a party to.
    #[error("operation not permitted for this user")]
    Forbidden,

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("invalid terms: {0}")]
    Validation(String),
}
