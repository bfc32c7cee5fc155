use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;
use crate::negotiation::NegotiationId;
use crate::proposal::ProposalTerms;

crate::id::string_id! {
    /// Unique contract identifier.
    ContractId
}

/// The immutable record generated exactly once when a proposal is accepted.
/// Terms are a verbatim snapshot of the accepted proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: ContractId,
    pub negotiation_id: NegotiationId,
    pub terms: ProposalTerms,
    pub accepted_at: DateTime<Utc>,
    /// The party that accepted, i.e. triggered contract generation.
    pub generated_by: UserId,
}

impl Contract {
    pub fn reference(&self) -> ContractRef {
        ContractRef {
            id: self.id.clone(),
        }
    }
}

/// Lightweight contract reference carried on the realtime wire so the
/// non-responding party learns the contract exists without a store query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRef {
    pub id: ContractId,
}
