use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use agrideal_common::contract::Contract;
use agrideal_common::error::NegotiationError;
use agrideal_common::identity::UserId;
use agrideal_common::message::ChatMessage;
use agrideal_common::negotiation::{Negotiation, NegotiationId, NegotiationStatus};
use agrideal_common::offer::OfferId;
use agrideal_common::proposal::{Proposal, ProposalId};
use agrideal_common::snapshot::NegotiationSnapshot;

use crate::store::{NegotiationStore, ResponseEffects};

#[derive(Default)]
struct Inner {
    negotiations: HashMap<NegotiationId, Negotiation>,
    /// Chat log per negotiation, in insertion order.
    messages: HashMap<NegotiationId, Vec<ChatMessage>>,
    proposals: HashMap<ProposalId, Proposal>,
    /// At most one contract per negotiation.
    contracts: HashMap<NegotiationId, Contract>,
}

/// In-process store. The single mutex is the transaction boundary: every
/// operation, in particular [`resolve_proposal`](NegotiationStore::resolve_proposal),
/// sees and leaves a consistent state, so concurrent responses to one
/// proposal are serialized and exactly one wins the `Pending` precondition.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn negotiation_mut(
        &mut self,
        id: &NegotiationId,
    ) -> Result<&mut Negotiation, NegotiationError> {
        self.negotiations
            .get_mut(id)
            .ok_or(NegotiationError::NotFound {
                entity: "negotiation",
            })
    }
}

impl NegotiationStore for MemoryStore {
    fn find_or_create_negotiation(
        &self,
        offer_id: &OfferId,
        party_a: &UserId,
        party_b: &UserId,
    ) -> Result<(Negotiation, bool), NegotiationError> {
        let mut inner = self.inner.lock().expect("store poisoned");

        let existing = inner.negotiations.values().find(|n| {
            n.offer_id == *offer_id
                && n.status == NegotiationStatus::Open
                && n.links(party_a, party_b)
        });
        if let Some(found) = existing {
            return Ok((found.clone(), false));
        }

        let negotiation = Negotiation {
            id: NegotiationId::random(),
            offer_id: offer_id.clone(),
            party_a: party_a.clone(),
            party_b: party_b.clone(),
            status: NegotiationStatus::Open,
            updated_at: Utc::now(),
        };
        inner
            .negotiations
            .insert(negotiation.id.clone(), negotiation.clone());
        inner.messages.insert(negotiation.id.clone(), Vec::new());
        Ok((negotiation, true))
    }

    fn negotiation(&self, id: &NegotiationId) -> Result<Negotiation, NegotiationError> {
        let inner = self.inner.lock().expect("store poisoned");
        inner
            .negotiations
            .get(id)
            .cloned()
            .ok_or(NegotiationError::NotFound {
                entity: "negotiation",
            })
    }

    fn proposal(&self, id: &ProposalId) -> Result<Proposal, NegotiationError> {
        let inner = self.inner.lock().expect("store poisoned");
        inner
            .proposals
            .get(id)
            .cloned()
            .ok_or(NegotiationError::NotFound {
                entity: "proposal",
            })
    }

    fn contract_for(
        &self,
        id: &NegotiationId,
    ) -> Result<Option<Contract>, NegotiationError> {
        let inner = self.inner.lock().expect("store poisoned");
        Ok(inner.contracts.get(id).cloned())
    }

    fn insert_message(&self, message: ChatMessage) -> Result<(), NegotiationError> {
        let mut inner = self.inner.lock().expect("store poisoned");
        let now = message.created_at;
        inner.negotiation_mut(&message.negotiation_id)?.updated_at = now;
        inner
            .messages
            .entry(message.negotiation_id.clone())
            .or_default()
            .push(message);
        Ok(())
    }

    fn insert_proposal(
        &self,
        proposal: Proposal,
        marker: ChatMessage,
    ) -> Result<(), NegotiationError> {
        let mut inner = self.inner.lock().expect("store poisoned");
        inner.negotiation_mut(&proposal.negotiation_id)?.updated_at = proposal.created_at;
        inner.proposals.insert(proposal.id.clone(), proposal);
        inner
            .messages
            .entry(marker.negotiation_id.clone())
            .or_default()
            .push(marker);
        Ok(())
    }

    fn resolve_proposal(
        &self,
        id: &ProposalId,
        effects: ResponseEffects,
    ) -> Result<Proposal, NegotiationError> {
        let mut inner = self.inner.lock().expect("store poisoned");

        let (negotiation_id, from) = {
            let proposal = inner.proposals.get(id).ok_or(NegotiationError::NotFound {
                entity: "proposal",
            })?;
            (proposal.negotiation_id.clone(), proposal.status)
        };
        if !from.can_transition_to(effects.new_status) {
            return Err(NegotiationError::InvalidTransition { from });
        }
        // A closed negotiation accepts no further resolutions, so a second
        // still-pending proposal cannot mint a second contract.
        let negotiation_status = inner.negotiation_mut(&negotiation_id)?.status;
        if negotiation_status != NegotiationStatus::Open {
            return Err(NegotiationError::NegotiationNotOpen {
                status: negotiation_status,
            });
        }

        let proposal = inner
            .proposals
            .get_mut(id)
            .ok_or(NegotiationError::NotFound {
                entity: "proposal",
            })?;
        proposal.status = effects.new_status;
        let resolved = proposal.clone();

        if let Some(contract) = effects.contract {
            let negotiation = inner.negotiation_mut(&negotiation_id)?;
            negotiation.status = NegotiationStatus::Closed;
            inner.contracts.insert(negotiation_id.clone(), contract);
        }

        inner.negotiation_mut(&negotiation_id)?.updated_at = effects.message.created_at;
        inner
            .messages
            .entry(negotiation_id)
            .or_default()
            .push(effects.message);

        Ok(resolved)
    }

    fn snapshot(&self, id: &NegotiationId) -> Result<NegotiationSnapshot, NegotiationError> {
        let inner = self.inner.lock().expect("store poisoned");
        let negotiation = inner
            .negotiations
            .get(id)
            .cloned()
            .ok_or(NegotiationError::NotFound {
                entity: "negotiation",
            })?;

        let messages = inner.messages.get(id).cloned().unwrap_or_default();
        let mut proposals: Vec<Proposal> = inner
            .proposals
            .values()
            .filter(|p| p.negotiation_id == *id)
            .cloned()
            .collect();
        proposals.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(NegotiationSnapshot {
            contract: inner.contracts.get(id).cloned(),
            negotiation,
            messages,
            proposals,
        })
    }
}
