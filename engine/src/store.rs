use agrideal_common::contract::Contract;
use agrideal_common::error::NegotiationError;
use agrideal_common::identity::UserId;
use agrideal_common::message::ChatMessage;
use agrideal_common::negotiation::{Negotiation, NegotiationId};
use agrideal_common::offer::OfferId;
use agrideal_common::proposal::{Proposal, ProposalId, ProposalStatus};
use agrideal_common::snapshot::NegotiationSnapshot;

/// Everything a winning proposal response commits, in one atomic unit.
///
/// The store must apply the status change, the system message, and (on
/// acceptance) the negotiation closure plus contract together or not at
/// all. A proposal that is no longer `Pending` rejects the whole batch
/// with `InvalidTransition`; that check is the single arbiter between
/// concurrent responders.
#[derive(Debug, Clone)]
pub struct ResponseEffects {
    pub new_status: ProposalStatus,
    pub message: ChatMessage,
    /// Present only on acceptance.
    pub contract: Option<Contract>,
}

/// Gateway to the durable record store.
///
/// Implementations own identity durability and the `Pending` precondition
/// on [`resolve_proposal`](Self::resolve_proposal). Records are constructed
/// by the engine (ids, timestamps included) and persisted verbatim.
pub trait NegotiationStore: Send + Sync {
    /// Return the existing `Open` negotiation for this offer and unordered
    /// party pair, or create one. The boolean is true when a new
    /// negotiation was created.
    fn find_or_create_negotiation(
        &self,
        offer_id: &OfferId,
        party_a: &UserId,
        party_b: &UserId,
    ) -> Result<(Negotiation, bool), NegotiationError>;

    fn negotiation(&self, id: &NegotiationId) -> Result<Negotiation, NegotiationError>;

    fn proposal(&self, id: &ProposalId) -> Result<Proposal, NegotiationError>;

    fn contract_for(
        &self,
        id: &NegotiationId,
    ) -> Result<Option<Contract>, NegotiationError>;

    /// Append a message to its negotiation's chat log.
    fn insert_message(&self, message: ChatMessage) -> Result<(), NegotiationError>;

    /// Persist a new proposal together with the system message that binds
    /// it into the timeline.
    fn insert_proposal(
        &self,
        proposal: Proposal,
        marker: ChatMessage,
    ) -> Result<(), NegotiationError>;

    /// Atomically resolve a `Pending` proposal. Returns the updated
    /// proposal, or `InvalidTransition` if it was already resolved.
    fn resolve_proposal(
        &self,
        id: &ProposalId,
        effects: ResponseEffects,
    ) -> Result<Proposal, NegotiationError>;

    /// The durable state a client session loads at start.
    fn snapshot(&self, id: &NegotiationId) -> Result<NegotiationSnapshot, NegotiationError>;
}
