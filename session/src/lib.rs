//! Client-side negotiation session controller.
//!
//! Merges three input streams into one consistent view: the durable
//! snapshot loaded at session start, the viewer's own optimistic actions,
//! and events arriving over the realtime relay. Messages and proposals are
//! keyed by identity; the first copy of an id wins and later copies
//! (broadcast echoes of an optimistic write) are discarded. The durable
//! store stays authoritative: the timeline orders by `created_at`, never by
//! arrival.

mod timeline;

pub use timeline::{day_label, TimelineEntry};

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use agrideal_common::contract::ContractRef;
use agrideal_common::identity::UserId;
use agrideal_common::message::{ChatMessage, MessageId};
use agrideal_common::negotiation::{Negotiation, NegotiationId, NegotiationStatus};
use agrideal_common::proposal::{Proposal, ProposalId, ProposalStatus, ResponseAction};
use agrideal_common::protocol::RelayEvent;
use agrideal_common::snapshot::NegotiationSnapshot;

/// How long a typing indicator stays visible with no further events.
pub const TYPING_DECAY_MS: i64 = 2000;

struct TypingState {
    name: String,
    last_seen: DateTime<Utc>,
}

/// One participant's live view of a negotiation.
pub struct NegotiationSession {
    viewer: UserId,
    negotiation: Negotiation,
    contract: Option<ContractRef>,
    messages: HashMap<MessageId, ChatMessage>,
    proposals: HashMap<ProposalId, Proposal>,
    typing: Option<TypingState>,
}

impl NegotiationSession {
    pub fn new(snapshot: NegotiationSnapshot, viewer: UserId) -> Self {
        let contract = snapshot.contract.as_ref().map(|c| c.reference());
        let messages = snapshot
            .messages
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();
        let proposals = snapshot
            .proposals
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        Self {
            viewer,
            negotiation: snapshot.negotiation,
            contract,
            messages,
            proposals,
            typing: None,
        }
    }

    pub fn negotiation_id(&self) -> &NegotiationId {
        &self.negotiation.id
    }

    pub fn status(&self) -> NegotiationStatus {
        self.negotiation.status
    }

    pub fn contract(&self) -> Option<&ContractRef> {
        self.contract.as_ref()
    }

    pub fn other_party(&self) -> Option<&UserId> {
        self.negotiation.other_party(&self.viewer)
    }

    pub fn proposal(&self, id: &ProposalId) -> Option<&Proposal> {
        self.proposals.get(id)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn proposal_count(&self) -> usize {
        self.proposals.len()
    }

    /// Merge an event arriving from the realtime relay.
    pub fn apply_event(&mut self, event: RelayEvent, now: DateTime<Utc>) {
        match event {
            // Client-side no-op: joining is a server-side concern.
            RelayEvent::Join { .. } => {}
            RelayEvent::NewMessage { message } => {
                self.merge_message(message);
            }
            RelayEvent::NewProposal { proposal, message } => {
                self.merge_proposal(proposal);
                self.merge_message(message);
            }
            RelayEvent::ProposalResponse {
                proposal_id,
                new_status,
                message,
                negotiation_status,
                contract,
            } => {
                self.apply_response(proposal_id, new_status, message, negotiation_status, contract);
            }
            RelayEvent::Typing { user_id, user_name } => {
                self.observe_typing(&user_id, user_name, now);
            }
        }
    }

    /// Merge a message by identity. Returns false (and keeps the existing
    /// copy) when the id is already present.
    pub fn merge_message(&mut self, message: ChatMessage) -> bool {
        match self.messages.entry(message.id.clone()) {
            std::collections::hash_map::Entry::Occupied(_) => {
                tracing::trace!(id = %message.id, "duplicate message dropped");
                false
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(message);
                true
            }
        }
    }

    /// Merge a proposal by identity, first copy wins.
    pub fn merge_proposal(&mut self, proposal: Proposal) -> bool {
        match self.proposals.entry(proposal.id.clone()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(proposal);
                true
            }
        }
    }

    /// The viewer's own durably confirmed message, applied before the
    /// broadcast echo arrives. Same merge path as remote events.
    pub fn add_local_message(&mut self, message: ChatMessage) {
        self.merge_message(message);
    }

    /// The viewer's own durably confirmed proposal plus its timeline marker.
    pub fn add_local_proposal(&mut self, proposal: Proposal, marker: ChatMessage) {
        self.merge_proposal(proposal);
        self.merge_message(marker);
    }

    /// Optimistically mirror the viewer's own response before (or while)
    /// the durable confirmation returns. Accepting mirrors the negotiation
    /// closure; the contract reference arrives with the confirmation.
    pub fn respond_locally(&mut self, proposal_id: &ProposalId, action: ResponseAction) {
        let new_status = action.resulting_status();
        let Some(p) = self.proposals.get_mut(proposal_id) else {
            return;
        };
        // The closure only mirrors when the transition itself applies; an
        // accept that lost (the proposal already resolved remotely) must
        // leave the negotiation view untouched.
        if !p.status.can_transition_to(new_status) {
            return;
        }
        p.status = new_status;
        if action == ResponseAction::Accept {
            self.negotiation.status = NegotiationStatus::Closed;
        }
    }

    fn apply_response(
        &mut self,
        proposal_id: ProposalId,
        new_status: ProposalStatus,
        message: Option<ChatMessage>,
        negotiation_status: Option<NegotiationStatus>,
        contract: Option<ContractRef>,
    ) {
        if let Some(p) = self.proposals.get_mut(&proposal_id) {
            // One-way: a resolved proposal never changes again, so a
            // duplicate broadcast cannot re-apply or flip the status.
            if p.status.can_transition_to(new_status) {
                p.status = new_status;
            }
        }
        if let Some(message) = message {
            self.merge_message(message);
        }
        if let Some(status) = negotiation_status {
            self.negotiation.status = status;
        }
        if let Some(contract) = contract {
            self.contract.get_or_insert(contract);
        }
    }

    /// Record a typing signal. The viewer's own echoes are ignored.
    pub fn observe_typing(&mut self, user_id: &UserId, name: String, now: DateTime<Utc>) {
        if *user_id == self.viewer {
            return;
        }
        self.typing = Some(TypingState {
            name,
            last_seen: now,
        });
    }

    /// Who is typing right now, if the last signal is fresh enough.
    pub fn typing_user(&self, now: DateTime<Utc>) -> Option<&str> {
        let state = self.typing.as_ref()?;
        if now - state.last_seen < Duration::milliseconds(TYPING_DECAY_MS) {
            Some(state.name.as_str())
        } else {
            None
        }
    }

    /// The ordered, duplicate-free timeline: messages ascending by
    /// `created_at` (id as tiebreak), day separators between calendar days,
    /// proposal markers rendered with their bound proposal.
    pub fn timeline(&self) -> Vec<TimelineEntry<'_>> {
        let mut ordered: Vec<&ChatMessage> = self.messages.values().collect();
        ordered.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        timeline::build(&ordered, &self.proposals)
    }
}
