//! Realtime wire protocol: JSON text frames over a persistent socket.
//!
//! Frames are internally tagged by `type`. The relay parses a frame once to
//! classify it; everything except `join` is re-serialized and fanned out to
//! the other members of the sender's room. Unknown tags and non-JSON frames
//! fail to decode and are dropped by the relay without closing the
//! connection.

use serde::{Deserialize, Serialize};

use crate::contract::ContractRef;
use crate::identity::UserId;
use crate::message::ChatMessage;
use crate::negotiation::{NegotiationId, NegotiationStatus};
use crate::proposal::{Proposal, ProposalId, ProposalStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RelayEvent {
    /// Enter the room for one negotiation, leaving any previous room.
    /// Client to server only; never broadcast.
    Join { negotiation_id: NegotiationId },

    /// A text message was durably created.
    NewMessage { message: ChatMessage },

    /// A proposal was durably created, together with the system message
    /// that binds it into the chat timeline.
    NewProposal {
        proposal: Proposal,
        message: ChatMessage,
    },

    /// A pending proposal was resolved. `negotiation_status` and `contract`
    /// ride along on acceptance so other room members converge without a
    /// store query.
    ProposalResponse {
        proposal_id: ProposalId,
        new_status: ProposalStatus,
        message: Option<ChatMessage>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        negotiation_status: Option<NegotiationStatus>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        contract: Option<ContractRef>,
    },

    /// Ephemeral presence signal. Never persisted.
    Typing { user_id: UserId, user_name: String },
}

impl RelayEvent {
    /// Whether the relay forwards this frame to other room members.
    pub fn is_broadcast(&self) -> bool {
        !matches!(self, RelayEvent::Join { .. })
    }
}
