use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;
use crate::negotiation::NegotiationId;
use crate::proposal::ProposalId;

crate::id::string_id! {
    /// Unique chat message identifier.
    MessageId
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    Text,
    System,
}

/// One entry in a negotiation's chat log. Immutable once created.
///
/// A system message that announces a proposal carries the proposal's id in
/// `bound_proposal_id`; the timeline renders the bound proposal card in
/// place of text at that position, which fixes the total order between
/// prose and structured proposals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub negotiation_id: NegotiationId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub kind: MessageKind,
    /// `None` is reserved for future attachment-only messages.
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_proposal_id: Option<ProposalId>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn is_proposal_marker(&self) -> bool {
        self.bound_proposal_id.is_some()
    }
}
