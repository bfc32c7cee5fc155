use serde::{Deserialize, Serialize};

use crate::contract::Contract;
use crate::message::ChatMessage;
use crate::negotiation::Negotiation;
use crate::proposal::Proposal;

/// The durable state of one negotiation as loaded at session start. The
/// store produces it; the session controller merges realtime events on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationSnapshot {
    pub negotiation: Negotiation,
    pub messages: Vec<ChatMessage>,
    pub proposals: Vec<Proposal>,
    pub contract: Option<Contract>,
}
