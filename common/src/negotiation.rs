use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;
use crate::offer::OfferId;

crate::id::string_id! {
    /// Unique negotiation identifier. Also the room key on the realtime relay.
    NegotiationId
}

/// Negotiation lifecycle status.
///
/// `Closed` is produced only by proposal acceptance. `Cancelled` is terminal
/// and set by an external trigger, never by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NegotiationStatus {
    Open,
    Closed,
    Cancelled,
}

impl std::fmt::Display for NegotiationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NegotiationStatus::Open => "OPEN",
            NegotiationStatus::Closed => "CLOSED",
            NegotiationStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// A negotiation session between exactly two parties over one offer.
///
/// The party pair is unordered: "the other party" is whoever the viewer
/// is not, resolved through [`Negotiation::other_party`] rather than stored
/// per viewpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Negotiation {
    pub id: NegotiationId,
    pub offer_id: OfferId,
    pub party_a: UserId,
    pub party_b: UserId,
    pub status: NegotiationStatus,
    pub updated_at: DateTime<Utc>,
}

impl Negotiation {
    pub fn is_party(&self, user: &UserId) -> bool {
        self.party_a == *user || self.party_b == *user
    }

    /// Whether this negotiation links the given unordered pair.
    pub fn links(&self, x: &UserId, y: &UserId) -> bool {
        (self.party_a == *x && self.party_b == *y)
            || (self.party_a == *y && self.party_b == *x)
    }

    /// The counterparty of `viewer`, or `None` if the viewer is not a party.
    pub fn other_party(&self, viewer: &UserId) -> Option<&UserId> {
        if self.party_a == *viewer {
            Some(&self.party_b)
        } else if self.party_b == *viewer {
            Some(&self.party_a)
        } else {
            None
        }
    }
}
