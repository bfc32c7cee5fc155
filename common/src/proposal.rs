use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NegotiationError;
use crate::identity::UserId;
use crate::negotiation::NegotiationId;
use crate::offer::{Commodity, Unit};

crate::id::string_id! {
    /// Unique proposal identifier.
    ProposalId
}

/// One-way proposal status: `Pending` transitions exactly once to one of
/// the three terminal states, through the counterparty's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
    Countered,
}

impl ProposalStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ProposalStatus::Pending)
    }

    /// Returns true if transitioning from self to `next` is valid.
    pub fn can_transition_to(self, next: ProposalStatus) -> bool {
        self == ProposalStatus::Pending && next.is_terminal()
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProposalStatus::Pending => "PENDING",
            ProposalStatus::Accepted => "ACCEPTED",
            ProposalStatus::Rejected => "REJECTED",
            ProposalStatus::Countered => "COUNTERED",
        };
        f.write_str(s)
    }
}

/// How a counterparty answers a pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseAction {
    Accept,
    Reject,
    Counter,
}

impl ResponseAction {
    /// The terminal status this response drives the proposal into.
    pub fn resulting_status(self) -> ProposalStatus {
        match self {
            ResponseAction::Accept => ProposalStatus::Accepted,
            ResponseAction::Reject => ProposalStatus::Rejected,
            ResponseAction::Counter => ProposalStatus::Countered,
        }
    }

    /// Verb used in the system message announcing the response.
    pub fn announcement(self) -> &'static str {
        match self {
            ResponseAction::Accept => "accepted the proposal",
            ResponseAction::Reject => "rejected the proposal",
            ResponseAction::Counter => "asked to counter the proposal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryType {
    Fob,
    Cif,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTerms {
    Upfront,
    Net7,
    Net30,
}

/// The full terms snapshot a proposal carries. Copied verbatim into the
/// contract on acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalTerms {
    pub commodity: Commodity,
    pub quantity: f64,
    pub unit: Unit,
    /// Price per unit, in the marketplace currency.
    pub unit_price: f64,
    pub city: String,
    pub state: String,
    pub delivery_type: DeliveryType,
    pub delivery_date: Option<String>,
    pub payment_terms: PaymentTerms,
    pub note: Option<String>,
}

impl ProposalTerms {
    /// Reject malformed terms before anything is persisted.
    pub fn validate(&self) -> Result<(), NegotiationError> {
        if !(self.quantity > 0.0) {
            return Err(NegotiationError::Validation(
                "quantity must be positive".into(),
            ));
        }
        if !(self.unit_price > 0.0) {
            return Err(NegotiationError::Validation(
                "unit price must be positive".into(),
            ));
        }
        if self.city.trim().is_empty() {
            return Err(NegotiationError::Validation("city is required".into()));
        }
        let state = self.state.trim();
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(NegotiationError::Validation(
                "state must be a two-letter code".into(),
            ));
        }
        Ok(())
    }
}

/// A structured set of deal terms submitted by one party for the other to
/// accept, reject, or counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub negotiation_id: NegotiationId,
    pub sender_id: UserId,
    pub sender_name: String,
    #[serde(flatten)]
    pub terms: ProposalTerms,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms() -> ProposalTerms {
        ProposalTerms {
            commodity: Commodity::Soy,
            quantity: 200.0,
            unit: Unit::Tonne,
            unit_price: 130.0,
            city: "Sorriso".to_string(),
            state: "MT".to_string(),
            delivery_type: DeliveryType::Fob,
            delivery_date: Some("by 2026-03-15".to_string()),
            payment_terms: PaymentTerms::Net30,
            note: None,
        }
    }

    #[test]
    fn pending_transitions_to_every_terminal() {
        for next in [
            ProposalStatus::Accepted,
            ProposalStatus::Rejected,
            ProposalStatus::Countered,
        ] {
            assert!(ProposalStatus::Pending.can_transition_to(next));
        }
    }

    #[test]
    fn terminal_states_never_transition() {
        for from in [
            ProposalStatus::Accepted,
            ProposalStatus::Rejected,
            ProposalStatus::Countered,
        ] {
            assert!(from.is_terminal());
            for next in [
                ProposalStatus::Pending,
                ProposalStatus::Accepted,
                ProposalStatus::Rejected,
                ProposalStatus::Countered,
            ] {
                assert!(!from.can_transition_to(next));
            }
        }
    }

    #[test]
    fn pending_never_transitions_to_pending() {
        assert!(!ProposalStatus::Pending.can_transition_to(ProposalStatus::Pending));
    }

    #[test]
    fn valid_terms_pass() {
        assert!(terms().validate().is_ok());
    }

    #[test]
    fn non_positive_quantity_rejected() {
        let mut t = terms();
        t.quantity = 0.0;
        assert!(matches!(
            t.validate(),
            Err(NegotiationError::Validation(_))
        ));
        t.quantity = -5.0;
        assert!(t.validate().is_err());
        t.quantity = f64::NAN;
        assert!(t.validate().is_err());
    }

    #[test]
    fn non_positive_price_rejected() {
        let mut t = terms();
        t.unit_price = 0.0;
        assert!(t.validate().is_err());
    }

    #[test]
    fn blank_location_rejected() {
        let mut t = terms();
        t.city = "  ".to_string();
        assert!(t.validate().is_err());

        let mut t = terms();
        t.state = "Mato Grosso".to_string();
        assert!(t.validate().is_err());
    }

    #[test]
    fn response_action_status_mapping() {
        assert_eq!(
            ResponseAction::Accept.resulting_status(),
            ProposalStatus::Accepted
        );
        assert_eq!(
            ResponseAction::Reject.resulting_status(),
            ProposalStatus::Rejected
        );
        assert_eq!(
            ResponseAction::Counter.resulting_status(),
            ProposalStatus::Countered
        );
    }
}
