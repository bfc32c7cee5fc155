use chrono::Utc;

use agrideal_common::contract::Contract;
use agrideal_common::error::NegotiationError;
use agrideal_common::identity::Participant;
use agrideal_common::message::{ChatMessage, MessageId, MessageKind};
use agrideal_common::negotiation::{Negotiation, NegotiationId, NegotiationStatus};
use agrideal_common::offer::Offer;
use agrideal_common::proposal::{
    Proposal, ProposalId, ProposalStatus, ProposalTerms, ResponseAction,
};
use agrideal_common::protocol::RelayEvent;
use agrideal_common::snapshot::NegotiationSnapshot;

use crate::store::{NegotiationStore, ResponseEffects};

/// Result of submitting a proposal: the proposal plus the system message
/// that binds it into the timeline. Mirrors as a `new_proposal` event.
#[derive(Debug, Clone)]
pub struct ProposalSubmission {
    pub proposal: Proposal,
    pub message: ChatMessage,
}

impl ProposalSubmission {
    pub fn to_event(&self) -> RelayEvent {
        RelayEvent::NewProposal {
            proposal: self.proposal.clone(),
            message: self.message.clone(),
        }
    }
}

/// Result of a winning proposal response. Mirrors as a `proposal_response`
/// event; `negotiation_status` and `contract` are set only on acceptance.
#[derive(Debug, Clone)]
pub struct ResponseOutcome {
    pub proposal: Proposal,
    pub message: ChatMessage,
    pub negotiation_status: Option<NegotiationStatus>,
    pub contract: Option<Contract>,
}

impl ResponseOutcome {
    pub fn to_event(&self) -> RelayEvent {
        RelayEvent::ProposalResponse {
            proposal_id: self.proposal.id.clone(),
            new_status: self.proposal.status,
            message: Some(self.message.clone()),
            negotiation_status: self.negotiation_status,
            contract: self.contract.as_ref().map(Contract::reference),
        }
    }
}

/// Canned mid-negotiation requests, announced as system messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickRequest {
    ContractDocument,
    LogisticsData,
    Invoice,
}

impl QuickRequest {
    fn announcement(self) -> &'static str {
        match self {
            QuickRequest::ContractDocument => "requested the contract document",
            QuickRequest::LogisticsData => "requested logistics data",
            QuickRequest::Invoice => "requested the invoice",
        }
    }
}

/// Enforces the proposal/negotiation state machine over a durable store.
///
/// Each operation commits durably first and returns the payload the caller
/// mirrors over the realtime relay. On error nothing was committed and
/// nothing must be broadcast.
pub struct NegotiationEngine<S> {
    store: S,
}

impl<S: NegotiationStore> NegotiationEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open (or re-enter) a negotiation against an offer. At most one
    /// `Open` negotiation exists per offer and party pair; a repeat
    /// initiation returns the existing one. Sellers cannot negotiate
    /// their own offers.
    pub fn open_negotiation(
        &self,
        offer: &Offer,
        initiator: &Participant,
    ) -> Result<Negotiation, NegotiationError> {
        if offer.seller == initiator.id {
            return Err(NegotiationError::Forbidden);
        }

        let (negotiation, created) =
            self.store
                .find_or_create_negotiation(&offer.id, &initiator.id, &offer.seller)?;

        if created {
            let content = format!(
                "Negotiation opened: {}, {} {}",
                offer.commodity.label(),
                offer.quantity,
                offer.unit.label()
            );
            self.store
                .insert_message(system_message(&negotiation.id, initiator, content, None))?;
            tracing::info!(negotiation = %negotiation.id, offer = %offer.id, "negotiation opened");
        }

        Ok(negotiation)
    }

    /// Append a text message from one of the parties.
    pub fn send_message(
        &self,
        negotiation_id: &NegotiationId,
        sender: &Participant,
        text: &str,
    ) -> Result<ChatMessage, NegotiationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NegotiationError::Validation("empty message".into()));
        }
        self.require_party(negotiation_id, sender)?;

        let message = ChatMessage {
            id: MessageId::random(),
            negotiation_id: negotiation_id.clone(),
            sender_id: sender.id.clone(),
            sender_name: sender.name.clone(),
            kind: MessageKind::Text,
            content: Some(text.to_string()),
            bound_proposal_id: None,
            created_at: Utc::now(),
        };
        self.store.insert_message(message.clone())?;
        Ok(message)
    }

    /// Post a canned request as a system message.
    pub fn send_quick_request(
        &self,
        negotiation_id: &NegotiationId,
        sender: &Participant,
        request: QuickRequest,
    ) -> Result<ChatMessage, NegotiationError> {
        self.require_party(negotiation_id, sender)?;

        let content = format!("{} {}.", sender.name, request.announcement());
        let message = system_message(negotiation_id, sender, content, None);
        self.store.insert_message(message.clone())?;
        Ok(message)
    }

    /// Submit a proposal into an open negotiation. Creates the proposal
    /// plus the system message that binds it into the timeline.
    pub fn submit_proposal(
        &self,
        negotiation_id: &NegotiationId,
        sender: &Participant,
        terms: ProposalTerms,
    ) -> Result<ProposalSubmission, NegotiationError> {
        terms.validate()?;
        self.require_party(negotiation_id, sender)?;

        let proposal = Proposal {
            id: ProposalId::random(),
            negotiation_id: negotiation_id.clone(),
            sender_id: sender.id.clone(),
            sender_name: sender.name.clone(),
            terms,
            status: ProposalStatus::Pending,
            created_at: Utc::now(),
        };
        let marker = system_message(
            negotiation_id,
            sender,
            format!("{} sent a proposal.", sender.name),
            Some(proposal.id.clone()),
        );
        self.store.insert_proposal(proposal.clone(), marker.clone())?;

        Ok(ProposalSubmission {
            proposal,
            message: marker,
        })
    }

    /// Resolve a pending proposal as the counterparty.
    ///
    /// Accepting closes the negotiation and generates the contract; all
    /// effects commit as one atomic unit inside the store. A proposal that
    /// already left `Pending` fails with `InvalidTransition`; once the
    /// negotiation itself is closed, even still-pending proposals fail with
    /// `NegotiationNotOpen`, so at most one contract ever exists. Responding
    /// to one's own proposal fails with `Forbidden` regardless of status.
    pub fn respond(
        &self,
        proposal_id: &ProposalId,
        responder: &Participant,
        action: ResponseAction,
    ) -> Result<ResponseOutcome, NegotiationError> {
        let proposal = self.store.proposal(proposal_id)?;
        let negotiation = self.store.negotiation(&proposal.negotiation_id)?;

        if !negotiation.is_party(&responder.id) || proposal.sender_id == responder.id {
            return Err(NegotiationError::Forbidden);
        }

        let new_status = action.resulting_status();
        let message = system_message(
            &negotiation.id,
            responder,
            format!("{} {}.", responder.name, action.announcement()),
            None,
        );
        let contract = match action {
            ResponseAction::Accept => Some(Contract {
                id: agrideal_common::contract::ContractId::random(),
                negotiation_id: negotiation.id.clone(),
                terms: proposal.terms.clone(),
                accepted_at: Utc::now(),
                generated_by: responder.id.clone(),
            }),
            ResponseAction::Reject | ResponseAction::Counter => None,
        };

        let resolved = self.store.resolve_proposal(
            proposal_id,
            ResponseEffects {
                new_status,
                message: message.clone(),
                contract: contract.clone(),
            },
        )?;

        if contract.is_some() {
            tracing::info!(negotiation = %negotiation.id, proposal = %proposal_id, "deal closed, contract generated");
        }

        Ok(ResponseOutcome {
            proposal: resolved,
            message,
            negotiation_status: contract
                .as_ref()
                .map(|_| NegotiationStatus::Closed),
            contract,
        })
    }

    /// The durable state a client session loads at start.
    pub fn snapshot(
        &self,
        negotiation_id: &NegotiationId,
        viewer: &Participant,
    ) -> Result<NegotiationSnapshot, NegotiationError> {
        self.require_party(negotiation_id, viewer)?;
        self.store.snapshot(negotiation_id)
    }

    fn require_party(
        &self,
        negotiation_id: &NegotiationId,
        user: &Participant,
    ) -> Result<Negotiation, NegotiationError> {
        let negotiation = self.store.negotiation(negotiation_id)?;
        if !negotiation.is_party(&user.id) {
            return Err(NegotiationError::Forbidden);
        }
        Ok(negotiation)
    }
}

fn system_message(
    negotiation_id: &NegotiationId,
    sender: &Participant,
    content: String,
    bound_proposal_id: Option<ProposalId>,
) -> ChatMessage {
    ChatMessage {
        id: MessageId::random(),
        negotiation_id: negotiation_id.clone(),
        sender_id: sender.id.clone(),
        sender_name: sender.name.clone(),
        kind: MessageKind::System,
        content: Some(content),
        bound_proposal_id,
        created_at: Utc::now(),
    }
}
