//! Negotiation engine: the durable side of the deal protocol.
//!
//! The [`store::NegotiationStore`] trait is the narrow gateway to the
//! authoritative record store; [`memory::MemoryStore`] is the in-process
//! implementation used by tests and single-node deployments. The
//! [`engine::NegotiationEngine`] enforces the proposal state machine on top
//! of whichever store it is given. Realtime mirroring is the caller's job:
//! every engine operation returns the exact payload to broadcast after the
//! durable commit succeeds, and returns an error (no payload, no broadcast)
//! when it does not.

pub mod engine;
pub mod memory;
pub mod store;

pub use engine::{NegotiationEngine, ProposalSubmission, QuickRequest, ResponseOutcome};
pub use memory::MemoryStore;
pub use store::{NegotiationStore, ResponseEffects};
