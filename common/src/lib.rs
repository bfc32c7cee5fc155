mod id;

pub mod contract;
pub mod error;
pub mod identity;
pub mod message;
pub mod negotiation;
pub mod offer;
pub mod proposal;
pub mod protocol;
pub mod snapshot;
