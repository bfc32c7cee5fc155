use serde::{Deserialize, Serialize};

use crate::identity::UserId;

crate::id::string_id! {
    /// Unique offer identifier.
    OfferId
}

/// Commodity being traded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Commodity {
    Soy,
    Corn,
    Wheat,
    Coffee,
    Cotton,
    Rice,
    Other(String),
}

impl Commodity {
    pub fn label(&self) -> &str {
        match self {
            Commodity::Soy => "Soy",
            Commodity::Corn => "Corn",
            Commodity::Wheat => "Wheat",
            Commodity::Coffee => "Coffee",
            Commodity::Cotton => "Cotton",
            Commodity::Rice => "Rice",
            Commodity::Other(name) => name,
        }
    }
}

/// Quantity unit for grain lots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Tonne,
    Sack,
}

impl Unit {
    pub fn label(self) -> &'static str {
        match self {
            Unit::Tonne => "t",
            Unit::Sack => "sc",
        }
    }
}

/// The read-side view of a marketplace offer that a negotiation is opened
/// against. Offer listing and editing live outside this workspace; the
/// engine only needs the owner and the headline terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: OfferId,
    pub seller: UserId,
    pub commodity: Commodity,
    pub quantity: f64,
    pub unit: Unit,
}
