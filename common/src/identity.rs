use serde::{Deserialize, Serialize};

crate::id::string_id! {
    /// A marketplace user's identity.
    UserId
}

/// Display snapshot of a user, embedded in messages and proposals so that
/// receivers can render a sender name without a user lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: UserId,
    pub name: String,
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UserId::random(),
            name: name.into(),
        }
    }
}
