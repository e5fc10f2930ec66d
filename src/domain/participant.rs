use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ParticipantId = Uuid;

/// Someone who can take part in shared expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Display identity used when an expense is shown to people.
    pub fn identity(&self) -> ParticipantIdentity {
        ParticipantIdentity {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// The name/email pair substituted for a raw participant id in resolved views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantIdentity {
    pub id: ParticipantId,
    pub name: String,
    pub email: Option<String>,
}

impl ParticipantIdentity {
    /// Identity for an id that is missing from the directory.
    /// The raw id stands in for the name.
    pub fn unresolved(id: ParticipantId) -> Self {
        Self {
            id,
            name: id.to_string(),
            email: None,
        }
    }
}
