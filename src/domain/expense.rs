use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, NewShare, ParticipantId, ParticipantShare, SplitError, SplitMethod, compute, validate};

pub type ExpenseId = Uuid;

/// An expense as submitted by a caller, before it is validated and split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub description: String,
    pub amount_cents: Cents,
    pub split_method: SplitMethod,
    pub participants: Vec<NewShare>,
}

/// A validated expense with every participant's owed amount filled in.
/// Records are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    /// Monotonically increasing sequence number for ordering
    pub sequence: i64,
    pub description: String,
    /// Total amount in cents (always positive)
    pub amount_cents: Cents,
    pub split_method: SplitMethod,
    /// Shares in the order they were submitted
    pub participants: Vec<ParticipantShare>,
    pub created_at: DateTime<Utc>,
}

impl ExpenseRecord {
    /// Validate and split a new expense. Sequence number must be assigned by the repository.
    pub fn create(input: NewExpense) -> Result<Self, SplitError> {
        validate(input.amount_cents, input.split_method, &input.participants)?;
        let participants = compute(input.amount_cents, input.split_method, &input.participants)?;

        Ok(Self {
            id: Uuid::new_v4(),
            sequence: 0, // Will be set by repository
            description: input.description,
            amount_cents: input.amount_cents,
            split_method: input.split_method,
            participants,
            created_at: Utc::now(),
        })
    }

    pub fn involves(&self, participant_id: ParticipantId) -> bool {
        self.participants
            .iter()
            .any(|share| share.participant_id == participant_id)
    }

    pub fn share_of(&self, participant_id: ParticipantId) -> Option<&ParticipantShare> {
        self.participants
            .iter()
            .find(|share| share.participant_id == participant_id)
    }

    pub fn total_owed(&self) -> Cents {
        self.participants.iter().map(|share| share.amount_owed).sum()
    }
}
