use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{ExpenseRecord, Participant, ParticipantId};

/// Where computed expense records are kept.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Persist a record and assign its sequence number.
    async fn save(&self, record: &mut ExpenseRecord) -> Result<()>;

    /// Records in sequence order, optionally only those the participant appears in.
    async fn find(&self, participant: Option<ParticipantId>) -> Result<Vec<ExpenseRecord>>;
}

/// Where participant display identities are kept.
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    async fn save_participant(&self, participant: &Participant) -> Result<()>;

    async fn get_participant(&self, id: ParticipantId) -> Result<Option<Participant>>;

    async fn get_participant_by_name(&self, name: &str) -> Result<Option<Participant>>;

    async fn list_participants(&self) -> Result<Vec<Participant>>;
}
