use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    BasisPoints, Cents, ExpenseId, ExpenseRecord, Participant, ParticipantId, ParticipantIdentity,
    SplitMethod,
};

/// Participant lookup used to resolve display identities.
pub type ParticipantDirectory = HashMap<ParticipantId, Participant>;

/// A share with the participant's display identity in place of the raw id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedShare {
    pub participant: ParticipantIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<BasisPoints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_amount: Option<Cents>,
    pub amount_owed: Cents,
}

/// An expense record joined with participant identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseView {
    pub id: ExpenseId,
    pub sequence: i64,
    pub description: String,
    pub amount_cents: Cents,
    pub split_method: SplitMethod,
    pub participants: Vec<ResolvedShare>,
    pub created_at: DateTime<Utc>,
}

/// Result of [`aggregate`]: either the expenses one participant takes part in,
/// or every expense resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceSummary {
    Involving {
        participant_id: ParticipantId,
        expenses: Vec<ExpenseRecord>,
    },
    Overall(Vec<ExpenseView>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("No expenses found for participant {0}")]
    NotFound(ParticipantId),
}

/// Fold expense records into a summary, optionally restricted to one participant.
pub fn aggregate(
    records: &[ExpenseRecord],
    directory: &ParticipantDirectory,
    filter: Option<ParticipantId>,
) -> Result<BalanceSummary, AggregateError> {
    match filter {
        Some(participant_id) => Ok(BalanceSummary::Involving {
            participant_id,
            expenses: expenses_involving(records, participant_id)?,
        }),
        None => Ok(BalanceSummary::Overall(resolve_participants(
            records, directory,
        ))),
    }
}

/// Records the participant appears in, whole and in input order.
pub fn expenses_involving(
    records: &[ExpenseRecord],
    participant_id: ParticipantId,
) -> Result<Vec<ExpenseRecord>, AggregateError> {
    let matching: Vec<ExpenseRecord> = records
        .iter()
        .filter(|record| record.involves(participant_id))
        .cloned()
        .collect();

    if matching.is_empty() {
        return Err(AggregateError::NotFound(participant_id));
    }
    Ok(matching)
}

/// Replace raw participant ids with display identities.
pub fn resolve_participants(
    records: &[ExpenseRecord],
    directory: &ParticipantDirectory,
) -> Vec<ExpenseView> {
    records
        .iter()
        .map(|record| ExpenseView {
            id: record.id,
            sequence: record.sequence,
            description: record.description.clone(),
            amount_cents: record.amount_cents,
            split_method: record.split_method,
            participants: record
                .participants
                .iter()
                .map(|share| ResolvedShare {
                    participant: directory
                        .get(&share.participant_id)
                        .map(Participant::identity)
                        .unwrap_or_else(|| ParticipantIdentity::unresolved(share.participant_id)),
                    percentage: share.percentage,
                    exact_amount: share.exact_amount,
                    amount_owed: share.amount_owed,
                })
                .collect(),
            created_at: record.created_at,
        })
        .collect()
}

/// Total owed by each participant across all records.
pub fn net_owed(records: &[ExpenseRecord]) -> BTreeMap<ParticipantId, Cents> {
    let mut totals: BTreeMap<ParticipantId, Cents> = BTreeMap::new();

    for record in records {
        for share in &record.participants {
            *totals.entry(share.participant_id).or_insert(0) += share.amount_owed;
        }
    }

    totals
}
