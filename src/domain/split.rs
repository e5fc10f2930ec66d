use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{BasisPoints, Cents, ParticipantId};

/// How an expense amount is divided among its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SplitMethod {
    /// Everyone owes the same amount
    #[serde(alias = "equal")]
    Equal,
    /// Each participant owes a percentage of the amount
    #[serde(alias = "percentage")]
    Percentage,
    /// Each participant owes an amount stated up front
    #[serde(alias = "exact")]
    Exact,
}

impl SplitMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitMethod::Equal => "EQUAL",
            SplitMethod::Percentage => "PERCENTAGE",
            SplitMethod::Exact => "EXACT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "EQUAL" => Some(SplitMethod::Equal),
            "PERCENTAGE" => Some(SplitMethod::Percentage),
            "EXACT" => Some(SplitMethod::Exact),
            _ => None,
        }
    }

    /// Parse a method tag coming from outside, reporting unknown tags.
    pub fn parse(s: &str) -> Result<Self, SplitError> {
        Self::from_str(s).ok_or_else(|| SplitError::UnsupportedSplitMethod(s.to_string()))
    }
}

impl std::fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A participant's part of an expense as submitted, before amounts are computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShare {
    pub participant_id: ParticipantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<BasisPoints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_amount: Option<Cents>,
}

impl NewShare {
    pub fn new(participant_id: ParticipantId) -> Self {
        Self {
            participant_id,
            percentage: None,
            exact_amount: None,
        }
    }

    pub fn with_percentage(mut self, percentage: BasisPoints) -> Self {
        self.percentage = Some(percentage);
        self
    }

    pub fn with_exact_amount(mut self, exact_amount: Cents) -> Self {
        self.exact_amount = Some(exact_amount);
        self
    }
}

/// A participant's part of a recorded expense. `amount_owed` is always filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantShare {
    pub participant_id: ParticipantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<BasisPoints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_amount: Option<Cents>,
    pub amount_owed: Cents,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    #[error("Unsupported split method: {0}")]
    UnsupportedSplitMethod(String),

    #[error("Invalid expense: {0}")]
    InvalidExpense(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_method_parse_is_case_insensitive() {
        assert_eq!(SplitMethod::parse("percentage"), Ok(SplitMethod::Percentage));
        assert_eq!(SplitMethod::parse("EQUAL"), Ok(SplitMethod::Equal));
        assert_eq!(SplitMethod::parse(" Exact "), Ok(SplitMethod::Exact));
    }

    #[test]
    fn test_split_method_parse_unknown() {
        assert_eq!(
            SplitMethod::parse("shares"),
            Err(SplitError::UnsupportedSplitMethod("shares".into()))
        );
    }

    #[test]
    fn test_split_method_serde_tags() {
        let json = serde_json::to_string(&SplitMethod::Percentage).unwrap();
        assert_eq!(json, "\"PERCENTAGE\"");

        let parsed: SplitMethod = serde_json::from_str("\"exact\"").unwrap();
        assert_eq!(parsed, SplitMethod::Exact);
    }

    #[test]
    fn test_share_omits_unused_inputs() {
        let share = ParticipantShare {
            participant_id: uuid::Uuid::nil(),
            percentage: None,
            exact_amount: None,
            amount_owed: 500,
        };
        let json = serde_json::to_value(&share).unwrap();
        assert!(json.get("percentage").is_none());
        assert_eq!(json["amount_owed"], 500);
    }
}
