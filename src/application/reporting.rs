use serde::{Deserialize, Serialize};

use crate::domain::{Cents, ExpenseView, format_cents};

/// Column labels of the balance sheet, in the order downstream consumers expect.
pub const BALANCE_SHEET_HEADERS: [&str; 5] =
    ["Description", "Amount", "Split Method", "Participant", "Amount Owed"];

/// One (expense, participant) line of the balance sheet.
/// Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetRow {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Split Method")]
    pub split_method: String,
    #[serde(rename = "Participant")]
    pub participant: String,
    #[serde(rename = "Amount Owed")]
    pub amount_owed: String,
}

/// Flatten resolved expenses into one row per participant share.
/// Expense-level columns repeat on every row of the same expense.
pub fn format_balance_sheet(expenses: &[ExpenseView]) -> Vec<BalanceSheetRow> {
    expenses
        .iter()
        .flat_map(|expense| {
            expense.participants.iter().map(move |share| BalanceSheetRow {
                description: expense.description.clone(),
                amount: format_cents(expense.amount_cents),
                split_method: expense.split_method.as_str().to_string(),
                participant: share.participant.name.clone(),
                amount_owed: format_cents(share.amount_owed),
            })
        })
        .collect()
}

/// Net amount a participant owes across every expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantBalance {
    pub participant: String,
    pub email: Option<String>,
    pub total_owed: Cents,
    pub expense_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ExpenseRecord, NewExpense, NewShare, Participant, ParticipantDirectory, SplitMethod,
        resolve_participants,
    };

    #[test]
    fn test_one_row_per_participant() {
        let alice = Participant::new("Alice");
        let bob = Participant::new("Bob");
        let directory: ParticipantDirectory = [alice.clone(), bob.clone()]
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let record = ExpenseRecord::create(NewExpense {
            description: "Hotel".into(),
            amount_cents: 25000,
            split_method: SplitMethod::Exact,
            participants: vec![
                NewShare::new(alice.id).with_exact_amount(15000),
                NewShare::new(bob.id).with_exact_amount(10000),
            ],
        })
        .unwrap();

        let rows = format_balance_sheet(&resolve_participants(&[record], &directory));

        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.description, "Hotel");
            assert_eq!(row.amount, "250.00");
            assert_eq!(row.split_method, "EXACT");
        }
        assert_eq!(rows[0].participant, "Alice");
        assert_eq!(rows[0].amount_owed, "150.00");
        assert_eq!(rows[1].participant, "Bob");
        assert_eq!(rows[1].amount_owed, "100.00");
    }

    #[test]
    fn test_empty_input_gives_no_rows() {
        assert!(format_balance_sheet(&[]).is_empty());
    }
}
