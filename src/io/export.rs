use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{BALANCE_SHEET_HEADERS, ExpenseService, ParticipantBalance};
use crate::domain::{ExpenseView, Participant, format_cents};
use crate::storage::{ExpenseStore, ParticipantStore};

/// Snapshot of resolved expenses for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpensesSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
    pub expenses: Vec<ExpenseView>,
}

/// Exporter for writing expense data in tabular or JSON form
pub struct Exporter<'a, S> {
    service: &'a ExpenseService<S>,
}

impl<'a, S> Exporter<'a, S>
where
    S: ExpenseStore + ParticipantStore,
{
    pub fn new(service: &'a ExpenseService<S>) -> Self {
        Self { service }
    }

    /// Export the balance sheet to CSV, one row per expense participant.
    /// The header is written even when there are no expenses.
    pub async fn export_balance_sheet_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let rows = self.service.balance_sheet().await?;
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        csv_writer.write_record(BALANCE_SHEET_HEADERS)?;
        for row in &rows {
            csv_writer.serialize(row)?;
        }

        csv_writer.flush()?;
        tracing::debug!(rows = rows.len(), "balance sheet exported");
        Ok(rows.len())
    }

    /// Export net owed totals per participant to CSV
    pub async fn export_balances_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let balances = self.service.net_balances().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["participant", "email", "expenses", "total_owed"])?;
        for ParticipantBalance {
            participant,
            email,
            total_owed,
            expense_count,
        } in &balances
        {
            csv_writer.write_record([
                participant.as_str(),
                email.as_deref().unwrap_or(""),
                expense_count.to_string().as_str(),
                format_cents(*total_owed).as_str(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(balances.len())
    }

    /// Export every expense, with participants resolved, as a JSON snapshot
    pub async fn export_expenses_json<W: Write>(&self, mut writer: W) -> Result<ExpensesSnapshot> {
        let snapshot = ExpensesSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            participants: self.service.list_participants().await?,
            expenses: self.service.overall_expenses().await?,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
