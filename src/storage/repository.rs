use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{ExpenseRecord, Participant, ParticipantId, ParticipantShare, SplitMethod};

use super::{ExpenseStore, MIGRATION_001_INITIAL, ParticipantStore};

/// SQLite-backed store for participants and expenses.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    fn row_to_participant(row: &sqlx::sqlite::SqliteRow) -> Result<Participant> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(Participant {
            id: Uuid::parse_str(&id_str).context("Invalid participant ID")?,
            name: row.get("name"),
            email: row.get("email"),
            created_at: parse_timestamp(&created_at_str)?,
        })
    }

    fn row_to_expense(
        row: &sqlx::sqlite::SqliteRow,
        shares: &mut HashMap<String, Vec<ParticipantShare>>,
    ) -> Result<ExpenseRecord> {
        let id_str: String = row.get("id");
        let split_method_str: String = row.get("split_method");
        let created_at_str: String = row.get("created_at");

        Ok(ExpenseRecord {
            id: Uuid::parse_str(&id_str).context("Invalid expense ID")?,
            sequence: row.get("sequence"),
            description: row.get("description"),
            amount_cents: row.get("amount_cents"),
            split_method: SplitMethod::from_str(&split_method_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid split method: {}", split_method_str))?,
            participants: shares
                .remove(&id_str)
                .ok_or_else(|| anyhow::anyhow!("Expense {} has no shares", id_str))?,
            created_at: parse_timestamp(&created_at_str)?,
        })
    }

    /// Load shares grouped by expense id, each group in submission order.
    async fn load_shares(
        &self,
        participant: Option<ParticipantId>,
    ) -> Result<HashMap<String, Vec<ParticipantShare>>> {
        let rows = match participant {
            Some(id) => sqlx::query(
                r#"
                SELECT expense_id, participant_id, percentage_bp, exact_amount_cents, amount_owed_cents
                FROM expense_shares
                WHERE expense_id IN (SELECT expense_id FROM expense_shares WHERE participant_id = ?)
                ORDER BY expense_id, position
                "#,
            )
            .bind(id.to_string())
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query(
                r#"
                SELECT expense_id, participant_id, percentage_bp, exact_amount_cents, amount_owed_cents
                FROM expense_shares
                ORDER BY expense_id, position
                "#,
            )
            .fetch_all(&self.pool)
            .await,
        }
        .context("Failed to load expense shares")?;

        let mut grouped: HashMap<String, Vec<ParticipantShare>> = HashMap::new();
        for row in &rows {
            let participant_str: String = row.get("participant_id");
            grouped
                .entry(row.get("expense_id"))
                .or_default()
                .push(ParticipantShare {
                    participant_id: Uuid::parse_str(&participant_str)
                        .context("Invalid participant ID in share")?,
                    percentage: row.get("percentage_bp"),
                    exact_amount: row.get("exact_amount_cents"),
                    amount_owed: row.get("amount_owed_cents"),
                });
        }
        Ok(grouped)
    }
}

#[async_trait]
impl ExpenseStore for Repository {
    /// Save the expense and its shares atomically.
    /// The sequence number comes from the insert.
    async fn save(&self, record: &mut ExpenseRecord) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start transaction")?;

        let row = sqlx::query(
            r#"
            INSERT INTO expenses (id, description, amount_cents, split_method, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING sequence
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.description)
        .bind(record.amount_cents)
        .bind(record.split_method.as_str())
        .bind(record.created_at.to_rfc3339())
        .fetch_one(&mut *tx)
        .await
        .context("Failed to save expense")?;
        let sequence: i64 = row.get("sequence");

        for (position, share) in record.participants.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO expense_shares (expense_id, position, participant_id, percentage_bp, exact_amount_cents, amount_owed_cents)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(record.id.to_string())
            .bind(position as i64)
            .bind(share.participant_id.to_string())
            .bind(share.percentage)
            .bind(share.exact_amount)
            .bind(share.amount_owed)
            .execute(&mut *tx)
            .await
            .context("Failed to save expense share")?;
        }

        tx.commit().await.context("Failed to commit expense")?;
        record.sequence = sequence;

        tracing::debug!(
            expense_id = %record.id,
            sequence,
            shares = record.participants.len(),
            "expense saved"
        );
        Ok(())
    }

    async fn find(&self, participant: Option<ParticipantId>) -> Result<Vec<ExpenseRecord>> {
        let rows = match participant {
            Some(id) => sqlx::query(
                r#"
                SELECT sequence, id, description, amount_cents, split_method, created_at
                FROM expenses
                WHERE id IN (SELECT expense_id FROM expense_shares WHERE participant_id = ?)
                ORDER BY sequence
                "#,
            )
            .bind(id.to_string())
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query(
                r#"
                SELECT sequence, id, description, amount_cents, split_method, created_at
                FROM expenses
                ORDER BY sequence
                "#,
            )
            .fetch_all(&self.pool)
            .await,
        }
        .context("Failed to list expenses")?;

        let mut shares = self.load_shares(participant).await?;
        tracing::debug!(count = rows.len(), filtered = participant.is_some(), "expenses loaded");

        rows.iter()
            .map(|row| Self::row_to_expense(row, &mut shares))
            .collect()
    }
}

#[async_trait]
impl ParticipantStore for Repository {
    async fn save_participant(&self, participant: &Participant) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO participants (id, name, email, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(participant.id.to_string())
        .bind(&participant.name)
        .bind(&participant.email)
        .bind(participant.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save participant")?;
        Ok(())
    }

    async fn get_participant(&self, id: ParticipantId) -> Result<Option<Participant>> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM participants WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch participant")?;

        row.as_ref().map(Self::row_to_participant).transpose()
    }

    async fn get_participant_by_name(&self, name: &str) -> Result<Option<Participant>> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM participants WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch participant by name")?;

        row.as_ref().map(Self::row_to_participant).transpose()
    }

    async fn list_participants(&self) -> Result<Vec<Participant>> {
        let rows = sqlx::query("SELECT id, name, email, created_at FROM participants ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list participants")?;

        rows.iter().map(Self::row_to_participant).collect()
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .context("Invalid timestamp")?
        .with_timezone(&Utc))
}
