use std::collections::HashMap;

use crate::domain::{
    BalanceSummary, ExpenseRecord, ExpenseView, NewExpense, Participant,
    ParticipantDirectory, ParticipantId, aggregate, net_owed,
    resolve_participants,
};
use crate::storage::{ExpenseStore, ParticipantStore, Repository};

use super::{AppError, BalanceSheetRow, ParticipantBalance, format_balance_sheet};

/// Application service providing high-level operations for shared expenses.
/// This is the primary interface for any client (CLI, API, etc.).
pub struct ExpenseService<S = Repository> {
    store: S,
}

impl ExpenseService<Repository> {
    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }
}

impl<S> ExpenseService<S>
where
    S: ExpenseStore + ParticipantStore,
{
    /// Create a new service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // ========================
    // Participant operations
    // ========================

    /// Register a participant. Names are unique.
    pub async fn add_participant(
        &self,
        name: String,
        email: Option<String>,
    ) -> Result<Participant, AppError> {
        if self.store.get_participant_by_name(&name).await?.is_some() {
            return Err(AppError::ParticipantAlreadyExists(name));
        }

        let mut participant = Participant::new(name);
        if let Some(email) = email {
            participant = participant.with_email(email);
        }

        self.store.save_participant(&participant).await?;
        tracing::info!(participant = %participant.name, "participant added");
        Ok(participant)
    }

    /// Get a participant by name.
    pub async fn get_participant(&self, name: &str) -> Result<Participant, AppError> {
        self.store
            .get_participant_by_name(name)
            .await?
            .ok_or_else(|| AppError::ParticipantNotFound(name.to_string()))
    }

    /// Get a participant by ID.
    pub async fn get_participant_by_id(&self, id: ParticipantId) -> Result<Participant, AppError> {
        self.store
            .get_participant(id)
            .await?
            .ok_or_else(|| AppError::ParticipantNotFound(id.to_string()))
    }

    pub async fn list_participants(&self) -> Result<Vec<Participant>, AppError> {
        Ok(self.store.list_participants().await?)
    }

    async fn directory(&self) -> Result<ParticipantDirectory, AppError> {
        let participants = self.store.list_participants().await?;
        Ok(participants.into_iter().map(|p| (p.id, p)).collect())
    }

    // ========================
    // Expense operations
    // ========================

    /// Validate, split and store a new expense.
    pub async fn record_expense(&self, input: NewExpense) -> Result<ExpenseRecord, AppError> {
        for share in &input.participants {
            if self.store.get_participant(share.participant_id).await?.is_none() {
                return Err(AppError::ParticipantNotFound(share.participant_id.to_string()));
            }
        }

        let mut record = ExpenseRecord::create(input).map_err(|err| {
            tracing::warn!("expense rejected: {err}");
            AppError::from(err)
        })?;
        tracing::debug!(
            method = %record.split_method,
            amount_cents = record.amount_cents,
            owed = ?record.participants.iter().map(|s| s.amount_owed).collect::<Vec<_>>(),
            "expense split computed"
        );

        self.store.save(&mut record).await?;
        tracing::info!(
            expense_id = %record.id,
            description = %record.description,
            "expense recorded"
        );
        Ok(record)
    }

    /// Expenses involving a participant when a name is given, in recording
    /// order and in full. Fails with `NotFound` when there are none.
    /// Without a name, every expense with participant identities resolved.
    pub async fn list_expenses(&self, participant: Option<&str>) -> Result<BalanceSummary, AppError> {
        let filter = match participant {
            Some(name) => Some(self.get_participant(name).await?),
            None => None,
        };
        let filter_id = filter.as_ref().map(|p| p.id);

        let records = self.store.find(filter_id).await?;
        let directory = self.directory().await?;

        aggregate(&records, &directory, filter_id).map_err(|_| {
            AppError::NotFound(format!(
                "No expenses found for participant {}",
                filter.map(|p| p.name).unwrap_or_default()
            ))
        })
    }

    /// Every expense, with participant names and emails resolved.
    pub async fn overall_expenses(&self) -> Result<Vec<ExpenseView>, AppError> {
        let records = self.store.find(None).await?;
        let directory = self.directory().await?;
        Ok(resolve_participants(&records, &directory))
    }

    /// Balance sheet rows, one per expense participant.
    pub async fn balance_sheet(&self) -> Result<Vec<BalanceSheetRow>, AppError> {
        let views = self.overall_expenses().await?;
        Ok(format_balance_sheet(&views))
    }

    /// Total owed by each participant, sorted by name.
    pub async fn net_balances(&self) -> Result<Vec<ParticipantBalance>, AppError> {
        let records = self.store.find(None).await?;
        let directory = self.directory().await?;
        let totals = net_owed(&records);

        let mut counts: HashMap<ParticipantId, usize> = HashMap::new();
        for record in &records {
            for share in &record.participants {
                *counts.entry(share.participant_id).or_insert(0) += 1;
            }
        }

        let mut balances: Vec<ParticipantBalance> = totals
            .into_iter()
            .map(|(id, total_owed)| {
                let (participant, email) = match directory.get(&id) {
                    Some(p) => (p.name.clone(), p.email.clone()),
                    None => (id.to_string(), None),
                };
                ParticipantBalance {
                    participant,
                    email,
                    total_owed,
                    expense_count: counts.get(&id).copied().unwrap_or(0),
                }
            })
            .collect();

        balances.sort_by(|a, b| a.participant.cmp(&b.participant));
        Ok(balances)
    }
}
