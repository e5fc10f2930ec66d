// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use divvy::application::ExpenseService;
use divvy::domain::{ExpenseRecord, NewExpense, NewShare, SplitMethod};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(ExpenseService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = ExpenseService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Test fixture: a small group of flatmates
pub struct Flatmates;

impl Flatmates {
    /// Create Alice, Bob and Carol
    pub async fn create(service: &ExpenseService) -> Result<()> {
        service
            .add_participant("Alice".into(), Some("alice@example.com".into()))
            .await?;
        service
            .add_participant("Bob".into(), Some("bob@example.com".into()))
            .await?;
        service.add_participant("Carol".into(), None).await?;
        Ok(())
    }
}

/// Record an equal split among the named participants
pub async fn record_equal(
    service: &ExpenseService,
    description: &str,
    amount_cents: i64,
    names: &[&str],
) -> Result<ExpenseRecord> {
    let mut participants = Vec::new();
    for name in names {
        participants.push(NewShare::new(service.get_participant(name).await?.id));
    }

    Ok(service
        .record_expense(NewExpense {
            description: description.into(),
            amount_cents,
            split_method: SplitMethod::Equal,
            participants,
        })
        .await?)
}
