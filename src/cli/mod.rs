use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::ExpenseService;
use crate::domain::{
    BalanceSummary, NewExpense, NewShare, SplitMethod, format_cents, format_percentage,
    parse_cents, parse_percentage,
};

/// Divvy - Shared Expense Splitter
#[derive(Parser)]
#[command(name = "divvy")]
#[command(about = "Split shared expenses among participants and keep a balance sheet")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "DIVVY_DATABASE", default_value = "divvy.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Participant management commands
    #[command(subcommand)]
    Participant(ParticipantCommands),

    /// Record a shared expense
    Expense {
        /// What the expense was for
        description: String,

        /// Total amount (e.g., "100.00" or "100")
        amount: String,

        /// Split method: equal, percentage, exact
        #[arg(short, long, default_value = "equal")]
        split: String,

        /// Participant share as NAME, NAME=PERCENT or NAME=AMOUNT (repeatable)
        #[arg(long = "share", required = true)]
        shares: Vec<String>,
    },

    /// List expenses, optionally only those involving one participant
    Expenses {
        /// Participant name
        #[arg(short, long)]
        participant: Option<String>,
    },

    /// Show total owed by each participant
    Balances,

    /// Export data to CSV or JSON
    Export {
        /// What to export: balance-sheet, balances, expenses
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ParticipantCommands {
    /// Add a participant
    Add {
        /// Participant name (must be unique)
        name: String,

        /// Contact email
        #[arg(short, long)]
        email: Option<String>,
    },

    /// List all participants
    List,
}

/// Install the tracing subscriber.
/// `DIVVY_LOG` takes precedence; otherwise `--verbose` selects debug output.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("DIVVY_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("divvy={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                ExpenseService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Participant(participant_cmd) => {
                let service = ExpenseService::connect(&self.database).await?;
                run_participant_command(&service, participant_cmd).await?;
            }

            Commands::Expense {
                description,
                amount,
                split,
                shares,
            } => {
                let service = ExpenseService::connect(&self.database).await?;
                run_expense_command(&service, description, &amount, &split, &shares).await?;
            }

            Commands::Expenses { participant } => {
                let service = ExpenseService::connect(&self.database).await?;
                run_expenses_command(&service, participant.as_deref()).await?;
            }

            Commands::Balances => {
                let service = ExpenseService::connect(&self.database).await?;
                run_balances_command(&service).await?;
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = ExpenseService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref()).await?;
            }
        }
        Ok(())
    }
}

async fn run_participant_command(service: &ExpenseService, cmd: ParticipantCommands) -> Result<()> {
    match cmd {
        ParticipantCommands::Add { name, email } => {
            let participant = service.add_participant(name, email).await?;
            println!("Added participant: {} ({})", participant.name, participant.id);
        }
        ParticipantCommands::List => {
            let participants = service.list_participants().await?;
            if participants.is_empty() {
                println!("No participants found.");
            } else {
                println!("{:<20} {:<30}", "NAME", "EMAIL");
                println!("{}", "-".repeat(50));
                for p in participants {
                    println!("{:<20} {:<30}", truncate(&p.name, 20), p.email.unwrap_or_default());
                }
            }
        }
    }
    Ok(())
}

async fn run_expense_command(
    service: &ExpenseService,
    description: String,
    amount: &str,
    split: &str,
    shares: &[String],
) -> Result<()> {
    let amount_cents =
        parse_cents(amount).context("Invalid amount format. Use '100.00' or '100'")?;
    let split_method = SplitMethod::parse(split).map_err(crate::application::AppError::from)?;

    let mut participants = Vec::with_capacity(shares.len());
    for spec in shares {
        let (name, value) = parse_share_arg(spec);
        let participant = service.get_participant(name).await?;
        participants.push(share_for(split_method, participant.id, name, value)?);
    }

    let record = service
        .record_expense(NewExpense {
            description,
            amount_cents,
            split_method,
            participants,
        })
        .await?;

    println!(
        "Recorded expense: {} {} split {} ({})",
        record.description,
        format_cents(record.amount_cents),
        record.split_method,
        record.id
    );
    for share in &record.participants {
        let participant = service.get_participant_by_id(share.participant_id).await?;
        println!(
            "  {:<20} owes {:>10}",
            truncate(&participant.name, 20),
            format_cents(share.amount_owed)
        );
    }
    Ok(())
}

/// Split a `--share` argument into the participant name and optional value.
fn parse_share_arg(spec: &str) -> (&str, Option<&str>) {
    match spec.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (spec.trim(), None),
    }
}

fn share_for(
    method: SplitMethod,
    participant_id: uuid::Uuid,
    name: &str,
    value: Option<&str>,
) -> Result<NewShare> {
    let share = NewShare::new(participant_id);
    match (method, value) {
        (SplitMethod::Equal, None) => Ok(share),
        (SplitMethod::Equal, Some(_)) => {
            anyhow::bail!("Share '{}' has a value, but equal splits take names only", name)
        }
        (SplitMethod::Percentage, Some(value)) => {
            let percentage = parse_percentage(value)
                .with_context(|| format!("Invalid percentage '{}' for {}", value, name))?;
            Ok(share.with_percentage(percentage))
        }
        (SplitMethod::Exact, Some(value)) => {
            let exact = parse_cents(value)
                .with_context(|| format!("Invalid amount '{}' for {}", value, name))?;
            Ok(share.with_exact_amount(exact))
        }
        // Missing values are reported by the split validator
        (_, None) => Ok(share),
    }
}

async fn run_expenses_command(service: &ExpenseService, participant: Option<&str>) -> Result<()> {
    match service.list_expenses(participant).await? {
        BalanceSummary::Involving {
            participant_id,
            expenses,
        } => {
            println!(
                "{:<12} {:>10} {:<11} {:>10} DESCRIPTION",
                "DATE", "AMOUNT", "SPLIT", "OWED"
            );
            println!("{}", "-".repeat(70));
            for expense in &expenses {
                let owed = expense
                    .share_of(participant_id)
                    .map(|s| s.amount_owed)
                    .unwrap_or(0);
                println!(
                    "{:<12} {:>10} {:<11} {:>10} {}",
                    expense.created_at.format("%Y-%m-%d"),
                    format_cents(expense.amount_cents),
                    expense.split_method,
                    format_cents(owed),
                    truncate(&expense.description, 30)
                );
            }
        }
        BalanceSummary::Overall(views) => {
            if views.is_empty() {
                println!("No expenses found.");
                return Ok(());
            }
            for view in &views {
                println!(
                    "{}  {}  {} ({})",
                    view.created_at.format("%Y-%m-%d"),
                    format_cents(view.amount_cents),
                    view.description,
                    view.split_method
                );
                for share in &view.participants {
                    let detail = share
                        .percentage
                        .map(|p| format!("{}%", format_percentage(p)))
                        .unwrap_or_default();
                    println!(
                        "    {:<20} {:>10} {}",
                        truncate(&share.participant.name, 20),
                        format_cents(share.amount_owed),
                        detail
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_balances_command(service: &ExpenseService) -> Result<()> {
    let balances = service.net_balances().await?;
    if balances.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    println!("{:<20} {:>8} {:>12}", "PARTICIPANT", "EXPENSES", "OWED");
    println!("{}", "-".repeat(42));
    for entry in balances {
        println!(
            "{:<20} {:>8} {:>12}",
            truncate(&entry.participant, 20),
            entry.expense_count,
            format_cents(entry.total_owed)
        );
    }
    Ok(())
}

async fn run_export_command(
    service: &ExpenseService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "balance-sheet" => {
            let count = exporter.export_balance_sheet_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} balance sheet rows", count);
            }
        }
        "balances" => {
            let count = exporter.export_balances_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} balances", count);
            }
        }
        "expenses" => {
            let snapshot = exporter.export_expenses_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported {} expenses and {} participants",
                    snapshot.expenses.len(),
                    snapshot.participants.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: balance-sheet, balances, expenses",
                export_type
            );
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
