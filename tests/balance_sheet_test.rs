mod common;

use anyhow::Result;
use common::{Flatmates, record_equal, test_service};
use divvy::application::BALANCE_SHEET_HEADERS;
use divvy::domain::{NewExpense, NewShare, SplitMethod};
use divvy::io::Exporter;

#[tokio::test]
async fn test_balance_sheet_rows() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Flatmates::create(&service).await?;

    let alice = service.get_participant("Alice").await?;
    let bob = service.get_participant("Bob").await?;
    service
        .record_expense(NewExpense {
            description: "Hotel".into(),
            amount_cents: 25000,
            split_method: SplitMethod::Percentage,
            participants: vec![
                NewShare::new(alice.id).with_percentage(6000),
                NewShare::new(bob.id).with_percentage(4000),
            ],
        })
        .await?;

    let rows = service.balance_sheet().await?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].description, rows[1].description);
    assert_eq!(rows[0].amount, "250.00");
    assert_eq!(rows[1].amount, "250.00");
    assert_eq!(rows[0].split_method, "PERCENTAGE");
    assert_eq!(rows[0].participant, "Alice");
    assert_eq!(rows[0].amount_owed, "150.00");
    assert_eq!(rows[1].participant, "Bob");
    assert_eq!(rows[1].amount_owed, "100.00");

    Ok(())
}

#[tokio::test]
async fn test_balance_sheet_csv_export() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Flatmates::create(&service).await?;

    record_equal(&service, "Pizza", 10000, &["Alice", "Bob", "Carol"]).await?;
    record_equal(&service, "Taxi, airport", 3000, &["Bob"]).await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service)
        .export_balance_sheet_csv(&mut buffer)
        .await?;
    assert_eq!(count, 4);

    let csv = String::from_utf8(buffer)?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Description,Amount,Split Method,Participant,Amount Owed");
    assert_eq!(lines[1], "Pizza,100.00,EQUAL,Alice,33.34");
    assert_eq!(lines[2], "Pizza,100.00,EQUAL,Bob,33.33");
    assert_eq!(lines[3], "Pizza,100.00,EQUAL,Carol,33.33");
    assert_eq!(lines[4], "\"Taxi, airport\",30.00,EQUAL,Bob,30.00");

    Ok(())
}

#[tokio::test]
async fn test_empty_balance_sheet_has_header() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service)
        .export_balance_sheet_csv(&mut buffer)
        .await?;
    assert_eq!(count, 0);

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    assert_eq!(headers, BALANCE_SHEET_HEADERS);
    assert_eq!(reader.records().count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_balances_csv_and_json_exports() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Flatmates::create(&service).await?;
    record_equal(&service, "Rent", 90000, &["Alice", "Bob", "Carol"]).await?;

    let exporter = Exporter::new(&service);

    let mut buffer = Vec::new();
    let count = exporter.export_balances_csv(&mut buffer).await?;
    assert_eq!(count, 3);
    let csv = String::from_utf8(buffer)?;
    assert_eq!(csv.lines().next(), Some("participant,email,expenses,total_owed"));
    assert!(csv.contains("Alice,alice@example.com,1,300.00"));

    let mut buffer = Vec::new();
    let snapshot = exporter.export_expenses_json(&mut buffer).await?;
    assert_eq!(snapshot.expenses.len(), 1);
    assert_eq!(snapshot.participants.len(), 3);

    let json: serde_json::Value = serde_json::from_slice(&buffer)?;
    assert_eq!(json["expenses"][0]["split_method"], "EQUAL");
    assert_eq!(json["expenses"][0]["participants"][0]["participant"]["name"], "Alice");
    assert_eq!(json["expenses"][0]["participants"][0]["amount_owed"], 30000);

    Ok(())
}
