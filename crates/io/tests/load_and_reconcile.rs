// Loader output fed straight into the engine, the way the CLI wires them.

use serde_json::json;
use tally_io::{load_reference, load_spreadsheet};
use tally_recon::{run_rows, MismatchReason, NoopObserver, ReconConfig};

fn config(toml: &str) -> ReconConfig {
    ReconConfig::from_toml(toml).unwrap()
}

#[test]
fn csv_and_json_sources_reconcile() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("upload.csv");
    let reference = dir.path().join("ledger.json");
    std::fs::write(&sheet, "id;reference;amount\n1;INV-1;100\n2;INV-2;50.5\n4;INV-4;9\n").unwrap();
    std::fs::write(
        &reference,
        r#"[
            {"id": 1, "reference": "INV-1", "amount": 100.0, "posted": "2024-03-01"},
            {"id": 2, "reference": "INV-2", "amount": 50},
            {"id": 3, "reference": "INV-3", "amount": 12}
        ]"#,
    )
    .unwrap();

    let cfg = ReconConfig::default();
    let rows_a = load_spreadsheet(&sheet, &cfg).unwrap();
    let rows_b = load_reference(&reference, &cfg.columns).unwrap();
    let result = run_rows(&cfg, rows_a, rows_b, &NoopObserver).unwrap();

    assert_eq!(result.reconciled.len(), 1);
    let reasons: Vec<_> = result.unreconciled.iter().map(|r| r.reason).collect();
    assert_eq!(
        reasons,
        vec![
            MismatchReason::AmountMismatch,
            MismatchReason::OnlyInSpreadsheet,
            MismatchReason::OnlyInReference,
        ]
    );

    let reconciled = serde_json::to_value(&result.reconciled[0]).unwrap();
    assert_eq!(reconciled["posted"], json!("2024-03-01"));
}

#[test]
fn workbook_sheet_and_column_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("upload.xlsx");

    let mut wb = rust_xlsxwriter::Workbook::new();
    wb.add_worksheet().set_name("Notes").unwrap();
    let ws = wb.add_worksheet().set_name("March").unwrap();
    ws.write_string(0, 0, "Txn").unwrap();
    ws.write_string(0, 1, "Ref").unwrap();
    ws.write_string(0, 2, "Total").unwrap();
    ws.write_number(1, 0, 7.0).unwrap();
    ws.write_string(1, 1, "R7").unwrap();
    ws.write_number(1, 2, 19.99).unwrap();
    wb.save(&sheet).unwrap();

    let cfg = config(
        "[columns]\nid = \"Txn\"\nreference = \"Ref\"\namount = \"Total\"\n\n[spreadsheet]\nsheet = \"March\"\n",
    );
    let rows_a = load_spreadsheet(&sheet, &cfg).unwrap();
    let rows_b = tally_io::parse_reference(r#"[{"Txn": 7, "Ref": "R7", "Total": 19.99}]"#, &cfg.columns)
        .unwrap();

    let result = run_rows(&cfg, rows_a, rows_b, &NoopObserver).unwrap();
    assert!(result.is_fully_reconciled());
}

#[test]
fn zero_padded_csv_codes_join_text_reference() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("upload.csv");
    std::fs::write(&sheet, "id,reference,amount\n000123,0042,10\n").unwrap();

    let cfg = ReconConfig::default();
    let rows_a = load_spreadsheet(&sheet, &cfg).unwrap();
    let rows_b = tally_io::parse_reference(
        r#"[{"id": "000123", "reference": "0042", "amount": 10}]"#,
        &cfg.columns,
    )
    .unwrap();

    let result = run_rows(&cfg, rows_a, rows_b, &NoopObserver).unwrap();
    assert!(result.is_fully_reconciled());
}
