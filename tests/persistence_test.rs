#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

const HEADER: &str = "type, reseller, sale, index, amount, count, client, method, at";

fn run(db_path: &std::path::Path, lines: &[&str]) -> String {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "{HEADER}").unwrap();
    for line in lines {
        writeln!(csv, "{line}").unwrap();
    }

    let output = Command::new(cargo_bin!("reseller-ledger"))
        .arg(csv.path())
        .arg("--config")
        .arg("tests/fixtures/ledger.toml")
        .arg("--db-path")
        .arg(db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: a sale paid in three installments
    let stdout1 = run(
        &db_path,
        &[
            "sale, 1, 1, , 90.00, , Ana, ,",
            "pay, 1, 1, , , 3, , credit,",
        ],
    );
    assert!(stdout1.contains("1,1,90.00,9.00,81.00"));
    assert!(stdout1.contains(",90.00,0"));

    // 2. Second run: the recovered schedule accepts a mark
    let stdout2 = run(&db_path, &["mark, 1, 1, 0, , , , ,"]);
    assert!(stdout2.contains(",60.00,0"));

    // 3. Third run: settle and complete against the stored sales
    let stdout3 = run(&db_path, &["settle, 1", "complete, 1"]);
    assert!(stdout3.contains("1,0,0.00,0.00,0.00"));
}
