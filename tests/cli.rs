use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rentradar() -> Command {
    Command::cargo_bin("rentradar").unwrap()
}

#[test]
fn test_load_then_query_roundtrip() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("rentradar.db");
    let data = dir.path().join("properties.json");
    std::fs::write(
        &data,
        r#"[{"property_id": "p1", "zipCode": 22903}, {"property_id": "p2", "zipCode": 22902}]"#,
    )
    .unwrap();

    rentradar()
        .arg("--db")
        .arg(&db)
        .arg("load")
        .arg(&data)
        .args(["--table", "properties"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 2 rows into properties"));

    rentradar()
        .arg("--db")
        .arg(&db)
        .arg("tables")
        .assert()
        .success()
        .stdout(predicate::str::contains("properties"));

    rentradar()
        .arg("--db")
        .arg(&db)
        .args(["schema", "properties"])
        .assert()
        .success()
        .stdout(predicate::str::contains("zipCode"));

    rentradar()
        .arg("--db")
        .arg(&db)
        .args([
            "query",
            "SELECT zipCode FROM properties WHERE property_id = ?1",
            "--param",
            "p1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("22903"));
}

#[test]
fn test_property_lookup_as_json() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("rentradar.db");
    let data = dir.path().join("properties.json");
    std::fs::write(&data, r#"[{"property_id": "p1", "zipCode": 22903}]"#).unwrap();

    rentradar()
        .arg("--db")
        .arg(&db)
        .arg("load")
        .arg(&data)
        .args(["--table", "properties"])
        .assert()
        .success();

    rentradar()
        .arg("--db")
        .arg(&db)
        .args(["--json", "property", "p1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"property_id\": \"p1\""))
        .stdout(predicate::str::contains("\"zipCode\": 22903"));

    rentradar()
        .arg("--db")
        .arg(&db)
        .args(["property", "missing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No property found"));
}

#[test]
fn test_query_error_reports_and_fails() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("rentradar.db");

    rentradar()
        .arg("--db")
        .arg(&db)
        .args(["query", "SELECT * FROM no_such_table"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_load_unsupported_format_fails() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("rentradar.db");
    let data = dir.path().join("listings.parquet");
    std::fs::write(&data, b"not parquet").unwrap();

    rentradar()
        .arg("--db")
        .arg(&db)
        .arg("load")
        .arg(&data)
        .args(["--table", "listings"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file format"));
}
