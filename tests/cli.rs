//! End-to-end tests for the `sleek` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sleek(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sleek").unwrap();
    cmd.arg("--data-dir")
        .arg(dir.path())
        .env_remove("SLEEK_INVOICES_DATA_DIR")
        .env_remove("SLEEK_ENCRYPTION_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn initialized() -> TempDir {
    let dir = TempDir::new().unwrap();
    sleek(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized SleekInvoices"));
    dir
}

#[test]
fn test_requires_init() {
    let dir = TempDir::new().unwrap();
    sleek(&dir)
        .args(["client", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sleek init"));
}

#[test]
fn test_config_before_init_still_requires_init() {
    let dir = TempDir::new().unwrap();
    sleek(&dir)
        .args(["config", "--business-name", "Early Bird"])
        .assert()
        .success();

    sleek(&dir)
        .args(["config", "--payment-terms", "200000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot exceed"));

    sleek(&dir)
        .args(["client", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sleek init"));

    sleek(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized SleekInvoices"));

    sleek(&dir)
        .args(["expense", "category-list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Office Supplies"));
}

#[test]
fn test_init_is_idempotent() {
    let dir = initialized();
    sleek(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already initialized"));

    sleek(&dir)
        .args(["expense", "category-list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Office Supplies"));
}

#[test]
fn test_client_add_and_list() {
    let dir = initialized();

    sleek(&dir)
        .args(["client", "add", "Acme Corp", "--email", "billing@acme.test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created client: Acme Corp"));

    sleek(&dir)
        .args(["client", "add", "Acme Again", "--email", "BILLING@acme.test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    sleek(&dir)
        .args(["client", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Corp"))
        .stdout(predicate::str::contains("1 client(s)"));
}

#[test]
fn test_sample_csv_imports_cleanly() {
    let dir = initialized();

    let output = sleek(&dir).args(["client", "sample-csv"]).output().unwrap();
    assert!(output.status.success());
    let csv_path = dir.path().join("clients.csv");
    std::fs::write(&csv_path, &output.stdout).unwrap();

    sleek(&dir)
        .args(["client", "import"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported: 3"));

    // Second run: every email is already a client
    sleek(&dir)
        .args(["client", "import"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported: 0"))
        .stdout(predicate::str::contains("already a client"));

    sleek(&dir)
        .args(["export", "clients"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "name,email,phone,address,company,notes,vat_number",
        ))
        .stdout(predicate::str::contains("Lukas Weber"));
}

#[test]
fn test_import_without_name_column_fails() {
    let dir = initialized();
    let csv_path = dir.path().join("bad.csv");
    std::fs::write(&csv_path, "email,phone\na@b.test,555-123-4567\n").unwrap();

    sleek(&dir)
        .args(["client", "import"])
        .arg(&csv_path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Missing required column: name"));
}

#[test]
fn test_invoice_lifecycle() {
    let dir = initialized();

    sleek(&dir)
        .args(["client", "add", "Acme Corp"])
        .assert()
        .success();

    sleek(&dir)
        .args([
            "invoice", "create", "Acme Corp", "--date", "2024-03-01", "--tax", "10",
            "--discount", "5%",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created invoice INV-0001"))
        .stdout(predicate::str::contains("Due: 2024-03-31"));

    sleek(&dir)
        .args(["invoice", "add-item", "INV-0001", "Design", "2", "100.00"])
        .assert()
        .success();
    sleek(&dir)
        .args(["invoice", "add-item", "INV-0001", "Hosting", "1", "150"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New total: $365.75"));

    sleek(&dir)
        .args(["invoice", "send", "INV-0001"])
        .assert()
        .success();

    // Sent invoices can no longer be edited
    sleek(&dir)
        .args(["invoice", "add-item", "INV-0001", "Extra", "1", "10"])
        .assert()
        .failure();

    sleek(&dir)
        .args(["invoice", "pay", "INV-0001", "400.00", "--date", "2024-03-10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the balance"));

    sleek(&dir)
        .args(["invoice", "pay", "INV-0001", "100.00", "--date", "2024-03-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Partial"))
        .stdout(predicate::str::contains("$265.75"));

    sleek(&dir)
        .args([
            "invoice", "pay", "INV-0001", "265.75", "--date", "2024-03-15", "--method", "card",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Paid"));

    sleek(&dir)
        .args(["invoice", "show", "INV-0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Paid]"))
        .stdout(predicate::str::contains("Balance due: $0.00"));

    sleek(&dir)
        .args(["invoice", "cancel", "INV-0001"])
        .assert()
        .failure();

    sleek(&dir)
        .args(["report", "summary", "--from", "2024-01-01", "--to", "2024-12-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Business Summary"))
        .stdout(predicate::str::contains("$365.75"));

    sleek(&dir)
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE"))
        .stdout(predicate::str::contains("INV-0001"));
}

#[test]
fn test_estimate_conversion() {
    let dir = initialized();

    sleek(&dir).args(["client", "add", "Globex"]).assert().success();
    sleek(&dir)
        .args(["estimate", "create", "Globex", "--date", "2099-01-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created estimate EST-0001"));
    sleek(&dir)
        .args(["estimate", "add-item", "EST-0001", "Audit", "3", "125"])
        .assert()
        .success();
    sleek(&dir)
        .args(["estimate", "convert", "EST-0001"])
        .assert()
        .failure();
    sleek(&dir)
        .args(["estimate", "send", "EST-0001"])
        .assert()
        .success();
    sleek(&dir)
        .args(["estimate", "accept", "EST-0001"])
        .assert()
        .success();
    sleek(&dir)
        .args(["estimate", "convert", "EST-0001", "--date", "2099-01-20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("into invoice INV-0001"))
        .stdout(predicate::str::contains("$375.00"));

    sleek(&dir)
        .args(["estimate", "show", "EST-0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Converted]"));
}

#[test]
fn test_secret_round_trip_with_env_key() {
    let dir = TempDir::new().unwrap();

    let keygen = sleek(&dir).args(["secret", "keygen"]).output().unwrap();
    assert!(keygen.status.success());
    let key = String::from_utf8(keygen.stdout).unwrap().trim().to_string();
    assert_eq!(key.len(), 64);

    let encrypted = sleek(&dir)
        .env("SLEEK_ENCRYPTION_KEY", &key)
        .args(["secret", "encrypt", "re_live_token_123"])
        .output()
        .unwrap();
    assert!(encrypted.status.success());
    let blob = String::from_utf8(encrypted.stdout).unwrap().trim().to_string();
    assert_ne!(blob, "re_live_token_123");

    sleek(&dir)
        .env("SLEEK_ENCRYPTION_KEY", &key)
        .args(["secret", "decrypt", &blob])
        .assert()
        .success()
        .stdout("re_live_token_123\n");

    let other_key = "00".repeat(32);
    sleek(&dir)
        .env("SLEEK_ENCRYPTION_KEY", &other_key)
        .args(["secret", "decrypt", &blob])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decryption failed"));
}

#[test]
fn test_image_check_rejects_unknown_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "just text").unwrap();

    sleek(&dir)
        .args(["image", "check"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type"));

    let svg = dir.path().join("logo.svg");
    std::fs::write(&svg, "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>").unwrap();
    sleek(&dir)
        .args(["image", "check"])
        .arg(&svg)
        .assert()
        .success()
        .stdout(predicate::str::contains("image/svg+xml"));
}
