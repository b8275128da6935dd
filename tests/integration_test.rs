use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn stockflow_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stockflow"));
    cmd.env("STOCKFLOW_THEME", "light").env_remove("STOCKFLOW_LOG");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    stockflow_cmd().current_dir(dir).args(args).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Initialized store with the demo user signed in
fn signed_in() -> TempDir {
    let tmp = TempDir::new().unwrap();
    assert!(run(tmp.path(), &["init"]).status.success());
    let output = run(
        tmp.path(),
        &["login", "--email", "admin@admin.com", "--password", "1234"],
    );
    assert!(output.status.success(), "login failed: {}", stderr(&output));
    tmp
}

fn seeded() -> TempDir {
    let tmp = signed_in();
    let output = run(tmp.path(), &["seed"]);
    assert!(output.status.success(), "seed failed: {}", stderr(&output));
    tmp
}

#[test]
fn test_init_creates_stockflow_directory() {
    let tmp = TempDir::new().unwrap();

    let output = run(tmp.path(), &["init"]);

    assert!(output.status.success());
    assert!(tmp.path().join(".stockflow").exists());
    assert!(tmp.path().join(".stockflow/config.yaml").exists());
}

#[test]
fn test_init_twice_fails() {
    let tmp = TempDir::new().unwrap();

    run(tmp.path(), &["init"]);
    let output = run(tmp.path(), &["init"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Already initialized"));
}

#[test]
fn test_command_without_init_fails() {
    let tmp = TempDir::new().unwrap();

    let output = run(tmp.path(), &["dashboard"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Not in a stockflow project"));
}

#[test]
fn test_guarded_command_requires_login() {
    let tmp = TempDir::new().unwrap();
    run(tmp.path(), &["init"]);

    let output = run(tmp.path(), &["dashboard"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Login required"));
}

#[test]
fn test_wrong_credentials_rejected() {
    let tmp = TempDir::new().unwrap();
    run(tmp.path(), &["init"]);

    let output = run(
        tmp.path(),
        &["login", "--email", "admin@admin.com", "--password", "wrong"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid email or password"));
    assert!(!tmp.path().join(".stockflow/stockflow_auth.json").exists());
}

#[test]
fn test_login_whoami_logout() {
    let tmp = signed_in();

    let output = run(tmp.path(), &["whoami", "--json"]);
    assert!(output.status.success());
    let user: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(user["email"], "admin@admin.com");
    assert_eq!(user["role"], "admin");

    assert!(run(tmp.path(), &["logout"]).status.success());
    let output = run(tmp.path(), &["whoami"]);
    assert!(!output.status.success());
}

#[test]
fn test_register_does_not_sign_in() {
    let tmp = TempDir::new().unwrap();
    run(tmp.path(), &["init"]);

    let output = run(
        tmp.path(),
        &[
            "register",
            "--name",
            "Maria",
            "--email",
            "maria@example.com",
            "--password",
            "123456",
            "--confirm",
            "123456",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(!run(tmp.path(), &["dashboard"]).status.success());

    let output = run(
        tmp.path(),
        &[
            "register",
            "--name",
            "Maria",
            "--email",
            "maria@example.com",
            "--password",
            "12345",
            "--confirm",
            "12345",
        ],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("at least 6 characters"));
}

#[test]
fn test_seed_is_idempotent() {
    let tmp = seeded();

    let output = run(tmp.path(), &["seed"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Seeded 0 products, 0 suppliers, 0 inbound notes"));

    let output = run(tmp.path(), &["entrada", "list", "--json"]);
    let notes: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(notes.len(), 10);
}

#[test]
fn test_entrada_add_creates_note_and_supplier() {
    let tmp = signed_in();

    let output = run(
        tmp.path(),
        &[
            "entrada",
            "add",
            "--supplier",
            "Fornecedor Novo",
            "--number",
            "20001",
            "--date",
            "2024-07-01",
            "--item",
            "Parafuso:100:0.25",
            "--item",
            "parafuso:50:0.30",
            "--json",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let note: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(note["number"], "20001");
    assert_eq!(note["date"], "2024-07-01");
    let lines = note["lineItems"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["availableQuantity"], 150);
    assert_eq!(lines[0]["receivedQuantity"], 150);

    let output = run(tmp.path(), &["stock", "--json"]);
    let levels: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0]["name"], "Parafuso");
    assert_eq!(levels[0]["quantity"], 150);
}

#[test]
fn test_entrada_duplicate_number_rejected() {
    let tmp = seeded();

    let output = run(
        tmp.path(),
        &[
            "entrada",
            "add",
            "--supplier",
            "Fornecedor X",
            "--number",
            "10001",
            "--item",
            "Produto A:1:1.0",
        ],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("already registered"));
}

#[test]
fn test_entrada_without_items_rejected() {
    let tmp = signed_in();

    let output = run(
        tmp.path(),
        &["entrada", "add", "--supplier", "Fornecedor X", "--number", "1"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Add at least one product"));
}

#[test]
fn test_saida_decrements_note_and_records_movement() {
    let tmp = seeded();

    let output = run(
        tmp.path(),
        &[
            "saida", "add", "--note", "10001", "--reason", "Venda", "--item", "p1:5", "--json",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let movement: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(movement["inboundNoteId"], "n1");
    assert_eq!(movement["items"][0]["outboundQuantity"], 5);

    let output = run(tmp.path(), &["entrada", "list", "--json"]);
    let notes: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    let n1 = notes.iter().find(|n| n["id"] == "n1").unwrap();
    assert_eq!(n1["lineItems"][0]["availableQuantity"], 45);

    let output = run(tmp.path(), &["saida", "list", "--json"]);
    let movements: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(movements.len(), 1);
}

#[test]
fn test_saida_over_quantity_rejected_without_writing() {
    let tmp = seeded();
    let notes_before = std::fs::read_to_string(tmp.path().join(".stockflow/notas_entrada.json")).unwrap();

    let output = run(
        tmp.path(),
        &["saida", "add", "--note", "10001", "--reason", "Venda", "--item", "p1:60"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid quantity"));
    let notes_after = std::fs::read_to_string(tmp.path().join(".stockflow/notas_entrada.json")).unwrap();
    assert_eq!(notes_before, notes_after);
    assert!(!tmp.path().join(".stockflow/saidas_estoque.json").exists());
}

#[test]
fn test_saida_low_stock_warning() {
    let tmp = seeded();

    // Produto J only appears on note 10008 with 14 units
    let output = run(
        tmp.path(),
        &["saida", "add", "--note", "10008", "--reason", "Venda", "--item", "p10:10"],
    );

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("Produto J is critically low (4 left)"));
}

#[test]
fn test_dashboard_json() {
    let tmp = seeded();

    let output = run(tmp.path(), &["dashboard", "--json"]);
    assert!(output.status.success());

    let dashboard: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(dashboard["totals"]["products"], 10);
    assert_eq!(dashboard["totals"]["inboundNotes"], 10);
    assert_eq!(dashboard["totals"]["outboundMovements"], 0);
    let activity = dashboard["recentActivity"].as_array().unwrap();
    assert_eq!(activity.len(), 10);
    assert_eq!(activity[0]["date"], "2024-06-10");
}

#[test]
fn test_entrada_remove_requires_force_when_not_interactive() {
    let tmp = seeded();

    let output = stockflow_cmd()
        .current_dir(tmp.path())
        .args(["entrada", "remove", "10001"])
        .stdin(std::process::Stdio::null())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--force"));

    let output = run(tmp.path(), &["entrada", "remove", "10001", "--force"]);
    assert!(output.status.success());
    let output = run(tmp.path(), &["entrada", "list", "--json"]);
    let notes: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(notes.len(), 9);
}

#[test]
fn test_theme_toggle() {
    let tmp = signed_in();

    let output = run(tmp.path(), &["theme"]);
    assert_eq!(stdout(&output).trim(), "light");

    let output = run(tmp.path(), &["theme", "toggle"]);
    assert!(stdout(&output).contains("dark"));

    let output = run(tmp.path(), &["theme", "show"]);
    assert_eq!(stdout(&output).trim(), "dark");
}

#[test]
fn test_profile_update_validates_password() {
    let tmp = signed_in();

    let output = run(
        tmp.path(),
        &["profile", "update", "--new-password", "abc", "--confirm", "abc"],
    );
    assert!(!output.status.success());

    let output = run(tmp.path(), &["profile", "update", "--name", "Admin"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Admin"));
}
