use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn khata_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("khata"))
}

fn khata(config_path: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    khata_cmd()
        .env_remove("KHATA_LOG")
        .arg("-C")
        .arg(config_path)
        .args(args)
        .assert()
}

/// Init a shop and log in as the default admin
fn setup_shop(temp_dir: &TempDir) -> PathBuf {
    let config_path = temp_dir.path().join("khata-config");
    khata(&config_path, &["init"]).success();
    khata(&config_path, &["login", "--phone", "admin", "--password", "admin"]).success();
    config_path
}

/// Shop with one category, one product (#1, 10 in stock, Rs.40) and one customer
fn setup_catalog(temp_dir: &TempDir) -> PathBuf {
    let config_path = setup_shop(temp_dir);
    khata(&config_path, &["category", "add", "Kulfi", "--unit", "piece"]).success();
    khata(
        &config_path,
        &[
            "product", "add", "--name", "Malai Kulfi", "--category", "Kulfi", "--price", "40",
            "--stock", "10",
        ],
    )
    .success();
    khata(
        &config_path,
        &["customer", "add", "--name", "Asha", "--phone", "9000000001"],
    )
    .success();
    config_path
}

#[test]
fn test_help() {
    khata_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shop book"));
}

#[test]
fn test_version() {
    khata_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("khata"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("khata-config");

    khata(&config_path, &["init"])
        .success()
        .stdout(predicate::str::contains("Initialized khata"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("business.toml").exists());
    assert!(config_path.join("data").join("users.toml").exists());
    assert!(config_path.join("output").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("khata-config");

    khata(&config_path, &["init"]).success();
    khata(&config_path, &["init"])
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    khata(&config_path, &["status"])
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_status() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(&config_path, &["status"])
        .success()
        .stdout(predicate::str::contains("Logged in as:     Admin (admin)"))
        .stdout(predicate::str::contains("Customers:        1"))
        .stdout(predicate::str::contains("Products:         1"));
}

#[test]
fn test_login_with_wrong_password() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("khata-config");
    khata(&config_path, &["init"]).success();

    khata(&config_path, &["login", "--phone", "admin", "--password", "nope"])
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));
    assert!(!config_path.join("session.toml").exists());
}

#[test]
fn test_commands_require_login() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("khata-config");
    khata(&config_path, &["init"]).success();

    khata(&config_path, &["dashboard"])
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_logout_ends_session() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_shop(&temp_dir);

    khata(&config_path, &["whoami"])
        .success()
        .stdout(predicate::str::contains("Admin (admin) - admin"));
    khata(&config_path, &["logout"])
        .success()
        .stdout(predicate::str::contains("Logged out Admin"));
    khata(&config_path, &["whoami"])
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_customer_cannot_use_admin_commands() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(
        &config_path,
        &["login", "--phone", "9000000001", "--password", "9000000001"],
    )
    .success()
    .stdout(predicate::str::contains("Logged in as Asha (user)"));

    khata(&config_path, &["expense", "add", "--description", "Ice", "--amount", "50"])
        .failure()
        .stderr(predicate::str::contains("Admin access required"));

    // Own ledger is fine, somebody else's is not
    khata(&config_path, &["ledger"])
        .success()
        .stdout(predicate::str::contains("Ledger for Asha"));
    khata(&config_path, &["ledger", "9000000002"])
        .failure()
        .stderr(predicate::str::contains("9000000002"));
}

#[test]
fn test_passwd_changes_login() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_shop(&temp_dir);

    khata(&config_path, &["passwd", "--current", "wrong", "--new", "s3cret"])
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));
    khata(&config_path, &["passwd", "--current", "admin", "--new", "s3cret"]).success();

    khata(&config_path, &["login", "--phone", "admin", "--password", "admin"]).failure();
    khata(&config_path, &["login", "--phone", "admin", "--password", "s3cret"]).success();
}

#[test]
fn test_duplicate_customer_phone() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(
        &config_path,
        &["customer", "add", "--name", "Other", "--phone", "9000000001"],
    )
    .failure()
    .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_category_in_use_cannot_be_removed() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(&config_path, &["category", "remove", "Kulfi"]).failure();
    khata(&config_path, &["category", "list"])
        .success()
        .stdout(predicate::str::contains("Kulfi"));
}

#[test]
fn test_product_list_and_update() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(&config_path, &["product", "list"])
        .success()
        .stdout(predicate::str::contains("Malai Kulfi"))
        .stdout(predicate::str::contains("Rs.40.00/piece"))
        .stdout(predicate::str::contains("AVAILABLE"));

    khata(
        &config_path,
        &["product", "update", "1", "--price", "45", "--available", "false"],
    )
    .success();

    khata(&config_path, &["product", "list", "--available"])
        .success()
        .stdout(predicate::str::contains("No products found."));
    khata(&config_path, &["product", "show", "1"])
        .success()
        .stdout(predicate::str::contains("Rs.45.00/piece"))
        .stdout(predicate::str::contains("Available: no"));
}

#[test]
fn test_negative_price_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(
        &config_path,
        &["product", "add", "--name", "Bad", "--category", "Kulfi", "--price", "-5"],
    )
    .failure()
    .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn test_sale_decrements_stock() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(
        &config_path,
        &["sale", "add", "--product", "1", "--qty", "3", "--phone", "9000000001"],
    )
    .success()
    .stdout(predicate::str::contains("Recorded sale #1"))
    .stdout(predicate::str::contains("Rs.120.00"))
    .stdout(predicate::str::contains("Rs.120.00 Dr"));

    khata(&config_path, &["product", "show", "1"])
        .success()
        .stdout(predicate::str::contains("Stock:     7"));
}

#[test]
fn test_sale_over_stock_fails_and_keeps_stock() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(&config_path, &["sale", "add", "--product", "1", "--qty", "11"])
        .failure()
        .stderr(predicate::str::contains("Not enough stock"));

    khata(&config_path, &["product", "show", "1"])
        .success()
        .stdout(predicate::str::contains("Stock:     10"));
    khata(&config_path, &["sale", "list"])
        .success()
        .stdout(predicate::str::contains("No sales recorded."));
}

#[test]
fn test_sale_for_unknown_customer_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(
        &config_path,
        &["sale", "add", "--product", "1", "--qty", "1", "--phone", "123"],
    )
    .failure()
    .stderr(predicate::str::contains("Customer with phone '123' not found"));
}

#[test]
fn test_ledger_running_balance() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    // Payment is recorded first but dated after the sale
    khata(
        &config_path,
        &[
            "payment", "add", "--phone", "9000000001", "--amount", "100", "--date",
            "2024-01-03",
        ],
    )
    .success();
    khata(
        &config_path,
        &[
            "sale", "add", "--product", "1", "--qty", "4", "--phone", "9000000001", "--date",
            "2024-01-01 10:00",
        ],
    )
    .success();

    khata(&config_path, &["ledger", "9000000001"])
        .success()
        .stdout(predicate::str::contains("Malai Kulfi x4 piece"))
        .stdout(predicate::str::contains("160.00 Dr"))
        .stdout(predicate::str::contains("60.00 Dr"))
        .stdout(predicate::str::contains("Total debit:  Rs.160.00"))
        .stdout(predicate::str::contains("Total credit: Rs.100.00"))
        .stdout(predicate::str::contains("Balance:      Rs.60.00 Dr"));

    khata(&config_path, &["customer", "balance", "9000000001"])
        .success()
        .stdout(predicate::str::contains("Rs.60.00 Dr"));
}

#[test]
fn test_advance_payment_shows_credit_balance() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(
        &config_path,
        &["payment", "add", "--phone", "9000000001", "--amount", "40"],
    )
    .success()
    .stdout(predicate::str::contains("Rs.40.00 Cr"));

    khata(&config_path, &["customer", "list"])
        .success()
        .stdout(predicate::str::contains("Asha"))
        .stdout(predicate::str::contains("Rs.40.00 Cr"));
}

#[test]
fn test_zero_payment_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(
        &config_path,
        &["payment", "add", "--phone", "9000000001", "--amount", "0"],
    )
    .failure()
    .stderr(predicate::str::contains("greater than zero"));
    khata(&config_path, &["payment", "list"])
        .success()
        .stdout(predicate::str::contains("No payments recorded."));
}

#[test]
fn test_empty_ledger() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(&config_path, &["ledger", "9000000001"])
        .success()
        .stdout(predicate::str::contains("No transactions recorded."))
        .stdout(predicate::str::contains("Balance:      Rs.0.00"));
}

#[test]
fn test_expense_crud() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_shop(&temp_dir);

    khata(
        &config_path,
        &["expense", "add", "--description", "Milk", "--amount", "250", "--date", "2024-02-01"],
    )
    .success()
    .stdout(predicate::str::contains("Added expense #1 Milk"));

    khata(&config_path, &["expense", "update", "1", "--amount", "300"]).success();
    khata(&config_path, &["expense", "list"])
        .success()
        .stdout(predicate::str::contains("2024-02-01"))
        .stdout(predicate::str::contains("Total spent: Rs.300.00"));

    khata(&config_path, &["expense", "remove", "1"]).success();
    khata(&config_path, &["expense", "list"])
        .success()
        .stdout(predicate::str::contains("No expenses recorded."));
    khata(&config_path, &["expense", "remove", "1"]).failure();
}

#[test]
fn test_dashboard_overview_totals() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(&config_path, &["sale", "add", "--product", "1", "--qty", "2"]).success();
    khata(
        &config_path,
        &["expense", "add", "--description", "Ice", "--amount", "30"],
    )
    .success();

    khata(&config_path, &["dashboard"])
        .success()
        .stdout(predicate::str::contains("Customers: 1"))
        .stdout(predicate::str::contains("Sales:     1"))
        .stdout(predicate::str::contains("Orders:    0 (0 pending, 0 completed)"))
        .stdout(predicate::str::contains("Revenue:   Rs.80.00"))
        .stdout(predicate::str::contains("Profit:    Rs.50.00"))
        .stdout(predicate::str::contains("Sales vs expenses (month)"))
        .stdout(predicate::str::contains("80.00"));
}

#[test]
fn test_dashboard_window_excludes_older_days() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(
        &config_path,
        &["sale", "add", "--product", "1", "--qty", "1", "--date", "2020-01-01"],
    )
    .success();

    khata(&config_path, &["dashboard", "--window", "today"])
        .success()
        .stdout(predicate::str::contains("No sales or expenses in this window."));

    khata(&config_path, &["dashboard", "--window", "all"])
        .success()
        .stdout(predicate::str::contains("2020-01-01"));
}

#[test]
fn test_dashboard_unknown_window_shows_everything() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(
        &config_path,
        &["sale", "add", "--product", "1", "--qty", "1", "--date", "2020-01-01"],
    )
    .success();

    khata(&config_path, &["dashboard", "--window", "fortnight"])
        .success()
        .stdout(predicate::str::contains("2020-01-01"))
        .stderr(predicate::str::contains("Unknown window 'fortnight'"));
}

#[test]
fn test_dashboard_low_stock() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(&config_path, &["sale", "add", "--product", "1", "--qty", "6"]).success();

    khata(&config_path, &["dashboard", "--section", "products"])
        .success()
        .stdout(predicate::str::contains("Low stock (<= 5):"))
        .stdout(predicate::str::contains("Malai Kulfi"));
}

#[test]
fn test_dashboard_reports_receivables() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);
    khata(
        &config_path,
        &["customer", "add", "--name", "Ravi", "--phone", "9000000002"],
    )
    .success();

    khata(
        &config_path,
        &["sale", "add", "--product", "1", "--qty", "4", "--phone", "9000000001"],
    )
    .success();
    khata(
        &config_path,
        &["payment", "add", "--phone", "9000000001", "--amount", "100"],
    )
    .success();
    khata(
        &config_path,
        &["payment", "add", "--phone", "9000000002", "--amount", "30"],
    )
    .success();

    khata(&config_path, &["dashboard", "--section", "reports"])
        .success()
        .stdout(predicate::str::contains("Outstanding: Rs.60.00"))
        .stdout(predicate::str::contains("Advances:    Rs.30.00"))
        .stdout(predicate::str::contains("Kulfi"))
        .stdout(predicate::str::contains("Rs.160.00"));
}

#[test]
fn test_order_reserves_stock() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(
        &config_path,
        &["order", "add", "--item", "1:3", "--item", "1:1", "--phone", "9000000001"],
    )
    .success()
    .stdout(predicate::str::contains("Placed order ORD-"))
    .stdout(predicate::str::contains("Lines:    2"))
    .stdout(predicate::str::contains("Total:    Rs.160.00"));

    khata(&config_path, &["product", "show", "1"])
        .success()
        .stdout(predicate::str::contains("Stock:     6"));

    khata(&config_path, &["order", "show", "1"])
        .success()
        .stdout(predicate::str::contains("Customer: Asha (9000000001)"))
        .stdout(predicate::str::contains("Status:   pending"))
        .stdout(predicate::str::contains("Malai Kulfi"));

    khata(&config_path, &["dashboard"])
        .success()
        .stdout(predicate::str::contains("Orders:    1 (1 pending, 0 completed)"));
}

#[test]
fn test_order_rejects_bad_lines() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(
        &config_path,
        &["order", "add", "--item", "1-3", "--phone", "9000000001"],
    )
    .failure()
    .stderr(predicate::str::contains("Invalid order item '1-3'"));

    khata(
        &config_path,
        &["order", "add", "--item", "1:6", "--item", "1:5", "--phone", "9000000001"],
    )
    .failure()
    .stderr(predicate::str::contains("Not enough stock"));

    khata(
        &config_path,
        &["order", "add", "--item", "1:1", "--phone", "9000000001", "--type", "delivery"],
    )
    .failure()
    .stderr(predicate::str::contains("delivery address must not be empty"));

    khata(&config_path, &["product", "show", "1"])
        .success()
        .stdout(predicate::str::contains("Stock:     10"));
    khata(&config_path, &["order", "list"])
        .success()
        .stdout(predicate::str::contains("No orders found."));
}

#[test]
fn test_customer_sees_only_own_orders() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);
    khata(
        &config_path,
        &["customer", "add", "--name", "Ravi", "--phone", "9000000002"],
    )
    .success();

    khata(
        &config_path,
        &["login", "--phone", "9000000001", "--password", "9000000001"],
    )
    .success();
    khata(&config_path, &["order", "add", "--item", "1:2", "--note", "less sugar"])
        .success()
        .stdout(predicate::str::contains("Customer: Asha (9000000001)"));
    khata(&config_path, &["order", "list"])
        .success()
        .stdout(predicate::str::contains("Asha"))
        .stdout(predicate::str::contains("PENDING"));
    khata(&config_path, &["order", "status", "1", "--status", "ready"])
        .failure()
        .stderr(predicate::str::contains("Admin access required"));

    khata(
        &config_path,
        &["login", "--phone", "9000000002", "--password", "9000000002"],
    )
    .success();
    khata(&config_path, &["order", "list"])
        .success()
        .stdout(predicate::str::contains("No orders found."));
    khata(&config_path, &["order", "show", "1"])
        .failure()
        .stderr(predicate::str::contains("9000000001"));
}

#[test]
fn test_order_status_flow() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(
        &config_path,
        &["order", "add", "--item", "1:4", "--phone", "9000000001"],
    )
    .success();
    khata(
        &config_path,
        &["order", "add", "--item", "1:2", "--phone", "9000000001"],
    )
    .success();

    khata(&config_path, &["order", "status", "1", "--status", "cancelled"])
        .success()
        .stdout(predicate::str::contains("is cancelled (payment pending)"));
    khata(&config_path, &["product", "show", "1"])
        .success()
        .stdout(predicate::str::contains("Stock:     8"));
    khata(&config_path, &["order", "status", "1", "--status", "ready"])
        .failure()
        .stderr(predicate::str::contains("is already cancelled"));

    khata(
        &config_path,
        &["order", "status", "2", "--status", "delivered", "--payment", "paid"],
    )
    .success()
    .stdout(predicate::str::contains("is delivered (payment paid)"));

    khata(&config_path, &["order", "list", "--status", "delivered"])
        .success()
        .stdout(predicate::str::contains("DELIVERED"))
        .stdout(predicate::str::contains("CANCELLED").not());

    khata(&config_path, &["dashboard", "--section", "orders"])
        .success()
        .stdout(predicate::str::contains("Completed:   1"))
        .stdout(predicate::str::contains("Cancelled:   1"))
        .stdout(predicate::str::contains("Delivered:   Rs.80.00"));
    khata(&config_path, &["dashboard"])
        .success()
        .stdout(predicate::str::contains("Revenue:   Rs.80.00"));
}

#[test]
fn test_business_set() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_shop(&temp_dir);

    khata(
        &config_path,
        &["business", "set", "--name", "Sharma Kulfi", "--phone", "+91-98765-43210"],
    )
    .success();

    let content = fs::read_to_string(config_path.join("business.toml")).unwrap();
    assert!(content.contains("Sharma Kulfi"));
    khata(&config_path, &["business", "show"])
        .success()
        .stdout(predicate::str::contains("+91-98765-43210"));
}

#[test]
fn test_bill_for_missing_sale() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_shop(&temp_dir);

    khata(&config_path, &["bill", "42"])
        .failure()
        .stderr(predicate::str::contains("Sale #42 not found"));
}

#[test]
fn test_statement_for_missing_customer() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_shop(&temp_dir);

    khata(&config_path, &["statement", "555"])
        .failure()
        .stderr(predicate::str::contains("Customer with phone '555' not found"));
}

#[test]
fn test_statement_rejects_bad_date() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup_catalog(&temp_dir);

    khata(
        &config_path,
        &["statement", "9000000001", "--from", "01/02/2024"],
    )
    .failure()
    .stderr(predicate::str::contains("01/02/2024"));
}
