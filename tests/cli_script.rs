mod common;

use assert_cmd::Command;
use predicates::str::contains;

fn script(base: &std::path::Path, today: &str) -> Command {
    let mut cmd = Command::cargo_bin("dayroll_cli").unwrap();
    cmd.env("DAYROLL_CLI_SCRIPT", "1")
        .env("DAYROLL_DATA_DIR", base)
        .env("DAYROLL_TODAY", today)
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn script_mode_runs_a_daily_flow() {
    let base = common::temp_base();

    script(&base, "2025-04-01")
        .write_stdin("user asha\nbudget 3000\nspend 80\nsummary\nexit\n")
        .assert()
        .success()
        .stdout(contains("Monthly budget of ₹3000.00 saved for 2025-04."))
        .stdout(contains("Expense of"))
        .stdout(contains("Remaining balance: ₹20.00"))
        .stdout(contains("Monthly Summary 2025-04"));

    let document = base.join("users").join("asha.json");
    assert!(document.exists());

    // The selected user is remembered between sessions.
    script(&base, "2025-04-02")
        .write_stdin("today\n")
        .assert()
        .success()
        .stdout(contains("Today's available budget (2025-04-02): ₹120.00"));
}

#[test]
fn script_mode_reports_rule_violations_without_stopping() {
    let base = common::temp_base();

    script(&base, "2025-04-01")
        .write_stdin("user asha\nspend 10\nbudget -5\nbudget 3000\nspend 10\nspend 10\nmonths\n")
        .assert()
        .success()
        .stderr(contains("no budget has been set for 2025-04"))
        .stderr(contains("already"))
        .stdout(contains("Rolling balance"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let base = common::temp_base();

    script(&base, "2025-04-01")
        .write_stdin("sumary\nversion\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `sumary`"))
        .stdout(contains("Suggestion: `summary`?"))
        .stdout(contains(format!("dayroll {}", env!("CARGO_PKG_VERSION"))));
}
