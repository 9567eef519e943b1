mod common;

use assert_cmd::Command;
use common::temp_base;
use predicates::str::contains;

fn cli(base: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("finance_core_cli").unwrap();
    cmd.env("FINANCE_CORE_CLI_SCRIPT", "1")
        .env("FINANCE_CORE_HOME", base)
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn script_mode_runs_basic_flow() {
    let base = temp_base();
    let input = "\
user ana@example.com
income 3.000,00
expense add \"Padaria do Zé\" 12,50 Comida
expense add Aluguel 1.500,00 Casa --recurring
scenario set principal 10 rate 10 days 3
project
solve 100
done 1
summary
exit
";
    cli(&base)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Opened `ana@example.com`"))
        .stdout(contains("Scenario updated."))
        .stdout(contains("Final balance"))
        .stdout(contains("Required daily rate:"))
        .stdout(contains("Day 1 marked as done."))
        .stdout(contains("Comida"))
        .stdout(contains("Unsaved changes written."));

    let json = std::fs::read_to_string(base.join("users").join("ana_example_com.json")).unwrap();
    assert!(json.contains("Padaria do Zé"));
    assert!(json.contains("\"income\": 3000.0"));
    assert!(base.join("config").join("config.json").is_file());
}

#[test]
fn data_survives_between_runs() {
    let base = temp_base();
    cli(&base)
        .write_stdin("user bia\nscenario new Viagem\nsave\n")
        .assert()
        .success()
        .stdout(contains("Data saved."));

    cli(&base)
        .write_stdin("user bia\nscenario list\n")
        .assert()
        .success()
        .stdout(contains("Viagem"))
        .stdout(contains("2 scenario(s)"));
}

#[test]
fn errors_are_reported_and_the_script_continues() {
    let base = temp_base();
    cli(&base)
        .write_stdin("income 10\nsumary\nuser carla\nexpense add Nada 0\nexpense list\n")
        .assert()
        .success()
        .stdout(contains("No user selected"))
        .stdout(contains("Did you mean `summary`?"))
        .stdout(contains("Expense amount must be greater than zero"))
        .stdout(contains("No expenses recorded."));
}
