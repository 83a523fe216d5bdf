//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const DEMO_BANK: &str = "../../banks/demo.json";
const DEMO_PROFILE: &str = "../../profiles/demo.toml";

fn quizforge() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("quizforge").unwrap()
}

/// Assemble a seeded demo exam into `dir` and return its path.
fn assemble_demo(dir: &Path) -> std::path::PathBuf {
    let exam = dir.join("exam.json");
    quizforge()
        .args(["assemble", "--bank", DEMO_BANK, "--profile", DEMO_PROFILE, "--seed", "7"])
        .arg("--output")
        .arg(&exam)
        .assert()
        .success()
        .stdout(predicate::str::contains("(7 questions)"));
    exam
}

fn blank_answers(dir: &Path) -> std::path::PathBuf {
    let answers = dir.join("answers.json");
    std::fs::write(&answers, "[null, null, null, null, null, null, null]").unwrap();
    answers
}

#[test]
fn help_lists_commands() {
    quizforge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Randomized exam assembly and scoring"))
        .stdout(predicate::str::contains("assemble"))
        .stdout(predicate::str::contains("grade"))
        .stdout(predicate::str::contains("take"));
}

#[test]
fn version_flag() {
    quizforge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizforge"));
}

#[test]
fn validate_demo_bank() {
    quizforge()
        .args(["validate", "--bank", DEMO_BANK, "--profile", DEMO_PROFILE])
        .assert()
        .success()
        .stdout(predicate::str::contains("(10 questions)"))
        .stdout(predicate::str::contains(
            "Bank is valid for profile `demo` (7 questions, 14 points, pass at 8).",
        ));
}

#[test]
fn validate_bank_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::copy(DEMO_BANK, dir.path().join("exam.json")).unwrap();
    quizforge()
        .args(["validate", "--profile", DEMO_PROFILE, "--bank"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Bank is valid"));
}

#[test]
fn validate_nonexistent_bank() {
    quizforge()
        .args(["validate", "--bank", "nonexistent.json", "--profile", DEMO_PROFILE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_bank_too_small_for_profile() {
    quizforge()
        .args(["validate", "--bank", DEMO_BANK, "--preset", "standard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_malformed_bank() {
    let dir = TempDir::new().unwrap();
    let bank = dir.path().join("broken.json");
    std::fs::write(&bank, "{ not json").unwrap();
    quizforge()
        .args(["validate", "--profile", DEMO_PROFILE, "--bank"])
        .arg(&bank)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn profile_and_preset_conflict() {
    quizforge()
        .args([
            "validate", "--bank", DEMO_BANK, "--profile", DEMO_PROFILE, "--preset", "classic",
        ])
        .assert()
        .failure();
}

#[test]
fn assemble_to_stdout() {
    quizforge()
        .args(["assemble", "--bank", DEMO_BANK, "--profile", DEMO_PROFILE, "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"questions\""))
        .stdout(predicate::str::contains("\"profile\": \"demo\""));
}

#[test]
fn grade_blank_answers_as_text() {
    let dir = TempDir::new().unwrap();
    let exam = assemble_demo(dir.path());
    let answers = blank_answers(dir.path());

    quizforge()
        .arg("grade")
        .arg("--exam")
        .arg(&exam)
        .arg("--answers")
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 0 / 14 (FAILED, pass at 8)"))
        .stdout(predicate::str::contains("Wrong answers (7):"))
        .stdout(predicate::str::contains("未作答"));
}

#[test]
fn grade_writes_html_report() {
    let dir = TempDir::new().unwrap();
    let exam = assemble_demo(dir.path());
    let answers = blank_answers(dir.path());
    let output = dir.path().join("out").join("report.html");

    quizforge()
        .arg("grade")
        .arg("--exam")
        .arg(&exam)
        .arg("--answers")
        .arg(&answers)
        .args(["--format", "html", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score 0 / 14; report written to"));

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.contains("<html"));
    assert!(html.contains("Wrong answers (7)"));
}

#[test]
fn grade_json_and_markdown() {
    let dir = TempDir::new().unwrap();
    let exam = assemble_demo(dir.path());
    let answers = blank_answers(dir.path());

    let output = quizforge()
        .arg("grade")
        .arg("--exam")
        .arg(&exam)
        .arg("--answers")
        .arg(&answers)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["score"]["total"], 0.0);
    assert_eq!(report["wrong_answers"].as_array().unwrap().len(), 7);

    quizforge()
        .arg("grade")
        .arg("--exam")
        .arg(&exam)
        .arg("--answers")
        .arg(&answers)
        .args(["--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Exam result: demo"));
}

#[test]
fn grade_unknown_format() {
    let dir = TempDir::new().unwrap();
    let exam = assemble_demo(dir.path());
    let answers = blank_answers(dir.path());

    quizforge()
        .arg("grade")
        .arg("--exam")
        .arg(&exam)
        .arg("--answers")
        .arg(&answers)
        .args(["--format", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn init_creates_and_skips() {
    let dir = TempDir::new().unwrap();
    quizforge()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizforge.toml"))
        .stdout(predicate::str::contains("Created bank/exam.json"));

    assert!(dir.path().join("quizforge.toml").exists());
    assert!(dir.path().join("bank").join("exam.json").exists());

    quizforge()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, skipping"));

    // The generated profile is picked up from the working directory.
    quizforge()
        .current_dir(dir.path())
        .args(["validate", "--bank", "bank"])
        .assert()
        .success()
        .stdout(predicate::str::contains("profile `demo`"));
}

#[test]
fn take_answers_and_submits() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("attempt.json");

    quizforge()
        .args(["take", "--bank", DEMO_BANK, "--profile", DEMO_PROFILE, "--seed", "3"])
        .arg("--report")
        .arg(&report)
        .write_stdin("A\nn\nB\ns\nw\nr\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1/7"))
        .stdout(predicate::str::contains("2/7"))
        .stdout(predicate::str::contains("Score:"))
        .stdout(predicate::str::contains("Wrong answers ("))
        .stdout(predicate::str::contains("Report saved to"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(saved["submit_kind"], "manual");
    assert_eq!(saved["answers"].as_array().unwrap().len(), 7);
}

#[test]
fn take_without_submitting() {
    quizforge()
        .args(["take", "--bank", DEMO_BANK, "--profile", DEMO_PROFILE])
        .write_stdin("n\np\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exam not submitted."));
}

#[test]
fn take_new_exam_after_submitting() {
    let output = quizforge()
        .args(["take", "--bank", DEMO_BANK, "--profile", DEMO_PROFILE, "--seed", "5"])
        .write_stdin("s\nx\ns\nq\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("Score: ").count(), 2, "{stdout}");
    assert_eq!(stdout.matches("] 1/7 (").count(), 2, "{stdout}");
}
