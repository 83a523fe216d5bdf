//! The `quizforge grade` command.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use quizforge_core::report::read_json;
use quizforge_core::{AnswerSheet, Exam, ExamReport};
use quizforge_report::{generate_html, to_markdown, write_html_report};

use crate::input::normalize_answers;
use crate::render::{format_points, render_score, render_wrong_answers};

pub fn execute(
    exam_path: PathBuf,
    answers_path: PathBuf,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let exam: Exam = read_json(&exam_path).context("failed to load exam")?;
    let answers: AnswerSheet = read_json(&answers_path).context("failed to load answers")?;
    let answers = normalize_answers(&exam, &answers);

    let report = ExamReport::grade(exam, answers);

    if let ("html", Some(path)) = (format.as_str(), &output) {
        write_html_report(&report, path)?;
        print_written(&report, path);
        return Ok(());
    }

    let rendered = match format.as_str() {
        "json" => serde_json::to_string_pretty(&report).context("failed to serialize report")?,
        "markdown" | "md" => to_markdown(&report),
        "html" => generate_html(&report),
        "text" => format!(
            "{}\n\n{}",
            render_score(&report.score),
            render_wrong_answers(&report.wrong_answers)
        ),
        other => bail!("unknown format `{other}` (expected text, json, markdown, or html)"),
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            print_written(&report, &path);
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn print_written(report: &ExamReport, path: &Path) {
    println!(
        "Score {} / {}; report written to {}",
        format_points(report.score.total),
        format_points(report.score.possible),
        path.display()
    );
}
