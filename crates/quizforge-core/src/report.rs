//! Result reports with JSON persistence.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::answers::AnswerSheet;
use crate::model::Exam;
use crate::review::{wrong_answers, WrongAnswer};
use crate::scoring::{score, ScoreBreakdown};
use crate::session::SubmitKind;

/// A graded attempt: the exam, the answers given, and the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub exam: Exam,
    pub answers: AnswerSheet,
    pub score: ScoreBreakdown,
    pub wrong_answers: Vec<WrongAnswer>,
    /// How the attempt was submitted; absent for offline grading.
    #[serde(default)]
    pub submit_kind: Option<SubmitKind>,
    /// Time spent on the attempt in seconds; absent for offline grading.
    #[serde(default)]
    pub elapsed_secs: Option<u64>,
}

impl ExamReport {
    /// Build a report for an attempt submitted through a session.
    pub fn new(
        exam: Exam,
        answers: AnswerSheet,
        score: ScoreBreakdown,
        wrong_answers: Vec<WrongAnswer>,
        submit_kind: SubmitKind,
        elapsed: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            exam,
            answers,
            score,
            wrong_answers,
            submit_kind: Some(submit_kind),
            elapsed_secs: Some(elapsed.as_secs()),
        }
    }

    /// Grade `answers` against `exam` outside of a session.
    pub fn grade(exam: Exam, answers: AnswerSheet) -> Self {
        if answers.len() != exam.len() {
            tracing::warn!(
                "answer sheet has {} entries for {} questions",
                answers.len(),
                exam.len()
            );
        }
        let score = score(&exam, &answers);
        let wrong_answers = wrong_answers(&exam, &answers);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            exam,
            answers,
            score,
            wrong_answers,
            submit_kind: None,
            elapsed_secs: None,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        write_json(self, path).context("failed to save report")
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        read_json(path).context("failed to load report")
    }
}

/// Write any serializable value as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize JSON")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Read a JSON file into `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}
