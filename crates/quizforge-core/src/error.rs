//! Error types for the exam engine.
//!
//! Validation, tracking, and session errors are returned synchronously;
//! assembly and scoring never fail. `LoadError` is defined here so that
//! every `BankSource` implementation reports fetch failures the same way.

use std::time::Duration;

use thiserror::Error;

use crate::model::Category;
use crate::session::{format_clock, Phase};

/// A question bank was fetched but does not satisfy the exam's requirements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The top-level document is not a JSON object.
    #[error("question bank must be an object keyed by category")]
    NotAnObject,

    /// A required category key is absent.
    #[error("question bank is missing the `{category}` category")]
    MissingCategory { category: Category },

    /// A category key is present but is not a list.
    #[error("`{category}` must be a list of questions")]
    NotASequence { category: Category },

    /// A category holds fewer questions than the profile draws.
    #[error("`{category}` has {found} questions, at least {required} required")]
    TooFewQuestions {
        category: Category,
        found: usize,
        required: usize,
    },

    /// A single question is structurally unusable.
    #[error("`{category}` question #{index}: {reason}")]
    MalformedQuestion {
        category: Category,
        index: usize,
        reason: String,
    },
}

impl ValidationError {
    /// The category the error refers to, if any.
    pub fn category(&self) -> Option<Category> {
        match self {
            ValidationError::NotAnObject => None,
            ValidationError::MissingCategory { category }
            | ValidationError::NotASequence { category }
            | ValidationError::TooFewQuestions { category, .. }
            | ValidationError::MalformedQuestion { category, .. } => Some(*category),
        }
    }
}

/// An answer slot or navigation target outside the exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("question index {index} out of range (exam has {len} questions)")]
pub struct IndexError {
    pub index: usize,
    pub len: usize,
}

/// Manual submission attempted before the minimum time has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("submission opens in {}", format_clock(.remaining))]
pub struct SubmitGateError {
    /// Time left until the gate opens.
    pub remaining: Duration,
}

/// Errors returned by `ExamSession` actions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// No exam has been started yet.
    #[error("no exam has been started")]
    NotStarted,

    /// The action is not valid in the current phase.
    #[error("not allowed while the session is {0}")]
    InvalidPhase(Phase),

    /// The profile and bank produced an exam without questions.
    #[error("the assembled exam has no questions")]
    EmptyExam,

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Gate(#[from] SubmitGateError),
}

/// An exam profile that cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    /// No built-in preset with this name.
    #[error("unknown profile preset: {0} (expected `standard` or `classic`)")]
    UnknownPreset(String),

    /// The profile's values are inconsistent.
    #[error("invalid profile `{name}`: {reason}")]
    Invalid { name: String, reason: String },
}

/// Failures fetching the raw question bank.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The server answered with a non-success status.
    #[error("fetching {url} failed (HTTP {status})")]
    Http { url: String, status: u16 },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),

    /// Reading a local bank file failed.
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// The payload is not parseable JSON.
    #[error("question bank is not valid JSON: {0}")]
    Parse(String),
}

impl LoadError {
    /// Returns `true` if a fresh attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LoadError::Http { status, .. } => *status >= 500 || *status == 429,
            LoadError::Timeout(_) | LoadError::Transport(_) => true,
            LoadError::Io { .. } | LoadError::Parse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_error_reports_remaining_time() {
        let err = SubmitGateError {
            remaining: Duration::from_secs(125),
        };
        assert_eq!(err.to_string(), "submission opens in 02:05");
    }

    #[test]
    fn validation_error_names_category() {
        let err = ValidationError::TooFewQuestions {
            category: Category::MultipleChoice,
            found: 3,
            required: 20,
        };
        assert_eq!(err.category(), Some(Category::MultipleChoice));
        assert_eq!(
            err.to_string(),
            "`multiple_choice` has 3 questions, at least 20 required"
        );
        assert_eq!(ValidationError::NotAnObject.category(), None);
    }

    #[test]
    fn retryable_load_errors() {
        assert!(LoadError::Timeout(30).is_retryable());
        assert!(LoadError::Http {
            url: "x".into(),
            status: 503
        }
        .is_retryable());
        assert!(!LoadError::Http {
            url: "x".into(),
            status: 404
        }
        .is_retryable());
        assert!(!LoadError::Parse("eof".into()).is_retryable());
    }
}
