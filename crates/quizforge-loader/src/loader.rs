//! Fetch-and-validate with single-flight protection.

use std::sync::atomic::{AtomicBool, Ordering};

use quizforge_core::{validate_bank, BankRequirements, BankSource, QuestionBank};

use crate::error::BankError;

/// Loads a question bank from a source and validates it against the
/// requirements of the exam profile.
pub struct BankLoader {
    source: Box<dyn BankSource>,
    requirements: BankRequirements,
    loading: AtomicBool,
}

/// Clears the in-flight flag even if the load future is dropped midway.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl BankLoader {
    pub fn new(source: Box<dyn BankSource>, requirements: BankRequirements) -> Self {
        Self {
            source,
            requirements,
            loading: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &dyn BankSource {
        self.source.as_ref()
    }

    pub fn requirements(&self) -> &BankRequirements {
        &self.requirements
    }

    /// Whether a load is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Fetch and validate the bank.
    ///
    /// Returns `Ok(None)` without touching the source when another load is
    /// already in flight.
    pub async fn load(&self) -> Result<Option<QuestionBank>, BankError> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(source = %self.source.describe(), "load already in progress");
            return Ok(None);
        }
        let _in_flight = InFlight(&self.loading);

        tracing::info!(source = %self.source.describe(), "loading question bank");
        let document = self.source.fetch().await?;
        let bank = validate_bank(&document, &self.requirements)?;
        tracing::info!(questions = bank.total(), "question bank loaded");
        Ok(Some(bank))
    }
}
