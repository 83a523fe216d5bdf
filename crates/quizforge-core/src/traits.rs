//! Core trait definitions for question bank sources.
//!
//! Implemented by the `quizforge-loader` crate for HTTP, local files, and
//! in-memory documents.

use async_trait::async_trait;

use crate::error::LoadError;

/// Where a raw question bank document comes from.
#[async_trait]
pub trait BankSource: Send + Sync {
    /// Human-readable location (URL or path) used in logs and errors.
    fn describe(&self) -> String;

    /// Fetch the raw JSON document. Validation is the caller's job.
    async fn fetch(&self) -> Result<serde_json::Value, LoadError>;
}
