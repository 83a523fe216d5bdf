//! In-memory bank source.

use async_trait::async_trait;
use serde_json::Value;

use quizforge_core::{BankSource, LoadError};

/// Serves a document held in memory, e.g. one embedded in the binary.
pub struct StaticBankSource {
    name: String,
    document: Value,
}

impl StaticBankSource {
    pub fn new(name: impl Into<String>, document: Value) -> Self {
        Self {
            name: name.into(),
            document,
        }
    }
}

#[async_trait]
impl BankSource for StaticBankSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    async fn fetch(&self) -> Result<Value, LoadError> {
        Ok(self.document.clone())
    }
}
