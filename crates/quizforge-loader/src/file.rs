//! Question banks read from the local filesystem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use quizforge_core::{BankSource, LoadError};

use crate::BANK_FILE_NAME;

/// Reads a bank document from disk. A directory path resolves to the
/// `exam.json` inside it.
pub struct FileBankSource {
    path: PathBuf,
}

impl FileBankSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BankSource for FileBankSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Value, LoadError> {
        let path = if self.path.is_dir() {
            self.path.join(BANK_FILE_NAME)
        } else {
            self.path.clone()
        };

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LoadError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        serde_json::from_str(&content).map_err(|e| LoadError::Parse(e.to_string()))
    }
}
