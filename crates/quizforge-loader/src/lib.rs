//! quizforge-loader: Question bank sources.
//!
//! Implements the `BankSource` trait for HTTP endpoints, local files, and
//! in-memory documents, and wraps a source in a `BankLoader` that validates
//! what it fetches and refuses to start a second load while one is running.

pub mod error;
pub mod file;
pub mod http;
pub mod loader;
pub mod memory;

use quizforge_core::{BankSource, LoadError};

pub use error::BankError;
pub use file::FileBankSource;
pub use http::HttpBankSource;
pub use loader::BankLoader;
pub use memory::StaticBankSource;

/// Name of the bank document, relative to a base URL or directory.
pub const BANK_FILE_NAME: &str = "exam.json";

/// Pick a source for `location`: `http://` and `https://` locations are
/// fetched over HTTP, anything else is read from disk.
pub fn open_source(location: &str) -> Result<Box<dyn BankSource>, LoadError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpBankSource::new(location)?))
    } else {
        Ok(Box::new(FileBankSource::new(location)))
    }
}
