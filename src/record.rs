use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Numeric job posting id as returned by the search API.
pub type CandidateId = i64;

/// Structured fields pulled from one job ad detail page.
///
/// Scalar fields are `None` when the page had nothing at the expected
/// position; they serialize as `null` so a reload yields the same record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: Option<String>,
    pub code: Option<String>,
    pub entry_type: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeDerivationError {
    #[error("job record has no code")]
    Missing,
    #[error("job code {0:?} contains no digits")]
    NoDigits(String),
}

impl JobRecord {
    /// File stem for this record's rendered document.
    pub fn derived_code(&self) -> Result<String, CodeDerivationError> {
        let code = self.code.as_deref().ok_or(CodeDerivationError::Missing)?;
        derive_code(code)
    }

    /// Short label for log lines.
    pub fn label(&self) -> &str {
        self.code
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("<unknown>")
    }
}

/// First digit run of `code` with leading zeros stripped.
///
/// A run made only of zeros maps to `"0"`.
pub fn derive_code(code: &str) -> Result<String, CodeDerivationError> {
    let digits = DIGITS_RE
        .find(code)
        .ok_or_else(|| CodeDerivationError::NoDigits(code.to_string()))?
        .as_str();

    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() {
        Ok("0".to_string())
    } else {
        Ok(stripped.to_string())
    }
}
