//! Names used to build output file paths.

use std::fmt;

use crate::IoError;

/// Prefix shared by every artifact of one comparison run.
///
/// Restricted to `[a-zA-Z0-9_-]+` so it can never escape the output
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Check `name` against the allowed alphabet.
    ///
    /// # Errors
    ///
    /// [`IoError::InvalidExperimentName`] for an empty name or any other
    /// character.
    pub fn new(name: impl Into<String>) -> Result<Self, IoError> {
        let name = name.into();
        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-');
        if name.is_empty() || !name.chars().all(allowed) {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// The name itself.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `{experiment}_{suffix}`.
    pub(crate) fn file_name(&self, suffix: &str) -> String {
        format!("{}_{suffix}", self.0)
    }
}

impl fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
