use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

/// A recoverable problem found while parsing, located at file and line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub file: Option<String>,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.file {
            Some(file) => write!(f, "{level}: {} in {file}:{}", self.message, self.line),
            None => write!(f, "{level}: {} on line {}", self.message, self.line),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("Source not found: {0}")]
    NotFound(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Source {0} is not valid UTF-8")]
    InvalidUtf8(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Origin(#[from] OriginError),
}

/// Failure of a directive handler. The dispatcher reports it and carries on.
#[derive(Debug, thiserror::Error)]
pub enum DirectiveError {
    #[error("{directive} directive requires data")]
    MissingData { directive: String },
    #[error("{directive} directive requires content")]
    MissingContent { directive: String },
    #[error("{directive} directive requires a |variable| binding")]
    MissingVariable { directive: String },
    #[error("invalid value {value:?} for option {option}")]
    InvalidOption { option: String, value: String },
    #[error("include directive is disabled")]
    IncludeDisabled,
    #[error("include cycle detected: {0}")]
    IncludeCycle(String),
    #[error("include depth limit of {0} reached")]
    IncludeTooDeep(usize),
    #[error("include of {path} is outside {root}")]
    IncludeOutsideRoot { path: String, root: String },
    #[error("unable to include {path}: {source}")]
    IncludeUnreadable {
        path: String,
        #[source]
        source: OriginError,
    },
}

impl DirectiveError {
    /// An unreadable include contributes nothing; every other failure leaves
    /// an error node carrying the directive source.
    #[must_use]
    pub fn leaves_placeholder(&self) -> bool {
        !matches!(self, DirectiveError::IncludeUnreadable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_includes_location() {
        let diag = Diagnostic {
            severity: Severity::Error,
            file: Some("guide/index.rst".into()),
            line: 12,
            message: "Unknown directive: \"foo\"".into(),
        };
        assert_eq!(
            diag.to_string(),
            "error: Unknown directive: \"foo\" in guide/index.rst:12"
        );
    }

    #[test]
    fn only_unreadable_includes_leave_no_placeholder() {
        assert!(DirectiveError::IncludeCycle("a -> a".into()).leaves_placeholder());
        assert!(DirectiveError::IncludeTooDeep(10).leaves_placeholder());
        assert!(DirectiveError::IncludeDisabled.leaves_placeholder());
        assert!(
            !DirectiveError::IncludeUnreadable {
                path: "gone.rst".into(),
                source: OriginError::NotFound("gone.rst".into()),
            }
            .leaves_placeholder()
        );
    }
}
