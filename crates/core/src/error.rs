use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that abort a document render.
///
/// Anything that can be recovered from (a bad directive, malformed front
/// matter, an unknown code language) is reported through [`Diagnostics`]
/// instead and never reaches this type.
#[derive(Debug, Error)]
pub enum DocError {
    /// Input could not be turned into text at all.
    #[error("Malformed input: {message}")]
    MalformedInput {
        /// Error message
        message: String,
    },
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    Parse {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// The caller cancelled the render; no partial output is produced.
    #[error("Render cancelled before stage '{stage}'")]
    Cancelled {
        /// Stage that was about to start.
        stage: String,
    },
    /// Internal logic error (unexpected state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::string::FromUtf8Error> for DocError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::MalformedInput {
            message: format!("input is not valid UTF-8: {err}"),
        }
    }
}

impl From<std::str::Utf8Error> for DocError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::MalformedInput {
            message: format!("input is not valid UTF-8: {err}"),
        }
    }
}

impl DocError {
    /// Create a cancellation error for the given stage.
    pub fn cancelled(stage: impl Into<String>) -> Self {
        Self::Cancelled {
            stage: stage.into(),
        }
    }

    /// Returns true if this error is a cancellation outcome.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Non-fatal problems that were recovered from during a render.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    /// Front matter could not be used; metadata fell back to an empty mapping.
    Frontmatter {
        /// Warning message
        message: String,
    },
    /// A code block could not be highlighted and was left as plain code.
    Highlight {
        /// Declared language of the block
        lang: String,
        /// Warning message
        message: String,
    },
    /// A math span could not be rendered and was left literal.
    Math {
        /// The TeX source that failed
        source: String,
        /// Warning message
        message: String,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::Frontmatter { message } => write!(f, "front matter ignored: {}", message),
            Warning::Highlight { lang, message } => {
                write!(f, "code block ({}) not highlighted: {}", lang, message)
            }
            Warning::Math { source, message } => {
                write!(f, "math '{}' left literal: {}", source, message)
            }
        }
    }
}

/// Collection of recoverable diagnostics gathered during one render.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Moves every warning from `other` into this collection.
    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get total count of all diagnostics
    pub fn count(&self) -> usize {
        self.warnings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_errors_become_malformed_input() {
        let err = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let doc_err = DocError::from(err);
        assert!(matches!(doc_err, DocError::MalformedInput { .. }));
        assert!(doc_err.to_string().contains("UTF-8"));
    }

    #[test]
    fn cancelled_reports_stage() {
        let err = DocError::cancelled("lower");
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "Render cancelled before stage 'lower'");
    }

    #[test]
    fn diagnostics_collect_warnings() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_warnings());
        diagnostics.add_warning(Warning::Math {
            source: r"\frac{".to_string(),
            message: "unexpected end".to_string(),
        });
        assert_eq!(diagnostics.count(), 1);
    }
}
