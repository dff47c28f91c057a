//! Error types and handling for document rewriting

use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for rewrite operations
///
/// All rewrite errors are document-scoped and fatal for that document: the
/// engine never emits partial output. Validation errors carry the offending
/// tag's original source text and byte span so callers can render a precise
/// code frame.
#[derive(Debug, Error)]
pub enum OrigamiError {
    /// The host document failed to parse
    #[error("parse error: {message}")]
    Parse { message: String, span: Range<usize> },

    /// A reserved form is missing a required attribute
    #[error("missing `{attribute}` attribute in `{tag}`")]
    MissingAttribute {
        attribute: String,
        tag: String,
        span: Range<usize>,
    },

    /// A required attribute has the wrong value kind
    #[error("`{attribute}` must be {expected} in `{tag}`")]
    WrongAttributeKind {
        attribute: String,
        expected: &'static str,
        tag: String,
        span: Range<usize>,
    },

    /// A reserved form carries an attribute it does not admit
    #[error("unexpected `{attribute}` attribute in `{tag}`")]
    UnexpectedAttribute {
        attribute: String,
        tag: String,
        span: Range<usize>,
    },

    /// An `$else`/`$else-if` with no `$if` leading its sibling run
    #[error("`{tag}` has no matching `$if` in its sibling run")]
    MalformedChain { tag: String, span: Range<usize> },

    /// Configuration loading or validation errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// File system I/O errors
    #[error("io error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Overlapping or misplaced edits registered against one run. Always a
    /// bug in the engine, never a property of the input document.
    #[error("edit conflict: {message}")]
    EditConflict { message: String },

    /// Generic internal errors
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Validation,
    Chain,
    Config,
    Io,
    Internal,
}

impl OrigamiError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrigamiError::Parse { .. } => ErrorKind::Parse,
            OrigamiError::MissingAttribute { .. }
            | OrigamiError::WrongAttributeKind { .. }
            | OrigamiError::UnexpectedAttribute { .. } => ErrorKind::Validation,
            OrigamiError::MalformedChain { .. } => ErrorKind::Chain,
            OrigamiError::Config { .. } => ErrorKind::Config,
            OrigamiError::Io { .. } => ErrorKind::Io,
            OrigamiError::EditConflict { .. } | OrigamiError::Internal { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Byte span of the offending source region, when the error has one
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            OrigamiError::Parse { span, .. }
            | OrigamiError::MissingAttribute { span, .. }
            | OrigamiError::WrongAttributeKind { span, .. }
            | OrigamiError::UnexpectedAttribute { span, .. }
            | OrigamiError::MalformedChain { span, .. } => Some(span.clone()),
            _ => None,
        }
    }

    /// Whether processing other documents may continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Parse | ErrorKind::Validation | ErrorKind::Chain
        )
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>, span: Range<usize>) -> Self {
        Self::Parse {
            message: message.into(),
            span,
        }
    }

    /// Create a missing-attribute error
    pub fn missing_attribute(
        attribute: impl Into<String>,
        tag: impl Into<String>,
        span: Range<usize>,
    ) -> Self {
        Self::MissingAttribute {
            attribute: attribute.into(),
            tag: tag.into(),
            span,
        }
    }

    /// Create a wrong-attribute-kind error
    pub fn wrong_attribute_kind(
        attribute: impl Into<String>,
        expected: &'static str,
        tag: impl Into<String>,
        span: Range<usize>,
    ) -> Self {
        Self::WrongAttributeKind {
            attribute: attribute.into(),
            expected,
            tag: tag.into(),
            span,
        }
    }

    /// Create an unexpected-attribute error
    pub fn unexpected_attribute(
        attribute: impl Into<String>,
        tag: impl Into<String>,
        span: Range<usize>,
    ) -> Self {
        Self::UnexpectedAttribute {
            attribute: attribute.into(),
            tag: tag.into(),
            span,
        }
    }

    /// Create a malformed-chain error
    pub fn malformed_chain(tag: impl Into<String>, span: Range<usize>) -> Self {
        Self::MalformedChain {
            tag: tag.into(),
            span,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an edit-conflict error
    pub fn edit_conflict(message: impl Into<String>) -> Self {
        Self::EditConflict {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for OrigamiError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}
