//! Error types for the TPL placement core.
//!
//! This module provides a unified error type [`PlacerError`] that covers
//! all error conditions that can occur while reading benchmark records,
//! loading the circuit database, and assembling or solving the net force
//! systems.

use thiserror::Error;

use crate::circuit::Axis;

/// Result type alias using [`PlacerError`].
pub type Result<T> = std::result::Result<T, PlacerError>;

/// Broad classification of a [`PlacerError`].
///
/// Numerical failures call for a different remedy (anchor more modules,
/// adjust weights) than data-integrity failures (fix the input), so callers
/// can branch on this instead of matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed benchmark text
    Parse,
    /// Records or lookups that do not describe a consistent circuit
    DataIntegrity,
    /// Caller passed arguments of the wrong shape
    Precondition,
    /// The linear system could not be solved
    Numerical,
    /// Invalid configuration
    Config,
    /// File system errors
    Io,
}

/// Unified error type for all placement operations.
#[derive(Error, Debug)]
pub enum PlacerError {
    // ============ Bookshelf Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    // ============ Data Integrity Errors ============
    /// Module identifier not present in the database
    #[error("Module '{module}' not found in circuit")]
    UnknownModule { module: String },

    /// Net identifier not present in the database
    #[error("Net '{net}' not found in circuit")]
    UnknownNet { net: String },

    /// Duplicate module identifier in the geometry records
    #[error("Duplicate module name '{module}'")]
    DuplicateModule { module: String },

    /// Duplicate net identifier in the net records
    #[error("Duplicate net name '{net}'")]
    DuplicateNet { net: String },

    /// Module with unusable geometry
    #[error("Invalid module '{module}': {message}")]
    InvalidModule { module: String, message: String },

    /// Declared net degree differs from the number of pins listed
    #[error("Net '{net}' declares degree {declared} but lists {actual} pins")]
    DegreeMismatch {
        net: String,
        declared: usize,
        actual: usize,
    },

    /// Geometry and placement record collections differ in length
    #[error("Found {nodes} geometry records but {placements} placement records")]
    RecordCountMismatch { nodes: usize, placements: usize },

    /// The i-th geometry and placement records name different modules
    #[error("Record {index}: geometry names '{node}' but placement names '{placement}'")]
    RecordIdMismatch {
        index: usize,
        node: String,
        placement: String,
    },

    /// Index-based access past the end of a collection
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    // ============ Precondition Errors ============
    /// Vector or matrix sized differently from the free-module count
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    // ============ Numerical Errors ============
    /// Free module with no net path to any fixed module
    #[error("Floating module '{module}' detected - no net path to a fixed module ({count} floating in total)")]
    FloatingModule { module: String, count: usize },

    /// A free module has no net force acting on it along an axis
    #[error("Free module '{module}' has no net weight along {axis} - its target is indeterminate")]
    UnconstrainedModule { module: String, axis: Axis },

    /// Cholesky factorization failed
    #[error("Net force matrix along {axis} is not positive definite - a group of free modules may have no path to a fixed module")]
    SingularMatrix { axis: Axis },

    /// The solve produced NaN or infinite coordinates
    #[error("Solving the net force system along {axis} produced non-finite coordinates")]
    NonFiniteSolution { axis: Axis },

    // ============ Configuration Errors ============
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    // ============ I/O Errors ============
    /// Error reading a benchmark or configuration file
    #[error("Failed to read file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a placement snapshot
    #[error("Failed to write file '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl PlacerError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an unknown module error
    pub fn unknown_module(module: impl Into<String>) -> Self {
        Self::UnknownModule {
            module: module.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::LexerError { .. } | Self::ParseError { .. } => ErrorCategory::Parse,
            Self::UnknownModule { .. }
            | Self::UnknownNet { .. }
            | Self::DuplicateModule { .. }
            | Self::DuplicateNet { .. }
            | Self::InvalidModule { .. }
            | Self::DegreeMismatch { .. }
            | Self::RecordCountMismatch { .. }
            | Self::RecordIdMismatch { .. }
            | Self::IndexOutOfRange { .. } => ErrorCategory::DataIntegrity,
            Self::DimensionMismatch { .. } => ErrorCategory::Precondition,
            Self::FloatingModule { .. }
            | Self::UnconstrainedModule { .. }
            | Self::SingularMatrix { .. }
            | Self::NonFiniteSolution { .. } => ErrorCategory::Numerical,
            Self::ConfigError { .. } => ErrorCategory::Config,
            Self::FileReadError { .. } | Self::FileWriteError { .. } => ErrorCategory::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numerical_errors_are_distinct_from_data_errors() {
        let singular = PlacerError::SingularMatrix { axis: Axis::X };
        let unknown = PlacerError::unknown_module("a0");
        assert_eq!(singular.category(), ErrorCategory::Numerical);
        assert_eq!(unknown.category(), ErrorCategory::DataIntegrity);
    }

    #[test]
    fn test_error_messages() {
        let err = PlacerError::DegreeMismatch {
            net: "n7".to_string(),
            declared: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Net 'n7' declares degree 3 but lists 2 pins");

        let err = PlacerError::UnconstrainedModule {
            module: "o12".to_string(),
            axis: Axis::Y,
        };
        assert!(err.to_string().contains("'o12'"));
        assert!(err.to_string().contains("y"));
    }
}
