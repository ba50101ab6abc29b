//! Error types for the waveform converter.
//!
//! This module provides a unified error type [`VwfError`] that covers
//! all error conditions that can occur during VWF parsing, model building,
//! value formatting and timing configuration. Every error is fatal to the
//! conversion in progress: no partial output is ever produced.

use thiserror::Error;

/// Result type alias using [`VwfError`].
pub type Result<T> = std::result::Result<T, VwfError>;

/// Broad classification of a [`VwfError`] by pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input text
    Parse,
    /// Structurally valid text describing an invalid waveform
    Model,
    /// A formatter rejected a value
    Format,
    /// Invalid timing configuration
    Config,
    /// File I/O failure
    Io,
}

/// Unified error type for all conversion operations.
#[derive(Error, Debug)]
pub enum VwfError {
    // ============ Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}, column {column} near '{token}': {message}")]
    ParseError {
        line: usize,
        column: usize,
        token: String,
        message: String,
    },

    // ============ Model Errors ============
    /// The file has no usable HEADER section
    #[error("Missing HEADER section")]
    MissingHeader,

    /// A section attribute is missing, duplicated, unknown or mistyped
    #[error("Invalid attribute '{key}' in {section} at line {line}: {message}")]
    InvalidAttribute {
        section: String,
        key: String,
        line: usize,
        message: String,
    },

    /// Header values this converter does not accept
    #[error("Unsupported header: {message}")]
    UnsupportedHeader { message: String },

    /// Two SIGNAL or TRANSITION_LIST sections share a name
    #[error("Duplicate {section} for signal '{name}'")]
    DuplicateSignal { section: String, name: String },

    /// A reference to a signal that was never declared
    #[error("Unknown signal '{name}'")]
    UnknownSignal { name: String },

    /// Signal declaration is inconsistent
    #[error("Invalid signal '{name}': {message}")]
    InvalidSignal { name: String, message: String },

    /// The DISPLAY_LINE tree is inconsistent
    #[error("Invalid display tree: {message}")]
    InvalidDisplayTree { message: String },

    /// Radix name is neither built in nor registered
    #[error("Unknown radix '{radix}' for node '{node}'")]
    UnknownRadix { node: String, radix: String },

    /// A LEVEL value that cannot be represented in the node's width
    #[error("Value {value} of node '{node}' at time {time} does not fit in {width} bit(s)")]
    ValueExceedsWidth {
        node: String,
        time: u64,
        value: String,
        width: u32,
    },

    /// A LEVEL value or unknown-bit marker that cannot be interpreted
    #[error("Malformed level '{level}' for node '{node}' at line {line}: {message}")]
    MalformedLevel {
        node: String,
        level: String,
        line: usize,
        message: String,
    },

    /// A LEVEL duration that is negative or finer than the model's time resolution
    #[error("Invalid duration '{duration}' for node '{node}' at line {line}")]
    InvalidDuration {
        node: String,
        duration: String,
        line: usize,
    },

    /// Two transitions at the same time disagree about the value
    #[error("Conflicting transitions for node '{node}' at time {time}")]
    ConflictingTransition { node: String, time: u64 },

    // ============ Formatter Errors ============
    /// A built-in or custom formatter rejected a value
    #[error("Cannot format value of node '{node}' at time {time} as {radix}: {message}")]
    FormatterError {
        node: String,
        time: u64,
        radix: String,
        message: String,
    },

    // ============ Configuration Errors ============
    /// Invalid global timing configuration
    #[error("Invalid timing configuration: {message}")]
    ConfigError { message: String },

    // ============ I/O Errors ============
    /// Error reading the waveform file
    #[error("Failed to read waveform file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing the generated output
    #[error("Failed to write output file '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl VwfError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(
        line: usize,
        column: usize,
        token: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ParseError {
            line,
            column,
            token: token.into(),
            message: message.into(),
        }
    }

    /// Create an invalid attribute error
    pub fn attribute(
        section: impl Into<String>,
        key: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            section: section.into(),
            key: key.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Pipeline stage this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LexerError { .. } | Self::ParseError { .. } => ErrorKind::Parse,
            Self::FormatterError { .. } => ErrorKind::Format,
            Self::ConfigError { .. } => ErrorKind::Config,
            Self::FileReadError { .. } | Self::FileWriteError { .. } => ErrorKind::Io,
            _ => ErrorKind::Model,
        }
    }
}
