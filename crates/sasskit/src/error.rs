//! Error types for sasskit
//!
//! Copyright (c) 2025 Posit, PBC

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::language::SourceSpan;

/// Errors that can abort a compilation run.
///
/// All variants are fatal: the orchestrator never retries resolution or
/// evaluation after one of these is produced. Import errors carry the
/// requesting context and reference string; parse and evaluation errors
/// carry a source span, so callers have enough to format a user-facing
/// message.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The resolution cascade was exhausted without an answer.
    #[error("Can't find stylesheet to import: {reference}{}", .context.as_ref().map(|c| format!(" (imported from {c})")).unwrap_or_default())]
    ImportNotFound {
        reference: String,
        context: Option<Url>,
    },

    /// A resolver found multiple equally-valid candidate files.
    #[error("It's not clear which file to import for {reference}. Found:{}", .candidates.iter().map(|c| format!("\n  {}", c.display())).collect::<String>())]
    ImportAmbiguous {
        reference: String,
        candidates: Vec<PathBuf>,
    },

    /// The external parser rejected a stylesheet.
    #[error("Syntax error: {message} at {span}")]
    Syntax { message: String, span: SourceSpan },

    /// The external evaluator failed.
    #[error("Error: {message} at {span}")]
    Evaluation { message: String, span: SourceSpan },

    /// Contradictory or invalid request configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failed to read a resolved stylesheet.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CompileError>;
