/*
 * logger.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Logger seam for user-facing diagnostics.
 */

use crate::language::SourceSpan;

/// Receives warnings, deprecation notices, and debug messages.
///
/// Diagnostics are non-fatal and never abort a compilation run; the
/// orchestrator routes them here after throttling and quiet-dependencies
/// filtering. Implementations must be callable from either execution
/// mode, so they should not block on their own async work.
pub trait Logger: Send + Sync {
    /// A warning or deprecation notice, optionally with a source span.
    fn warn(&self, message: &str, span: Option<&SourceSpan>);

    /// A `@debug` message from a stylesheet.
    fn debug(&self, message: &str, span: Option<&SourceSpan>);
}

/// Default logger: writes to the error stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrLogger;

impl Logger for StderrLogger {
    fn warn(&self, message: &str, span: Option<&SourceSpan>) {
        match span {
            Some(span) => eprintln!("Warning: {message}\n    {span}"),
            None => eprintln!("Warning: {message}"),
        }
    }

    fn debug(&self, message: &str, span: Option<&SourceSpan>) {
        match span {
            Some(span) => eprintln!("{span}: Debug: {message}"),
            None => eprintln!("Debug: {message}"),
        }
    }
}
