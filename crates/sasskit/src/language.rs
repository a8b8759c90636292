/*
 * language.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Seam to the external parser, evaluator, and serializer.
 */

//! Language collaborator interfaces.
//!
//! The orchestration layer does not define Sass grammar or evaluation
//! semantics. It drives an implementation of [`StyleLanguage`] through
//! the compilation state machine, handing the evaluator an
//! [`EvalContext`] so import statements route through the per-run
//! import cache and diagnostics route through the deprecation throttle.

use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use crate::cache::AsyncImportCache;
use crate::deprecation::{Deprecation, DeprecationThrottle};
use crate::error::Result;
use crate::importer::ResolvedImport;
use crate::logger::Logger;
use crate::request::OutputStyle;
use crate::syntax::Syntax;
use sasskit_source_map::SourceMapBuilder;

/// A position in a stylesheet, carried by errors and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    /// Canonical URL of the stylesheet, if known.
    pub url: Option<Url>,
    /// Zero-based line.
    pub line: usize,
    /// Zero-based column.
    pub column: usize,
}

impl SourceSpan {
    pub fn new(url: Option<Url>, line: usize, column: usize) -> Self {
        Self { url, line, column }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.url {
            Some(url) => write!(f, "{url} {}:{}", self.line + 1, self.column + 1),
            None => write!(f, "{}:{}", self.line + 1, self.column + 1),
        }
    }
}

/// Output of the external serializer: CSS text plus the source-map
/// builder it populated while emitting, when one was requested.
#[derive(Debug)]
pub struct Rendered {
    pub css: String,
    pub source_map: Option<SourceMapBuilder>,
}

/// Routes evaluator diagnostics through quiet-dependencies filtering
/// and the deprecation throttle before they reach the logger.
pub struct DiagnosticSink<'a> {
    logger: &'a dyn Logger,
    throttle: &'a DeprecationThrottle,
    quiet_dependencies: bool,
    imports: &'a AsyncImportCache,
}

impl<'a> DiagnosticSink<'a> {
    pub(crate) fn new(
        logger: &'a dyn Logger,
        throttle: &'a DeprecationThrottle,
        quiet_dependencies: bool,
        imports: &'a AsyncImportCache,
    ) -> Self {
        Self {
            logger,
            throttle,
            quiet_dependencies,
            imports,
        }
    }

    /// Report a deprecation warning, counted per kind across the run.
    pub fn deprecation(&self, kind: Deprecation, message: &str, span: Option<&SourceSpan>) {
        if self.suppressed(span) {
            return;
        }
        self.throttle.report(kind, message, span, self.logger);
    }

    /// Report an ordinary `@warn`-style warning.
    pub fn warn(&self, message: &str, span: Option<&SourceSpan>) {
        if self.suppressed(span) {
            return;
        }
        self.logger.warn(message, span);
    }

    /// Forward a `@debug` message. Never suppressed.
    pub fn debug(&self, message: &str, span: Option<&SourceSpan>) {
        self.logger.debug(message, span);
    }

    /// Quiet-dependencies: drop warnings whose origin is a stylesheet
    /// loaded through a secondary resolver rather than the entry point.
    fn suppressed(&self, span: Option<&SourceSpan>) -> bool {
        if !self.quiet_dependencies {
            return false;
        }
        span.and_then(|s| s.url.as_ref())
            .is_some_and(|url| self.imports.is_dependency(url))
    }
}

/// Everything the external evaluator needs from the orchestrator.
pub struct EvalContext<'a> {
    imports: &'a AsyncImportCache,
    diagnostics: DiagnosticSink<'a>,
    /// URLs loaded by this run, in load order. Kept separate from the
    /// cache's own bookkeeping so a cache retained across sequential
    /// compiles does not leak earlier runs' loads into this result.
    loaded: Mutex<Vec<Url>>,
}

impl<'a> EvalContext<'a> {
    pub(crate) fn new(imports: &'a AsyncImportCache, diagnostics: DiagnosticSink<'a>) -> Self {
        Self {
            imports,
            diagnostics,
            loaded: Mutex::new(Vec::new()),
        }
    }

    /// Resolve an import encountered during evaluation. Follows the
    /// cascade and caching contracts; may suspend in asynchronous mode.
    pub async fn import(
        &self,
        context: Option<&Url>,
        reference: &str,
    ) -> Result<Arc<ResolvedImport>> {
        let resolved = self.imports.resolve(context, reference).await?;
        self.record_load(&resolved.url);
        Ok(resolved)
    }

    pub fn diagnostics(&self) -> &DiagnosticSink<'a> {
        &self.diagnostics
    }

    pub(crate) fn record_load(&self, url: &Url) {
        let mut loaded = self.loaded.lock().expect("loaded urls poisoned");
        if !loaded.iter().any(|loaded_url| loaded_url == url) {
            loaded.push(url.clone());
        }
    }

    /// URLs loaded by this run so far, in load order.
    pub(crate) fn loaded_urls(&self) -> Vec<Url> {
        self.loaded.lock().expect("loaded urls poisoned").clone()
    }
}

/// The external parser, evaluator, and serializer as one collaborator.
///
/// `parse` and `render` are pure with respect to the orchestrator;
/// `evaluate` may call back into the import cache arbitrarily many
/// times and may suspend at those calls in asynchronous mode.
#[async_trait]
pub trait StyleLanguage: Send + Sync {
    /// Parsed form of one stylesheet.
    type Ast: Send;
    /// Result of evaluating the entry stylesheet.
    type Tree: Send;

    /// Parse stylesheet text. Fails with a syntax error carrying a
    /// source location.
    fn parse(&self, text: &str, syntax: Syntax, url: Option<&Url>) -> Result<Self::Ast>;

    /// Evaluate a parsed stylesheet, resolving imports through
    /// `ctx.import` and reporting diagnostics through
    /// `ctx.diagnostics()`.
    async fn evaluate(&self, ast: Self::Ast, ctx: &EvalContext<'_>) -> Result<Self::Tree>;

    /// Render the evaluated tree to CSS text, populating a source-map
    /// builder when `source_map` is set.
    fn render(&self, tree: &Self::Tree, style: OutputStyle, source_map: bool) -> Rendered;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_span_display() {
        let span = SourceSpan::new(
            Some(Url::parse("file:///a/main.scss").unwrap()),
            2,
            4,
        );
        assert_eq!(span.to_string(), "file:///a/main.scss 3:5");

        let span = SourceSpan::new(None, 0, 0);
        assert_eq!(span.to_string(), "1:1");
    }
}
