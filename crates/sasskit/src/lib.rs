//! Sass compilation orchestration.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This crate provides the coordination layer around an external Sass
//! parser/evaluator/serializer (the [`StyleLanguage`] seam):
//! - An ordered, pluggable import resolution cascade ([`ResolverSet`])
//! - A memoizing import cache shared by every import site in a run
//! - Deprecation warning throttling and quiet-dependencies filtering
//! - Synchronous and asynchronous compilation entry points that produce
//!   bit-identical results
//! - Final output assembly (charset/BOM policy, source-map packaging)

mod cache;
mod compile;
mod deprecation;
mod error;
mod importer;
mod language;
mod logger;
mod output;
mod request;
mod syntax;
#[cfg(test)]
mod test_support;

pub use cache::{AsyncImportCache, ImportCache};
pub use compile::{compile, compile_async, compile_with_cache, compile_with_cache_async};
pub use deprecation::{Deprecation, DeprecationThrottle};
pub use error::{CompileError, Result};
pub use importer::{
    Importer, ImporterResult, PackageConfig, ResolvedImport, Resolver, ResolverOrigin,
    ResolverSet, SASS_PATH_VAR,
};
pub use language::{DiagnosticSink, EvalContext, Rendered, SourceSpan, StyleLanguage};
pub use logger::{Logger, StderrLogger};
pub use output::assemble;
pub use request::{CompilationRequest, CompileResult, Input, OutputStyle};
pub use syntax::Syntax;
