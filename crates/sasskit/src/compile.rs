/*
 * compile.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The compilation orchestrator.
 */

//! Compilation orchestration.
//!
//! One state machine drives every run: validate the request, resolve
//! the entry point through the import cache, hand the parsed entry to
//! the evaluator (which calls back into the cache for every import it
//! encounters), then assemble the final output.
//!
//! The machine is written once, as the async [`compile_async`]; the
//! synchronous [`compile`] drives the identical future to completion on
//! the calling thread with `pollster::block_on`. For identical inputs
//! and resolver behavior the two modes produce bit-identical results —
//! they differ only in whether resolver calls may suspend.
//!
//! ```rust,ignore
//! use sasskit::{CompilationRequest, StderrLogger, compile};
//!
//! let request = CompilationRequest::from_path("styles/main.scss");
//! let result = compile(&request, &language, &StderrLogger)?;
//! println!("{}", result.css);
//! ```

use std::sync::Arc;

use url::Url;

use crate::cache::{AsyncImportCache, ImportCache};
use crate::deprecation::DeprecationThrottle;
use crate::error::{CompileError, Result};
use crate::importer::{ResolvedImport, ResolverOrigin, ResolverSet};
use crate::language::{DiagnosticSink, EvalContext, StyleLanguage};
use crate::logger::Logger;
use crate::output;
use crate::request::{CompilationRequest, CompileResult, Input};
use crate::syntax::Syntax;

/// Compile a request, building a fresh import cache for the run.
///
/// Synchronous mode: every state transition runs to completion on the
/// calling thread. Produces results identical to [`compile_async`].
pub fn compile<L: StyleLanguage>(
    request: &CompilationRequest,
    language: &L,
    logger: &dyn Logger,
) -> Result<CompileResult> {
    pollster::block_on(compile_async(request, language, logger))
}

/// Compile a request, suspending wherever a resolver needs to.
pub async fn compile_async<L: StyleLanguage>(
    request: &CompilationRequest,
    language: &L,
    logger: &dyn Logger,
) -> Result<CompileResult> {
    let resolvers = ResolverSet::new(
        request.importers.clone(),
        request.load_paths.clone(),
        request.package_config.clone(),
    );
    let cache = AsyncImportCache::new(resolvers);
    compile_with_cache_async(request, language, logger, &cache).await
}

/// Synchronous compile against a caller-retained cache, for amortizing
/// resolution across sequential compiles.
pub fn compile_with_cache<L: StyleLanguage>(
    request: &CompilationRequest,
    language: &L,
    logger: &dyn Logger,
    cache: &ImportCache,
) -> Result<CompileResult> {
    pollster::block_on(compile_with_cache_async(
        request,
        language,
        logger,
        cache.as_async(),
    ))
}

/// The shared state machine behind every compile entry point.
pub async fn compile_with_cache_async<L: StyleLanguage>(
    request: &CompilationRequest,
    language: &L,
    logger: &dyn Logger,
    cache: &AsyncImportCache,
) -> Result<CompileResult> {
    // Start
    request.validate()?;

    // Resolve-Entry: the entry point goes through the same cascade and
    // cache as any other import; failure here is fatal.
    let entry = load_entry(request, cache).await?;
    tracing::debug!(url = %entry.url, "compilation started");

    // Evaluate
    let throttle = DeprecationThrottle::new(request.verbose);
    let sink = DiagnosticSink::new(logger, &throttle, request.quiet_dependencies, cache);
    let ctx = EvalContext::new(cache, sink);
    ctx.record_load(&entry.url);
    let ast = language.parse(&entry.text, entry.syntax, Some(&entry.url))?;
    let tree = language.evaluate(ast, &ctx).await?;

    // Assemble
    let rendered = language.render(&tree, request.style, request.source_map);
    let (css, source_map) =
        output::assemble(rendered.css, request.style, request.charset, rendered.source_map);

    let loaded_urls = ctx.loaded_urls();
    tracing::debug!(url = %entry.url, loaded = loaded_urls.len(), "compilation finished");
    Ok(CompileResult {
        css,
        source_map,
        loaded_urls,
    })
}

async fn load_entry(
    request: &CompilationRequest,
    cache: &AsyncImportCache,
) -> Result<Arc<ResolvedImport>> {
    match &request.input {
        Input::Path(path) => {
            let reference = path.to_str().ok_or_else(|| {
                CompileError::Config(format!(
                    "entry path is not valid UTF-8: {}",
                    path.display()
                ))
            })?;
            cache.resolve(None, reference).await
        }
        Input::Source(text) => {
            let url = request
                .url
                .clone()
                .unwrap_or_else(|| Url::parse("memory:entry").expect("valid synthetic URL"));
            let syntax = request
                .syntax
                .or_else(|| Syntax::from_url(&url))
                .unwrap_or_default();
            Ok(cache.register_entry(ResolvedImport {
                url,
                text: text.clone(),
                syntax,
                origin: ResolverOrigin::EntryRelative,
            }))
        }
    }
}
