/*
 * importer.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The import resolution cascade: a fixed-order set of resolver variants
 * tried until one produces an answer.
 */

//! Import resolution.
//!
//! A [`ResolverSet`] holds the configured [`Resolver`] variants in their
//! fixed priority order:
//!
//! 1. Relative to the requesting stylesheet (or the given entry path)
//! 2. Each explicitly supplied [`Importer`], in the order supplied
//! 3. Each configured load path, in order
//! 4. Each directory named in `SASS_PATH`, in listed order
//! 5. Package-manifest resolution for `package:` references
//!
//! The first resolver to produce a non-declining answer wins. Ambiguity
//! (two candidate files matching one reference) is a terminal error for
//! the whole attempt, never a cascade miss. Resolvers are deliberately a
//! closed enum dispatched by one ordered loop, so the priority order is
//! explicit and cannot be extended by subclassing.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::error::{CompileError, Result};
use crate::syntax::Syntax;

/// Environment variable naming extra search directories, split on the
/// platform path separator (`;` on Windows, `:` elsewhere).
pub const SASS_PATH_VAR: &str = "SASS_PATH";

/// A stylesheet produced by an [`Importer`].
#[derive(Debug, Clone)]
pub struct ImporterResult {
    /// Canonical URL of the resolved stylesheet.
    pub url: Url,
    /// Raw stylesheet text.
    pub text: String,
    /// How the text should be parsed.
    pub syntax: Syntax,
}

/// A pluggable resolution strategy supplied by the caller.
///
/// Explicit importers sit at step 2 of the cascade and may suspend
/// (network access, asynchronous filesystems). Returning `Ok(None)`
/// declines the reference and lets the cascade continue; returning an
/// error (for example an ambiguity) terminates the whole attempt.
#[async_trait]
pub trait Importer: fmt::Debug + Send + Sync {
    /// Attempt to resolve `reference` as seen from `context`.
    ///
    /// `context` is the canonical URL of the importing stylesheet, or
    /// `None` when resolving the entry point.
    async fn resolve(
        &self,
        context: Option<&Url>,
        reference: &str,
    ) -> Result<Option<ImporterResult>>;
}

/// Maps package names to their filesystem roots for `package:` URLs.
#[derive(Debug, Clone, Default)]
pub struct PackageConfig {
    roots: HashMap<String, PathBuf>,
}

impl PackageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package root. `package:<name>/<path>` references
    /// resolve against `<root>/<path>`.
    pub fn with_package(mut self, name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.roots.insert(name.into(), root.into());
        self
    }

    /// Look up the root directory for a package name.
    pub fn root(&self, name: &str) -> Option<&Path> {
        self.roots.get(name).map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Package roots must be absolute so resolved canonical URLs do not
    /// depend on the working directory.
    pub(crate) fn validate(&self) -> Result<()> {
        for (name, root) in &self.roots {
            if !root.is_absolute() {
                return Err(CompileError::Config(format!(
                    "package root for '{name}' must be an absolute path: {}",
                    root.display()
                )));
            }
        }
        Ok(())
    }
}

/// Which cascade step produced a resolution.
///
/// Recorded per canonical URL so quiet-dependencies filtering can tell
/// entry-point stylesheets apart from dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverOrigin {
    EntryRelative,
    Explicit,
    SearchPath,
    EnvSearchPath,
    PackageManifest,
}

/// A fully resolved stylesheet, as stored in the import cache.
#[derive(Debug, Clone)]
pub struct ResolvedImport {
    pub url: Url,
    pub text: String,
    pub syntax: Syntax,
    pub origin: ResolverOrigin,
}

impl ResolvedImport {
    fn from_importer(result: ImporterResult, origin: ResolverOrigin) -> Self {
        Self {
            url: result.url,
            text: result.text,
            syntax: result.syntax,
            origin,
        }
    }
}

/// One resolution strategy in the cascade.
///
/// The set of strategies is closed on purpose: ordering lives in
/// [`ResolverSet::resolve`]'s single iteration, not in a type hierarchy.
#[derive(Debug)]
pub enum Resolver {
    /// Resolve relative to the requesting stylesheet, or relative to the
    /// given path for the entry point.
    EntryRelative,
    /// Caller-supplied importers, tried in the order supplied.
    Explicit(Vec<Arc<dyn Importer>>),
    /// Configured load-path directories, tried in order.
    SearchPath(Vec<PathBuf>),
    /// Directories from the `SASS_PATH` environment variable.
    EnvSearchPath(Vec<PathBuf>),
    /// `package:` resolution against a package configuration.
    PackageManifest(PackageConfig),
}

/// The ordered resolution cascade for one compilation run.
#[derive(Debug)]
pub struct ResolverSet {
    resolvers: Vec<Resolver>,
}

impl ResolverSet {
    /// Build the cascade in its canonical order from request
    /// configuration. The `SASS_PATH` snapshot is taken here, once.
    pub fn new(
        importers: Vec<Arc<dyn Importer>>,
        load_paths: Vec<PathBuf>,
        package_config: Option<PackageConfig>,
    ) -> Self {
        let mut resolvers = vec![Resolver::EntryRelative];
        if !importers.is_empty() {
            resolvers.push(Resolver::Explicit(importers));
        }
        if !load_paths.is_empty() {
            resolvers.push(Resolver::SearchPath(load_paths));
        }
        let env_paths = env_search_paths();
        if !env_paths.is_empty() {
            resolvers.push(Resolver::EnvSearchPath(env_paths));
        }
        if let Some(config) = package_config {
            resolvers.push(Resolver::PackageManifest(config));
        }
        Self { resolvers }
    }

    /// Build a cascade from explicit resolver variants, preserving their
    /// order. Used by tests and by callers that need full control.
    pub fn from_resolvers(resolvers: Vec<Resolver>) -> Self {
        Self { resolvers }
    }

    /// Try each resolver in order and return the first answer.
    ///
    /// `Ok(None)` means the cascade was exhausted; the import cache
    /// turns that into an Import-Not-Found error. Ambiguity and I/O
    /// errors from any step propagate immediately without falling
    /// through to later resolvers.
    pub async fn resolve(
        &self,
        context: Option<&Url>,
        reference: &str,
    ) -> Result<Option<ResolvedImport>> {
        for resolver in &self.resolvers {
            let answer = match resolver {
                Resolver::EntryRelative => resolve_relative(context, reference)?,
                Resolver::Explicit(importers) => {
                    let mut found = None;
                    for importer in importers {
                        if let Some(result) = importer.resolve(context, reference).await? {
                            found =
                                Some(ResolvedImport::from_importer(result, ResolverOrigin::Explicit));
                            break;
                        }
                    }
                    found
                }
                Resolver::SearchPath(dirs) => {
                    resolve_in_dirs(dirs, reference, ResolverOrigin::SearchPath)?
                }
                Resolver::EnvSearchPath(dirs) => {
                    resolve_in_dirs(dirs, reference, ResolverOrigin::EnvSearchPath)?
                }
                Resolver::PackageManifest(config) => resolve_package(config, reference)?,
            };
            if let Some(resolved) = answer {
                tracing::debug!(
                    reference,
                    url = %resolved.url,
                    origin = ?resolved.origin,
                    "import resolved"
                );
                return Ok(Some(resolved));
            }
        }
        tracing::debug!(reference, "import cascade exhausted");
        Ok(None)
    }
}

/// Split a `SASS_PATH`-style value into directories.
pub(crate) fn split_search_path(raw: &str) -> Vec<PathBuf> {
    let separator = if cfg!(windows) { ';' } else { ':' };
    raw.split(separator)
        .filter(|part| !part.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn env_search_paths() -> Vec<PathBuf> {
    match std::env::var(SASS_PATH_VAR) {
        Ok(raw) => split_search_path(&raw),
        Err(_) => Vec::new(),
    }
}

fn resolve_relative(context: Option<&Url>, reference: &str) -> Result<Option<ResolvedImport>> {
    if reference.starts_with("package:") {
        return Ok(None);
    }
    let candidate = match context {
        // Entry point: the reference is itself a filesystem path.
        None => PathBuf::from(reference),
        Some(url) if url.scheme() == "file" => {
            let base = url.to_file_path().map_err(|_| {
                CompileError::Config(format!("invalid file URL in import context: {url}"))
            })?;
            match base.parent() {
                Some(dir) => dir.join(reference),
                None => PathBuf::from(reference),
            }
        }
        // In-memory or custom-scheme context: nothing to be relative to.
        Some(_) => return Ok(None),
    };
    load_file(&candidate, reference, ResolverOrigin::EntryRelative)
}

fn resolve_in_dirs(
    dirs: &[PathBuf],
    reference: &str,
    origin: ResolverOrigin,
) -> Result<Option<ResolvedImport>> {
    if reference.starts_with("package:") {
        return Ok(None);
    }
    for dir in dirs {
        if let Some(resolved) = load_file(&dir.join(reference), reference, origin)? {
            return Ok(Some(resolved));
        }
    }
    Ok(None)
}

fn resolve_package(config: &PackageConfig, reference: &str) -> Result<Option<ResolvedImport>> {
    let Some(rest) = reference.strip_prefix("package:") else {
        return Ok(None);
    };
    let Some((name, subpath)) = rest.split_once('/') else {
        return Err(CompileError::Config(format!(
            "invalid package URL '{reference}': expected package:<name>/<path>"
        )));
    };
    if name.is_empty() || subpath.is_empty() {
        return Err(CompileError::Config(format!(
            "invalid package URL '{reference}': expected package:<name>/<path>"
        )));
    }
    let Some(root) = config.root(name) else {
        // Unknown package name: decline, so the cascade reports
        // Import-Not-Found rather than a configuration error.
        return Ok(None);
    };
    load_file(&root.join(subpath), reference, ResolverOrigin::PackageManifest)
}

/// Resolve a filesystem candidate to at most one real file and load it.
fn load_file(
    candidate: &Path,
    reference: &str,
    origin: ResolverOrigin,
) -> Result<Option<ResolvedImport>> {
    let Some(path) = resolve_candidates(candidate, reference)? else {
        return Ok(None);
    };
    let text = fs::read_to_string(&path)?;
    let syntax = Syntax::from_path(&path).unwrap_or_default();
    let absolute = path.canonicalize()?;
    let url =
        Url::from_file_path(&absolute).expect("canonicalized paths convert to file URLs");
    Ok(Some(ResolvedImport {
        url,
        text,
        syntax,
        origin,
    }))
}

/// Map a reference path to the single file it names, if any.
///
/// References with a known extension try the exact name and its partial
/// twin. Extensionless references try `.sass`/`.scss` (partials first
/// within each), falling back to `.css`, then to a directory index.
/// More than one surviving candidate is an ambiguity error.
fn resolve_candidates(candidate: &Path, reference: &str) -> Result<Option<PathBuf>> {
    let mut found = if Syntax::from_path(candidate).is_some() {
        try_path(candidate)
    } else {
        try_path_with_extensions(candidate)
    };
    if found.is_empty() && candidate.is_dir() {
        found = try_path_with_extensions(&candidate.join("index"));
    }
    match found.len() {
        0 => Ok(None),
        1 => Ok(Some(found.remove(0))),
        _ => Err(CompileError::ImportAmbiguous {
            reference: reference.to_string(),
            candidates: found,
        }),
    }
}

/// Existing files among a path and its `_`-prefixed partial twin.
fn try_path(path: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    if let (Some(dir), Some(name)) = (path.parent(), path.file_name()) {
        let partial = dir.join(format!("_{}", name.to_string_lossy()));
        if partial.is_file() {
            found.push(partial);
        }
    }
    if path.is_file() {
        found.push(path.to_path_buf());
    }
    found
}

fn try_path_with_extensions(path: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for ext in ["sass", "scss"] {
        found.extend(try_path(&append_extension(path, ext)));
    }
    if found.is_empty() {
        found = try_path(&append_extension(path, "css"));
    }
    found
}

/// Append an extension rather than replacing an existing suffix, so a
/// reference like `theme.dark` maps to `theme.dark.scss`.
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}
