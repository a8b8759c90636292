/*
 * request.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Compilation request and result types.
 */

use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use crate::error::{CompileError, Result};
use crate::importer::{Importer, PackageConfig};
use crate::syntax::Syntax;
use sasskit_source_map::SourceMap;

/// How rendered CSS should be formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// Human-readable output, one declaration per line.
    #[default]
    Expanded,
    /// Whitespace-stripped output for production.
    Compressed,
}

/// The stylesheet a compilation starts from.
#[derive(Debug)]
pub enum Input {
    /// A file on disk, resolved through the cascade like any import.
    Path(PathBuf),
    /// An in-memory source string.
    Source(String),
}

/// Everything one compilation run needs, built once and then immutable.
///
/// # Example
///
/// ```rust,ignore
/// use sasskit::CompilationRequest;
///
/// let request = CompilationRequest::from_path("styles/main.scss")
///     .with_load_path("node_modules")
///     .quiet_dependencies(true)
///     .source_map(true);
/// ```
#[derive(Debug)]
pub struct CompilationRequest {
    pub(crate) input: Input,
    /// Caller-supplied canonical URL for in-memory source input.
    pub(crate) url: Option<Url>,
    /// Syntax hint for in-memory source input without a deciding URL.
    pub(crate) syntax: Option<Syntax>,
    pub(crate) importers: Vec<Arc<dyn Importer>>,
    pub(crate) load_paths: Vec<PathBuf>,
    pub(crate) package_config: Option<PackageConfig>,
    pub(crate) quiet_dependencies: bool,
    pub(crate) verbose: bool,
    pub(crate) style: OutputStyle,
    pub(crate) source_map: bool,
    pub(crate) charset: bool,
}

impl CompilationRequest {
    fn new(input: Input) -> Self {
        Self {
            input,
            url: None,
            syntax: None,
            importers: Vec::new(),
            load_paths: Vec::new(),
            package_config: None,
            quiet_dependencies: false,
            verbose: false,
            style: OutputStyle::default(),
            source_map: false,
            charset: true,
        }
    }

    /// Compile a stylesheet file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(Input::Path(path.into()))
    }

    /// Compile an in-memory source string.
    pub fn from_source(text: impl Into<String>) -> Self {
        Self::new(Input::Source(text.into()))
    }

    /// Canonical URL for an in-memory source. Relative imports resolve
    /// against it when it is a `file:` URL; it also determines the
    /// syntax when no explicit hint is given.
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Syntax hint for an in-memory source.
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = Some(syntax);
        self
    }

    /// Add an explicit importer at the next position in cascade step 2.
    pub fn with_importer(mut self, importer: Arc<dyn Importer>) -> Self {
        self.importers.push(importer);
        self
    }

    /// Add a load-path directory at the next position in cascade step 3.
    pub fn with_load_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.load_paths.push(path.into());
        self
    }

    /// Enable `package:` resolution.
    pub fn with_package_config(mut self, config: PackageConfig) -> Self {
        self.package_config = Some(config);
        self
    }

    /// Suppress warnings originating in dependencies (stylesheets
    /// loaded through a secondary resolver). Never changes resolution
    /// order or CSS output.
    pub fn quiet_dependencies(mut self, quiet: bool) -> Self {
        self.quiet_dependencies = quiet;
        self
    }

    /// Emit every deprecation warning instead of throttling repeats.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn style(mut self, style: OutputStyle) -> Self {
        self.style = style;
        self
    }

    /// Request a source map alongside the CSS.
    pub fn source_map(mut self, source_map: bool) -> Self {
        self.source_map = source_map;
        self
    }

    /// Whether to emit a `@charset` declaration or byte-order mark when
    /// the output contains non-ASCII characters. On by default.
    pub fn charset(mut self, charset: bool) -> Self {
        self.charset = charset;
        self
    }

    /// Reject contradictory configuration before the run starts.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Input::Path(path) = &self.input {
            if path.as_os_str().is_empty() {
                return Err(CompileError::Config("entry path is empty".to_string()));
            }
            if self.syntax.is_some() {
                return Err(CompileError::Config(
                    "a syntax hint only applies to in-memory source input".to_string(),
                ));
            }
            if self.url.is_some() {
                return Err(CompileError::Config(
                    "an entry URL only applies to in-memory source input".to_string(),
                ));
            }
        }
        if let Some(config) = &self.package_config {
            config.validate()?;
        }
        Ok(())
    }
}

/// The product of a successful compilation run.
///
/// Never produced for a failed run; failure yields a
/// [`CompileError`](crate::CompileError) instead.
#[derive(Debug)]
pub struct CompileResult {
    /// Rendered CSS text, including any charset marker.
    pub css: String,
    /// Source map, when requested. Its `file` field is unset; the
    /// caller persists the map and adds a pointer comment if desired.
    pub source_map: Option<SourceMap>,
    /// Canonical URLs loaded during the run, for dependency tracking.
    pub loaded_urls: Vec<Url>,
}
