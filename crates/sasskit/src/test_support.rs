/*
 * test_support.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Shared fixtures for unit tests: a line-oriented stand-in for the
 * external parser/evaluator/serializer, plus instrumented importers
 * and a collecting logger.
 */

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use async_trait::async_trait;
use url::Url;

use crate::deprecation::Deprecation;
use crate::error::{CompileError, Result};
use crate::importer::{Importer, ImporterResult};
use crate::language::{EvalContext, Rendered, SourceSpan, StyleLanguage};
use crate::logger::Logger;
use crate::request::OutputStyle;
use crate::syntax::Syntax;
use sasskit_source_map::SourceMapBuilder;

/// Logger that records messages for assertions.
#[derive(Debug, Default)]
pub(crate) struct VecLogger {
    warnings: Mutex<Vec<String>>,
    debugs: Mutex<Vec<String>>,
}

impl VecLogger {
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn debugs(&self) -> Vec<String> {
        self.debugs.lock().unwrap().clone()
    }
}

impl Logger for VecLogger {
    fn warn(&self, message: &str, _span: Option<&SourceSpan>) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn debug(&self, message: &str, _span: Option<&SourceSpan>) {
        self.debugs.lock().unwrap().push(message.to_string());
    }
}

/// Importer backed by an in-memory map, counting resolve invocations.
#[derive(Debug, Default)]
pub(crate) struct CountingImporter {
    sheets: HashMap<String, (String, String)>,
    calls: AtomicUsize,
}

impl CountingImporter {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_stylesheet(reference: &str, url: &str, text: &str) -> Self {
        Self::empty().add(reference, url, text)
    }

    pub fn add(mut self, reference: &str, url: &str, text: &str) -> Self {
        self.sheets
            .insert(reference.to_string(), (url.to_string(), text.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Importer for CountingImporter {
    async fn resolve(
        &self,
        _context: Option<&Url>,
        reference: &str,
    ) -> Result<Option<ImporterResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.sheets.get(reference).map(|(url, text)| ImporterResult {
            url: Url::parse(url).expect("test importer URL"),
            text: text.clone(),
            syntax: Syntax::Scss,
        }))
    }
}

/// Importer that suspends once before answering, to exercise the
/// asynchronous execution mode's suspension points.
#[derive(Debug)]
pub(crate) struct SuspendingImporter {
    inner: CountingImporter,
}

impl SuspendingImporter {
    pub fn new(inner: CountingImporter) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Importer for SuspendingImporter {
    async fn resolve(
        &self,
        context: Option<&Url>,
        reference: &str,
    ) -> Result<Option<ImporterResult>> {
        yield_once().await;
        self.inner.resolve(context, reference).await
    }
}

/// A future that is pending exactly once.
fn yield_once() -> impl Future<Output = ()> {
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    YieldOnce(false)
}

/// Line-oriented stand-in for the external language collaborators.
///
/// Recognized directives, one per line:
///
/// - `@import "ref";` — resolve `ref` through the import cache and
///   splice in the imported stylesheet
/// - `@deprecated <kind> <message>` — report a deprecation warning
/// - `@warn <message>` — report an ordinary warning
/// - `@debug <message>` — forward a debug message
/// - `%runtime-error%` — fail evaluation
///
/// Any text containing `%syntax-error%` fails to parse. All other
/// lines pass through to the output verbatim.
#[derive(Debug, Default)]
pub(crate) struct TextLanguage;

#[derive(Debug)]
pub(crate) struct TextAst {
    lines: Vec<String>,
    url: Option<Url>,
}

#[derive(Debug, Clone)]
pub(crate) struct TreeLine {
    text: String,
    url: Option<Url>,
    line: usize,
}

#[derive(Debug)]
pub(crate) struct TextTree {
    lines: Vec<TreeLine>,
}

fn deprecation_kind(id: &str) -> Deprecation {
    match id {
        "import" => Deprecation::Import,
        "global-builtin" => Deprecation::GlobalBuiltin,
        "slash-div" => Deprecation::SlashDiv,
        "color-functions" => Deprecation::ColorFunctions,
        "mixed-decls" => Deprecation::MixedDecls,
        _ => Deprecation::UserAuthored,
    }
}

fn expand<'a>(
    ast: TextAst,
    ctx: &'a EvalContext<'a>,
) -> Pin<Box<dyn Future<Output = Result<Vec<TreeLine>>> + Send + 'a>> {
    Box::pin(async move {
        let mut out = Vec::new();
        for (line_number, line) in ast.lines.iter().enumerate() {
            let span = SourceSpan::new(ast.url.clone(), line_number, 0);
            let trimmed = line.trim();
            if trimmed == "%runtime-error%" {
                return Err(CompileError::Evaluation {
                    message: "runtime error directive".to_string(),
                    span,
                });
            }
            if let Some(rest) = trimmed.strip_prefix("@import \"") {
                let reference = rest.trim_end_matches("\";");
                let imported = ctx.import(ast.url.as_ref(), reference).await?;
                let sub = TextAst {
                    lines: imported.text.lines().map(str::to_string).collect(),
                    url: Some(imported.url.clone()),
                };
                out.extend(expand(sub, ctx).await?);
            } else if let Some(rest) = trimmed.strip_prefix("@deprecated ") {
                let (kind, message) = rest.split_once(' ').unwrap_or((rest, ""));
                ctx.diagnostics()
                    .deprecation(deprecation_kind(kind), message, Some(&span));
            } else if let Some(message) = trimmed.strip_prefix("@warn ") {
                ctx.diagnostics().warn(message, Some(&span));
            } else if let Some(message) = trimmed.strip_prefix("@debug ") {
                ctx.diagnostics().debug(message, Some(&span));
            } else if !trimmed.is_empty() {
                out.push(TreeLine {
                    text: line.clone(),
                    url: ast.url.clone(),
                    line: line_number,
                });
            }
        }
        Ok(out)
    })
}

#[async_trait]
impl StyleLanguage for TextLanguage {
    type Ast = TextAst;
    type Tree = TextTree;

    fn parse(&self, text: &str, _syntax: Syntax, url: Option<&Url>) -> Result<Self::Ast> {
        if text.contains("%syntax-error%") {
            return Err(CompileError::Syntax {
                message: "syntax error directive".to_string(),
                span: SourceSpan::new(url.cloned(), 0, 0),
            });
        }
        Ok(TextAst {
            lines: text.lines().map(str::to_string).collect(),
            url: url.cloned(),
        })
    }

    async fn evaluate(&self, ast: Self::Ast, ctx: &EvalContext<'_>) -> Result<Self::Tree> {
        let lines = expand(ast, ctx).await?;
        Ok(TextTree { lines })
    }

    fn render(&self, tree: &Self::Tree, style: OutputStyle, source_map: bool) -> Rendered {
        let css = match style {
            OutputStyle::Expanded => tree
                .lines
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            OutputStyle::Compressed => {
                tree.lines.iter().map(|l| l.text.trim()).collect::<String>()
            }
        };
        let source_map = source_map.then(|| {
            let mut builder = SourceMapBuilder::new();
            for (dst_line, line) in tree.lines.iter().enumerate() {
                match &line.url {
                    Some(url) => {
                        let src = builder.add_source(url.as_str());
                        builder.add_mapping(dst_line as u32, 0, Some((src, line.line as u32, 0)));
                    }
                    None => builder.add_mapping(dst_line as u32, 0, None),
                }
            }
            builder
        });
        Rendered { css, source_map }
    }
}
