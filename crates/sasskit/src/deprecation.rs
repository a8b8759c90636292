/*
 * deprecation.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Deprecation kinds and the per-run warning throttle.
 */

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use crate::language::SourceSpan;
use crate::logger::Logger;

/// How many warnings of one kind are emitted before throttling kicks in.
const MAX_REPETITIONS: u32 = 5;

/// The kinds of deprecated behavior a stylesheet can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deprecation {
    /// `@import` rules (superseded by `@use`).
    Import,
    /// Global built-in functions now namespaced under modules.
    GlobalBuiltin,
    /// `/` as division (superseded by `math.div`).
    SlashDiv,
    /// Legacy color channel functions.
    ColorFunctions,
    /// Declarations mixed after nested rules.
    MixedDecls,
    /// Deprecations authored in stylesheets themselves.
    UserAuthored,
}

impl Deprecation {
    /// Stable identifier, matching the names stylesheets use to silence
    /// a kind.
    pub fn id(&self) -> &'static str {
        match self {
            Deprecation::Import => "import",
            Deprecation::GlobalBuiltin => "global-builtin",
            Deprecation::SlashDiv => "slash-div",
            Deprecation::ColorFunctions => "color-functions",
            Deprecation::MixedDecls => "mixed-decls",
            Deprecation::UserAuthored => "user-authored",
        }
    }
}

impl fmt::Display for Deprecation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Per-run counter that silences repeated warnings of one kind.
///
/// Shared across the whole compilation run so warnings from many
/// imported files are counted cumulatively, not per-file. Once a kind
/// has been emitted [`MAX_REPETITIONS`] times, further occurrences are
/// counted but no longer forwarded to the logger. Verbose mode disables
/// throttling entirely.
#[derive(Debug)]
pub struct DeprecationThrottle {
    verbose: bool,
    counts: Mutex<HashMap<Deprecation, u32>>,
}

impl DeprecationThrottle {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Forward a deprecation warning to `logger` unless throttled.
    pub fn report(
        &self,
        kind: Deprecation,
        message: &str,
        span: Option<&SourceSpan>,
        logger: &dyn Logger,
    ) {
        if self.should_emit(kind) {
            logger.warn(&format!("Deprecation [{kind}]: {message}"), span);
        } else {
            tracing::trace!(kind = kind.id(), "deprecation warning throttled");
        }
    }

    /// Count an occurrence of `kind` and decide whether to emit it.
    ///
    /// The count advances even after the threshold is reached.
    fn should_emit(&self, kind: Deprecation) -> bool {
        let mut counts = self.counts.lock().expect("deprecation counts poisoned");
        let count = counts.entry(kind).or_insert(0);
        *count += 1;
        self.verbose || *count <= MAX_REPETITIONS
    }

    /// How many occurrences of `kind` have been counted so far.
    pub fn count(&self, kind: Deprecation) -> u32 {
        let counts = self.counts.lock().expect("deprecation counts poisoned");
        counts.get(&kind).copied().unwrap_or(0)
    }
}
