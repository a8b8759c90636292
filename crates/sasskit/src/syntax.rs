/*
 * syntax.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Stylesheet syntax identification.
 */

use std::path::Path;

use url::Url;

/// How a stylesheet's text should be parsed.
///
/// Filesystem resolvers infer this from the file extension; in-memory
/// sources carry an explicit hint or default to [`Syntax::Scss`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Syntax {
    /// SCSS (CSS-superset syntax, `.scss`).
    #[default]
    Scss,
    /// Indented syntax (`.sass`).
    Indented,
    /// Plain CSS (`.css`), parsed without Sass extensions.
    Css,
}

impl Syntax {
    /// Infer the syntax from a file path's extension.
    pub fn from_path(path: &Path) -> Option<Syntax> {
        match path.extension()?.to_str()? {
            "scss" => Some(Syntax::Scss),
            "sass" => Some(Syntax::Indented),
            "css" => Some(Syntax::Css),
            _ => None,
        }
    }

    /// Infer the syntax from the path component of a URL.
    pub fn from_url(url: &Url) -> Option<Syntax> {
        Syntax::from_path(Path::new(url.path()))
    }
}
