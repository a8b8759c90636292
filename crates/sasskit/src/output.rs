/*
 * output.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Final output assembly: charset/BOM policy and source-map packaging.
 */

use sasskit_source_map::{SourceMap, SourceMapBuilder};

use crate::request::OutputStyle;

/// Package rendered CSS and an optional source map into final output.
///
/// When `charset` is requested and the CSS contains non-ASCII
/// characters, expanded output gains a leading `@charset "UTF-8";`
/// declaration and compressed output gains a UTF-8 byte-order mark —
/// a single leading marker, never both. ASCII-only CSS gains neither,
/// regardless of the flag.
///
/// The source map is built with its `file` field unset, and the CSS is
/// never mutated to add a `sourceMappingURL` comment; both remain the
/// caller's responsibility.
pub fn assemble(
    css: String,
    style: OutputStyle,
    charset: bool,
    source_map: Option<SourceMapBuilder>,
) -> (String, Option<SourceMap>) {
    let css = if charset && !css.is_ascii() {
        match style {
            OutputStyle::Expanded => format!("@charset \"UTF-8\";\n{css}"),
            OutputStyle::Compressed => format!("\u{feff}{css}"),
        }
    } else {
        css
    };
    let map = source_map.map(SourceMapBuilder::build);
    (css, map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_output_never_gains_a_marker() {
        let (css, _) = assemble(".a { b: c }".to_string(), OutputStyle::Expanded, true, None);
        assert_eq!(css, ".a { b: c }");

        let (css, _) = assemble(".a { b: c }".to_string(), OutputStyle::Compressed, true, None);
        assert_eq!(css, ".a { b: c }");
    }

    #[test]
    fn test_expanded_non_ascii_gains_charset_declaration() {
        let (css, _) = assemble(
            ".a::before { content: \"café\" }".to_string(),
            OutputStyle::Expanded,
            true,
            None,
        );
        assert!(css.starts_with("@charset \"UTF-8\";\n"));
        assert!(!css.starts_with('\u{feff}'));
        assert_eq!(css.matches("@charset").count(), 1);
    }

    #[test]
    fn test_compressed_non_ascii_gains_bom() {
        let (css, _) = assemble(
            ".a::before{content:\"café\"}".to_string(),
            OutputStyle::Compressed,
            true,
            None,
        );
        assert!(css.starts_with('\u{feff}'));
        assert!(!css.contains("@charset"));
    }

    #[test]
    fn test_charset_suppressed_when_not_requested() {
        let (css, _) = assemble(
            ".a::before { content: \"café\" }".to_string(),
            OutputStyle::Expanded,
            false,
            None,
        );
        assert!(!css.contains("@charset"));
        assert!(!css.starts_with('\u{feff}'));
    }

    #[test]
    fn test_source_map_packaged_with_file_unset() {
        let mut builder = SourceMapBuilder::new();
        let src = builder.add_source("file:///main.scss");
        builder.add_mapping(0, 0, Some((src, 0, 0)));

        let (_, map) = assemble(".a {}".to_string(), OutputStyle::Expanded, true, Some(builder));
        let map = map.expect("map requested");
        assert!(map.file.is_none());
        assert_eq!(map.sources, vec!["file:///main.scss".to_string()]);
    }

    #[test]
    fn test_no_source_map_when_not_requested() {
        let (_, map) = assemble(".a {}".to_string(), OutputStyle::Expanded, true, None);
        assert!(map.is_none());
    }
}
