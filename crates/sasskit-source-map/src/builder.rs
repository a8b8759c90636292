/*
 * builder.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Incremental source map construction.
 */

use std::collections::HashMap;

use crate::map::SourceMap;
use crate::vlq;

/// One raw mapping from a generated position back to an original one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawMapping {
    /// Zero-based line in the generated CSS.
    dst_line: u32,
    /// Zero-based column in the generated CSS.
    dst_column: u32,
    /// Original position: (source index, line, column), if known.
    src: Option<(u32, u32, u32)>,
    /// Index into `names`, if this mapping carries a symbol name.
    name: Option<u32>,
}

/// Collects mappings while a serializer emits CSS, then encodes them.
///
/// Sources and names are interned so repeated additions of the same URL
/// return the same index. Mappings may be added in any order; `build`
/// sorts them by generated position before encoding.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    sources: Vec<String>,
    source_indices: HashMap<String, u32>,
    names: Vec<String>,
    name_indices: HashMap<String, u32>,
    mappings: Vec<RawMapping>,
}

impl SourceMapBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a source URL, returning its index.
    pub fn add_source(&mut self, url: impl Into<String>) -> u32 {
        let url = url.into();
        if let Some(&idx) = self.source_indices.get(&url) {
            return idx;
        }
        let idx = self.sources.len() as u32;
        self.source_indices.insert(url.clone(), idx);
        self.sources.push(url);
        idx
    }

    /// Intern a symbol name, returning its index.
    pub fn add_name(&mut self, name: impl Into<String>) -> u32 {
        let name = name.into();
        if let Some(&idx) = self.name_indices.get(&name) {
            return idx;
        }
        let idx = self.names.len() as u32;
        self.name_indices.insert(name.clone(), idx);
        self.names.push(name);
        idx
    }

    /// Record a mapping from a generated position to an original one.
    ///
    /// Positions are zero-based (line, column). `src` is
    /// `(source index, original line, original column)` as returned by
    /// [`add_source`](Self::add_source), or `None` for a generated-only
    /// segment.
    pub fn add_mapping(&mut self, dst_line: u32, dst_column: u32, src: Option<(u32, u32, u32)>) {
        self.mappings.push(RawMapping {
            dst_line,
            dst_column,
            src,
            name: None,
        });
    }

    /// Record a mapping that also carries a symbol name.
    pub fn add_named_mapping(
        &mut self,
        dst_line: u32,
        dst_column: u32,
        src: (u32, u32, u32),
        name: u32,
    ) {
        self.mappings.push(RawMapping {
            dst_line,
            dst_column,
            src: Some(src),
            name: Some(name),
        });
    }

    /// Whether any mappings have been recorded.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Encode the collected mappings into a [`SourceMap`].
    ///
    /// The `file` field of the result is left unset.
    pub fn build(mut self) -> SourceMap {
        self.mappings
            .sort_by_key(|m| (m.dst_line, m.dst_column));

        let mut mappings = String::new();
        let mut current_line = 0u32;
        let mut prev_dst_column = 0i64;
        let mut prev_src_index = 0i64;
        let mut prev_src_line = 0i64;
        let mut prev_src_column = 0i64;
        let mut prev_name = 0i64;
        let mut line_has_segment = false;

        for mapping in &self.mappings {
            while current_line < mapping.dst_line {
                mappings.push(';');
                current_line += 1;
                prev_dst_column = 0;
                line_has_segment = false;
            }
            if line_has_segment {
                mappings.push(',');
            }
            line_has_segment = true;

            vlq::encode(i64::from(mapping.dst_column) - prev_dst_column, &mut mappings);
            prev_dst_column = i64::from(mapping.dst_column);

            if let Some((src_index, src_line, src_column)) = mapping.src {
                vlq::encode(i64::from(src_index) - prev_src_index, &mut mappings);
                prev_src_index = i64::from(src_index);
                vlq::encode(i64::from(src_line) - prev_src_line, &mut mappings);
                prev_src_line = i64::from(src_line);
                vlq::encode(i64::from(src_column) - prev_src_column, &mut mappings);
                prev_src_column = i64::from(src_column);

                if let Some(name) = mapping.name {
                    vlq::encode(i64::from(name) - prev_name, &mut mappings);
                    prev_name = i64::from(name);
                }
            }
        }

        SourceMap {
            version: 3,
            file: None,
            source_root: None,
            sources: self.sources,
            sources_content: None,
            names: self.names,
            mappings,
        }
    }
}
