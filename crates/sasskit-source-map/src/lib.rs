//! Source maps for compiled CSS
//!
//! This crate provides the standard source map v3 structure
//! ([`SourceMap`]) and an incremental [`SourceMapBuilder`] that
//! serializers use while emitting CSS. The builder collects raw
//! (generated → original) position pairs and encodes them into the
//! base64-VLQ `mappings` string on [`SourceMapBuilder::build`].
//!
//! # Example
//!
//! ```rust
//! use sasskit_source_map::SourceMapBuilder;
//!
//! let mut builder = SourceMapBuilder::new();
//! let src = builder.add_source("file:///input.scss");
//! builder.add_mapping(0, 0, Some((src, 0, 0)));
//! builder.add_mapping(1, 2, Some((src, 3, 4)));
//!
//! let map = builder.build();
//! assert_eq!(map.version, 3);
//! assert_eq!(map.sources, vec!["file:///input.scss".to_string()]);
//! assert!(map.file.is_none());
//! ```

mod builder;
mod map;
mod vlq;

pub use builder::SourceMapBuilder;
pub use map::SourceMap;
