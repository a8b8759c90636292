/*
 * map.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Source map v3 JSON structure.
 */

use serde::{Deserialize, Serialize};

/// A source map in the standard v3 JSON format.
///
/// Produced by [`SourceMapBuilder::build`](crate::SourceMapBuilder::build).
/// The `file` field is always left unset by the builder; callers that
/// persist the map alongside the CSS are responsible for filling it in
/// (and for adding a `sourceMappingURL` comment to the CSS, if desired).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMap {
    /// Format version. Always 3.
    pub version: u32,

    /// URL of the generated file. Left unset by the builder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Optional prefix prepended to each entry in `sources`.
    #[serde(rename = "sourceRoot", skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,

    /// Canonical URLs of the original sources, in reference order.
    pub sources: Vec<String>,

    /// Embedded source contents, parallel to `sources`. `None` entries
    /// mean the consumer must fetch the source itself.
    #[serde(rename = "sourcesContent", skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,

    /// Symbol names referenced by mappings.
    pub names: Vec<String>,

    /// Base64-VLQ encoded mapping segments.
    pub mappings: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_fields() {
        let map = SourceMap {
            version: 3,
            file: None,
            source_root: Some("/root".to_string()),
            sources: vec!["a.scss".to_string()],
            sources_content: Some(vec![Some("a { b: c }".to_string())]),
            names: vec![],
            mappings: "AAAA".to_string(),
        };

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["version"], 3);
        assert_eq!(json["sourceRoot"], "/root");
        assert_eq!(json["sourcesContent"][0], "a { b: c }");
        // Unset optional fields are omitted entirely
        assert!(json.get("file").is_none());
    }

    #[test]
    fn test_round_trips_through_json() {
        let map = SourceMap {
            version: 3,
            file: Some("out.css".to_string()),
            source_root: None,
            sources: vec!["x.scss".to_string(), "y.scss".to_string()],
            sources_content: None,
            names: vec!["main".to_string()],
            mappings: "AAAA;ACAA".to_string(),
        };

        let json = serde_json::to_string(&map).unwrap();
        let back: SourceMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
