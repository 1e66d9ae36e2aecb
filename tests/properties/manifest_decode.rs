//! Property tests for multi-document manifest decoding.

use std::path::Path;

use proptest::prelude::*;

use eksforge::decode_documents;

fn kind() -> impl Strategy<Value = String> {
    // Core-schema keywords like `True` or `Null` decode as non-strings.
    proptest::string::string_regex("[A-Z][A-Za-z]{0,15}")
        .unwrap()
        .prop_filter("not a YAML keyword", |k| {
            !matches!(k.to_ascii_lowercase().as_str(), "null" | "true" | "false")
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Arbitrary text never panics the decoder.
    #[test]
    fn property_decode_never_panics(content in "\\PC{0,200}") {
        let _ = decode_documents(&content, Path::new("fuzz.yaml"));
    }

    /// PROPERTY: N separated documents decode to N values, in order.
    #[test]
    fn property_document_count_and_order(kinds in proptest::collection::vec(kind(), 1..=6)) {
        let content = kinds
            .iter()
            .map(|k| format!("kind: {k}\nmetadata:\n  name: x\n"))
            .collect::<Vec<_>>()
            .join("---\n");

        let documents = decode_documents(&content, Path::new("multi.yaml")).unwrap();
        prop_assert_eq!(documents.len(), kinds.len());
        for (doc, k) in documents.iter().zip(&kinds) {
            prop_assert_eq!(doc["kind"].as_str(), Some(k.as_str()));
        }
    }
}
