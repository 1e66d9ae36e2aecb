//! Property tests for `-c key=value` parsing.

use proptest::prelude::*;

use eksforge::config::parse_context_pair;

proptest! {
    /// PROPERTY: Everything after the first `=` is the value, verbatim.
    #[test]
    fn property_value_keeps_later_equals(
        key in "[a-z][a-z\\-]{0,20}",
        value in "[A-Za-z0-9=:/._\\-]{0,40}",
    ) {
        let (k, v) = parse_context_pair(&format!("{key}={value}")).unwrap();
        prop_assert_eq!(k, key);
        prop_assert_eq!(v, value);
    }

    /// PROPERTY: Input without `=` is always rejected.
    #[test]
    fn property_missing_separator_is_rejected(raw in "[A-Za-z0-9\\-]{0,20}") {
        prop_assert!(parse_context_pair(&raw).is_err());
    }
}
