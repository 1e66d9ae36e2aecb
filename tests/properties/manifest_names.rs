//! Property tests for manifest file selection and component naming.

use proptest::prelude::*;

use eksforge::{component_name, ManifestMatch};

fn file_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9_.\\-]{0,32}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: The component name is the prefix before the first dot.
    #[test]
    fn property_component_name_is_dot_free_prefix(name in file_name()) {
        let component = component_name(&name);
        prop_assert!(!component.contains('.'));
        prop_assert!(name.starts_with(component));
        if let Some(rest) = name.get(component.len()..) {
            prop_assert!(rest.is_empty() || rest.starts_with('.'));
        }
    }

    /// PROPERTY: The default rule accepts exactly the names containing "yaml".
    #[test]
    fn property_substring_rule_is_plain_contains(name in file_name()) {
        prop_assert_eq!(ManifestMatch::Substring.matches(&name), name.contains("yaml"));
    }

    /// PROPERTY: A `.yaml` suffix is accepted by both rules.
    #[test]
    fn property_yaml_suffix_matches_both_rules(stem in "[a-z0-9\\-]{1,16}") {
        let name = format!("{stem}.yaml");
        prop_assert!(ManifestMatch::Substring.matches(&name));
        prop_assert!(ManifestMatch::Extension.matches(&name));
        prop_assert!(!ManifestMatch::Substring.is_loose_hit(&name));
        prop_assert_eq!(component_name(&name), stem.as_str());
    }
}
