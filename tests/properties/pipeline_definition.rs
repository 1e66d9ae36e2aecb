//! Property tests for the pipeline builder.

use proptest::prelude::*;

use eksforge::{Config, PipelineDefinitionBuilder};

fn name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9_\\-]{1,24}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Any non-empty names yield a valid three-stage pipeline.
    #[test]
    fn property_build_is_valid_and_deterministic(
        pipeline in name(),
        repo in name(),
        archive in "[a-z0-9_.]{1,20}",
    ) {
        let config = Config::default();
        let url = format!("https://example.com/releases/{archive}");
        let builder = PipelineDefinitionBuilder::new(&config);

        let first = builder.build(&pipeline, &repo, &url).unwrap();
        let second = builder.build(&pipeline, &repo, &url).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert!(first.validate().is_ok());
        prop_assert_eq!(first.stages.len(), 3);
        prop_assert_eq!(&first.name, &pipeline);
    }
}
