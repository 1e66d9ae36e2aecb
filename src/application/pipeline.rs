//! Pipeline definition builder
//!
//! Source -> ValidateK8sManifests -> DeployEksWorkloads (approve, then deploy).
//! Every build action reads the same source artifact.

use std::path::{Component, Path, PathBuf};

use tracing::info;

use super::shell;
use crate::config::context::{CODECOMMIT_REPO_NAME, CONFTEST_DOWNLOAD_URL, PIPELINE_NAME};
use crate::config::{Config, Context, PipelineConfig, ProjectConfig, PROJECT_CONFIG_FILE};
use crate::domain::buildspec::BuildSpec;
use crate::domain::pipeline::{
    Action, ActionKind, ArtifactName, BuildEnvironment, BuildProject, PipelineDefinition, Stage,
};
use crate::domain::stack::{DeploymentEnv, OutputValue, Stack};
use crate::error::{EksforgeError, EksforgeResult};

pub const SOURCE_STAGE: &str = "Source";
pub const VALIDATE_STAGE: &str = "ValidateK8sManifests";
pub const DEPLOY_STAGE: &str = "DeployEksWorkloads";

pub const SOURCE_ACTION: &str = "CodeCommit";
pub const VALIDATE_ACTION: &str = "ValidateK8sManifests";
pub const APPROVE_ACTION: &str = "ApproveDeployment";
pub const DEPLOY_ACTION: &str = "DeployCluster";

pub const VALIDATION_PROJECT: &str = "K8sValidationCodeBuildProject";
pub const DEPLOY_PROJECT: &str = "ClusterDeployCodeBuildProject";

pub const SOURCE_ARTIFACT: &str = "SourceArtifact";

/// Policy granted to the deploy project; it creates IAM, VPC and EKS resources.
pub const DEPLOY_POLICY: &str = "AdministratorAccess";

/// The three required pipeline parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineParams {
    pub pipeline_name: String,
    pub source_repo_name: String,
    pub conftest_url: String,
}

impl PipelineParams {
    /// Read all three keys, failing on the first one missing.
    pub fn from_context(context: &Context) -> EksforgeResult<Self> {
        Ok(Self {
            pipeline_name: context.require(PIPELINE_NAME)?.to_string(),
            source_repo_name: context.require(CODECOMMIT_REPO_NAME)?.to_string(),
            conftest_url: context.require(CONFTEST_DOWNLOAD_URL)?.to_string(),
        })
    }
}

/// Archive name of the validation tool: last path segment of its URL.
pub fn conftest_file_name(url: &str) -> EksforgeResult<&str> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    match without_query.rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(EksforgeError::InvalidContext {
            key: CONFTEST_DOWNLOAD_URL.to_string(),
            message: format!("'{}' does not end in a file name", url),
        }),
    }
}

/// Path from `from_dir` back up to the project root, then into `target`.
///
/// Both must be relative to the project root and free of `..`, otherwise the
/// walk back up cannot be computed.
fn relative_from(from_dir: &Path, target: &Path) -> EksforgeResult<String> {
    for (key, dir) in [("conftest_dir", from_dir), ("manifest_dir", target)] {
        let escapes = dir.components().any(|c| {
            matches!(
                c,
                Component::RootDir | Component::Prefix(_) | Component::ParentDir
            )
        });
        if escapes {
            return Err(EksforgeError::InvalidConfig {
                file: PathBuf::from(PROJECT_CONFIG_FILE),
                message: format!(
                    "project.{} '{}' must be relative to the project root and must not contain '..'",
                    key,
                    dir.display()
                ),
            });
        }
    }

    let depth = from_dir
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count();
    let mut path = "../".repeat(depth);
    for component in target.components() {
        if let Component::Normal(part) = component {
            path.push_str(&part.to_string_lossy());
            path.push('/');
        }
    }
    if path.is_empty() {
        path.push_str("./");
    }
    Ok(path)
}

pub struct PipelineDefinitionBuilder<'a> {
    pipeline: &'a PipelineConfig,
    project: &'a ProjectConfig,
}

impl<'a> PipelineDefinitionBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            pipeline: &config.pipeline,
            project: &config.project,
        }
    }

    /// Build from context; missing keys fail before any stage exists.
    pub fn build_from_context(&self, context: &Context) -> EksforgeResult<PipelineDefinition> {
        let params = PipelineParams::from_context(context)?;
        self.build(
            &params.pipeline_name,
            &params.source_repo_name,
            &params.conftest_url,
        )
    }

    pub fn build(
        &self,
        pipeline_name: &str,
        source_repo_name: &str,
        conftest_url: &str,
    ) -> EksforgeResult<PipelineDefinition> {
        for (key, value) in [
            (PIPELINE_NAME, pipeline_name),
            (CODECOMMIT_REPO_NAME, source_repo_name),
            (CONFTEST_DOWNLOAD_URL, conftest_url),
        ] {
            if value.is_empty() {
                return Err(EksforgeError::missing(key));
            }
        }

        let source_output = ArtifactName::new(SOURCE_ARTIFACT);

        let source = Action::new(
            SOURCE_ACTION,
            ActionKind::CodeCommitSource {
                repository: source_repo_name.to_string(),
                branch: self.pipeline.branch.clone(),
                output: source_output.clone(),
            },
        );

        let validate = Action::new(
            VALIDATE_ACTION,
            ActionKind::CodeBuild {
                project: VALIDATION_PROJECT.to_string(),
                input: source_output.clone(),
            },
        );

        let approve = Action::new(APPROVE_ACTION, ActionKind::ManualApproval).with_run_order(1);

        let deploy = Action::new(
            DEPLOY_ACTION,
            ActionKind::CodeBuild {
                project: DEPLOY_PROJECT.to_string(),
                input: source_output,
            },
        )
        .with_run_order(2);

        let definition = PipelineDefinition {
            name: pipeline_name.to_string(),
            restart_execution_on_update: true,
            stages: vec![
                Stage::new(SOURCE_STAGE, vec![source]),
                Stage::new(VALIDATE_STAGE, vec![validate]),
                Stage::new(DEPLOY_STAGE, vec![approve, deploy]),
            ],
            build_projects: vec![
                self.project(
                    VALIDATION_PROJECT,
                    self.validation_build_spec(conftest_url)?,
                    Vec::new(),
                ),
                self.project(
                    DEPLOY_PROJECT,
                    self.deploy_build_spec(),
                    vec![DEPLOY_POLICY.to_string()],
                ),
            ],
        };

        definition.validate()?;
        Ok(definition)
    }

    fn project(&self, id: &str, build_spec: BuildSpec, managed_policies: Vec<String>) -> BuildProject {
        BuildProject {
            id: id.to_string(),
            environment: BuildEnvironment {
                image: self.pipeline.build_image.clone(),
                compute_type: self.pipeline.compute_type.clone(),
            },
            build_spec,
            managed_policies,
        }
    }

    /// Download and unpack conftest, then test all manifests as one unit.
    fn validation_build_spec(&self, conftest_url: &str) -> EksforgeResult<BuildSpec> {
        let archive = conftest_file_name(conftest_url)?;
        let conftest_dir = &self.project.conftest_dir;
        let manifests = relative_from(conftest_dir, &self.project.manifest_dir)?;
        let archive = shell::word(archive);

        Ok(BuildSpec::new(
            [
                "ls -rtla $CODEBUILD_SRC_DIR/".to_string(),
                format!("cd {}", shell::word(&conftest_dir.to_string_lossy())),
                "ls -rtla".to_string(),
                // -O: a signed URL's query string must not end up in the file name
                format!("wget -q -O {} {}", archive, shell::quote(conftest_url)),
                format!("tar xzf {}", archive),
                "ls -rtla".to_string(),
            ],
            [format!("./conftest test {} --combine", shell::word(&manifests))],
        ))
    }

    fn deploy_build_spec(&self) -> BuildSpec {
        BuildSpec::new(
            self.pipeline.deploy_pre_build.iter().cloned(),
            self.pipeline.deploy_build.iter().cloned(),
        )
    }
}

/// Build the pipeline stack from configuration and context.
pub fn pipeline_stack(
    config: &Config,
    context: &Context,
    env: DeploymentEnv,
) -> EksforgeResult<Stack<PipelineDefinition>> {
    let definition = PipelineDefinitionBuilder::new(config).build_from_context(context)?;

    info!(
        stack = %config.pipeline.stack_name,
        pipeline = %definition.name,
        stages = ?definition.stage_names(),
        "built pipeline definition"
    );

    let name = definition.name.clone();
    Ok(Stack::new(config.pipeline.stack_name.clone(), env, definition)
        .with_output("PipelineName", OutputValue::Literal(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://github.com/open-policy-agent/conftest/releases/download/v1.2/conftest_1.2.tgz";

    fn context() -> Context {
        Context::new()
            .with(PIPELINE_NAME, "p1")
            .with(CODECOMMIT_REPO_NAME, "r1")
            .with(CONFTEST_DOWNLOAD_URL, URL)
    }

    #[test]
    fn conftest_file_name_is_last_segment() {
        assert_eq!(conftest_file_name(URL).unwrap(), "conftest_1.2.tgz");
        assert_eq!(conftest_file_name("conftest.tgz").unwrap(), "conftest.tgz");
        assert_eq!(
            conftest_file_name("https://x/c.tar.gz?sig=abc").unwrap(),
            "c.tar.gz"
        );
        assert_eq!(conftest_file_name("https://x/c.tgz?a=1&b=2#frag").unwrap(), "c.tgz");
        assert!(conftest_file_name("https://x/dir/").is_err());
    }

    #[test]
    fn relative_from_walks_up_then_down() {
        assert_eq!(
            relative_from(Path::new("conftest/bin"), Path::new("k8s-manifests")).unwrap(),
            "../../k8s-manifests/"
        );
        assert_eq!(
            relative_from(Path::new("."), Path::new("m/k8s")).unwrap(),
            "m/k8s/"
        );
        assert_eq!(relative_from(Path::new("."), Path::new(".")).unwrap(), "./");
    }

    #[test]
    fn relative_from_rejects_absolute_and_parent_dirs() {
        for (from, target) in [
            ("conftest/bin", "/abs/m"),
            ("conftest/bin", "../m"),
            ("/opt/conftest", "k8s-manifests"),
            ("tools/../bin", "k8s-manifests"),
        ] {
            let err = relative_from(Path::new(from), Path::new(target)).unwrap_err();
            assert!(
                matches!(err, EksforgeError::InvalidConfig { .. }),
                "{} -> {}",
                from,
                target
            );
        }
    }

    #[test]
    fn absolute_manifest_dir_fails_pipeline_build() {
        let mut config = Config::default();
        config.project.manifest_dir = PathBuf::from("/srv/manifests");

        let err = PipelineDefinitionBuilder::new(&config)
            .build_from_context(&context())
            .unwrap_err();
        assert!(err.to_string().contains("manifest_dir"));
    }

    #[test]
    fn signed_url_download_keeps_archive_name() {
        let config = Config::default();
        let pipeline = PipelineDefinitionBuilder::new(&config)
            .build("p1", "r1", "https://x/c.tgz?a=1&b=2")
            .unwrap();
        let spec = &pipeline.project(VALIDATION_PROJECT).unwrap().build_spec;
        let commands: Vec<_> = spec.commands().collect();

        assert!(commands.contains(&"wget -q -O c.tgz 'https://x/c.tgz?a=1&b=2'"));
        assert!(commands.contains(&"tar xzf c.tgz"));
    }

    #[test]
    fn pipeline_scenario() {
        let config = Config::default();
        let pipeline = PipelineDefinitionBuilder::new(&config)
            .build_from_context(&context())
            .unwrap();

        assert_eq!(pipeline.name, "p1");
        assert!(pipeline.restart_execution_on_update);
        assert_eq!(
            pipeline.stage_names(),
            vec!["Source", "ValidateK8sManifests", "DeployEksWorkloads"]
        );

        let validation = pipeline.project(VALIDATION_PROJECT).unwrap();
        assert!(validation
            .build_spec
            .commands()
            .any(|c| c == "tar xzf conftest_1.2.tgz"));

        let deploy = pipeline.stage(DEPLOY_STAGE).unwrap();
        let orders: Vec<_> = deploy
            .actions
            .iter()
            .map(|a| (a.name.as_str(), a.run_order))
            .collect();
        assert_eq!(orders, vec![("ApproveDeployment", 1), ("DeployCluster", 2)]);
        assert_eq!(deploy.actions[0].kind, ActionKind::ManualApproval);
    }

    #[test]
    fn source_tracks_main_branch_of_repo() {
        let config = Config::default();
        let pipeline = PipelineDefinitionBuilder::new(&config)
            .build_from_context(&context())
            .unwrap();

        let source = pipeline.stage(SOURCE_STAGE).unwrap().action(SOURCE_ACTION).unwrap();
        assert_eq!(
            source.kind,
            ActionKind::CodeCommitSource {
                repository: "r1".to_string(),
                branch: "main".to_string(),
                output: ArtifactName::new(SOURCE_ARTIFACT),
            }
        );
    }

    #[test]
    fn build_actions_share_source_artifact() {
        let config = Config::default();
        let pipeline = PipelineDefinitionBuilder::new(&config)
            .build_from_context(&context())
            .unwrap();

        let inputs: Vec<_> = pipeline
            .stages
            .iter()
            .flat_map(|s| &s.actions)
            .filter_map(|a| match &a.kind {
                ActionKind::CodeBuild { input, .. } => Some(input.0.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(inputs, vec![SOURCE_ARTIFACT, SOURCE_ARTIFACT]);
    }

    #[test]
    fn only_deploy_project_is_admin() {
        let config = Config::default();
        let pipeline = PipelineDefinitionBuilder::new(&config)
            .build_from_context(&context())
            .unwrap();

        assert!(pipeline
            .project(VALIDATION_PROJECT)
            .unwrap()
            .managed_policies
            .is_empty());
        assert_eq!(
            pipeline.project(DEPLOY_PROJECT).unwrap().managed_policies,
            vec!["AdministratorAccess"]
        );
    }

    #[test]
    fn each_missing_key_fails_before_building() {
        let config = Config::default();
        let builder = PipelineDefinitionBuilder::new(&config);

        for key in [PIPELINE_NAME, CODECOMMIT_REPO_NAME, CONFTEST_DOWNLOAD_URL] {
            let mut ctx = Context::new();
            for (k, v) in context().iter() {
                if k != key {
                    ctx.set(k, v);
                }
            }
            match builder.build_from_context(&ctx) {
                Err(EksforgeError::ConfigurationMissing { key: missing }) => {
                    assert_eq!(missing, key)
                }
                other => panic!("expected missing {}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn empty_argument_is_missing() {
        let config = Config::default();
        let err = PipelineDefinitionBuilder::new(&config)
            .build("p1", "", URL)
            .unwrap_err();
        assert!(err.to_string().contains("codecommit-repo-name"));
    }

    #[test]
    fn validation_commands_snapshot() {
        let config = Config::default();
        let pipeline = PipelineDefinitionBuilder::new(&config)
            .build_from_context(&context())
            .unwrap();
        let spec = &pipeline.project(VALIDATION_PROJECT).unwrap().build_spec;
        let commands = spec.commands().collect::<Vec<_>>().join("\n");

        insta::assert_snapshot!(commands, @r###"
        ls -rtla $CODEBUILD_SRC_DIR/
        cd conftest/bin
        ls -rtla
        wget -q -O conftest_1.2.tgz 'https://github.com/open-policy-agent/conftest/releases/download/v1.2/conftest_1.2.tgz'
        tar xzf conftest_1.2.tgz
        ls -rtla
        ./conftest test ../../k8s-manifests/ --combine
        "###);
    }

    #[test]
    fn pipeline_stack_outputs_name() {
        let stack = pipeline_stack(&Config::default(), &context(), DeploymentEnv::default()).unwrap();
        assert_eq!(stack.name, "EksforgePipeline");
        assert_eq!(
            stack.outputs.get("PipelineName"),
            Some(&OutputValue::Literal("p1".to_string()))
        );
    }
}
