//! Workflow configuration: stages of steps, referenced by name from
//! per-project settings.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::Deserialize;

/// One pipeline step. A closed set of kinds plus `Unknown`, which parsing
/// produces for names this version does not recognize and the pipeline skips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Init { extra_args: Vec<String> },
    Plan { extra_args: Vec<String> },
    Apply { extra_args: Vec<String> },
    Run { command: String },
    Unknown { name: String },
}

impl Step {
    pub fn name(&self) -> &str {
        match self {
            Step::Init { .. } => "init",
            Step::Plan { .. } => "plan",
            Step::Apply { .. } => "apply",
            Step::Run { .. } => "run",
            Step::Unknown { name } => name,
        }
    }

    fn from_name(name: &str, extra_args: Vec<String>) -> Step {
        match name {
            "init" => Step::Init { extra_args },
            "plan" => Step::Plan { extra_args },
            "apply" => Step::Apply { extra_args },
            name => Step::Unknown { name: name.to_string() },
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the three YAML spellings of a step:
///
/// ```yaml
/// steps:
///   - init
///   - plan:
///       extra_args: ["-lock-timeout=30s"]
///   - run: ./scripts/check.sh
/// ```
impl<'de> Deserialize<'de> for Step {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawBody {
            Command(String),
            ExtraArgs {
                #[serde(default)]
                extra_args: Vec<String>,
            },
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawStep {
            Name(String),
            Keyed(BTreeMap<String, RawBody>),
        }

        match RawStep::deserialize(deserializer)? {
            RawStep::Name(name) => {
                if name == "run" {
                    return Err(de::Error::custom("a run step requires a command string"));
                }
                Ok(Step::from_name(&name, Vec::new()))
            }
            RawStep::Keyed(map) => {
                let mut entries = map.into_iter();
                let (name, body) = match (entries.next(), entries.next()) {
                    (Some(entry), None) => entry,
                    _ => return Err(de::Error::custom("a step must have exactly one key")),
                };
                match body {
                    RawBody::Command(command) => {
                        if name == "run" {
                            Ok(Step::Run { command })
                        } else {
                            Err(de::Error::custom(format!(
                                "step '{name}' does not take a command string"
                            )))
                        }
                    }
                    RawBody::ExtraArgs { extra_args } => {
                        if name == "run" {
                            return Err(de::Error::custom("a run step takes a command string"));
                        }
                        Ok(Step::from_name(&name, extra_args))
                    }
                }
            }
        }
    }
}

/// An ordered list of steps making up one workflow phase.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Stage {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Stage {
    /// The built-in planning stage used when no workflow overrides it.
    pub fn default_plan() -> Stage {
        Stage {
            steps: vec![
                Step::Init { extra_args: Vec::new() },
                Step::Plan { extra_args: Vec::new() },
            ],
        }
    }

    /// The built-in applying stage used when no workflow overrides it.
    pub fn default_apply() -> Stage {
        Stage { steps: vec![Step::Apply { extra_args: Vec::new() }] }
    }
}

/// A named workflow: optional plan and apply stage overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Workflow {
    #[serde(default)]
    pub plan: Option<Stage>,
    #[serde(default)]
    pub apply: Option<Stage>,
}

/// Server-wide workflow definitions, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(transparent)]
pub struct RepoWorkflows {
    pub workflows: BTreeMap<String, Workflow>,
}

impl RepoWorkflows {
    /// Configured planning stage of the named workflow, if any.
    pub fn plan_stage(&self, workflow: &str) -> Option<&Stage> {
        self.workflows.get(workflow).and_then(|w| w.plan.as_ref())
    }

    /// Configured applying stage of the named workflow, if any.
    pub fn apply_stage(&self, workflow: &str) -> Option<&Stage> {
        self.workflows.get(workflow).and_then(|w| w.apply.as_ref())
    }
}

/// A named precondition a project demands before apply may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyRequirement {
    Approved,
}

impl fmt::Display for ApplyRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyRequirement::Approved => f.write_str("approved"),
        }
    }
}

/// Per-project settings resolved from the repo's config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// Name of the workflow whose stages replace the built-in defaults.
    #[serde(default)]
    pub workflow: Option<String>,
    #[serde(default)]
    pub apply_requirements: Vec<ApplyRequirement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_parses_bare_name() {
        let step: Step = serde_yaml::from_str("init").unwrap();
        assert_eq!(step, Step::Init { extra_args: vec![] });
    }

    #[test]
    fn step_parses_extra_args_form() {
        let step: Step = serde_yaml::from_str("plan:\n  extra_args: [\"-lock=false\"]").unwrap();
        assert_eq!(step, Step::Plan { extra_args: vec!["-lock=false".to_string()] });
    }

    #[test]
    fn step_parses_run_command() {
        let step: Step = serde_yaml::from_str("run: ./scripts/check.sh --strict").unwrap();
        assert_eq!(step, Step::Run { command: "./scripts/check.sh --strict".to_string() });
    }

    #[test]
    fn bare_run_step_without_command_is_rejected() {
        assert!(serde_yaml::from_str::<Step>("run").is_err());
    }

    #[test]
    fn unrecognized_step_name_becomes_unknown() {
        let step: Step = serde_yaml::from_str("validate").unwrap();
        assert_eq!(step, Step::Unknown { name: "validate".to_string() });
    }

    #[test]
    fn workflows_resolve_stages_by_name() {
        let yaml = r#"
custom:
  plan:
    steps:
      - init
      - plan:
          extra_args: ["-parallelism=2"]
  apply:
    steps:
      - run: echo applying
      - apply
"#;
        let workflows: RepoWorkflows = serde_yaml::from_str(yaml).unwrap();
        let plan = workflows.plan_stage("custom").unwrap();
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[1], Step::Plan { extra_args: vec!["-parallelism=2".to_string()] });
        let apply = workflows.apply_stage("custom").unwrap();
        assert_eq!(apply.steps[0], Step::Run { command: "echo applying".to_string() });
        assert!(workflows.plan_stage("missing").is_none());
    }

    #[test]
    fn default_stages_cover_plan_and_apply() {
        assert_eq!(
            Stage::default_plan().steps.iter().map(Step::name).collect::<Vec<_>>(),
            vec!["init", "plan"]
        );
        assert_eq!(
            Stage::default_apply().steps.iter().map(Step::name).collect::<Vec<_>>(),
            vec!["apply"]
        );
    }

    #[test]
    fn project_config_parses_requirements() {
        let cfg: ProjectConfig =
            serde_yaml::from_str("workflow: custom\napply_requirements: [approved]").unwrap();
        assert_eq!(cfg.workflow.as_deref(), Some("custom"));
        assert_eq!(cfg.apply_requirements, vec![ApplyRequirement::Approved]);
    }
}
