use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::profile::{self, Check, LanguageProfile, Phase, Severity};

/// What one invocation was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Check,
    Lint { language: Option<String> },
    Format { fix: bool },
    Security,
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Task::Check => "check",
            Task::Lint { .. } => "lint",
            Task::Format { .. } => "format",
            Task::Security => "security",
        }
    }

    pub fn phases(&self) -> &'static [Phase] {
        match self {
            Task::Check => &[Phase::Security, Phase::Lint, Phase::Format],
            Task::Lint { .. } => &[Phase::Lint],
            Task::Format { .. } => &[Phase::Format],
            Task::Security => &[Phase::Security],
        }
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            Task::Lint { language } => language.as_deref(),
            _ => None,
        }
    }

    pub fn fix(&self) -> bool {
        matches!(self, Task::Format { fix: true })
    }
}

/// Input to the check pipeline.
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub task: Task,
    pub root: PathBuf,
    pub profiles: Vec<LanguageProfile>,
    pub script: Option<PathBuf>,
    /// Secret baseline path, relative to `root`.
    pub baseline: PathBuf,
}

impl PipelineInput {
    pub fn from_config(task: Task, root: PathBuf, cfg: &Config) -> Result<Self> {
        Ok(Self {
            task,
            root,
            profiles: profile::resolve(cfg)?,
            script: cfg.script.clone(),
            baseline: cfg.baseline.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASS",
            Outcome::Failed => "FAIL",
            Outcome::Skipped => "SKIP",
        }
    }
}

/// Why a check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Failure {
    /// The tool reported a violation on a fatal check.
    Finding,
    /// The tool reported a violation on an advisory check.
    Advisory,
    /// The sandbox or the tool could not be started.
    Environment,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Finding => f.write_str("finding"),
            Failure::Advisory => f.write_str("advisory"),
            Failure::Environment => f.write_str("environment"),
        }
    }
}

/// Result of one check execution. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub profile: String,
    pub check: String,
    pub phase: Phase,
    pub severity: Severity,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
    pub diagnostic: String,
}

impl CheckResult {
    fn new(profile: &str, check: &Check, outcome: Outcome, diagnostic: String) -> Self {
        Self {
            profile: profile.to_string(),
            check: check.name.clone(),
            phase: check.phase,
            severity: check.severity,
            outcome,
            failure: None,
            diagnostic,
        }
    }

    pub fn passed(profile: &str, check: &Check, log: String) -> Self {
        Self::new(profile, check, Outcome::Passed, log)
    }

    pub fn skipped(profile: &str, check: &Check, reason: impl Into<String>) -> Self {
        Self::new(profile, check, Outcome::Skipped, reason.into())
    }

    /// A tool finding, classified by the check's severity.
    pub fn finding(profile: &str, check: &Check, log: String) -> Self {
        let failure = match check.severity {
            Severity::Fatal => Failure::Finding,
            Severity::Advisory => Failure::Advisory,
        };
        Self {
            failure: Some(failure),
            ..Self::new(profile, check, Outcome::Failed, log)
        }
    }

    pub fn environment(profile: &str, check: &Check, message: String) -> Self {
        Self {
            failure: Some(Failure::Environment),
            ..Self::new(profile, check, Outcome::Failed, message)
        }
    }

    /// Whether this result fails the run. Environment failures always do;
    /// advisory findings and skips never do.
    pub fn is_fatal_failure(&self) -> bool {
        matches!(
            self.failure,
            Some(Failure::Finding) | Some(Failure::Environment)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overall {
    Passed,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Ordered results of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub command: String,
    pub root: PathBuf,
    pub outcome: Overall,
    pub results: Vec<CheckResult>,
    pub summary: Summary,
}

impl RunReport {
    pub fn new(command: &str, root: PathBuf, results: Vec<CheckResult>) -> Self {
        let mut summary = Summary {
            total: results.len(),
            ..Summary::default()
        };
        for r in &results {
            match r.outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Skipped => summary.skipped += 1,
            }
        }
        let outcome = if results.iter().any(CheckResult::is_fatal_failure) {
            Overall::Failed
        } else {
            Overall::Passed
        };
        Self {
            command: command.to_string(),
            root,
            outcome,
            results,
            summary,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == Overall::Passed
    }

    /// 0 passed, 1 finding, 2 environment unavailable.
    pub fn exit_code(&self) -> i32 {
        let environment = self
            .results
            .iter()
            .any(|r| r.failure == Some(Failure::Environment));
        if environment {
            2
        } else if self.passed() {
            0
        } else {
            1
        }
    }
}
