use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder expanded to the discovered file list.
pub const FILES_TOKEN: &str = "{files}";
/// Placeholder expanded to the secret baseline path.
pub const BASELINE_TOKEN: &str = "{baseline}";

/// Whether a failing check fails the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fatal,
    Advisory,
}

/// Which subcommand phase a check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Security,
    Lint,
    Format,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Security => "security",
            Phase::Lint => "lint",
            Phase::Format => "format",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external tool invocation. Command vectors are already split into
/// arguments; the first element is the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: String,
    pub phase: Phase,
    pub severity: Severity,
    pub image: String,
    pub command: Vec<String>,
    /// Auto-fix variant; only format checks have one.
    pub fix_command: Option<Vec<String>>,
    /// Generate command for baseline-managed checks. When set, `command`
    /// is the audit step.
    pub baseline_command: Option<Vec<String>>,
}

impl Check {
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    pub fn is_baseline_managed(&self) -> bool {
        self.baseline_command.is_some()
    }
}

/// A supported file-type family and its checks, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageProfile {
    pub name: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Applies regardless of detected files (secret scanning).
    pub global: bool,
    pub checks: Vec<Check>,
}

impl LanguageProfile {
    pub fn checks_in<'a>(&'a self, phases: &'a [Phase]) -> impl Iterator<Item = &'a Check> + 'a {
        self.checks.iter().filter(move |c| phases.contains(&c.phase))
    }
}
