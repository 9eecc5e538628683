use std::path::Path;

use tracing::{info, warn};

use crate::discovery::{self, FileSet};
use crate::error::{Error, Result};
use crate::profile::{Check, LanguageProfile, language_names};

use super::baseline;
use super::commands::expand;
use super::dispatcher::Dispatcher;
use super::types::{CheckResult, Failure, Outcome, PipelineInput, RunReport};

/// Profile that an explicit script override replaces discovery for.
pub const SHELL_PROFILE: &str = "shell";

const NO_FILES: &str = "no matching files";
const NOT_RUN: &str = "not run: an earlier fatal check in this profile failed";

/// Run every selected check, one at a time, and aggregate the results.
///
/// All file sets are resolved before the first tool starts, so a
/// configuration error never leaves a partial run behind.
pub fn run_pipeline(input: &PipelineInput, dispatcher: &mut dyn Dispatcher) -> Result<RunReport> {
    let phases = input.task.phases();
    let selected = select_profiles(input)?;
    baseline::validate(&input.baseline)?;
    let plan = resolve_file_sets(input, &selected)?;

    let declared: Vec<(String, String)> = plan
        .iter()
        .flat_map(|(p, _)| {
            p.checks_in(phases)
                .map(move |c| (p.name.clone(), c.name.clone()))
        })
        .collect();
    let mut aggregator = Aggregator::new(declared);

    for (profile, files) in &plan {
        let checks: Vec<&Check> = profile.checks_in(phases).collect();
        if !profile.global && files.is_empty() {
            info!(profile = %profile.name, "no matching files, skipping");
            for check in checks {
                aggregator.record(CheckResult::skipped(&profile.name, check, NO_FILES));
            }
            continue;
        }

        let mut aborted = false;
        for check in checks {
            if aborted {
                aggregator.record(CheckResult::skipped(&profile.name, check, NOT_RUN));
                continue;
            }
            let result = if check.is_baseline_managed() {
                baseline::run_check(dispatcher, &profile.name, check, &input.root, &input.baseline)
            } else {
                run_check(dispatcher, &profile.name, check, files, input)
            };
            // An unavailable environment is not a finding: later checks still
            // go through the dispatcher and fail fast on their own.
            if result.failure == Some(Failure::Environment) {
                warn!(profile = %profile.name, check = %check.name, "environment unavailable");
            } else if result.is_fatal_failure() {
                warn!(profile = %profile.name, check = %check.name, "fatal check failed");
                aborted = true;
            }
            aggregator.record(result);
        }
    }

    Ok(aggregator.finish(input.task.name(), &input.root))
}

/// Run one non-baseline check against its file set.
pub fn run_check(
    dispatcher: &mut dyn Dispatcher,
    profile: &str,
    check: &Check,
    files: &FileSet,
    input: &PipelineInput,
) -> CheckResult {
    let template = match (&check.fix_command, input.task.fix()) {
        (Some(fix), true) => fix,
        _ => &check.command,
    };
    let argv = expand(template, files, &input.baseline);

    match dispatcher.invoke(check, &argv) {
        Ok(result) if result.success => CheckResult::passed(profile, check, result.log),
        Ok(result) => CheckResult::finding(profile, check, result.log),
        Err(Error::EnvironmentUnavailable(msg)) => CheckResult::environment(profile, check, msg),
        Err(e) => CheckResult::finding(profile, check, e.to_string()),
    }
}

/// Profiles taking part in this task, in declared order.
fn select_profiles(input: &PipelineInput) -> Result<Vec<&LanguageProfile>> {
    let phases = input.task.phases();
    if let Some(lang) = input.task.language()
        && !input.profiles.iter().any(|p| !p.global && p.name == lang)
    {
        return Err(Error::Config(format!(
            "unknown language `{lang}` (expected one of: {})",
            language_names().join(", ")
        )));
    }

    Ok(input
        .profiles
        .iter()
        .filter(|p| input.task.language().is_none_or(|lang| p.name == lang))
        .filter(|p| p.checks_in(phases).next().is_some())
        .collect())
}

/// Resolve the file set of every selected profile.
fn resolve_file_sets<'a>(
    input: &PipelineInput,
    selected: &[&'a LanguageProfile],
) -> Result<Vec<(&'a LanguageProfile, FileSet)>> {
    // The override is validated even when the shell profile isn't selected.
    let script = match &input.script {
        Some(path) => Some(discovery::script_override(&input.root, path)?),
        None => None,
    };

    selected
        .iter()
        .map(|&profile| {
            let files = if profile.global {
                FileSet::default()
            } else if let (SHELL_PROFILE, Some(script)) = (profile.name.as_str(), &script) {
                script.clone()
            } else {
                discover(&input.root, profile)?
            };
            Ok((profile, files))
        })
        .collect()
}

fn discover(root: &Path, profile: &LanguageProfile) -> Result<FileSet> {
    let files = discovery::discover(root, profile)?;
    info!(profile = %profile.name, files = files.len(), "file set");
    Ok(files)
}

/// Collects results and reports them in declared order, whatever order
/// they arrive in.
pub struct Aggregator {
    declared: Vec<(String, String)>,
    results: Vec<Option<CheckResult>>,
}

impl Aggregator {
    pub fn new(declared: impl IntoIterator<Item = (String, String)>) -> Self {
        let declared: Vec<_> = declared.into_iter().collect();
        let results = vec![None; declared.len()];
        Self { declared, results }
    }

    pub fn record(&mut self, result: CheckResult) {
        let slot = self
            .declared
            .iter()
            .position(|(p, c)| *p == result.profile && *c == result.check);
        match slot {
            Some(i) => {
                let label = match result.outcome {
                    Outcome::Passed => "passed",
                    Outcome::Failed => "failed",
                    Outcome::Skipped => "skipped",
                };
                info!(profile = %result.profile, check = %result.check, "{label}");
                self.results[i] = Some(result);
            }
            None => warn!(check = %result.check, "dropping result for undeclared check"),
        }
    }

    pub fn finish(self, command: &str, root: &Path) -> RunReport {
        let results = self.results.into_iter().flatten().collect();
        RunReport::new(command, root.to_path_buf(), results)
    }
}
