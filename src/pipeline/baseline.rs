//! Secret-scan baseline lifecycle.
//!
//! The baseline is an allow-list file at a fixed path under the scan root.
//! Its state is read from disk on every run:
//!
//! - **absent**: generate it once, then audit it unless generation found
//!   nothing.
//! - **created-empty** (zero bytes): nothing to audit, the check is skipped.
//! - **populated**: audit it; unreviewed findings fail the run.
//!
//! A baseline that exists is never rewritten or deleted here.

use std::path::{Component, Path};

use serde_json::Value;
use tracing::{info, warn};

use crate::discovery::FileSet;
use crate::error::Error;
use crate::profile::Check;

use super::commands::expand;
use super::dispatcher::Dispatcher;
use super::types::CheckResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineState {
    Absent,
    CreatedEmpty,
    Populated,
}

/// Read the current state of the baseline at `path`.
pub fn inspect(path: &Path) -> std::io::Result<BaselineState> {
    match std::fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(BaselineState::CreatedEmpty),
        Ok(_) => Ok(BaselineState::Populated),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BaselineState::Absent),
        Err(e) => Err(e),
    }
}

/// Check that a baseline path stays under the scan root.
///
/// The same path is written on the host and read inside the container,
/// so it must be relative and must not climb out with `..`.
pub fn validate(baseline: &Path) -> crate::error::Result<()> {
    let inside = baseline
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if baseline.as_os_str().is_empty() || !inside {
        return Err(Error::Config(format!(
            "baseline must be a relative path inside the scan root: {}",
            baseline.display()
        )));
    }
    Ok(())
}

/// Number of findings in a generated baseline document, if it is one.
///
/// detect-secrets writes `{"results": {"<file>": [<finding>, ...]}}`.
pub fn count_findings(document: &str) -> Option<usize> {
    let value: Value = serde_json::from_str(document).ok()?;
    let results = value.get("results")?.as_object()?;
    Some(
        results
            .values()
            .map(|v| v.as_array().map_or(0, Vec::len))
            .sum(),
    )
}

/// Run a baseline-managed check: create the baseline if absent, then audit.
///
/// `baseline` is relative to `root`.
pub fn run_check(
    dispatcher: &mut dyn Dispatcher,
    profile: &str,
    check: &Check,
    root: &Path,
    baseline: &Path,
) -> CheckResult {
    let path = root.join(baseline);
    let state = match inspect(&path) {
        Ok(state) => state,
        Err(e) => {
            return CheckResult::finding(
                profile,
                check,
                format!("cannot read baseline {}: {e}", path.display()),
            );
        }
    };

    match state {
        BaselineState::Absent => {
            let Some(generate) = &check.baseline_command else {
                return audit(dispatcher, profile, check, baseline);
            };
            match generate_baseline(dispatcher, profile, check, generate, &path) {
                Ok(Generated::Empty) => CheckResult::skipped(
                    profile,
                    check,
                    format!(
                        "created {} with no findings; nothing to audit",
                        baseline.display()
                    ),
                ),
                Ok(Generated::WithFindings) => audit(dispatcher, profile, check, baseline),
                Err(result) => *result,
            }
        }
        BaselineState::CreatedEmpty => CheckResult::skipped(
            profile,
            check,
            format!("{} is empty; nothing to audit", baseline.display()),
        ),
        BaselineState::Populated => audit(dispatcher, profile, check, baseline),
    }
}

enum Generated {
    Empty,
    WithFindings,
}

fn generate_baseline(
    dispatcher: &mut dyn Dispatcher,
    profile: &str,
    check: &Check,
    generate: &[String],
    path: &Path,
) -> Result<Generated, Box<CheckResult>> {
    info!(path = %path.display(), "baseline absent, generating");
    let result = match dispatcher.invoke(check, generate) {
        Ok(result) => result,
        Err(Error::EnvironmentUnavailable(msg)) => {
            return Err(Box::new(CheckResult::environment(profile, check, msg)));
        }
        Err(e) => return Err(Box::new(CheckResult::finding(profile, check, e.to_string()))),
    };

    if !result.success {
        return Err(Box::new(CheckResult::finding(
            profile,
            check,
            format!("baseline generation failed\n{}", result.log),
        )));
    }

    if let Err(e) = std::fs::write(path, &result.stdout) {
        return Err(Box::new(CheckResult::finding(
            profile,
            check,
            format!("cannot write baseline {}: {e}", path.display()),
        )));
    }

    let empty = result.stdout.trim().is_empty() || count_findings(&result.stdout) == Some(0);
    if empty {
        Ok(Generated::Empty)
    } else {
        Ok(Generated::WithFindings)
    }
}

fn audit(
    dispatcher: &mut dyn Dispatcher,
    profile: &str,
    check: &Check,
    baseline: &Path,
) -> CheckResult {
    let argv = expand(&check.command, &FileSet::default(), baseline);
    match dispatcher.invoke(check, &argv) {
        Ok(result) if result.success => CheckResult::passed(profile, check, result.log),
        Ok(result) => {
            warn!(check = %check.name, "baseline has unreviewed findings");
            CheckResult::finding(profile, check, result.log)
        }
        Err(Error::EnvironmentUnavailable(msg)) => CheckResult::environment(profile, check, msg),
        Err(e) => CheckResult::finding(profile, check, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{Failure, Outcome};
    use crate::profile::{Phase, Severity};
    use crate::sandbox::ToolResult;

    /// Answers generate/audit calls with canned results and records argv.
    struct Scripted {
        generate_stdout: String,
        audit_ok: bool,
        calls: Vec<Vec<String>>,
        unavailable: bool,
    }

    impl Scripted {
        fn new(generate_stdout: &str, audit_ok: bool) -> Self {
            Self {
                generate_stdout: generate_stdout.into(),
                audit_ok,
                calls: Vec::new(),
                unavailable: false,
            }
        }
    }

    impl Dispatcher for Scripted {
        fn invoke(&mut self, _check: &Check, argv: &[String]) -> crate::error::Result<ToolResult> {
            self.calls.push(argv.to_vec());
            if self.unavailable {
                return Err(Error::EnvironmentUnavailable("docker daemon is not running".into()));
            }
            if argv.get(1).map(String::as_str) == Some("scan") {
                Ok(ToolResult {
                    success: true,
                    exit_code: Some(0),
                    stdout: self.generate_stdout.clone(),
                    log: String::new(),
                })
            } else {
                Ok(ToolResult {
                    success: self.audit_ok,
                    exit_code: Some(if self.audit_ok { 0 } else { 1 }),
                    stdout: String::new(),
                    log: if self.audit_ok { "" } else { "1 unaudited secret" }.into(),
                })
            }
        }
    }

    fn detect_secrets() -> Check {
        Check {
            name: "detect-secrets".into(),
            phase: Phase::Security,
            severity: Severity::Fatal,
            image: String::new(),
            command: ["detect-secrets", "audit", "--report", "{baseline}"]
                .map(String::from)
                .to_vec(),
            fix_command: None,
            baseline_command: Some(["detect-secrets", "scan"].map(String::from).to_vec()),
        }
    }

    const EMPTY_SCAN: &str = r#"{"version": "1.5.0", "results": {}}"#;
    const ONE_FINDING: &str =
        r#"{"results": {"config.py": [{"type": "Secret Keyword", "hashed_secret": "ab12"}]}}"#;

    #[test]
    fn inspect_states() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".secrets.baseline");
        assert_eq!(inspect(&path).unwrap(), BaselineState::Absent);
        std::fs::write(&path, "").unwrap();
        assert_eq!(inspect(&path).unwrap(), BaselineState::CreatedEmpty);
        std::fs::write(&path, EMPTY_SCAN).unwrap();
        assert_eq!(inspect(&path).unwrap(), BaselineState::Populated);
    }

    #[test]
    fn validate_keeps_baseline_under_root() {
        for ok in [".secrets.baseline", "./ci/secrets.json", "ci/secrets.json"] {
            assert!(validate(Path::new(ok)).is_ok(), "{ok}");
        }
        for bad in ["", "/tmp/b.json", "../b.json", "ci/../../b.json"] {
            assert!(validate(Path::new(bad)).unwrap_err().is_config(), "{bad}");
        }
    }

    #[test]
    fn count_findings_reads_results() {
        assert_eq!(count_findings(EMPTY_SCAN), Some(0));
        assert_eq!(count_findings(ONE_FINDING), Some(1));
        assert_eq!(count_findings("not json"), None);
    }

    #[test]
    fn absent_baseline_with_no_findings_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut dispatcher = Scripted::new(EMPTY_SCAN, false);

        let result = run_check(
            &mut dispatcher,
            "secrets",
            &detect_secrets(),
            dir.path(),
            Path::new(".secrets.baseline"),
        );

        assert_eq!(result.outcome, Outcome::Skipped);
        assert!(!result.is_fatal_failure());
        assert_eq!(dispatcher.calls.len(), 1, "audit must not run");
        let written = std::fs::read_to_string(dir.path().join(".secrets.baseline")).unwrap();
        assert_eq!(written, EMPTY_SCAN);
    }

    #[test]
    fn absent_baseline_with_no_output_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut dispatcher = Scripted::new("", false);
        let result = run_check(
            &mut dispatcher,
            "secrets",
            &detect_secrets(),
            dir.path(),
            Path::new(".secrets.baseline"),
        );
        assert_eq!(result.outcome, Outcome::Skipped);
    }

    #[test]
    fn absent_baseline_with_findings_is_audited() {
        let dir = tempfile::tempdir().unwrap();
        let mut dispatcher = Scripted::new(ONE_FINDING, true);
        let result = run_check(
            &mut dispatcher,
            "secrets",
            &detect_secrets(),
            dir.path(),
            Path::new(".secrets.baseline"),
        );
        assert_eq!(result.outcome, Outcome::Passed);
        assert_eq!(dispatcher.calls.len(), 2);
        assert_eq!(
            dispatcher.calls[1],
            ["detect-secrets", "audit", "--report", ".secrets.baseline"]
        );
    }

    #[test]
    fn populated_baseline_with_unreviewed_finding_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".secrets.baseline"), ONE_FINDING).unwrap();
        let mut dispatcher = Scripted::new("", false);

        let result = run_check(
            &mut dispatcher,
            "secrets",
            &detect_secrets(),
            dir.path(),
            Path::new(".secrets.baseline"),
        );

        assert_eq!(result.outcome, Outcome::Failed);
        assert_eq!(result.failure, Some(Failure::Finding));
        assert!(result.diagnostic.contains("unaudited"));
        assert_eq!(dispatcher.calls.len(), 1, "must not regenerate");
        let kept = std::fs::read_to_string(dir.path().join(".secrets.baseline")).unwrap();
        assert_eq!(kept, ONE_FINDING);
    }

    #[test]
    fn created_empty_baseline_is_skipped_without_invoking() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".secrets.baseline"), "").unwrap();
        let mut dispatcher = Scripted::new(ONE_FINDING, false);
        let result = run_check(
            &mut dispatcher,
            "secrets",
            &detect_secrets(),
            dir.path(),
            Path::new(".secrets.baseline"),
        );
        assert_eq!(result.outcome, Outcome::Skipped);
        assert!(dispatcher.calls.is_empty());
    }

    #[test]
    fn environment_unavailable_during_generation() {
        let dir = tempfile::tempdir().unwrap();
        let mut dispatcher = Scripted::new(EMPTY_SCAN, true);
        dispatcher.unavailable = true;
        let result = run_check(
            &mut dispatcher,
            "secrets",
            &detect_secrets(),
            dir.path(),
            Path::new(".secrets.baseline"),
        );
        assert_eq!(result.failure, Some(Failure::Environment));
        assert!(!dir.path().join(".secrets.baseline").exists());
    }
}
