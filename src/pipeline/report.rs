use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use super::types::{Outcome, Overall, RunReport};

/// Human-readable report: one line per check, diagnostics of failed checks
/// indented below them, then the overall line.
pub fn render_text(report: &RunReport) -> String {
    let width = report
        .results
        .iter()
        .map(|r| r.profile.len() + r.check.len() + 1)
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for r in &report.results {
        let name = format!("{}/{}", r.profile, r.check);
        let _ = write!(out, "{name:<width$}  {}", r.outcome.label());
        match (r.outcome, r.failure) {
            (Outcome::Failed, Some(failure)) => {
                let _ = writeln!(out, "  [{failure}]");
            }
            (Outcome::Skipped, _) if !r.diagnostic.is_empty() => {
                let _ = writeln!(out, "  ({})", r.diagnostic);
            }
            _ => out.push('\n'),
        }
        if r.outcome == Outcome::Failed {
            for line in r.diagnostic.lines() {
                let _ = writeln!(out, "    {line}");
            }
        }
    }

    let overall = match report.outcome {
        Overall::Passed => "PASS",
        Overall::Failed => "FAIL",
    };
    let s = &report.summary;
    let _ = writeln!(
        out,
        "overall: {overall} ({} passed, {} failed, {} skipped)",
        s.passed, s.failed, s.skipped
    );
    out
}

pub fn render_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("serialize report")
}

/// Write the JSON report to `path`.
pub fn write_json(report: &RunReport, path: &Path) -> Result<()> {
    let json = render_json(report)?;
    std::fs::write(path, json).with_context(|| format!("write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{CheckResult, RunReport};
    use crate::profile::{Check, Phase, Severity};
    use std::path::PathBuf;

    fn check(name: &str, severity: Severity) -> Check {
        Check {
            name: name.into(),
            phase: Phase::Lint,
            severity,
            image: String::new(),
            command: vec![name.into()],
            fix_command: None,
            baseline_command: None,
        }
    }

    fn sample() -> RunReport {
        RunReport::new(
            "lint",
            PathBuf::from("/repo"),
            vec![
                CheckResult::skipped("shell", &check("shellcheck", Severity::Fatal), "no matching files"),
                CheckResult::finding(
                    "python",
                    &check("flake8", Severity::Fatal),
                    "app.py:1:80: E501 line too long\n".into(),
                ),
                CheckResult::passed("terraform", &check("tflint", Severity::Fatal), String::new()),
            ],
        )
    }

    #[test]
    fn text_has_one_line_per_check_and_overall() {
        let text = render_text(&sample());
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].starts_with("shell/shellcheck"));
        assert!(lines[0].contains("SKIP"));
        assert!(lines[1].starts_with("python/flake8"));
        assert!(lines[1].ends_with("FAIL  [finding]"));
        assert_eq!(lines[2], "    app.py:1:80: E501 line too long");
        assert!(lines[3].contains("PASS"));
        assert_eq!(
            lines.last().unwrap(),
            &"overall: FAIL (1 passed, 1 failed, 1 skipped)"
        );
    }

    #[test]
    fn json_round_trips_results() {
        let json = render_json(&sample()).unwrap();
        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn write_json_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json(&sample(), &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["command"], "lint");
        assert_eq!(value["summary"]["total"], 3);
    }
}
