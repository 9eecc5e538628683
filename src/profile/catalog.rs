use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

use super::types::{Check, LanguageProfile, Phase, Severity};

/// Directories and files no tool should ever see.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/.git",
    "**/.hg",
    "**/.svn",
    "**/.venv",
    "**/venv",
    "**/node_modules",
    "**/__pycache__",
    "**/.terraform",
    "**/.tox",
    "**/.mypy_cache",
    "**/target",
    "**/build",
    "**/dist",
];

struct CheckDef {
    name: &'static str,
    phase: Phase,
    severity: Severity,
    image: &'static str,
    command: &'static str,
    fix: Option<&'static str>,
    baseline: Option<&'static str>,
}

struct ProfileDef {
    name: &'static str,
    include: &'static [&'static str],
    global: bool,
    checks: &'static [CheckDef],
}

const PROFILES: &[ProfileDef] = &[
    ProfileDef {
        name: "shell",
        include: &["**/*.sh", "**/*.bash"],
        global: false,
        checks: &[CheckDef {
            name: "shellcheck",
            phase: Phase::Lint,
            severity: Severity::Fatal,
            image: "koalaman/shellcheck-alpine:stable",
            command: "shellcheck {files}",
            fix: None,
            baseline: None,
        }],
    },
    ProfileDef {
        name: "python",
        include: &["**/*.py"],
        global: false,
        checks: &[
            CheckDef {
                name: "flake8",
                phase: Phase::Lint,
                severity: Severity::Fatal,
                image: "registry.gitlab.com/pipeline-components/flake8:latest",
                command: "flake8 {files}",
                fix: None,
                baseline: None,
            },
            CheckDef {
                name: "pylint",
                phase: Phase::Lint,
                severity: Severity::Advisory,
                image: "registry.gitlab.com/pipeline-components/pylint:latest",
                command: "pylint {files}",
                fix: None,
                baseline: None,
            },
            CheckDef {
                name: "black",
                phase: Phase::Format,
                severity: Severity::Fatal,
                image: "registry.gitlab.com/pipeline-components/black:latest",
                command: "black --check --diff {files}",
                fix: Some("black {files}"),
                baseline: None,
            },
        ],
    },
    ProfileDef {
        name: "terraform",
        include: &["**/*.tf", "**/*.tfvars"],
        global: false,
        checks: &[
            CheckDef {
                name: "tflint",
                phase: Phase::Lint,
                severity: Severity::Fatal,
                image: "ghcr.io/terraform-linters/tflint:latest",
                command: "tflint --recursive",
                fix: None,
                baseline: None,
            },
            CheckDef {
                name: "terraform-fmt",
                phase: Phase::Format,
                severity: Severity::Fatal,
                image: "hashicorp/terraform:latest",
                command: "terraform fmt -check -recursive -diff",
                fix: Some("terraform fmt -recursive"),
                baseline: None,
            },
        ],
    },
    ProfileDef {
        name: "secrets",
        include: &[],
        global: true,
        checks: &[
            CheckDef {
                name: "gitleaks",
                phase: Phase::Security,
                severity: Severity::Fatal,
                image: "zricethezav/gitleaks:latest",
                command: "gitleaks detect --source . --no-git --redact",
                fix: None,
                baseline: None,
            },
            CheckDef {
                name: "detect-secrets",
                phase: Phase::Security,
                severity: Severity::Fatal,
                image: "registry.gitlab.com/pipeline-components/detect-secrets:latest",
                command: "detect-secrets audit --report --fail-on-unaudited {baseline}",
                fix: None,
                baseline: Some("detect-secrets scan --all-files"),
            },
        ],
    },
];

/// Names of the profiles selectable with `lint --language`.
pub fn language_names() -> Vec<&'static str> {
    PROFILES
        .iter()
        .filter(|p| !p.global)
        .map(|p| p.name)
        .collect()
}

/// Build the profile table with config overrides applied.
///
/// Unknown language or check names in the config are rejected so typos
/// don't silently fall back to defaults.
pub fn resolve(cfg: &Config) -> Result<Vec<LanguageProfile>> {
    let languages = language_names();
    for name in cfg.languages.keys() {
        if !languages.contains(&name.as_str()) {
            return Err(Error::Config(format!(
                "unknown language `{name}` (expected one of: {})",
                languages.join(", ")
            )));
        }
    }

    let check_names: Vec<&str> = PROFILES
        .iter()
        .flat_map(|p| p.checks.iter().map(|c| c.name))
        .collect();
    for name in cfg.images.keys().chain(cfg.extra_args.keys()) {
        if !check_names.contains(&name.as_str()) {
            return Err(Error::Config(format!("unknown check `{name}`")));
        }
    }

    PROFILES.iter().map(|def| build_profile(def, cfg)).collect()
}

fn build_profile(def: &ProfileDef, cfg: &Config) -> Result<LanguageProfile> {
    let lang = cfg.languages.get(def.name);

    let include = match lang.and_then(|l| l.include.clone()) {
        Some(include) => include,
        None => owned(def.include),
    };
    let mut exclude = match lang.and_then(|l| l.exclude.clone()) {
        Some(exclude) => exclude,
        None => owned(DEFAULT_EXCLUDES),
    };
    exclude.extend(cfg.exclude.iter().cloned());

    let checks = def
        .checks
        .iter()
        .map(|c| build_check(c, cfg))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        profile = def.name,
        include = include.len(),
        exclude = exclude.len(),
        "resolved profile"
    );

    Ok(LanguageProfile {
        name: def.name.to_string(),
        include,
        exclude,
        global: def.global,
        checks,
    })
}

fn build_check(def: &CheckDef, cfg: &Config) -> Result<Check> {
    let extra = match cfg.extra_args.get(def.name) {
        Some(raw) => split(def.name, raw)?,
        None => Vec::new(),
    };

    let with_extra = |template: &str| -> Result<Vec<String>> {
        let mut args = split(def.name, template)?;
        args.extend(extra.iter().cloned());
        Ok(args)
    };

    Ok(Check {
        name: def.name.to_string(),
        phase: def.phase,
        severity: def.severity,
        image: cfg
            .images
            .get(def.name)
            .cloned()
            .unwrap_or_else(|| def.image.to_string()),
        command: with_extra(def.command)?,
        fix_command: def.fix.map(with_extra).transpose()?,
        baseline_command: def.baseline.map(|t| split(def.name, t)).transpose()?,
    })
}

fn split(check: &str, raw: &str) -> Result<Vec<String>> {
    shell_words::split(raw)
        .map_err(|e| Error::Config(format!("cannot parse arguments for `{check}`: {e}")))
}

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}
