use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where tools execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Isolation {
    /// Disposable container with the tree mounted at `/work`.
    Docker,
    /// Directly on the host, tools resolved from `PATH`.
    Host,
}

impl Isolation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Isolation::Docker => "docker",
            Isolation::Host => "host",
        }
    }
}

/// Per-language include/exclude override. `None` keeps the built-in value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageOverride {
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub isolation: Isolation,
    pub engine: String,
    /// Explicit shell script to check instead of auto-discovery.
    pub script: Option<PathBuf>,
    pub baseline: PathBuf,
    /// Extra exclude globs applied to every language.
    pub exclude: Vec<String>,
    pub languages: HashMap<String, LanguageOverride>,
    /// Container image per check name.
    pub images: HashMap<String, String>,
    /// Extra arguments per check name, appended to the command template.
    pub extra_args: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            isolation: Isolation::Docker,
            engine: "docker".to_string(),
            script: None,
            baseline: PathBuf::from(".secrets.baseline"),
            exclude: Vec::new(),
            languages: HashMap::new(),
            images: HashMap::new(),
            extra_args: HashMap::new(),
        }
    }
}
