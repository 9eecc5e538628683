use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::types::Config;

pub const CONFIG_FILE: &str = ".lintdock.yml";

/// Load config from `.lintdock.yml` in the given directory.
///
/// A missing file yields the defaults; a present but malformed file is an error.
pub fn load(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        debug!("no {CONFIG_FILE} in {}, using defaults", dir.display());
        return Ok(Config::default());
    }
    load_file(&path)
}

/// Load config from an explicit path, which must exist.
pub fn load_file(path: &Path) -> Result<Config> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let config: Config =
        serde_yaml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    debug!("loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Isolation;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(dir.path()).unwrap();
        assert_eq!(cfg.isolation, Isolation::Docker);
    }

    #[test]
    fn reads_file_from_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "engine: podman\n").unwrap();
        let cfg = load(dir.path()).unwrap();
        assert_eq!(cfg.engine, "podman");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "exclude: [unterminated\n").unwrap();
        assert!(load(dir.path()).is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file(&dir.path().join("nope.yml")).is_err());
    }
}
