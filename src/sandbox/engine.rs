use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};

/// Verify that the container engine daemon is reachable.
pub fn ensure_available(engine: &str) -> Result<()> {
    let status = Command::new(engine)
        .args(["version", "--format", "{{.Server.Version}}"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| {
            Error::EnvironmentUnavailable(format!(
                "failed to invoke `{engine}` (is it installed and on PATH?): {e}"
            ))
        })?;

    if !status.success() {
        return Err(Error::EnvironmentUnavailable(format!(
            "{engine} daemon is not running ({status})"
        )));
    }
    debug!(engine, "container engine available");
    Ok(())
}

/// Returns `["--user", "uid:gid"]` on Unix so containers write files
/// as the invoking user. Empty on other platforms.
pub fn user_args() -> Vec<String> {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() and getegid() are simple POSIX getters that always succeed and have no side effects.
        let uid = unsafe { libc::geteuid() };
        let gid = unsafe { libc::getegid() };
        vec!["--user".into(), format!("{uid}:{gid}")]
    }

    #[cfg(not(unix))]
    {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_engine_is_environment_unavailable() {
        let err = ensure_available("lintdock-no-such-engine").unwrap_err();
        assert!(matches!(err, Error::EnvironmentUnavailable(_)));
    }

    #[cfg(unix)]
    #[test]
    fn user_args_returns_pair() {
        let args = user_args();
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], "--user");
        assert!(args[1].contains(':'));
    }
}
