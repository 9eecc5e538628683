#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch repository plus a directory of fake tools put first on `PATH`.
pub struct TestRepo {
    _tmp: TempDir,
    pub root: PathBuf,
    bin: PathBuf,
}

impl TestRepo {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("repo");
        let bin = tmp.path().join("bin");
        fs::create_dir_all(&root).expect("create repo");
        fs::create_dir_all(&bin).expect("create bin");
        Self {
            _tmp: tmp,
            root,
            bin,
        }
    }

    pub fn file(&self, rel: &str, contents: &str) -> &Self {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, contents).expect("write file");
        self
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Install a fake tool: a shell script whose body is `script`.
    /// Every invocation is appended to `calls.log` in the bin directory.
    #[cfg(unix)]
    pub fn tool(&self, name: &str, script: &str) -> &Self {
        use std::os::unix::fs::PermissionsExt;

        let log = self.bin.join("calls.log");
        let path = self.bin.join(name);
        let body = format!(
            "#!/bin/sh\necho \"{name} $*\" >> '{}'\n{script}\n",
            log.display()
        );
        fs::write(&path, body).expect("write tool");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod tool");
        self
    }

    /// Tool invocations recorded so far, one `program args...` per line.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.bin.join("calls.log"))
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// `lintdock --root <repo> --isolation host` with fake tools on `PATH`.
    pub fn cmd(&self) -> Command {
        let path = std::env::var_os("PATH").unwrap_or_default();
        let mut paths = vec![self.bin.clone()];
        paths.extend(std::env::split_paths(&path));
        let joined = std::env::join_paths(paths).expect("join PATH");

        let mut cmd = cargo_bin_cmd!("lintdock");
        cmd.env("PATH", joined)
            .env_remove("RUST_LOG")
            .arg("--root")
            .arg(&self.root)
            .args(["--isolation", "host"]);
        cmd
    }

    /// `lintdock --root <repo>` using container isolation.
    pub fn docker_cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("lintdock");
        cmd.env_remove("RUST_LOG").arg("--root").arg(&self.root);
        cmd
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read file")
}
