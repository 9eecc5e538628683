use std::path::{Path, PathBuf};

use crate::config::Isolation;
use crate::discovery::FileSet;
use crate::profile::{BASELINE_TOKEN, Check, FILES_TOKEN};
use crate::sandbox::{self, ToolCommand};

/// Mount point of the scan root inside containers.
pub const CONTAINER_ROOT: &str = "/work";

/// How tool commands are turned into processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub isolation: Isolation,
    pub engine: String,
    pub root: PathBuf,
}

/// Expand a command template. `{files}` becomes one argument per file,
/// `{baseline}` becomes the baseline path; everything else is kept as is.
pub fn expand(template: &[String], files: &FileSet, baseline: &Path) -> Vec<String> {
    let mut argv = Vec::with_capacity(template.len() + files.len());
    for arg in template {
        match arg.as_str() {
            FILES_TOKEN => argv.extend(files.to_args()),
            BASELINE_TOKEN => argv.push(baseline.to_string_lossy().replace('\\', "/")),
            _ => argv.push(arg.clone()),
        }
    }
    argv
}

/// Build the process for one tool invocation. `argv[0]` is the program.
pub fn tool_command(env: &Environment, check: &Check, argv: &[String]) -> ToolCommand {
    match env.isolation {
        Isolation::Docker => container_command(env, &check.image, argv),
        Isolation::Host => host_command(env, argv),
    }
}

/// Build a `docker run` command. The program is forced through
/// `--entrypoint` so images with a different default entrypoint behave
/// the same.
pub fn container_command(env: &Environment, image: &str, argv: &[String]) -> ToolCommand {
    let (program, rest) = match argv.split_first() {
        Some((program, rest)) => (program.as_str(), rest),
        None => ("", argv),
    };

    let mut args = vec![
        "run".into(),
        "--rm".into(),
        "-v".into(),
        format!("{}:{CONTAINER_ROOT}", env.root.display()),
        "-w".into(),
        CONTAINER_ROOT.into(),
    ];
    args.extend(sandbox::user_args());
    args.extend([
        "--entrypoint".into(),
        program.to_string(),
        image.to_string(),
    ]);
    args.extend(rest.iter().cloned());

    ToolCommand {
        program: env.engine.clone(),
        args,
        work_dir: env.root.clone(),
    }
}

/// Run the tool straight from `PATH` with the scan root as working directory.
pub fn host_command(env: &Environment, argv: &[String]) -> ToolCommand {
    let (program, args) = match argv.split_first() {
        Some((program, rest)) => (program.clone(), rest.to_vec()),
        None => (String::new(), Vec::new()),
    };
    ToolCommand {
        program,
        args,
        work_dir: env.root.clone(),
    }
}
