use std::path::PathBuf;

/// A fully assembled process invocation. For container isolation `program`
/// is the engine binary and `args` starts with `run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
}

/// Outcome of one tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    /// Standard output alone, in order.
    pub stdout: String,
    /// Standard output and error interleaved as they arrived.
    pub log: String,
}

/// Streamed output from a running tool.
#[derive(Debug)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
    Done(ToolResult),
}
