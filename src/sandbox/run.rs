use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::debug;

use crate::error::{Error, Result};

use super::types::{OutputLine, ToolCommand, ToolResult};

/// Spawn a tool and return a channel that streams its output.
///
/// The caller receives [`OutputLine::Stdout`]/[`OutputLine::Stderr`] as they
/// arrive, followed by exactly one [`OutputLine::Done`] carrying the final
/// result. A program that cannot be found is reported as
/// [`Error::EnvironmentUnavailable`].
pub fn spawn(cmd: ToolCommand) -> Result<Receiver<OutputLine>> {
    let mut child = Command::new(&cmd.program)
        .args(&cmd.args)
        .current_dir(&cmd.work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => Error::EnvironmentUnavailable(
                format!("failed to start `{}`: {e}", cmd.program),
            ),
            _ => Error::Io(e),
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        orchestrate(child, stdout, stderr, tx);
    });

    Ok(rx)
}

/// Run a tool to completion, forwarding each line to the debug log.
pub fn run(cmd: ToolCommand) -> Result<ToolResult> {
    let program = cmd.program.clone();
    let rx = spawn(cmd)?;

    for line in rx {
        match line {
            OutputLine::Stdout(l) | OutputLine::Stderr(l) => {
                debug!(target: "lintdock::tool", "{program}: {l}");
            }
            OutputLine::Done(result) => return Ok(result),
        }
    }

    Err(Error::EnvironmentUnavailable(format!(
        "`{program}` exited without reporting a status"
    )))
}

fn orchestrate(
    mut child: Child,
    stdout: Option<std::process::ChildStdout>,
    stderr: Option<std::process::ChildStderr>,
    tx: Sender<OutputLine>,
) {
    // Interleaved stdout+stderr, plus stdout on its own.
    let log_buf = Arc::new(Mutex::new(String::new()));
    let out_buf = Arc::new(Mutex::new(String::new()));

    let stdout_handle = stdout.map(|s| {
        reader_thread(s, tx.clone(), log_buf.clone(), Some(out_buf.clone()), OutputLine::Stdout)
    });
    let stderr_handle =
        stderr.map(|s| reader_thread(s, tx.clone(), log_buf.clone(), None, OutputLine::Stderr));

    let exit_status = child.wait().ok();

    if let Some(h) = stdout_handle {
        let _ = h.join();
    }
    if let Some(h) = stderr_handle {
        let _ = h.join();
    }

    let exit_code = exit_status.and_then(|s| s.code());
    let log = log_buf.lock().map(|b| b.clone()).unwrap_or_default();
    let stdout = out_buf.lock().map(|b| b.clone()).unwrap_or_default();

    // Receiver may be dropped; ignore send errors.
    let _ = tx.send(OutputLine::Done(ToolResult {
        success: exit_code == Some(0),
        exit_code,
        stdout,
        log,
    }));
}

fn reader_thread<R: Read + Send + 'static>(
    source: R,
    tx: Sender<OutputLine>,
    log_buf: Arc<Mutex<String>>,
    own_buf: Option<Arc<Mutex<String>>>,
    wrap: fn(String) -> OutputLine,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let reader = BufReader::new(source);
        for line in reader.lines() {
            let Ok(l) = line else { break };
            for buf in std::iter::once(&log_buf).chain(own_buf.as_ref()) {
                if let Ok(mut buf) = buf.lock() {
                    buf.push_str(&l);
                    buf.push('\n');
                }
            }
            let _ = tx.send(wrap(l));
        }
    })
}
