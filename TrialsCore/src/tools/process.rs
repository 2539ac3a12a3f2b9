//! Subprocess execution with a hard timeout
//!
//! Exit status is the only success signal consumed from the external tools;
//! stdout and stderr are captured for logging and for the few callers that
//! scan labeled lines.

use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Timeout applied when a caller does not pick one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const WAIT_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of a finished tool invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Display name of the tool (file name of the executable)
    pub tool: String,
    /// Exit code; `None` when the process was terminated by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the tool exited with status zero
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Convert a non-zero exit into [`Error::ToolFailed`]
    pub fn ensure_success(self) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }
        let detail = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        Err(Error::ToolFailed {
            tool: self.tool.clone(),
            status: self.status.unwrap_or(-1),
            stderr: detail.to_string(),
        })
    }
}

/// Builder for a single external tool invocation
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    timeout: Duration,
}

impl ToolCommand {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Run the tool from `dir` instead of the current directory
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Spawn the tool and wait for it to exit
    ///
    /// A tool that outlives the timeout is killed and reported as
    /// [`Error::ToolTimeout`].
    pub fn run(&self) -> Result<ToolOutput> {
        let tool = tool_name(&self.program);
        tracing::debug!(tool = %tool, args = ?self.args, "Running external tool");

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ToolNotFound {
                    name: self.program.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let Some(status) = wait_with_timeout(&mut child, self.timeout)? else {
            // The readers are left detached; they finish once the pipes close.
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(tool = %tool, timeout = ?self.timeout, "External tool timed out and was killed");
            return Err(Error::ToolTimeout {
                tool,
                seconds: self.timeout.as_secs(),
            });
        };

        let output = ToolOutput {
            tool,
            status: status.code(),
            stdout: collect(stdout),
            stderr: collect(stderr),
        };

        if output.success() {
            tracing::debug!(tool = %output.tool, "External tool finished");
        } else {
            tracing::warn!(
                tool = %output.tool,
                status = ?output.status,
                stderr = %output.stderr.trim(),
                "External tool exited with failure"
            );
        }
        Ok(output)
    }
}

/// Run `program` with `args`, waiting at most `timeout`
pub fn run_tool<I, S>(program: &Path, args: I, timeout: Duration) -> Result<ToolOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    ToolCommand::new(program).args(args).timeout(timeout).run()
}

fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map_or_else(|| program.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(WAIT_INTERVAL);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_output_and_status() {
        let output = ToolCommand::new("sh")
            .args(["-c", "echo hello; echo oops >&2; exit 3"])
            .run()
            .unwrap();
        assert_eq!(output.tool, "sh");
        assert_eq!(output.status, Some(3));
        assert_eq!(output.stdout.trim(), "hello");

        let err = output.ensure_success().unwrap_err();
        match err {
            Error::ToolFailed { status, stderr, .. } => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_success() {
        let output = run_tool(Path::new("sh"), ["-c", "exit 0"], DEFAULT_TIMEOUT).unwrap();
        assert!(output.success());
        assert!(output.ensure_success().is_ok());
    }

    #[test]
    fn test_timeout_kills_the_tool() {
        let started = Instant::now();
        let err = ToolCommand::new("sh")
            .args(["-c", "sleep 5"])
            .timeout(Duration::from_millis(200))
            .run()
            .unwrap_err();
        assert!(matches!(err, Error::ToolTimeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_missing_executable() {
        let err = ToolCommand::new("/definitely/not/a/real/tool").run().unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn test_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = ToolCommand::new("sh")
            .args(["-c", "pwd"])
            .current_dir(dir.path())
            .run()
            .unwrap();
        let reported = std::fs::canonicalize(output.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }
}
