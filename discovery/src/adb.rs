//! Device access through the `adb` executable.
//!
//! Every call runs a single `adb shell ...` command with a bounded wait.
//! Stdout and stderr are drained on background threads so a chatty child
//! cannot block on a full pipe before it exits.

use std::io::{ErrorKind, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;
use wait_timeout::ChildExt;

use crate::config::{DEFAULT_ADB_PATH, StatConfig};
use crate::error::{ReaderError, Result};
use crate::parser::split_lines;

/// Header line printed by `ps -A -o NAME`.
const PS_NAME_HEADER: &str = "NAME";

/// Runs `adb shell` commands against the attached device.
#[derive(Debug, Clone)]
pub struct AdbReader {
    adb_path: String,
    timeout: Duration,
}

impl AdbReader {
    pub fn new(adb_path: impl Into<String>, timeout: Duration) -> Self {
        let adb_path = adb_path.into();
        let adb_path = if adb_path.trim().is_empty() {
            DEFAULT_ADB_PATH.to_string()
        } else {
            adb_path
        };
        Self { adb_path, timeout }
    }

    pub fn from_config(config: &StatConfig) -> Self {
        Self::new(config.adb_path(), config.timeout())
    }

    pub fn adb_path(&self) -> &str {
        &self.adb_path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves the pid of the process running `package`.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::InvalidPackage`] for an empty name and
    /// [`ReaderError::ProcessNotFound`] when `pidof` prints nothing usable.
    /// `pidof` exits with status 1 when nothing matches, so a failed run
    /// without output is also reported as not found.
    pub fn pid_of(&self, package: &str) -> Result<u32> {
        let package = package.trim();
        if package.is_empty() {
            return Err(ReaderError::InvalidPackage);
        }
        let output = self.run(&["pidof", package])?;
        if !output.status.success() && output.stdout.trim().is_empty() {
            debug!(package, status = %output.status, "pidof found no process");
            return Err(ReaderError::ProcessNotFound(package.to_string()));
        }
        let stdout = output.into_stdout()?;
        parse_pid_output(&stdout).ok_or_else(|| ReaderError::ProcessNotFound(package.to_string()))
    }

    /// Captures `dumpsys meminfo <pid>` and returns its lines.
    pub fn dump_meminfo(&self, pid: u32) -> Result<Vec<String>> {
        let pid = pid.to_string();
        let output = self.shell(&["dumpsys", "meminfo", &pid])?;
        Ok(split_lines(&output)
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Lists the names of running processes that look like packages.
    pub fn packages(&self) -> Result<Vec<String>> {
        let output = self.shell(&["ps", "-A", "-o", PS_NAME_HEADER])?;
        Ok(parse_process_names(&output))
    }

    fn shell(&self, args: &[&str]) -> Result<String> {
        self.run(args)?.into_stdout()
    }

    fn run(&self, args: &[&str]) -> Result<ShellOutput> {
        let mut cmd_parts = vec![self.adb_path.as_str(), "shell"];
        cmd_parts.extend_from_slice(args);
        let command_line = cmd_parts.join(" ");

        let mut child = Command::new(&self.adb_path)
            .arg("shell")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    debug!(command = ?cmd_parts, "adb executable not found");
                }
                ReaderError::IoError(e)
            })?;

        let stdout_thread = child.stdout.take().map(drain);
        let stderr_thread = child.stderr.take().map(drain);

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                debug!(
                    command = ?cmd_parts,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "adb command timed out, killing process"
                );
                let _ = child.kill();
                let _ = child.wait();
                return Err(ReaderError::Timeout {
                    command: command_line,
                    timeout_ms: self.timeout.as_millis() as u64,
                });
            }
            Err(e) => {
                debug!(command = ?cmd_parts, error = %e, "Failed to wait on adb command");
                let _ = child.kill();
                let _ = child.wait();
                return Err(ReaderError::IoError(e));
            }
        };

        let stdout = collect(stdout_thread, &cmd_parts, "stdout");
        let stderr = collect(stderr_thread, &cmd_parts, "stderr");

        debug!(
            command = ?cmd_parts,
            status = %status,
            output_len = stdout.len(),
            "adb command finished"
        );
        Ok(ShellOutput {
            command: command_line,
            status,
            stdout,
            stderr,
        })
    }
}

/// Result of one finished `adb shell` command.
struct ShellOutput {
    command: String,
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

impl ShellOutput {
    /// Stdout of a successful run.
    fn into_stdout(self) -> Result<String> {
        if !self.status.success() {
            return Err(ReaderError::CommandFailed {
                command: self.command,
                status: self.status.to_string(),
                stderr: self.stderr.trim().to_string(),
            });
        }
        Ok(self.stdout)
    }
}

type Drained = (Vec<u8>, std::io::Result<usize>);

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Drained> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let result = pipe.read_to_end(&mut buf);
        (buf, result)
    })
}

fn collect(handle: Option<JoinHandle<Drained>>, cmd_parts: &[&str], stream: &str) -> String {
    let buf = handle
        .and_then(|t| t.join().ok())
        .map(|(buf, res)| {
            if let Err(e) = res {
                debug!(command = ?cmd_parts, stream, error = %e, "Failed to read output");
            }
            buf
        })
        .unwrap_or_default();
    String::from_utf8_lossy(&buf).into_owned()
}

/// Extracts the pid from `pidof` output.
///
/// `pidof` prints every matching pid separated by spaces; the first one is
/// used.
///
/// ```
/// use androidstat_discovery::adb::parse_pid_output;
///
/// assert_eq!(parse_pid_output("4321 4400\n"), Some(4321));
/// assert_eq!(parse_pid_output(""), None);
/// ```
pub fn parse_pid_output(output: &str) -> Option<u32> {
    output.split_whitespace().next()?.parse().ok()
}

/// Extracts process names from `ps -A -o NAME` output.
///
/// Drops the header and kernel threads (bracketed names).
pub fn parse_process_names(output: &str) -> Vec<String> {
    split_lines(output)
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != PS_NAME_HEADER && !name.starts_with('['))
        .map(str::to_string)
        .collect()
}
