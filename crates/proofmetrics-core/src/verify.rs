use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::VerifyConfig;

/// How often a running verifier is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Why a verification call produced no timing sample.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("verification of {} timed out after {}s", .path.display(), .timeout.as_secs_f64())]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("verifier `{program}` not found in PATH")]
    ToolUnavailable { program: String },

    #[error("no verifier command configured")]
    NoCommand,

    #[error("failed to run verifier on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Something that can verify one source file and report how long it took.
pub trait Verifier {
    /// Verify `path`. The returned duration is wall time around the call.
    fn verify(&mut self, path: &Path) -> Result<Duration, VerifyError>;

    /// False once the verifier has given up for the rest of the run.
    fn is_available(&self) -> bool {
        true
    }
}

/// Runs an external verifier as a blocking subprocess with a timeout.
///
/// Elapsed time is measured regardless of the process exit status: a run that
/// fails verification still reports its wall time.
pub struct ProcessVerifier {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    available: Option<bool>,
}

impl ProcessVerifier {
    pub fn new(command: &[String], timeout: Duration) -> Self {
        let (program, args) = match command.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };
        Self {
            program,
            args,
            timeout,
            available: None,
        }
    }

    pub fn from_config(config: &VerifyConfig) -> Self {
        Self::new(&config.command, Duration::from_secs(config.timeout_secs))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn tool_found(&mut self) -> bool {
        *self.available.get_or_insert_with(|| {
            !self.program.is_empty() && which::which(&self.program).is_ok()
        })
    }

    fn unavailable(&mut self) -> VerifyError {
        self.available = Some(false);
        if self.program.is_empty() {
            VerifyError::NoCommand
        } else {
            VerifyError::ToolUnavailable {
                program: self.program.clone(),
            }
        }
    }
}

impl Verifier for ProcessVerifier {
    fn verify(&mut self, path: &Path) -> Result<Duration, VerifyError> {
        if !self.tool_found() {
            return Err(self.unavailable());
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        // Run from the file's directory so relative includes resolve.
        match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
                cmd.current_dir(parent).arg(name);
            }
            _ => {
                cmd.arg(path);
            }
        }

        let start = Instant::now();
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(self.unavailable()),
            Err(source) => {
                return Err(VerifyError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let elapsed = start.elapsed();
                    if !status.success() {
                        log::debug!(
                            "verifier exited with {status} for {}; timing still counted",
                            path.display()
                        );
                    }
                    return Ok(elapsed);
                }
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(VerifyError::Timeout {
                            path: path.to_path_buf(),
                            timeout: self.timeout,
                        });
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(source) => {
                    let _ = child.kill();
                    return Err(VerifyError::Io {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }
    }

    fn is_available(&self) -> bool {
        self.available != Some(false)
    }
}

/// Verify `path` and turn the outcome into a timing sample.
///
/// Every failure contributes zero seconds. A missing tool is reported once;
/// afterwards the verifier is skipped silently.
pub fn sample(verifier: &mut dyn Verifier, path: &Path) -> f64 {
    if !verifier.is_available() {
        return 0.0;
    }
    match verifier.verify(path) {
        Ok(elapsed) => {
            log::debug!("verified {} in {:.1}s", path.display(), elapsed.as_secs_f64());
            elapsed.as_secs_f64()
        }
        Err(e @ (VerifyError::ToolUnavailable { .. } | VerifyError::NoCommand)) => {
            log::warn!("{e}, skipping verification timing");
            0.0
        }
        Err(e) => {
            log::warn!("{e}");
            0.0
        }
    }
}
