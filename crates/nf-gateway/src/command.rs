//! Bounded execution of helper programs.

use std::fmt;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{GatewayError, GatewayResult};

/// How often a running child is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A single helper program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Collect stdout; otherwise it is discarded.
    pub capture_stdout: bool,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs helper programs on behalf of a gateway.
pub trait CommandRunner {
    /// Run the invocation to completion and return its stdout (empty unless
    /// `capture_stdout` is set). A non-zero exit status is an error.
    fn run(&mut self, invocation: &Invocation) -> GatewayResult<Vec<u8>>;
}

/// Runs helper programs as child processes, killing them after a timeout.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn wait_with_deadline(
        &self,
        child: &mut Child,
        invocation: &Invocation,
    ) -> GatewayResult<ExitStatus> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let polled = match child.try_wait() {
                Ok(polled) => polled,
                Err(source) => {
                    abandon(child);
                    return Err(GatewayError::Io {
                        command: invocation.to_string(),
                        source,
                    });
                }
            };
            if let Some(status) = polled {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                abandon(child);
                return Err(GatewayError::Timeout {
                    command: invocation.to_string(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Kill and reap a child we no longer wait for, so it neither keeps running
/// nor lingers as a zombie.
fn abandon(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> GatewayResult<Vec<u8>> {
        let stdout = if invocation.capture_stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        };
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| GatewayError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        // Drain stdout concurrently so a chatty child cannot block on a full pipe.
        let reader = child.stdout.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                pipe.read_to_end(&mut buf).map(|_| buf)
            })
        });

        let status = self.wait_with_deadline(&mut child, invocation)?;

        let output = match reader {
            Some(handle) => handle
                .join()
                .map_err(|_| GatewayError::Io {
                    command: invocation.to_string(),
                    source: std::io::Error::other("stdout reader panicked"),
                })?
                .map_err(|source| GatewayError::Io {
                    command: invocation.to_string(),
                    source,
                })?,
            None => Vec::new(),
        };

        if !status.success() {
            return Err(GatewayError::CommandFailed {
                command: invocation.to_string(),
                status: status.to_string(),
            });
        }
        Ok(output)
    }
}
