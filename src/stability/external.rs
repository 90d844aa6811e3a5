//! External command solver tier.
//!
//! The configured program receives one JSON request on stdin:
//!
//! ```json
//! { "analysis": "effective-stress", "slope": { "angle": 30.0, "height": 40.0, ... } }
//! ```
//!
//! and must print either `{"factor_of_safety": 1.23}` or a bare number on stdout.
//! A call that outlives the timeout is killed and reported as unavailable.

use std::io::{Read, Write};
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;

use crate::domain::{AnalysisType, SlopeConfiguration, TierId};
use crate::error::ScreenError;
use crate::stability::tier::StabilityTier;

pub const SOLVER_CMD_ENV: &str = "PGD_SOLVER_CMD";
pub const SOLVER_TIMEOUT_ENV: &str = "PGD_SOLVER_TIMEOUT_MS";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Serialize)]
struct SolverRequest<'a> {
    analysis: AnalysisType,
    slope: &'a SlopeConfiguration,
}

#[derive(Debug, Clone)]
pub struct ExternalSolverTier {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ExternalSolverTier {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Build from a whitespace-separated command line (`"solver --fast"`).
    pub fn from_command_line(command: &str, timeout: Duration) -> Option<Self> {
        let mut parts = command.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts.map(str::to_string).collect(), timeout))
    }

    /// Read `PGD_SOLVER_CMD` / `PGD_SOLVER_TIMEOUT_MS`, loading `.env` first.
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();
        let command = std::env::var(SOLVER_CMD_ENV).ok()?;
        let timeout = std::env::var(SOLVER_TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Self::DEFAULT_TIMEOUT);
        Self::from_command_line(&command, timeout)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn locate(&self) -> Option<PathBuf> {
        if self.program.components().count() > 1 {
            return self.program.exists().then(|| self.program.clone());
        }
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .map(|dir| dir.join(&self.program))
            .find(|candidate| candidate.is_file())
    }

    /// One deadline covers writing the request, reading stdout and waiting for exit.
    fn run(&self, request: &[u8]) -> Result<String, String> {
        let deadline = Instant::now() + self.timeout;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        // Own process group, so a timeout also reaches anything the solver spawned.
        #[cfg(unix)]
        {
            command.process_group(0);
        }
        let mut child = command
            .spawn()
            .map_err(|e| format!("failed to start {}: {e}", self.program.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            let request = request.to_vec();
            thread::spawn(move || {
                // A solver that ignores its input may already have exited.
                let _ = stdin.write_all(&request);
            });
        }

        let Some(mut stdout) = child.stdout.take() else {
            terminate(&mut child);
            return Err("solver stdout was not captured".to_string());
        };
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = String::new();
            let result = stdout.read_to_string(&mut buf).map(|_| buf);
            let _ = tx.send(result);
        });

        let output = match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                terminate(&mut child);
                return Err(format!("failed to read solver output: {e}"));
            }
            Err(_) => {
                terminate(&mut child);
                return Err(self.timed_out());
            }
        };

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    terminate(&mut child);
                    return Err(self.timed_out());
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    terminate(&mut child);
                    return Err(format!("failed to wait for solver: {e}"));
                }
            }
        };
        if !status.success() {
            return Err(format!("solver exited with {status}"));
        }
        Ok(output)
    }

    fn timed_out(&self) -> String {
        format!("timed out after {} ms", self.timeout.as_millis())
    }
}

/// Kill the solver's process group (unix) and the solver itself, then reap it.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: `kill` has no memory-safety preconditions; the negative pid
            // addresses the group created for this child at spawn.
            unsafe {
                libc::kill(-pid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Accept `{"factor_of_safety": x}` or a bare number.
fn parse_factor_of_safety(output: &str) -> Result<f64, String> {
    let value: Value =
        serde_json::from_str(output.trim()).map_err(|e| format!("unparseable solver output: {e}"))?;
    let fos = match &value {
        Value::Number(n) => n.as_f64(),
        Value::Object(map) => map.get("factor_of_safety").and_then(Value::as_f64),
        _ => None,
    };
    fos.ok_or_else(|| format!("solver output has no factor_of_safety: {}", output.trim()))
}

impl StabilityTier for ExternalSolverTier {
    fn id(&self) -> TierId {
        TierId::ExternalSolver
    }

    fn is_available(&self) -> bool {
        self.locate().is_some()
    }

    fn attempt(&self, slope: &SlopeConfiguration, analysis: AnalysisType) -> Result<f64, ScreenError> {
        let request = serde_json::to_vec(&SolverRequest { analysis, slope })
            .map_err(|e| ScreenError::unavailable(self.id(), e.to_string()))?;
        let output = self
            .run(&request)
            .map_err(|reason| ScreenError::unavailable(self.id(), reason))?;
        parse_factor_of_safety(&output).map_err(|reason| ScreenError::unavailable(self.id(), reason))
    }
}
