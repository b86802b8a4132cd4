use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cnf::SatFormat;
use crate::cnf::cnf::SatEncoding;
use crate::cnf::dimacs::write_file;

use super::scope::{ChildGuard, TempFile};
use super::solution::Solution;
use super::timing::parse_times;
use super::{ProcessStatus, SolverConfig, SolverResult, Times};

const POLL: Duration = Duration::from_millis(10);

enum Run {
    Exited(String),
    TimedOut,
}

/// Runs an external SAT/MaxSAT solver on a DIMACS file and decodes its
/// answer. Failures come back as a [`ProcessStatus`], never as an error.
#[derive(Debug, Clone)]
pub struct SolverRunner {
    config: SolverConfig,
}

impl SolverRunner {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Writes `enc` to `path` and solves it. Only the write can fail.
    pub fn solve_encoding(&self, enc: &SatEncoding, path: &Path, format: SatFormat) -> Result<SolverResult> {
        let path = self.config.resolve(path);
        write_file(&path, enc, format)?;
        Ok(self.solve(&path, format))
    }

    pub fn solve(&self, input: &Path, format: SatFormat) -> SolverResult {
        let input = self.config.resolve(input);
        let timing = match self.timing_file() {
            Ok(t) => t,
            Err(e) => return SolverResult::failed(e),
        };

        let mut cmd = self.command(&input, timing.as_ref());
        debug!(command = ?cmd, "starting solver");

        let start = Instant::now();
        let run = run_with_deadline(&mut cmd, self.config.timeout);
        let elapsed = start.elapsed();

        let output = match run {
            Ok(Run::Exited(output)) => output,
            Ok(Run::TimedOut) => {
                warn!(input = %input.display(), elapsed = ?elapsed, "solver timed out");
                return SolverResult::timed_out(Times::wall(elapsed));
            }
            Err(e) => {
                warn!(solver = %self.config.solver.display(), error = %e, "solver failed to run");
                return SolverResult::failed(e.to_string());
            }
        };
        debug!(%output, "solver output");

        let times = timing
            .as_ref()
            .and_then(TempFile::read)
            .map(|text| parse_times(&text))
            .unwrap_or_else(|| Times::wall(elapsed));

        match Solution::parse(format, &output) {
            Ok(solution) => {
                info!(status = %solution.status, cost = solution.cost, real_ms = ?times.real_ms, "solver finished");
                SolverResult {
                    output,
                    status: ProcessStatus::Success,
                    times,
                    completed: true,
                    solution: Some(solution),
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "error parsing solver output");
                SolverResult {
                    output,
                    status: ProcessStatus::ErrorParsingOutput,
                    times,
                    completed: true,
                    solution: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn timing_file(&self) -> std::result::Result<Option<TempFile>, String> {
        if self.config.time_bin.is_none() {
            return Ok(None);
        }
        let solver = &self.config.solver;
        let has_dir = solver.parent().is_some_and(|p| !p.as_os_str().is_empty());
        if has_dir && !solver.exists() {
            return Err(format!("could not find solver: {}", solver.display()));
        }
        let path = match &self.config.time_output {
            Some(p) => self.config.resolve(p),
            None => self.config.resolve(&default_time_output()),
        };
        if path.exists() {
            return Err(format!("time output file exists: {}", path.display()));
        }
        Ok(Some(TempFile::new(path)))
    }

    fn command(&self, input: &Path, timing: Option<&TempFile>) -> Command {
        let mut cmd = match (&self.config.time_bin, timing) {
            (Some(time_bin), Some(file)) => {
                let mut cmd = Command::new(time_bin);
                cmd.arg("-p")
                    .arg("-o")
                    .arg(file.path())
                    .arg(&self.config.solver);
                cmd
            }
            _ => Command::new(&self.config.solver),
        };
        cmd.arg(input)
            .args(&self.config.extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        cmd
    }
}

fn default_time_output() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    PathBuf::from(format!("time_output_{}_{}.out", std::process::id(), nanos))
}

/// Spawns `cmd`, drains its stdout on a helper thread and waits for exit,
/// killing the child once `timeout` elapses. The guard reaps the child on
/// every return path.
fn run_with_deadline(cmd: &mut Command, timeout: Option<Duration>) -> io::Result<Run> {
    let mut child = ChildGuard::spawn(cmd)?;
    let mut stdout = child
        .take_stdout()
        .ok_or_else(|| io::Error::other("solver stdout was not captured"))?;

    let (tx, rx) = mpsc::channel();
    // detached: a grandchild still holding the pipe keeps it blocked
    thread::spawn(move || {
        let mut buf = Vec::new();
        let res = stdout
            .read_to_end(&mut buf)
            .map(|_| String::from_utf8_lossy(&buf).into_owned());
        let _ = tx.send(res);
    });

    let deadline = timeout.map(|t| Instant::now() + t);
    let output = match deadline {
        None => rx
            .recv()
            .map_err(|_| io::Error::other("stdout reader stopped"))??,
        Some(deadline) => match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(res) => res?,
            Err(RecvTimeoutError::Timeout) => {
                child.kill();
                return Ok(Run::TimedOut);
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(io::Error::other("stdout reader stopped"));
            }
        },
    };

    // stdout is closed but the process may still be running
    match deadline {
        None => {
            child.wait()?;
        }
        Some(deadline) => loop {
            if child.try_wait()?.is_some() {
                break;
            }
            if Instant::now() >= deadline {
                child.kill();
                return Ok(Run::TimedOut);
            }
            thread::sleep(POLL);
        },
    }
    Ok(Run::Exited(output))
}
