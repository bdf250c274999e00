//! Solver invoker: runs the external ASP solver and classifies its answer.
//!
//! The solver is an opaque text-in / JSON-out process:
//! `<solver> <facts...> <constraints> -c maxstep=<N> --outf=2 0`.
//! A launch failure is an error; anything the solver prints, including
//! garbage or a crash, degrades to an unsatisfiable verdict with no detail.

pub mod layout;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::error::SolverError;

/// `Result` value the solver reports for a satisfiable program.
pub const SATISFIABLE: &str = "SATISFIABLE";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Classified solver answer for one plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverVerdict {
    pub satisfiable: bool,
    pub nonexec_feedback: Vec<String>,
    pub unjustified: Vec<String>,
    pub open_commitment_frames: Vec<String>,
    pub conflicts: Vec<String>,
    pub raw_stdout: String,
    pub raw_stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Exact argv used, solver first.
    pub command: Vec<String>,
    /// Fact files in the order they were passed.
    pub input_files: Vec<PathBuf>,
}

/// The four atom buckets of one witness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomBuckets {
    pub nonexec_feedback: Vec<String>,
    pub unjustified: Vec<String>,
    pub open_commitment_frames: Vec<String>,
    pub conflicts: Vec<String>,
}

/// Partition witness atoms by prefix. Unmatched atoms are dropped.
pub fn classify<S: AsRef<str>>(atoms: &[S]) -> AtomBuckets {
    let mut b = AtomBuckets::default();
    for atom in atoms {
        let atom = atom.as_ref();
        let bucket = if atom.starts_with("nonexec_feedback") {
            &mut b.nonexec_feedback
        } else if atom.starts_with("unjustified") {
            &mut b.unjustified
        } else if atom.starts_with("open_commitment_frame") {
            &mut b.open_commitment_frames
        } else if atom.starts_with("conflict") {
            &mut b.conflicts
        } else {
            continue;
        };
        bucket.push(atom.to_string());
    }
    b
}

#[derive(Debug, Deserialize)]
struct SolverOutput {
    #[serde(rename = "Result", default)]
    result: String,
    #[serde(rename = "Call", default)]
    call: Vec<SolverCall>,
}

#[derive(Debug, Deserialize)]
struct SolverCall {
    #[serde(rename = "Witnesses", default)]
    witnesses: Vec<SolverWitness>,
}

#[derive(Debug, Deserialize)]
struct SolverWitness {
    #[serde(rename = "Value", default)]
    value: Vec<String>,
}

/// Fill the verdict's classification fields from solver stdout.
///
/// Leaves them at their defaults when stdout is not the expected JSON.
fn interpret(stdout: &str, verdict: &mut SolverVerdict) {
    let output: SolverOutput = match serde_json::from_str(stdout) {
        Ok(o) => o,
        Err(e) => {
            tracing::warn!(error = %e, "solver output is not valid JSON; treating as unsatisfiable");
            return;
        }
    };
    if output.result != SATISFIABLE {
        return;
    }
    verdict.satisfiable = true;
    let atoms = output
        .call
        .first()
        .and_then(|c| c.witnesses.first())
        .map(|w| w.value.as_slice())
        .unwrap_or_default();
    let b = classify(atoms);
    verdict.nonexec_feedback = b.nonexec_feedback;
    verdict.unjustified = b.unjustified;
    verdict.open_commitment_frames = b.open_commitment_frames;
    verdict.conflicts = b.conflicts;
}

/// Launches the solver once per call. Holds no process between calls.
#[derive(Debug, Clone)]
pub struct SolverInvoker {
    solver: String,
    timeout: Option<Duration>,
}

impl SolverInvoker {
    pub fn new(solver: impl Into<String>) -> Self {
        Self {
            solver: solver.into(),
            timeout: None,
        }
    }

    /// Kill the solver and fail with [`SolverError::TimedOut`] after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Collect the domain's fact files and run the solver on them plus
    /// `constraints`.
    pub fn validate(
        &self,
        domain: Domain,
        domain_dir: &Path,
        instance_dir: &Path,
        constraints: &str,
        maxstep: usize,
    ) -> Result<SolverVerdict, SolverError> {
        let files = layout::collect(domain.profile(), domain_dir, instance_dir);
        if files.is_empty() {
            return Err(SolverError::NoFactFiles {
                domain_dir: domain_dir.display().to_string(),
                instance_dir: instance_dir.display().to_string(),
            });
        }
        self.run(&files, constraints, maxstep)
    }

    /// Run the solver on explicit fact files.
    pub fn run(
        &self,
        files: &[PathBuf],
        constraints: &str,
        maxstep: usize,
    ) -> Result<SolverVerdict, SolverError> {
        let mut tmp = tempfile::Builder::new()
            .prefix("narrplan-")
            .suffix(".lp")
            .tempfile()
            .map_err(|source| SolverError::TempFile { source })?;
        tmp.write_all(constraints.as_bytes())
            .and_then(|()| tmp.flush())
            .map_err(|source| SolverError::TempFile { source })?;

        let mut args: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
        args.push(tmp.path().display().to_string());
        args.extend([
            "-c".to_string(),
            format!("maxstep={maxstep}"),
            "--outf=2".to_string(),
            "0".to_string(),
        ]);

        let started = Instant::now();
        let (raw_stdout, raw_stderr, exit_code) = self.execute(&args)?;
        tracing::info!(
            solver = %self.solver,
            files = files.len(),
            exit_code = ?exit_code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "solver finished"
        );

        let mut command = Vec::with_capacity(args.len() + 1);
        command.push(self.solver.clone());
        command.extend(args);

        let mut verdict = SolverVerdict::default();
        interpret(&raw_stdout, &mut verdict);
        Ok(SolverVerdict {
            raw_stdout,
            raw_stderr,
            exit_code,
            command,
            input_files: files.to_vec(),
            ..verdict
        })
    }

    /// Spawn, drain both pipes on reader threads, and wait with the
    /// optional deadline.
    fn execute(&self, args: &[String]) -> Result<(String, String, Option<i32>), SolverError> {
        let mut child = Command::new(&self.solver)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SolverError::InvocationFailed {
                solver: self.solver.clone(),
                source,
            })?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        reap(&mut child);
                        return Err(SolverError::TimedOut {
                            solver: self.solver.clone(),
                            seconds: self.timeout.map_or(0, |t| t.as_secs()),
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(source) => {
                    reap(&mut child);
                    return Err(SolverError::InvocationFailed {
                        solver: self.solver.clone(),
                        source,
                    });
                }
            }
        };

        let join = |h: Option<thread::JoinHandle<Vec<u8>>>| {
            h.and_then(|h| h.join().ok())
                .map(|buf| String::from_utf8_lossy(&buf).into_owned())
                .unwrap_or_default()
        };
        Ok((join(stdout), join(stderr), status.code()))
    }
}

/// Kill the child and wait for it so no zombie is left behind.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "solver kill failed");
    }
    if let Err(e) = child.wait() {
        tracing::warn!(error = %e, "could not reap solver process");
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}
