//! One evaluation end to end: parse → build → solve → evaluate.
//!
//! Every evaluation yields exactly one [`RunRecord`] tagged with the stage it
//! reached, so "unusable output", "plan rejected by the program" and
//! "harness broke" stay distinguishable in aggregated results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::BenchConfig;
use crate::constraints::{self, ConstraintBuilder};
use crate::domain::Domain;
use crate::error::{NarrError, NarrResult};
use crate::evaluate::{self, EvalParams, Metrics};
use crate::parser::{ParseResult, PlanParser};
use crate::solver::{SolverInvoker, SolverVerdict};

/// Terminal stage of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The model output could not be parsed into a valid plan.
    Parse,
    /// The solver ran and rejected the plan.
    Solve,
    /// The solver accepted the plan.
    Complete,
    /// The harness itself failed (fact files, constraint building, solver launch).
    Error,
}

/// Result object for one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub stage: Stage,
    pub domain: Domain,
    pub label: String,
    pub instance_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse: Option<ParseResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<SolverVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall time of the solver call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_ms: Option<u64>,
}

impl RunRecord {
    fn new(job: &Job) -> Self {
        Self {
            stage: Stage::Error,
            domain: job.domain,
            label: job.label.clone(),
            instance_dir: job.instance_dir.clone(),
            parse: None,
            constraints: None,
            verdict: None,
            metrics: None,
            error: None,
            solver_ms: None,
        }
    }

    fn failed(mut self, err: impl Into<NarrError>) -> Self {
        let err = err.into();
        tracing::warn!(label = %self.label, error = %err, "evaluation failed");
        self.stage = Stage::Error;
        self.error = Some(err.to_string());
        self
    }
}

/// One (instance, response) pair to evaluate.
#[derive(Debug, Clone)]
pub struct Job {
    pub label: String,
    pub domain: Domain,
    pub domain_dir: PathBuf,
    pub instance_dir: PathBuf,
    /// Raw model output.
    pub response: String,
}

/// Evaluation settings shared by every job.
#[derive(Debug, Clone)]
pub struct Harness {
    invoker: SolverInvoker,
    maxstep: Option<usize>,
    default_intentions: bool,
    require_character_plan: bool,
    eval: EvalParams,
    workers: usize,
}

impl Harness {
    pub fn new(config: &BenchConfig) -> Self {
        Self {
            invoker: SolverInvoker::new(config.solver.path.clone())
                .with_timeout(config.solver_timeout()),
            maxstep: config.experiment.maxstep,
            default_intentions: config.experiment.default_intentions,
            require_character_plan: config.experiment.require_character_plan,
            eval: config.eval_params(),
            workers: config.experiment.workers.max(1),
        }
    }

    /// Parser for one (domain, instance) pair with the configured options.
    pub fn parser(&self, domain: Domain, domain_dir: &Path, instance_dir: &Path) -> NarrResult<PlanParser> {
        Ok(PlanParser::new(domain, domain_dir, instance_dir)?
            .require_character_plan(self.require_character_plan))
    }

    /// Constraint program for a parsed plan.
    pub fn build_constraints(&self, parser: &PlanParser, parse: &ParseResult) -> NarrResult<String> {
        let builder = ConstraintBuilder::new(parser.domain().profile(), parser.symbols())
            .default_intentions(self.default_intentions);
        Ok(builder.build(parse.actions(), self.maxstep)?)
    }

    /// Run one job to its terminal stage.
    pub fn evaluate(&self, job: &Job) -> RunRecord {
        let record = RunRecord::new(job);

        let parser = match self.parser(job.domain, &job.domain_dir, &job.instance_dir) {
            Ok(p) => p,
            Err(e) => return record.failed(e),
        };
        let parse = parser.parse(&job.response);
        let mut record = RunRecord {
            parse: Some(parse.clone()),
            ..record
        };
        if !parse.is_success() {
            record.stage = Stage::Parse;
            tracing::info!(label = %job.label, stage = "parse", "evaluation finished");
            return record;
        }

        let program = match self.build_constraints(&parser, &parse) {
            Ok(p) => p,
            Err(e) => return record.failed(e),
        };
        record.constraints = Some(program.clone());

        let maxstep = match constraints::horizon(parse.actions().len(), self.maxstep) {
            Ok(m) => m,
            Err(e) => return record.failed(e),
        };
        let started = Instant::now();
        let verdict = match self.invoker.validate(
            job.domain,
            &job.domain_dir,
            &job.instance_dir,
            &program,
            maxstep,
        ) {
            Ok(v) => v,
            Err(e) => return record.failed(e),
        };
        record.solver_ms = Some(started.elapsed().as_millis() as u64);

        record.metrics = Some(evaluate::evaluate(job.domain, &verdict, &parse, &self.eval));
        record.stage = if verdict.satisfiable {
            Stage::Complete
        } else {
            Stage::Solve
        };
        record.verdict = Some(verdict);
        tracing::info!(label = %job.label, stage = ?record.stage, "evaluation finished");
        record
    }

    /// Evaluate many jobs on a pool of `workers` threads. Output order
    /// matches input order.
    pub fn evaluate_batch(&self, jobs: &[Job]) -> Vec<RunRecord> {
        tracing::info!(jobs = jobs.len(), workers = self.workers, "starting batch");
        match rayon::ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(|| jobs.par_iter().map(|j| self.evaluate(j)).collect()),
            Err(e) => {
                tracing::warn!(error = %e, "thread pool unavailable; running sequentially");
                jobs.iter().map(|j| self.evaluate(j)).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(dir: &Path, response: &str) -> Job {
        Job {
            label: "t".into(),
            domain: Domain::SecretAgent,
            domain_dir: dir.join("domain"),
            instance_dir: dir.join("instance"),
            response: response.into(),
        }
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("domain/constraints")).unwrap();
        std::fs::create_dir_all(dir.path().join("instance")).unwrap();
        std::fs::write(
            dir.path().join("domain/constraints/domain.lp"),
            "place(l0_1; l0_2).\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn parse_failure_stops_at_parse_stage() {
        let dir = fixture();
        let h = Harness::new(&BenchConfig::default());
        let r = h.evaluate(&job(dir.path(), "sorry, no plan"));
        assert_eq!(r.stage, Stage::Parse);
        assert!(r.constraints.is_none());
        assert!(r.verdict.is_none());
    }

    #[test]
    fn short_horizon_is_a_harness_error() {
        let dir = fixture();
        let mut cfg = BenchConfig::default();
        cfg.experiment.maxstep = Some(0);
        let r = Harness::new(&cfg).evaluate(&job(
            dir.path(),
            r#"[{"subject":"agent","actionId":1,"parameters":["l0_1"]}]"#,
        ));
        assert_eq!(r.stage, Stage::Error);
        assert!(r.error.unwrap().contains("maxstep"));
    }

    #[test]
    fn missing_solver_is_an_error_not_a_rejection() {
        let dir = fixture();
        let mut cfg = BenchConfig::default();
        cfg.solver.path = "/nonexistent/narrplan-solver".into();
        let r = Harness::new(&cfg).evaluate(&job(
            dir.path(),
            r#"[{"subject":"agent","actionId":1,"parameters":["l0_1"]}]"#,
        ));
        assert_eq!(r.stage, Stage::Error);
        assert!(r.constraints.unwrap().contains("move(l0_1)"));
    }

    #[test]
    fn batch_preserves_order() {
        let dir = fixture();
        let mut cfg = BenchConfig::default();
        cfg.experiment.workers = 3;
        let jobs: Vec<Job> = (0..6)
            .map(|i| Job {
                label: format!("job-{i}"),
                ..job(dir.path(), "not json")
            })
            .collect();
        let out = Harness::new(&cfg).evaluate_batch(&jobs);
        let labels: Vec<&str> = out.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["job-0", "job-1", "job-2", "job-3", "job-4", "job-5"]);
        assert!(out.iter().all(|r| r.stage == Stage::Parse));
    }
}
