//! Benchmark metrics from a solver verdict and the parsed plan.

use serde::Serialize;

use crate::domain::Domain;
use crate::parser::{Action, ParseResult};
use crate::solver::SolverVerdict;

/// Caller-supplied evaluation parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalParams {
    /// Conflicts the western scenario is expected to produce. `None` (or
    /// zero) scores any detected conflict as full marks.
    pub expected_conflicts: Option<u32>,
}

/// Metrics for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Satisfiable and no non-executability feedback.
    pub causal_sound: bool,
    pub plan_length: usize,
    pub executed_actions: usize,
    pub nonexecuted_actions: usize,
    pub nonexec_count: usize,
    pub nonexec_details: Vec<String>,
    pub filled_param_actions: usize,
    #[serde(flatten)]
    pub domain: DomainMetrics,
}

/// Domain-specific metric extensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum DomainMetrics {
    Aladdin(IntentionalityMetrics),
    Western(ConflictMetrics),
    SecretAgent { goal_achieved: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentionalityMetrics {
    pub goal_achieved: bool,
    /// `max(0, coverage - open_penalty - unjustified_penalty)`.
    pub intentionality_score: f64,
    pub intention_coverage: f64,
    pub intentional_actions: usize,
    pub actions_with_plan: usize,
    pub open_frames_count: usize,
    pub unjustified_count: usize,
    pub open_frames_details: Vec<String>,
    pub unjustified_details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictMetrics {
    pub conflict_score: f64,
    pub conflicts_found: usize,
    pub expected_conflicts: Option<u32>,
    pub conflicts: Vec<String>,
}

/// `num / den`, or 0 when `den` is 0.
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Compute metrics. A failed parse contributes its partial actions.
pub fn evaluate(
    domain: Domain,
    verdict: &SolverVerdict,
    parse: &ParseResult,
    params: &EvalParams,
) -> Metrics {
    let actions = parse.actions();
    let executed = actions.iter().filter(|a| a.executed).count();

    let domain_metrics = match domain {
        Domain::Aladdin => DomainMetrics::Aladdin(intentionality(domain, verdict, actions)),
        Domain::Western => DomainMetrics::Western(conflict(verdict, params)),
        Domain::SecretAgent => DomainMetrics::SecretAgent {
            goal_achieved: verdict.satisfiable,
        },
    };

    Metrics {
        causal_sound: verdict.satisfiable && verdict.nonexec_feedback.is_empty(),
        plan_length: actions.len(),
        executed_actions: executed,
        nonexecuted_actions: actions.len() - executed,
        nonexec_count: verdict.nonexec_feedback.len(),
        nonexec_details: verdict.nonexec_feedback.clone(),
        filled_param_actions: actions.iter().filter(|a| a.filled_params).count(),
        domain: domain_metrics,
    }
}

fn intentionality(domain: Domain, verdict: &SolverVerdict, actions: &[Action]) -> IntentionalityMetrics {
    let profile = domain.profile();
    let intentional: Vec<&Action> = actions
        .iter()
        .filter(|a| !profile.is_unintentional(a.action_id))
        .collect();
    let with_plan = intentional
        .iter()
        .filter(|a| a.character_plan.as_deref().is_some_and(|p| !p.trim().is_empty()))
        .count();

    let n = intentional.len();
    let coverage = ratio(with_plan, n);
    let open_penalty = ratio(verdict.open_commitment_frames.len(), n);
    let unjustified_penalty = ratio(verdict.unjustified.len(), n);

    IntentionalityMetrics {
        goal_achieved: verdict.satisfiable,
        intentionality_score: (coverage - open_penalty - unjustified_penalty).max(0.0),
        intention_coverage: coverage,
        intentional_actions: n,
        actions_with_plan: with_plan,
        open_frames_count: verdict.open_commitment_frames.len(),
        unjustified_count: verdict.unjustified.len(),
        open_frames_details: verdict.open_commitment_frames.clone(),
        unjustified_details: verdict.unjustified.clone(),
    }
}

fn conflict(verdict: &SolverVerdict, params: &EvalParams) -> ConflictMetrics {
    let found = verdict.conflicts.len();
    let conflict_score = match params.expected_conflicts {
        Some(expected) if expected > 0 => (found as f64 / f64::from(expected)).min(1.0),
        _ if found > 0 => 1.0,
        _ => 0.0,
    };
    ConflictMetrics {
        conflict_score,
        conflicts_found: found,
        expected_conflicts: params.expected_conflicts,
        conflicts: verdict.conflicts.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(id: u8, plan: Option<&str>, executed: bool) -> Action {
        Action {
            subject: "alice".into(),
            action_id: id,
            parameters: vec![],
            executed,
            character_plan: plan.map(str::to_string),
            intention: None,
            filled_params: id == 1,
        }
    }

    fn sat() -> SolverVerdict {
        SolverVerdict {
            satisfiable: true,
            ..SolverVerdict::default()
        }
    }

    #[test]
    fn causal_soundness_needs_no_nonexec_feedback() {
        let parse = ParseResult::Success { actions: vec![] };
        let mut v = sat();
        assert!(evaluate(Domain::SecretAgent, &v, &parse, &EvalParams::default()).causal_sound);
        v.nonexec_feedback.push("nonexec_feedback(x)".into());
        let m = evaluate(Domain::SecretAgent, &v, &parse, &EvalParams::default());
        assert!(!m.causal_sound);
        assert_eq!(m.nonexec_count, 1);
        assert_eq!(m.domain, DomainMetrics::SecretAgent { goal_achieved: true });
    }

    #[test]
    fn intentionality_score_with_penalties() {
        let parse = ParseResult::Success {
            actions: vec![
                action(1, Some("marry(polly)"), true),
                action(3, Some("dead(bob)"), true),
                action(4, None, true),
                action(5, Some("  "), true),
                action(7, None, true),
            ],
        };
        let mut v = sat();
        v.unjustified.push("unjustified(a)".into());
        let m = evaluate(Domain::Aladdin, &v, &parse, &EvalParams::default());
        let DomainMetrics::Aladdin(i) = &m.domain else {
            panic!("expected aladdin metrics");
        };
        assert_eq!(i.intentional_actions, 4);
        assert_eq!(i.actions_with_plan, 2);
        assert!((i.intentionality_score - 0.25).abs() < 1e-9);
        assert_eq!(m.filled_param_actions, 1);
    }

    #[test]
    fn intentionality_score_is_clamped_and_handles_empty_plans() {
        let mut v = sat();
        v.open_commitment_frames = vec!["open_commitment_frame(a)".into(); 3];
        let parse = ParseResult::Success {
            actions: vec![action(4, None, true)],
        };
        let DomainMetrics::Aladdin(i) = evaluate(Domain::Aladdin, &v, &parse, &EvalParams::default()).domain
        else {
            panic!("expected aladdin metrics");
        };
        assert_eq!(i.intentionality_score, 0.0);

        let empty = ParseResult::Success { actions: vec![] };
        let DomainMetrics::Aladdin(i) = evaluate(Domain::Aladdin, &v, &empty, &EvalParams::default()).domain
        else {
            panic!("expected aladdin metrics");
        };
        assert_eq!(i.intention_coverage, 0.0);
        assert_eq!(i.intentionality_score, 0.0);
    }

    #[test]
    fn conflict_score_with_and_without_expectation() {
        let parse = ParseResult::Success {
            actions: vec![action(2, None, true), action(5, None, false)],
        };
        let mut v = sat();
        v.conflicts = vec!["conflict(a)".into()];

        let score = |m: Metrics| match m.domain {
            DomainMetrics::Western(c) => c.conflict_score,
            other => panic!("unexpected {other:?}"),
        };
        let expect = |n| EvalParams {
            expected_conflicts: Some(n),
        };

        assert_eq!(score(evaluate(Domain::Western, &v, &parse, &expect(2))), 0.5);
        assert_eq!(score(evaluate(Domain::Western, &v, &parse, &expect(1))), 1.0);
        assert_eq!(score(evaluate(Domain::Western, &v, &parse, &EvalParams::default())), 1.0);

        let m = evaluate(Domain::Western, &sat(), &parse, &EvalParams::default());
        assert_eq!(m.executed_actions, 1);
        assert_eq!(m.nonexecuted_actions, 1);
        assert_eq!(score(m), 0.0);
    }

    #[test]
    fn metrics_serialize_flat_with_domain_tag() {
        let parse = ParseResult::Success { actions: vec![] };
        let m = evaluate(Domain::Western, &sat(), &parse, &EvalParams::default());
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["domain"], "western");
        assert_eq!(v["conflict_score"], 0.0);
        assert_eq!(v["causal_sound"], true);
    }
}
