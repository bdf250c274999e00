//! Constraint builder: validated actions → solver input.
//!
//! Each action becomes an integrity constraint `:- not act(...).` at its
//! 0-indexed timestep, so the solver must derive the claimed action from the
//! program's own rules instead of taking it as given. A plan the rules
//! disagree with surfaces as `UNSATISFIABLE`.

use crate::domain::{ConstraintStyle, DomainProfile};
use crate::error::BuildError;
use crate::intention;
use crate::parser::Action;
use crate::schema;
use crate::symbols::SymbolTable;

/// Directive forcing at least one detected conflict.
pub const CONFLICT_DIRECTIVE: &str = ":- not conflict(_,_,_,_,_).";

/// Solver horizon for a plan: the requested `maxstep`, or `len + 1`.
pub fn horizon(steps: usize, maxstep: Option<usize>) -> Result<usize, BuildError> {
    match maxstep {
        None => Ok(steps + 1),
        Some(m) if m < steps => Err(BuildError::HorizonTooShort { maxstep: m, steps }),
        Some(m) => Ok(m),
    }
}

/// Compiles one domain's action lists into solver input.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintBuilder<'a> {
    profile: &'static DomainProfile,
    symbols: &'a SymbolTable,
    default_intentions: bool,
}

impl<'a> ConstraintBuilder<'a> {
    pub fn new(profile: &'static DomainProfile, symbols: &'a SymbolTable) -> Self {
        Self {
            profile,
            symbols,
            default_intentions: true,
        }
    }

    /// Toggle default-intention templates for domains that allow it.
    pub fn default_intentions(mut self, enabled: bool) -> Self {
        self.default_intentions = enabled;
        self
    }

    /// Render the full constraint program for `actions`.
    pub fn build(&self, actions: &[Action], maxstep: Option<usize>) -> Result<String, BuildError> {
        let horizon = horizon(actions.len(), maxstep)?;
        let mut out = String::new();
        out.push_str(&format!("#const maxstep={horizon}.\n"));
        out.push_str(&format!("% {} plan constraints\n", self.profile.domain));

        for (step, action) in actions.iter().enumerate() {
            if let Some(line) = self.line(step, action)? {
                out.push_str(&line);
                out.push('\n');
            }
        }
        if self.profile.require_conflict {
            out.push_str(CONFLICT_DIRECTIVE);
            out.push('\n');
        }
        Ok(out)
    }

    /// One action's constraint, or `None` when the domain skips the action.
    fn line(&self, step: usize, action: &Action) -> Result<Option<String>, BuildError> {
        let id = action.action_id;
        if self.profile.is_skipped(id) {
            return Ok(None);
        }
        let functor = schema::to_functor(self.profile.domain, id, &action.parameters)?;
        let subject = &action.subject;

        let exec_sensitive = match self.profile.constraint_style {
            ConstraintStyle::Uniform => {
                return Ok(Some(format!(":- not act({subject}, {functor}, {step}).")));
            }
            ConstraintStyle::Intentional { exec_sensitive } => exec_sensitive,
        };
        if self.profile.is_unintentional(id) {
            return Ok(Some(format!(":- not act({subject}, {functor}, {step}).")));
        }

        let intention = self.intention(step, action)?;
        let predicate = if exec_sensitive && !action.executed {
            "unexec_act"
        } else {
            "act"
        };
        Ok(Some(format!(
            ":- not {predicate}({subject}, {functor}, {intention}, {step})."
        )))
    }

    /// Stated intention, else default template, else domain fallback.
    fn intention(&self, step: usize, action: &Action) -> Result<String, BuildError> {
        if let Some(stated) = intention::stated(self.profile, action, self.symbols) {
            return Ok(stated);
        }
        let defaults = self.default_intentions || !self.profile.default_switchable;
        let defaulted = defaults
            .then(|| {
                intention::default_for(self.profile, action)
                    .or_else(|| self.profile.fallback_intention.map(str::to_string))
            })
            .flatten();
        match defaulted {
            Some(term) => {
                tracing::debug!(
                    domain = %self.profile.domain,
                    step,
                    action_id = action.action_id,
                    intention = %term,
                    "intention defaulted"
                );
                Ok(term)
            }
            None => Err(BuildError::MissingIntention {
                action_id: action.action_id,
                step,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;

    fn action(subject: &str, id: u8, params: &[&str]) -> Action {
        Action {
            subject: subject.into(),
            action_id: id,
            parameters: params.iter().map(|s| s.to_string()).collect(),
            executed: true,
            character_plan: None,
            intention: None,
            filled_params: false,
        }
    }

    #[test]
    fn secret_agent_uniform_lines() {
        let symbols = SymbolTable::new();
        let b = ConstraintBuilder::new(Domain::SecretAgent.profile(), &symbols);
        let out = b
            .build(&[action("secret_agent", 1, &["l0_1"])], None)
            .unwrap();
        assert!(out.starts_with("#const maxstep=2.\n"));
        assert!(out.contains(":- not act(secret_agent, move(l0_1), 0).\n"));
    }

    #[test]
    fn western_conflict_directive_appears_exactly_once() {
        let symbols = SymbolTable::new();
        let b = ConstraintBuilder::new(Domain::Western.profile(), &symbols);
        let plans: [Vec<Action>; 3] = [
            vec![],
            vec![action("timmy", 1, &[])],
            vec![
                action("hank", 2, &["town"]),
                action("hank", 6, &[]),
                action("hank", 3, &["meds", "carl"]),
                action("hank", 5, &["timmy", "meds"]),
            ],
        ];
        for plan in &plans {
            let out = b.build(plan, None).unwrap();
            assert_eq!(out.matches(CONFLICT_DIRECTIVE).count(), 1, "{out}");
            assert!(out.trim_end().ends_with(CONFLICT_DIRECTIVE));
        }
    }

    #[test]
    fn western_skips_do_nothing_and_frames_unexecuted() {
        let symbols = SymbolTable::new();
        let b = ConstraintBuilder::new(Domain::Western.profile(), &symbols);
        let mut unexec = action("hank", 5, &["timmy", "meds"]);
        unexec.executed = false;
        let out = b
            .build(
                &[action("timmy", 1, &[]), action("hank", 6, &[]), unexec],
                None,
            )
            .unwrap();
        assert!(out.contains(":- not act(timmy, snakebite, 0)."));
        assert!(!out.contains("do_nothing"));
        assert!(out.contains(":- not unexec_act(hank, heal(timmy, meds), alive(timmy), 2)."));
    }

    #[test]
    fn western_free_text_intention_wins_over_template() {
        let mut symbols = SymbolTable::new();
        symbols.scan_text("character(hank; william).\n");
        let b = ConstraintBuilder::new(Domain::Western.profile(), &symbols);
        let mut a = action("hank", 2, &["ranch"]);
        a.intention = Some("make sure william ends up dead".into());
        let out = b.build(&[a], None).unwrap();
        assert!(out.contains(":- not act(hank, move(ranch), dead(william), 0)."));
    }

    #[test]
    fn aladdin_intention_sources() {
        let symbols = SymbolTable::new();
        let b = ConstraintBuilder::new(Domain::Aladdin.profile(), &symbols);
        let mut planned = action("jafar", 3, &["aladdin"]);
        planned.character_plan = Some("Jafar plans: possessed_by(lamp, Jafar)".into());
        let out = b
            .build(
                &[
                    planned,
                    action("jafar", 9, &["knight", "aladdin"]),
                    action("jasmine", 7, &["aladdin"]),
                ],
                Some(5),
            )
            .unwrap();
        assert!(out.starts_with("#const maxstep=5.\n"));
        assert!(out.contains(":- not act(jafar, kill(aladdin), possessed_by(lamp, jafar), 0)."));
        assert!(out.contains(":- not act(jafar, order_to_kill(knight, aladdin), dead(aladdin), 1)."));
        assert!(out.contains(":- not act(jasmine, fall_in_love(aladdin), 2)."));
        assert!(!out.contains("conflict"));
    }

    #[test]
    fn aladdin_without_defaults_requires_a_stated_intention() {
        let symbols = SymbolTable::new();
        let b = ConstraintBuilder::new(Domain::Aladdin.profile(), &symbols).default_intentions(false);
        let err = b
            .build(&[action("jasmine", 8, &[]), action("jafar", 3, &["aladdin"])], None)
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::MissingIntention {
                action_id: 3,
                step: 1
            }
        ));
    }

    #[test]
    fn western_defaults_cannot_be_switched_off() {
        let symbols = SymbolTable::new();
        let b = ConstraintBuilder::new(Domain::Western.profile(), &symbols).default_intentions(false);
        let out = b.build(&[action("hank", 2, &["town"])], None).unwrap();
        assert!(out.contains("at(hank,town)"));
    }

    #[test]
    fn horizon_rules() {
        assert_eq!(horizon(3, None).unwrap(), 4);
        assert_eq!(horizon(3, Some(3)).unwrap(), 3);
        assert!(matches!(
            horizon(3, Some(2)),
            Err(BuildError::HorizonTooShort {
                maxstep: 2,
                steps: 3
            })
        ));
    }

    #[test]
    fn arity_violation_surfaces_as_schema_error() {
        let symbols = SymbolTable::new();
        let b = ConstraintBuilder::new(Domain::SecretAgent.profile(), &symbols);
        let err = b.build(&[action("secret_agent", 1, &[])], None).unwrap_err();
        assert!(matches!(err, BuildError::Schema(_)));
    }
}
