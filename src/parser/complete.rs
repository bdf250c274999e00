//! Default-parameter completion for under-specified actions.
//!
//! Models routinely omit an "obvious" argument (the lamp, the merchant, the
//! acting subject). Rejecting those plans would skew scores, so the domain
//! tables supply what is missing. Completion only appends or prepends; a
//! provided value is never dropped.

use crate::domain::{CompletionRule, DomainProfile, Fill, FillCondition, Placement};
use crate::schema::ActionId;
use crate::symbols::SymbolTable;

/// Apply the first matching completion rule, returning the (possibly
/// unchanged) parameter list.
pub fn complete(
    profile: &DomainProfile,
    id: ActionId,
    params: &[String],
    subject: &str,
    symbols: &SymbolTable,
) -> Vec<String> {
    let mut out = params.to_vec();
    let Some(rule) = profile
        .completions
        .iter()
        .find(|r| r.action_id == id && r.given == params.len() && holds(r, params, symbols))
    else {
        return out;
    };

    for (placement, fill) in rule.fills {
        let value = match fill {
            Fill::Subject => subject.to_string(),
            Fill::Const(name) => (*name).to_string(),
        };
        match placement {
            Placement::Append => out.push(value),
            Placement::Prepend => out.insert(0, value),
        }
    }
    tracing::debug!(
        domain = %profile.domain,
        action_id = id,
        given = params.len(),
        completed = ?out,
        "default completion applied"
    );
    out
}

fn holds(rule: &CompletionRule, params: &[String], symbols: &SymbolTable) -> bool {
    let first = params.first().map(|p| symbols.normalize(p));
    match rule.when {
        FillCondition::Always => true,
        FillCondition::FirstIs(kind) => first.is_some_and(|p| symbols.contains(kind, &p)),
        FillCondition::FirstIsNot(kind) => !first.is_some_and(|p| symbols.contains(kind, &p)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;

    fn strings(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn aladdin_symbols() -> SymbolTable {
        let mut t = SymbolTable::new();
        t.scan_text("character(alice; genie; princess; knight).\nobject(lamp).\n");
        t
    }

    #[test]
    fn love_spell_defaults_lover_to_subject() {
        let out = complete(
            Domain::Aladdin.profile(),
            1,
            &strings(&["princess"]),
            "genie",
            &aladdin_symbols(),
        );
        assert_eq!(out, strings(&["princess", "genie"]));
    }

    #[test]
    fn order_to_obtain_keeps_the_named_knight() {
        let p = Domain::Aladdin.profile();
        let t = aladdin_symbols();
        assert_eq!(
            complete(p, 10, &strings(&["knight"]), "alice", &t),
            strings(&["knight", "lamp"])
        );
        assert_eq!(
            complete(p, 10, &strings(&["lamp"]), "alice", &t),
            strings(&["alice", "lamp"])
        );
        assert_eq!(complete(p, 10, &[], "alice", &t), strings(&["alice", "lamp"]));
    }

    #[test]
    fn western_take_picks_side_by_kind() {
        let p = Domain::Western.profile();
        let mut t = SymbolTable::new();
        t.scan_text("character(carl; hank).\nobject(meds).\n");
        assert_eq!(
            complete(p, 3, &strings(&["meds"]), "hank", &t),
            strings(&["meds", "carl"])
        );
        assert_eq!(
            complete(p, 3, &strings(&["carl"]), "hank", &t),
            strings(&["meds", "carl"])
        );
        assert_eq!(
            complete(p, 4, &strings(&["william"]), "hank", &t),
            strings(&["meds", "william"])
        );
        assert_eq!(complete(p, 4, &[], "hank", &t), strings(&["meds", "hank"]));
    }

    #[test]
    fn complete_lists_are_untouched() {
        let p = Domain::Aladdin.profile();
        let given = strings(&["princess", "genie"]);
        assert_eq!(complete(p, 1, &given, "genie", &aladdin_symbols()), given);
    }

    #[test]
    fn completion_never_drops_provided_values() {
        let t = aladdin_symbols();
        for domain in Domain::ALL {
            let p = domain.profile();
            for rule in p.completions {
                let given: Vec<String> = ["lamp", "knight"][..rule.given]
                    .iter()
                    .map(|s| s.to_string())
                    .collect();
                let out = complete(p, rule.action_id, &given, "alice", &t);
                for v in &given {
                    assert!(out.contains(v), "{domain} {} {out:?}", rule.action_id);
                }
            }
        }
    }
}
