//! Intention terms for intentional actions.
//!
//! Three sources, tried in this order by the constraint builder:
//! 1. text supplied by the model (`character_plan` patterns or a free-text
//!    `intention` field, depending on the domain),
//! 2. the domain's per-action default template,
//! 3. the domain's fallback term.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{DomainProfile, IntentionSource};
use crate::parser::Action;
use crate::symbols::SymbolTable;

static INTENTION_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"dead\(\s*([^)]+)\)").unwrap(), "dead({})"),
        (Regex::new(r"marry\(\s*([^)]+)\)").unwrap(), "marry({})"),
        (
            Regex::new(r"possessed_by\(\s*lamp\s*,\s*([^)]+)\)").unwrap(),
            "possessed_by(lamp, {})",
        ),
    ]
});

/// First `dead(X)`, `marry(X)` or `possessed_by(lamp, X)` mention in a
/// character plan, case-insensitively, with spaces in `X` turned into
/// underscores.
pub fn extract_intention(character_plan: &str) -> Option<String> {
    if character_plan.trim().is_empty() {
        return None;
    }
    let lowered = character_plan.to_lowercase();
    INTENTION_PATTERNS.iter().find_map(|(re, template)| {
        let caps = re.captures(&lowered)?;
        let arg = caps.get(1)?.as_str().trim().replace(' ', "_");
        Some(template.replace("{}", &arg))
    })
}

/// Map a free-text intention onto `alive/1`, `dead/1` or `possessed_by/2`.
///
/// Already-canonical terms pass through; otherwise the first declared
/// character mentioned together with "dead"/"alive" wins, then any mention of
/// possession or meds becomes `possessed_by(meds,<subject>)`.
pub fn normalize_free_text(intention: &str, subject: &str, symbols: &SymbolTable) -> Option<String> {
    let intent = intention.trim().to_lowercase();
    if intent.is_empty() {
        return None;
    }
    if ["alive(", "dead(", "possessed_by("]
        .iter()
        .any(|p| intent.starts_with(p))
    {
        return Some(intent);
    }
    for ch in &symbols.characters {
        if intent.contains(ch.as_str()) {
            if intent.contains("dead") {
                return Some(format!("dead({ch})"));
            }
            if intent.contains("alive") {
                return Some(format!("alive({ch})"));
            }
        }
    }
    if intent.contains("possess") || intent.contains("med") {
        return Some(format!("possessed_by(meds,{subject})"));
    }
    None
}

/// Intention the model stated for this action, if the domain reads one.
pub fn stated(profile: &DomainProfile, action: &Action, symbols: &SymbolTable) -> Option<String> {
    match profile.intention_source {
        IntentionSource::None => None,
        IntentionSource::CharacterPlan => action
            .character_plan
            .as_deref()
            .and_then(extract_intention),
        IntentionSource::FreeText => action
            .intention
            .as_deref()
            .and_then(|text| normalize_free_text(text, &action.subject, symbols)),
    }
}

/// Render the domain's default template for this action.
///
/// Returns `None` when the domain has no template for the action or the
/// template references a parameter the action does not have.
pub fn default_for(profile: &DomainProfile, action: &Action) -> Option<String> {
    let template = profile.default_intention(action.action_id)?;
    render_template(template, &action.subject, &action.parameters)
}

fn render_template(template: &str, subject: &str, params: &[String]) -> Option<String> {
    let mut out = template.replace("{subject}", subject);
    if out.contains("{last}") {
        out = out.replace("{last}", params.last()?);
    }
    for (i, p) in params.iter().enumerate() {
        out = out.replace(&format!("{{{i}}}"), p);
    }
    if out.contains('{') {
        return None;
    }
    Some(out)
}
