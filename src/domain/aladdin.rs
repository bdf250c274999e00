//! Aladdin-style fairy tale: intentional actions justified by goals.

use super::{
    ActionIdSyntax, CompletionRule, ConstraintStyle, DefaultIntention, Domain, DomainProfile,
    EntityKind, FactLayout, Fill, FillCondition, IntentionSource, Placement, SubjectRule,
};
use crate::schema::{ActionId, ActionSchema};

/// `do_nothing`, `fall_in_love` and `appear_threatening` carry no intention.
pub const UNINTENTIONAL: &[ActionId] = &[0, 7, 8];

const SCHEMAS: &[(ActionId, ActionSchema)] = &[
    (0, ActionSchema::new("do_nothing", 0)),
    (1, ActionSchema::new("cast_love_spell", 2)),
    (2, ActionSchema::new("pillage", 2)),
    (3, ActionSchema::new("kill", 1)),
    (4, ActionSchema::new("marry", 1)),
    (5, ActionSchema::new("give", 2)),
    (6, ActionSchema::new("move", 1)),
    (7, ActionSchema::new("fall_in_love", 1)),
    (8, ActionSchema::new("appear_threatening", 0)),
    (9, ActionSchema::new("order_to_kill", 2)),
    (10, ActionSchema::new("order_to_obtain", 2)),
];

// These defaults patch specific omissions observed in model output
// (the lamp as the implied object, the king as the implied commander).
const COMPLETIONS: &[CompletionRule] = &[
    // cast_love_spell(Target): the caster is the lover.
    CompletionRule {
        action_id: 1,
        given: 1,
        when: FillCondition::Always,
        fills: &[(Placement::Append, Fill::Subject)],
    },
    CompletionRule {
        action_id: 2,
        given: 1,
        when: FillCondition::Always,
        fills: &[(Placement::Append, Fill::Const("lamp"))],
    },
    CompletionRule {
        action_id: 5,
        given: 1,
        when: FillCondition::Always,
        fills: &[(Placement::Append, Fill::Const("lamp"))],
    },
    // order_to_kill(Victim): the order comes from the king.
    CompletionRule {
        action_id: 9,
        given: 1,
        when: FillCondition::Always,
        fills: &[(Placement::Prepend, Fill::Const("alice"))],
    },
    // order_to_obtain(Knight): the lamp is the object.
    CompletionRule {
        action_id: 10,
        given: 1,
        when: FillCondition::FirstIs(EntityKind::Character),
        fills: &[(Placement::Append, Fill::Const("lamp"))],
    },
    CompletionRule {
        action_id: 10,
        given: 1,
        when: FillCondition::FirstIsNot(EntityKind::Character),
        fills: &[(Placement::Prepend, Fill::Const("alice"))],
    },
    CompletionRule {
        action_id: 10,
        given: 0,
        when: FillCondition::Always,
        fills: &[
            (Placement::Append, Fill::Const("alice")),
            (Placement::Append, Fill::Const("lamp")),
        ],
    },
];

const DEFAULT_INTENTIONS: &[DefaultIntention] = &[
    DefaultIntention {
        action_id: 1,
        template: "marry({1})",
    },
    DefaultIntention {
        action_id: 2,
        template: "possessed_by({1}, {subject})",
    },
    DefaultIntention {
        action_id: 3,
        template: "dead({0})",
    },
    DefaultIntention {
        action_id: 4,
        template: "marry({0})",
    },
    DefaultIntention {
        action_id: 5,
        template: "possessed_by({1}, {0})",
    },
    DefaultIntention {
        action_id: 6,
        template: "possessed_by(lamp, {subject})",
    },
    DefaultIntention {
        action_id: 9,
        template: "dead({1})",
    },
    DefaultIntention {
        action_id: 10,
        template: "possessed_by({last}, {subject})",
    },
];

pub static PROFILE: DomainProfile = DomainProfile {
    domain: Domain::Aladdin,
    schemas: SCHEMAS,
    id_syntax: ActionIdSyntax::Integer,
    subject_rule: SubjectRule::Member,
    alias_prefixes: &["king ", "princess ", "knight ", "dragon ", "lamp spirit "],
    plan_exempt: Some(UNINTENTIONAL),
    completions: COMPLETIONS,
    param_rules: &[],
    dict_params: &[],
    unintentional: UNINTENTIONAL,
    skipped: &[],
    intention_source: IntentionSource::CharacterPlan,
    default_intentions: DEFAULT_INTENTIONS,
    fallback_intention: Some("marry(polly)"),
    default_switchable: true,
    constraint_style: ConstraintStyle::Intentional {
        exec_sensitive: false,
    },
    require_conflict: false,
    supplementary_scans: &[],
    layout: FactLayout {
        leading: &["domain.lp", "actions.lp", "init.lp", "goal.lp"],
        instance_fragments: false,
        trailing: &[],
    },
};
