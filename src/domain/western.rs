//! Western conflict scenario: a snakebite, scarce medicine, and rival plans.

use super::{
    ActionIdSyntax, CompletionRule, ConstraintStyle, DefaultIntention, Domain, DomainProfile,
    EntityKind, FactLayout, Fill, FillCondition, IntentionSource, Placement, ScanOrigin,
    SubjectRule, SupplementaryScan,
};
use crate::schema::{ActionId, ActionSchema};

/// The snakebite happens to a character; nobody intends it.
pub const SNAKEBITE: ActionId = 1;
/// Explicit "do nothing" steps occupy a timestep but emit no solver line.
pub const DO_NOTHING: ActionId = 6;

const SCHEMAS: &[(ActionId, ActionSchema)] = &[
    (1, ActionSchema::new("snakebite", 0)),
    (2, ActionSchema::new("move", 1)),
    // take(Obj, carl): buy from the merchant.
    (3, ActionSchema::new("take", 2)),
    // take(Obj, Other): take from anyone else.
    (4, ActionSchema::new("take", 2)),
    (5, ActionSchema::new("heal", 2)),
    (6, ActionSchema::new("do_nothing", 0)),
];

const COMPLETIONS: &[CompletionRule] = &[
    CompletionRule {
        action_id: 3,
        given: 0,
        when: FillCondition::Always,
        fills: &[
            (Placement::Append, Fill::Const("meds")),
            (Placement::Append, Fill::Const("carl")),
        ],
    },
    // A lone object is what is bought from carl; a lone name is the seller.
    CompletionRule {
        action_id: 3,
        given: 1,
        when: FillCondition::FirstIs(EntityKind::Object),
        fills: &[(Placement::Append, Fill::Const("carl"))],
    },
    CompletionRule {
        action_id: 3,
        given: 1,
        when: FillCondition::FirstIsNot(EntityKind::Object),
        fills: &[(Placement::Prepend, Fill::Const("meds"))],
    },
    CompletionRule {
        action_id: 4,
        given: 0,
        when: FillCondition::Always,
        fills: &[
            (Placement::Append, Fill::Const("meds")),
            (Placement::Append, Fill::Subject),
        ],
    },
    CompletionRule {
        action_id: 4,
        given: 1,
        when: FillCondition::Always,
        fills: &[(Placement::Prepend, Fill::Const("meds"))],
    },
    CompletionRule {
        action_id: 5,
        given: 1,
        when: FillCondition::Always,
        fills: &[(Placement::Append, Fill::Const("meds"))],
    },
];

const DEFAULT_INTENTIONS: &[DefaultIntention] = &[
    DefaultIntention {
        action_id: 2,
        template: "at({subject},{0})",
    },
    DefaultIntention {
        action_id: 3,
        template: "possessed_by({0},{subject})",
    },
    DefaultIntention {
        action_id: 4,
        template: "possessed_by({0},{subject})",
    },
    DefaultIntention {
        action_id: 5,
        template: "alive({0})",
    },
];

const SCANS: &[SupplementaryScan] = &[
    SupplementaryScan {
        origin: ScanOrigin::Instance,
        file: "instance.lp",
        pattern: r#"\brole\(\s*([A-Za-z0-9_]+)\s*,"#,
        kind: EntityKind::Character,
    },
    SupplementaryScan {
        origin: ScanOrigin::Domain,
        file: "prompts/2map.txt",
        pattern: r"\blocation\s+([A-Za-z0-9_]+)",
        kind: EntityKind::Place,
    },
];

pub static PROFILE: DomainProfile = DomainProfile {
    domain: Domain::Western,
    schemas: SCHEMAS,
    id_syntax: ActionIdSyntax::Integer,
    subject_rule: SubjectRule::Member,
    alias_prefixes: &[],
    plan_exempt: None,
    completions: COMPLETIONS,
    param_rules: &[],
    dict_params: &[],
    unintentional: &[SNAKEBITE],
    skipped: &[DO_NOTHING],
    intention_source: IntentionSource::FreeText,
    default_intentions: DEFAULT_INTENTIONS,
    fallback_intention: Some("alive(timmy)"),
    default_switchable: false,
    constraint_style: ConstraintStyle::Intentional {
        exec_sensitive: true,
    },
    require_conflict: true,
    supplementary_scans: SCANS,
    layout: FactLayout {
        leading: &["domain.lp", "actions.lp", "init.lp"],
        instance_fragments: true,
        trailing: &["goal.lp"],
    },
};
