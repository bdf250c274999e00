//! Secret-agent infiltration: move past guards, collect documents, reach the target.

use super::{
    ActionIdSyntax, ConstraintStyle, DictParams, Domain, DomainProfile, EntityKind, FactLayout,
    IntentionSource, ParamRule, SubjectRule,
};
use crate::schema::{ActionId, ActionSchema};

const SCHEMAS: &[(ActionId, ActionSchema)] = &[
    (1, ActionSchema::new("move", 1)),
    (2, ActionSchema::new("move_through_guards", 2)),
    (3, ActionSchema::new("pickup", 1)),
    (4, ActionSchema::new("kill", 1)),
];

const PLACES: &[EntityKind] = &[EntityKind::Place];
const OBJECTS: &[EntityKind] = &[EntityKind::Object];
const CHARACTERS: &[EntityKind] = &[EntityKind::Character];

const PARAM_RULES: &[ParamRule] = &[
    ParamRule {
        action_id: 1,
        position: 0,
        kinds: PLACES,
        extra: &[],
        prefixes: &[],
    },
    ParamRule {
        action_id: 2,
        position: 0,
        kinds: PLACES,
        extra: &[],
        prefixes: &[],
    },
    ParamRule {
        action_id: 2,
        position: 1,
        kinds: OBJECTS,
        extra: &[],
        prefixes: &["dox"],
    },
    // Weapons and documents are often left out of the object facts.
    ParamRule {
        action_id: 3,
        position: 0,
        kinds: OBJECTS,
        extra: &["gun"],
        prefixes: &["dox"],
    },
    ParamRule {
        action_id: 4,
        position: 0,
        kinds: CHARACTERS,
        extra: &["mastermind"],
        prefixes: &[],
    },
];

const DICT_PARAMS: &[DictParams] = &[
    DictParams {
        action_id: 1,
        keys: &[("location", None)],
    },
    DictParams {
        action_id: 2,
        keys: &[("location", None), ("dox", Some("dox"))],
    },
    DictParams {
        action_id: 3,
        keys: &[("item", None)],
    },
    DictParams {
        action_id: 4,
        keys: &[("target", None)],
    },
];

pub static PROFILE: DomainProfile = DomainProfile {
    domain: Domain::SecretAgent,
    schemas: SCHEMAS,
    id_syntax: ActionIdSyntax::Named,
    subject_rule: SubjectRule::Marker {
        marker: "agent",
        canonical: "secret_agent",
    },
    alias_prefixes: &[],
    plan_exempt: None,
    completions: &[],
    param_rules: PARAM_RULES,
    dict_params: DICT_PARAMS,
    unintentional: &[],
    skipped: &[],
    intention_source: IntentionSource::None,
    default_intentions: &[],
    fallback_intention: None,
    default_switchable: false,
    constraint_style: ConstraintStyle::Uniform,
    require_conflict: false,
    supplementary_scans: &[],
    layout: FactLayout {
        leading: &["domain.lp", "actions.lp", "init.lp", "goal.lp"],
        instance_fragments: true,
        trailing: &[],
    },
};
