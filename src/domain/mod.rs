//! Planning domains and their per-domain configuration tables.
//!
//! Every behaviour that differs between the three benchmark domains is
//! expressed as data in a [`DomainProfile`]: the action schema table, the
//! default-completion rules, the parameter resolution rules, the intention
//! policy, and the fact-file layout. The parser, constraint builder and
//! solver invoker are generic over the profile, so adding a domain means
//! adding one more table module.

pub mod aladdin;
pub mod secret_agent;
pub mod western;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::{ActionId, ActionSchema};

/// One of the three fictional planning scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Aladdin-style fairy tale with intentional actions.
    Aladdin,
    /// Western conflict scenario with executed / non-executed actions.
    Western,
    /// Secret-agent infiltration scenario.
    SecretAgent,
}

impl Domain {
    /// All supported domains, in a stable order.
    pub const ALL: [Domain; 3] = [Domain::Aladdin, Domain::Western, Domain::SecretAgent];

    /// The static configuration table for this domain.
    pub fn profile(self) -> &'static DomainProfile {
        match self {
            Domain::Aladdin => &aladdin::PROFILE,
            Domain::Western => &western::PROFILE,
            Domain::SecretAgent => &secret_agent::PROFILE,
        }
    }

    /// Directory / CLI name of the domain.
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Aladdin => "aladdin",
            Domain::Western => "western",
            Domain::SecretAgent => "secret_agent",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "aladdin" => Ok(Domain::Aladdin),
            "western" => Ok(Domain::Western),
            "secret_agent" => Ok(Domain::SecretAgent),
            other => Err(ConfigError::UnknownDomain {
                name: other.to_string(),
            }),
        }
    }
}

/// The three entity kinds declared by ground facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Character,
    Place,
    Object,
}

/// How the raw `actionId` value is coerced into a canonical id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionIdSyntax {
    /// Integers, integral floats, and numeric strings.
    Integer,
    /// Numeric strings and predicate-name strings (`"move"`), as well as integers.
    Named,
}

/// Subject acceptance policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectRule {
    /// The normalized subject must be a declared character.
    Member,
    /// Declared characters pass unchanged; any other subject containing
    /// `marker` is accepted and rewritten to `canonical`.
    Marker {
        marker: &'static str,
        canonical: &'static str,
    },
}

/// A value appended or prepended by default completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// The (normalized) acting subject.
    Subject,
    /// A fixed entity name.
    Const(&'static str),
}

/// Where a completion value goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Append,
    Prepend,
}

/// Guard on the first provided parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillCondition {
    Always,
    FirstIs(EntityKind),
    FirstIsNot(EntityKind),
}

/// One default-completion rule: when `action_id` arrives with exactly
/// `given` parameters and `when` holds, apply `fills` in order.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRule {
    pub action_id: ActionId,
    pub given: usize,
    pub when: FillCondition,
    pub fills: &'static [(Placement, Fill)],
}

/// Accepted values for one parameter position of one action.
#[derive(Debug, Clone, Copy)]
pub struct ParamRule {
    pub action_id: ActionId,
    pub position: usize,
    pub kinds: &'static [EntityKind],
    /// Literal names accepted even when undeclared.
    pub extra: &'static [&'static str],
    /// Name prefixes accepted even when undeclared.
    pub prefixes: &'static [&'static str],
}

/// Positional mapping from dictionary-form parameters to a list.
#[derive(Debug, Clone, Copy)]
pub struct DictParams {
    pub action_id: ActionId,
    /// `(key, default)` pairs in positional order. A key with no default
    /// that is absent from the dictionary ends the list.
    pub keys: &'static [(&'static str, Option<&'static str>)],
}

/// Where an action's intention term comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentionSource {
    /// No intention concept applies.
    None,
    /// Extracted from the `character_plan` free text by fixed patterns.
    CharacterPlan,
    /// Normalized from the free-text `intention` field.
    FreeText,
}

/// Template used when no intention could be read off the action.
///
/// Placeholders: `{subject}`, `{0}`, `{1}`, `{last}`.
#[derive(Debug, Clone, Copy)]
pub struct DefaultIntention {
    pub action_id: ActionId,
    pub template: &'static str,
}

/// Predicate and argument shape used for one action in solver input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintStyle {
    /// `:- not act(S, F, T).` for every action.
    Uniform,
    /// `act/3` for unintentional ids, `act/4` with an intention otherwise.
    Intentional {
        /// Whether `executed: false` switches the `act/4` predicate to
        /// `unexec_act`.
        exec_sensitive: bool,
    },
}

/// Extra regex pass over one file, widening one entity set.
#[derive(Debug, Clone, Copy)]
pub struct SupplementaryScan {
    pub origin: ScanOrigin,
    /// Relative path under the origin directory.
    pub file: &'static str,
    /// Regex with one capture group holding the entity name.
    pub pattern: &'static str,
    pub kind: EntityKind,
}

/// Root directory a supplementary scan path is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrigin {
    Domain,
    Instance,
}

/// Ordered fact-file layout for solver input.
#[derive(Debug, Clone, Copy)]
pub struct FactLayout {
    /// Files under `<domain_dir>/constraints/` listed before instance files.
    pub leading: &'static [&'static str],
    /// Whether sorted `<instance_dir>/constraints/*.lp` fragments are included.
    pub instance_fragments: bool,
    /// Files under `<domain_dir>/constraints/` listed after instance files.
    pub trailing: &'static [&'static str],
}

/// Complete per-domain configuration.
#[derive(Debug)]
pub struct DomainProfile {
    pub domain: Domain,
    pub schemas: &'static [(ActionId, ActionSchema)],
    pub id_syntax: ActionIdSyntax,
    pub subject_rule: SubjectRule,
    pub alias_prefixes: &'static [&'static str],
    /// When set, `character_plan` is required unless the id is listed here.
    pub plan_exempt: Option<&'static [ActionId]>,
    pub completions: &'static [CompletionRule],
    /// Overrides of the default "any declared entity" parameter check.
    pub param_rules: &'static [ParamRule],
    pub dict_params: &'static [DictParams],
    pub unintentional: &'static [ActionId],
    /// Actions that produce no solver line at all.
    pub skipped: &'static [ActionId],
    pub intention_source: IntentionSource,
    pub default_intentions: &'static [DefaultIntention],
    pub fallback_intention: Option<&'static str>,
    /// Whether the `default_intentions` experiment switch can turn the
    /// templates and fallback off. When false they always apply.
    pub default_switchable: bool,
    pub constraint_style: ConstraintStyle,
    /// Append `:- not conflict(_,_,_,_,_).` to every constraint set.
    pub require_conflict: bool,
    pub supplementary_scans: &'static [SupplementaryScan],
    pub layout: FactLayout,
}

impl DomainProfile {
    /// Whether the action carries no intention term.
    pub fn is_unintentional(&self, id: ActionId) -> bool {
        self.unintentional.contains(&id)
    }

    /// Whether the action is dropped from solver input.
    pub fn is_skipped(&self, id: ActionId) -> bool {
        self.skipped.contains(&id)
    }

    /// Parameter rule for one position, if the domain overrides it.
    pub fn param_rule(&self, id: ActionId, position: usize) -> Option<&ParamRule> {
        self.param_rules
            .iter()
            .find(|r| r.action_id == id && r.position == position)
    }

    /// Dictionary key mapping for an action, if the domain accepts one.
    pub fn dict_params(&self, id: ActionId) -> Option<&DictParams> {
        self.dict_params.iter().find(|d| d.action_id == id)
    }

    /// Default-intention template for an action.
    pub fn default_intention(&self, id: ActionId) -> Option<&'static str> {
        self.default_intentions
            .iter()
            .find(|d| d.action_id == id)
            .map(|d| d.template)
    }
}
