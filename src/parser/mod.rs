//! Plan parser: raw model output → validated, normalized actions.
//!
//! Per action, in order, first failure wins and stops the whole parse:
//! 1. object with `subject`, `actionId`, `parameters` (and `character_plan`
//!    when the parser is configured to require it);
//! 2. subject normalization and acceptance;
//! 3. action id coercion;
//! 4. parameter list (or dictionary) shape, default completion, arity;
//! 5. every parameter resolves to a declared entity.
//!
//! A failure is a recorded outcome, not an error: [`ParseResult::Failure`]
//! carries the kind, the offending index, and every action validated before
//! it.

pub mod complete;
pub mod extract;

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{ActionIdSyntax, Domain, DomainProfile, SubjectRule};
use crate::error::SymbolError;
use crate::schema::{self, ActionId};
use crate::symbols::SymbolTable;

/// One validated action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub subject: String,
    #[serde(rename = "actionId")]
    pub action_id: ActionId,
    pub parameters: Vec<String>,
    #[serde(default = "default_executed")]
    pub executed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intention: Option<String>,
    /// Set when default completion changed the parameter list.
    #[serde(default)]
    pub filled_params: bool,
}

fn default_executed() -> bool {
    true
}

/// Why a parse stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorKind {
    #[serde(rename = "InvalidJSON")]
    InvalidJson,
    NotAList,
    MissingRequiredField,
    UnknownCharacter,
    UnknownActionId,
    ArityMismatch,
    InvalidParameterValue,
}

/// Structured parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Index of the offending action; absent for whole-document failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Actions validated before the failure.
    pub partial_actions: Vec<Action>,
}

/// Outcome of parsing one model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseResult {
    Success { actions: Vec<Action> },
    Failure(ParseFailure),
}

impl ParseResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success { .. })
    }

    /// All actions on success, the partial list on failure.
    pub fn actions(&self) -> &[Action] {
        match self {
            ParseResult::Success { actions } => actions,
            ParseResult::Failure(f) => &f.partial_actions,
        }
    }

    pub fn failure(&self) -> Option<&ParseFailure> {
        match self {
            ParseResult::Success { .. } => None,
            ParseResult::Failure(f) => Some(f),
        }
    }
}

/// Validation failure of a single action, before the index and partial
/// list are attached.
struct Rejection {
    kind: ParseErrorKind,
    message: String,
}

impl Rejection {
    fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Parser for one (domain, instance) pair. Owns its symbol table.
#[derive(Debug, Clone)]
pub struct PlanParser {
    profile: &'static DomainProfile,
    symbols: SymbolTable,
    require_character_plan: bool,
}

impl PlanParser {
    /// Load the symbol table from the domain and instance directories.
    pub fn new(domain: Domain, domain_dir: &Path, instance_dir: &Path) -> Result<Self, SymbolError> {
        let symbols = SymbolTable::for_domain(domain.profile(), domain_dir, instance_dir)?;
        Ok(Self::with_symbols(domain, symbols))
    }

    /// Use an already-built symbol table.
    pub fn with_symbols(domain: Domain, symbols: SymbolTable) -> Self {
        Self {
            profile: domain.profile(),
            symbols,
            require_character_plan: false,
        }
    }

    /// Require `character_plan` on intentional actions in domains that
    /// read intentions from it.
    pub fn require_character_plan(mut self, require: bool) -> Self {
        self.require_character_plan = require;
        self
    }

    pub fn domain(&self) -> Domain {
        self.profile.domain
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Parse raw model output.
    pub fn parse(&self, text: &str) -> ParseResult {
        let value = match extract::extract_json(text) {
            Ok(v) => v,
            Err(message) => {
                return ParseResult::Failure(ParseFailure {
                    kind: ParseErrorKind::InvalidJson,
                    message,
                    index: None,
                    partial_actions: Vec::new(),
                });
            }
        };
        let Value::Array(items) = value else {
            return ParseResult::Failure(ParseFailure {
                kind: ParseErrorKind::NotAList,
                message: format!("expected a JSON array of actions, got {}", json_type(&value)),
                index: None,
                partial_actions: Vec::new(),
            });
        };

        let mut actions = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match self.validate(item) {
                Ok(action) => actions.push(action),
                Err(rejection) => {
                    tracing::debug!(
                        domain = %self.profile.domain,
                        index,
                        kind = ?rejection.kind,
                        message = %rejection.message,
                        "action rejected"
                    );
                    return ParseResult::Failure(ParseFailure {
                        kind: rejection.kind,
                        message: rejection.message,
                        index: Some(index),
                        partial_actions: actions,
                    });
                }
            }
        }
        tracing::debug!(domain = %self.profile.domain, count = actions.len(), "plan parsed");
        ParseResult::Success { actions }
    }

    fn validate(&self, item: &Value) -> Result<Action, Rejection> {
        let Value::Object(obj) = item else {
            return Err(Rejection::new(
                ParseErrorKind::InvalidJson,
                format!("action must be an object, got {}", json_type(item)),
            ));
        };

        // 1. required fields
        for field in ["subject", "actionId", "parameters"] {
            if !obj.contains_key(field) {
                return Err(Rejection::new(
                    ParseErrorKind::MissingRequiredField,
                    format!("missing required field `{field}`"),
                ));
            }
        }
        if self.require_character_plan && !obj.contains_key("character_plan") {
            if let (Some(exempt), Some(id)) =
                (self.profile.plan_exempt, self.coerce_id(&obj["actionId"]))
            {
                if !exempt.contains(&id) {
                    return Err(Rejection::new(
                        ParseErrorKind::MissingRequiredField,
                        format!("missing required field `character_plan` for action {id}"),
                    ));
                }
            }
        }

        // 2. subject
        let subject = self.accept_subject(&obj["subject"])?;

        // 3. action id
        let raw_id = &obj["actionId"];
        let (action_id, schema) = self
            .coerce_id(raw_id)
            .and_then(|id| Some((id, schema::schema(self.profile.domain, id).ok()?)))
            .ok_or_else(|| {
                Rejection::new(
                    ParseErrorKind::UnknownActionId,
                    format!("unknown actionId {} for {}", scalar_text(raw_id), self.profile.domain),
                )
            })?;

        // 4. parameters
        let (given, defaulted) = self.parameter_list(action_id, &obj["parameters"])?;
        let mut parameters = given.clone();
        if parameters.len() < schema.arity as usize {
            parameters =
                complete::complete(self.profile, action_id, &given, &subject, &self.symbols);
        }
        let filled_params = defaulted || parameters != given;
        if parameters.len() != schema.arity as usize {
            return Err(Rejection::new(
                ParseErrorKind::ArityMismatch,
                format!(
                    "{} expects {} parameter(s), got {}",
                    schema.name,
                    schema.arity,
                    parameters.len()
                ),
            ));
        }

        // 5. parameter values
        let mut normalized = Vec::with_capacity(parameters.len());
        for (position, raw) in parameters.iter().enumerate() {
            let name = self.symbols.normalize(raw);
            if !self.accepts_param(action_id, position, &name) {
                return Err(Rejection::new(
                    ParseErrorKind::InvalidParameterValue,
                    format!("parameter {position} of {}: unknown entity `{name}`", schema.name),
                ));
            }
            normalized.push(name);
        }

        Ok(Action {
            subject,
            action_id,
            parameters: normalized,
            executed: obj.get("executed").map(coerce_bool).unwrap_or(true),
            character_plan: optional_text(obj, "character_plan"),
            intention: optional_text(obj, "intention"),
            filled_params,
        })
    }

    fn accept_subject(&self, raw: &Value) -> Result<String, Rejection> {
        let subject = self.symbols.normalize(&scalar_text(raw));
        let characters = &self.symbols.characters;
        if characters.contains(&subject) {
            return Ok(subject);
        }
        match self.profile.subject_rule {
            SubjectRule::Marker { marker, canonical } if subject.contains(marker) => {
                Ok(canonical.to_string())
            }
            _ if characters.is_empty() => Ok(subject),
            _ => Err(Rejection::new(
                ParseErrorKind::UnknownCharacter,
                format!("unknown character `{subject}`"),
            )),
        }
    }

    fn coerce_id(&self, raw: &Value) -> Option<ActionId> {
        match raw {
            Value::Number(n) => {
                if let Some(i) = n.as_u64() {
                    return ActionId::try_from(i).ok();
                }
                let f = n.as_f64()?;
                if f.fract() == 0.0 && (0.0..=f64::from(ActionId::MAX)).contains(&f) {
                    Some(f as ActionId)
                } else {
                    None
                }
            }
            Value::String(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<ActionId>() {
                    return Some(i);
                }
                match self.profile.id_syntax {
                    ActionIdSyntax::Integer => None,
                    ActionIdSyntax::Named => {
                        schema::id_by_name(self.profile.domain, &s.to_lowercase())
                    }
                }
            }
            _ => None,
        }
    }

    /// Raw parameters as text, plus whether a dictionary default was used.
    fn parameter_list(&self, id: ActionId, raw: &Value) -> Result<(Vec<String>, bool), Rejection> {
        match raw {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| match v {
                    Value::Array(_) | Value::Object(_) => Err(Rejection::new(
                        ParseErrorKind::InvalidParameterValue,
                        format!("parameter {i} must be a scalar, got {}", json_type(v)),
                    )),
                    other => Ok(scalar_text(other)),
                })
                .collect::<Result<_, _>>()
                .map(|params| (params, false)),
            Value::Object(map) => match self.profile.dict_params(id) {
                Some(dict) => {
                    let mut out = Vec::new();
                    let mut defaulted = false;
                    for (key, default) in dict.keys {
                        match (map.get(*key), default) {
                            (Some(v), _) => out.push(scalar_text(v)),
                            (None, Some(d)) => {
                                out.push((*d).to_string());
                                defaulted = true;
                            }
                            (None, None) => break,
                        }
                    }
                    Ok((out, defaulted))
                }
                None => Err(Rejection::new(
                    ParseErrorKind::InvalidParameterValue,
                    format!("parameters of action {id} must be a list"),
                )),
            },
            other => Err(Rejection::new(
                ParseErrorKind::InvalidParameterValue,
                format!("parameters must be a list, got {}", json_type(other)),
            )),
        }
    }

    fn accepts_param(&self, id: ActionId, position: usize, name: &str) -> bool {
        match self.profile.param_rule(id, position) {
            Some(rule) => {
                rule.kinds.iter().any(|k| self.symbols.contains(*k, name))
                    || rule.extra.contains(&name)
                    || rule.prefixes.iter().any(|p| name.starts_with(p))
            }
            None => self.symbols.is_known(name),
        }
    }
}

fn optional_text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::Null => None,
        v => Some(scalar_text(v)),
    }
}

/// Strings verbatim, everything else in its JSON rendering.
fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn coerce_bool(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "false" | "no" | "0" | "n" | "f"
        ),
        Value::Null => true,
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
