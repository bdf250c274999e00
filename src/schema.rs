//! Action schema registry: action id → predicate name and arity.
//!
//! The tables are compiled into the domain profiles; this module only looks
//! them up and renders functors.

use serde::Serialize;

use crate::domain::Domain;
use crate::error::SchemaError;

/// Canonical numeric action identifier.
pub type ActionId = u8;

/// Predicate name and parameter count of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionSchema {
    pub name: &'static str,
    pub arity: u8,
}

impl ActionSchema {
    pub const fn new(name: &'static str, arity: u8) -> Self {
        Self { name, arity }
    }
}

/// Look up the schema for an action id.
pub fn schema(domain: Domain, id: ActionId) -> Result<ActionSchema, SchemaError> {
    domain
        .profile()
        .schemas
        .iter()
        .find(|(k, _)| *k == id)
        .map(|(_, s)| *s)
        .ok_or_else(|| SchemaError::UnknownActionId {
            domain: domain.to_string(),
            id: id.to_string(),
        })
}

/// Look up an action id by predicate name (first id carrying that name).
pub fn id_by_name(domain: Domain, name: &str) -> Option<ActionId> {
    domain
        .profile()
        .schemas
        .iter()
        .find(|(_, s)| s.name == name)
        .map(|(id, _)| *id)
}

/// Render `name`, `name(p0)` or `name(p0, p1)`.
///
/// Fails with [`SchemaError::ArityMismatch`] when `params.len()` differs
/// from the declared arity.
pub fn to_functor<S: AsRef<str>>(
    domain: Domain,
    id: ActionId,
    params: &[S],
) -> Result<String, SchemaError> {
    let schema = schema(domain, id)?;
    if params.len() != schema.arity as usize {
        return Err(SchemaError::ArityMismatch {
            action: schema.name.to_string(),
            expected: schema.arity as usize,
            actual: params.len(),
        });
    }
    Ok(match params {
        [] => schema.name.to_string(),
        [p0] => format!("{}({})", schema.name, p0.as_ref()),
        [p0, p1] => format!("{}({}, {})", schema.name, p0.as_ref(), p1.as_ref()),
        // Arity is 0..=2 for every table entry.
        _ => {
            let joined: Vec<&str> = params.iter().map(AsRef::as_ref).collect();
            format!("{}({})", schema.name, joined.join(", "))
        }
    })
}

/// Schema table of a domain, ordered by id.
pub fn table(domain: Domain) -> Vec<(ActionId, ActionSchema)> {
    let mut rows = domain.profile().schemas.to_vec();
    rows.sort_by_key(|(id, _)| *id);
    rows
}
