// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # narrplan
//!
//! A benchmark harness that checks language-model narrative plans against
//! answer-set-programming domain models.
//!
//! ## Architecture
//!
//! - **Domains** (`domain`): per-domain data tables (schemas, completion
//!   rules, intention policy, fact-file layout) for the fairy-tale, western
//!   and secret-agent scenarios
//! - **Plan parser** (`parser`): JSON extraction, validation, default
//!   completion and name normalization against a fact-file symbol table
//! - **Constraint builder** (`constraints`): integrity constraints, one per
//!   action and timestep
//! - **Solver invoker** (`solver`): external solver subprocess and verdict
//!   classification
//! - **Evaluator** (`evaluate`) and **pipeline** (`pipeline`): metrics and
//!   stage-tagged run records, sequential or on a rayon pool
//!
//! ## Library usage
//!
//! ```no_run
//! use narrplan::domain::Domain;
//! use narrplan::parser::PlanParser;
//! use std::path::Path;
//!
//! let parser = PlanParser::new(
//!     Domain::SecretAgent,
//!     Path::new("domains/secret_agent/original"),
//!     Path::new("instances/secret_agent/0"),
//! )
//! .unwrap();
//! let result = parser.parse(r#"[{"subject":"agent","actionId":1,"parameters":["l0_1"]}]"#);
//! println!("{}", serde_json::to_string_pretty(&result).unwrap());
//! ```

pub mod config;
pub mod constraints;
pub mod domain;
pub mod error;
pub mod evaluate;
pub mod intention;
pub mod parser;
pub mod paths;
pub mod pipeline;
pub mod schema;
pub mod solver;
pub mod symbols;
