//! Rich diagnostic error types for the narrplan harness.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so operators know exactly
//! what went wrong and how to fix it.
//!
//! Plan-parse failures are deliberately absent here: a model producing unusable
//! output is a recorded benchmark outcome ([`crate::parser::ParseResult`]), not
//! a harness error.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the harness.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum NarrError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Schema errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    #[error("unknown action id {id} for domain {domain}")]
    #[diagnostic(
        code(narrplan::schema::unknown_action),
        help(
            "The id is not in the domain's compiled-in action table. \
             List the valid ids with `narrplan actions --domain {domain}`."
        )
    )]
    UnknownActionId { domain: String, id: String },

    #[error("action {action} expects {expected} parameter(s), got {actual}")]
    #[diagnostic(
        code(narrplan::schema::arity_mismatch),
        help("Pass exactly as many parameters as the action schema declares.")
    )]
    ArityMismatch {
        action: String,
        expected: usize,
        actual: usize,
    },
}

// ---------------------------------------------------------------------------
// Symbol table errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SymbolError {
    #[error("failed to read fact file: {path}")]
    #[diagnostic(
        code(narrplan::symbols::read),
        help(
            "The file exists but could not be read as UTF-8 text. \
             Check its permissions and encoding; missing files are skipped, \
             unreadable ones are not."
        )
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Constraint builder errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    #[error("no intention available for action {action_id} at step {step}")]
    #[diagnostic(
        code(narrplan::build::missing_intention),
        help(
            "Intentional actions need a goal term. Either the model's \
             character_plan must mention one, or `default_intentions` must be \
             enabled in the experiment config."
        )
    )]
    MissingIntention { action_id: u8, step: usize },

    #[error("maxstep {maxstep} is too short for a plan of {steps} step(s)")]
    #[diagnostic(
        code(narrplan::build::horizon_too_short),
        help(
            "maxstep must be at least the number of actions so the final \
             timestep is inside the solver's horizon. Omit it to use len+1."
        )
    )]
    HorizonTooShort { maxstep: usize, steps: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),
}

// ---------------------------------------------------------------------------
// Solver errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SolverError {
    #[error("failed to launch solver `{solver}`")]
    #[diagnostic(
        code(narrplan::solver::launch),
        help(
            "Check that the solver binary exists and is executable, or point \
             `[solver] path` (or --solver) at it."
        )
    )]
    InvocationFailed {
        solver: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no fact files found under {domain_dir} / {instance_dir}")]
    #[diagnostic(
        code(narrplan::solver::no_fact_files),
        help(
            "The domain directory must contain a constraints/ folder with the \
             domain's .lp files. Check --domain-dir and --instance-dir."
        )
    )]
    NoFactFiles {
        domain_dir: String,
        instance_dir: String,
    },

    #[error("failed to write temporary constraints file")]
    #[diagnostic(
        code(narrplan::solver::temp_file),
        help("Check that the system temporary directory is writable.")
    )]
    TempFile {
        #[source]
        source: std::io::Error,
    },

    #[error("solver `{solver}` did not finish within {seconds}s")]
    #[diagnostic(
        code(narrplan::solver::timeout),
        help(
            "Raise `[solver] timeout_secs`, remove it to wait indefinitely, \
             or lower maxstep to shrink the search."
        )
    )]
    TimedOut { solver: String, seconds: u64 },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown domain: \"{name}\"")]
    #[diagnostic(
        code(narrplan::config::unknown_domain),
        help("Valid domains are: aladdin, western, secret_agent.")
    )]
    UnknownDomain { name: String },

    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(narrplan::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(narrplan::config::parse),
        help("Check the TOML syntax and field names in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(narrplan::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot determine home directory")]
    #[diagnostic(
        code(narrplan::config::no_home),
        help("Set the HOME environment variable or pass --config explicitly.")
    )]
    NoHome,
}

/// Convenience alias for functions returning harness results.
pub type NarrResult<T> = std::result::Result<T, NarrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_converts_to_narr_error() {
        let err = SchemaError::ArityMismatch {
            action: "move".into(),
            expected: 1,
            actual: 0,
        };
        let top: NarrError = err.into();
        assert!(matches!(
            top,
            NarrError::Schema(SchemaError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn build_error_wraps_schema_error() {
        let err: BuildError = SchemaError::UnknownActionId {
            domain: "western".into(),
            id: "9".into(),
        }
        .into();
        assert!(matches!(err, BuildError::Schema(_)));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = BuildError::HorizonTooShort {
            maxstep: 2,
            steps: 5,
        };
        let msg = format!("{err}");
        assert!(msg.contains('2'));
        assert!(msg.contains('5'));
    }
}
