//! Harness configuration, persisted as TOML.
//!
//! Looked up in order: an explicit `--config` path, then
//! `$XDG_CONFIG_HOME/narrplan/config.toml` if present, then built-in
//! defaults. CLI flags override whatever was loaded.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::evaluate::EvalParams;
use crate::paths::NarrPaths;

/// `[solver]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Solver executable, looked up on `PATH` when not absolute.
    #[serde(default = "default_solver_path")]
    pub path: String,
    /// Kill the solver after this many seconds. Absent: wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// `[experiment]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Solver horizon. Absent: number of actions + 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxstep: Option<usize>,
    /// Fill missing intentions from per-action templates.
    #[serde(default = "default_true")]
    pub default_intentions: bool,
    /// Reject intentional fairy-tale actions without a `character_plan`.
    #[serde(default)]
    pub require_character_plan: bool,
    /// Western conflict score denominator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_conflicts: Option<u32>,
    /// Batch worker threads.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Directory holding one subdirectory per domain.
    #[serde(default = "default_domains_root")]
    pub domains_root: PathBuf,
    /// Domain program variant under `<domains_root>/<domain>/`.
    #[serde(default = "default_asp_version")]
    pub asp_version: String,
}

/// Complete harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub experiment: ExperimentConfig,
}

fn default_solver_path() -> String {
    "clingo".into()
}
fn default_true() -> bool {
    true
}
fn default_workers() -> usize {
    1
}
fn default_domains_root() -> PathBuf {
    PathBuf::from("domains")
}
fn default_asp_version() -> String {
    "original".into()
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            path: default_solver_path(),
            timeout_secs: None,
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            maxstep: None,
            default_intentions: default_true(),
            require_character_plan: false,
            expected_conflicts: None,
            workers: default_workers(),
            domains_root: default_domains_root(),
            asp_version: default_asp_version(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub solver: Option<String>,
    pub maxstep: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub workers: Option<usize>,
}

impl BenchConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Explicit path, else the XDG config file if it exists, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let Ok(paths) = NarrPaths::resolve() else {
            return Ok(Self::default());
        };
        let file = paths.config_file();
        if file.is_file() {
            tracing::debug!(path = %file.display(), "loading config");
            Self::load(&file)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply command-line overrides.
    pub fn apply(&mut self, o: &Overrides) {
        if let Some(solver) = &o.solver {
            self.solver.path = solver.clone();
        }
        if o.maxstep.is_some() {
            self.experiment.maxstep = o.maxstep;
        }
        if o.timeout_secs.is_some() {
            self.solver.timeout_secs = o.timeout_secs;
        }
        if let Some(workers) = o.workers {
            self.experiment.workers = workers;
        }
    }

    pub fn solver_timeout(&self) -> Option<Duration> {
        self.solver.timeout_secs.map(Duration::from_secs)
    }

    pub fn eval_params(&self) -> EvalParams {
        EvalParams {
            expected_conflicts: self.experiment.expected_conflicts,
        }
    }

    /// `<domains_root>/<domain>/<asp_version>`.
    pub fn domain_dir(&self, domain: crate::domain::Domain) -> PathBuf {
        self.experiment
            .domains_root
            .join(domain.as_str())
            .join(&self.experiment.asp_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: BenchConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, BenchConfig::default());
        assert_eq!(cfg.solver.path, "clingo");
        assert!(cfg.experiment.default_intentions);
        assert_eq!(cfg.experiment.workers, 1);
        assert_eq!(cfg.solver_timeout(), None);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let cfg: BenchConfig = toml::from_str(
            "[solver]\ntimeout_secs = 30\n\n[experiment]\nexpected_conflicts = 2\n",
        )
        .unwrap();
        assert_eq!(cfg.solver.path, "clingo");
        assert_eq!(cfg.solver_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.eval_params().expected_conflicts, Some(2));
        assert_eq!(cfg.experiment.asp_version, "original");
    }

    #[test]
    fn save_and_load_through_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut cfg = BenchConfig::default();
        cfg.experiment.maxstep = Some(12);
        cfg.save(&path).unwrap();
        assert_eq!(BenchConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[solver\npath = 3").unwrap();
        assert!(matches!(
            BenchConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            BenchConfig::discover(Some(&dir.path().join("missing.toml"))),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn overrides_win() {
        let mut cfg = BenchConfig::default();
        cfg.apply(&Overrides {
            solver: Some("/opt/clingo".into()),
            maxstep: Some(9),
            timeout_secs: None,
            workers: Some(4),
        });
        assert_eq!(cfg.solver.path, "/opt/clingo");
        assert_eq!(cfg.experiment.maxstep, Some(9));
        assert_eq!(cfg.experiment.workers, 4);
        assert_eq!(cfg.solver.timeout_secs, None);
    }

    #[test]
    fn domain_dir_joins_version() {
        let cfg = BenchConfig::default();
        assert_eq!(
            cfg.domain_dir(crate::domain::Domain::Western),
            PathBuf::from("domains/western/original")
        );
    }
}
