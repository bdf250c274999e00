//! Symbol table: characters, places and objects declared by ground facts.
//!
//! The loader is a deliberately narrow scanner for the ground-fact subset of
//! ASP syntax the domain files use: one `predicate(args).` fact per line,
//! optionally with `;`-separated alternatives inside the parentheses. It is
//! not a grammar for the full language and does not try to be one.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::{DomainProfile, EntityKind, ScanOrigin};
use crate::error::SymbolError;
use crate::solver::layout;

static RE_CHARACTER: LazyLock<Regex> = LazyLock::new(|| fact_regex("character"));
static RE_PLACE: LazyLock<Regex> = LazyLock::new(|| fact_regex("place"));
static RE_LOCATION: LazyLock<Regex> = LazyLock::new(|| fact_regex("location"));
static RE_OBJECT: LazyLock<Regex> = LazyLock::new(|| fact_regex("object"));

fn fact_regex(predicate: &str) -> Regex {
    Regex::new(&format!(r"\b{predicate}\(\s*([^)]+?)\s*\)\s*\.")).unwrap()
}

/// Instance files scanned for declarations, in order.
const INSTANCE_SYMBOL_FILES: &[&str] = &["instance.lp", "init.lp", "instance_init.lp"];

/// Declared entities of one (domain, instance) pair plus display-name aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolTable {
    pub characters: BTreeSet<String>,
    pub places: BTreeSet<String>,
    pub objects: BTreeSet<String>,
    /// Lowercased alias → canonical name.
    pub aliases: BTreeMap<String, String>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan domain and instance fact files. Files that do not exist are skipped.
    pub fn load<P: AsRef<Path>>(
        domain_files: &[P],
        instance_files: &[P],
    ) -> Result<Self, SymbolError> {
        let mut table = Self::new();
        for path in domain_files.iter().chain(instance_files) {
            if let Some(text) = read_if_exists(path.as_ref())? {
                table.scan_text(&text);
            }
        }
        Ok(table)
    }

    /// Build the table for a domain: generic scan, the domain's
    /// supplementary scans, then alias construction.
    pub fn for_domain(
        profile: &DomainProfile,
        domain_dir: &Path,
        instance_dir: &Path,
    ) -> Result<Self, SymbolError> {
        let domain_files: Vec<PathBuf> = layout::domain_file(domain_dir, "domain.lp")
            .into_iter()
            .collect();
        let instance_files: Vec<PathBuf> = INSTANCE_SYMBOL_FILES
            .iter()
            .map(|name| instance_dir.join(name))
            .collect();

        let mut table = Self::load(&domain_files, &instance_files)?;

        for scan in profile.supplementary_scans {
            let root = match scan.origin {
                ScanOrigin::Domain => domain_dir,
                ScanOrigin::Instance => instance_dir,
            };
            let path = root.join(scan.file);
            let text = match read_if_exists(&path) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping supplementary scan");
                    continue;
                }
            };
            let re = match Regex::new(scan.pattern) {
                Ok(re) => re,
                Err(e) => {
                    tracing::warn!(pattern = scan.pattern, error = %e, "invalid scan pattern");
                    continue;
                }
            };
            for caps in re.captures_iter(&text) {
                if let Some(m) = caps.get(1) {
                    table.insert(scan.kind, m.as_str().trim());
                }
            }
        }

        table.build_aliases(profile.alias_prefixes);

        tracing::info!(
            domain = %profile.domain,
            characters = table.characters.len(),
            places = table.places.len(),
            objects = table.objects.len(),
            aliases = table.aliases.len(),
            "symbol table loaded"
        );
        Ok(table)
    }

    /// Scan one file's text for `character/1`, `place/1` (or `location/1`
    /// when the text declares no places), and `object/1` facts.
    pub fn scan_text(&mut self, text: &str) {
        let characters = extract(text, &RE_CHARACTER);
        let mut places = extract(text, &RE_PLACE);
        if places.is_empty() {
            places = extract(text, &RE_LOCATION);
        }
        let objects = extract(text, &RE_OBJECT);

        self.characters.extend(characters);
        self.places.extend(places);
        self.objects.extend(objects);
    }

    /// Add one entity name.
    pub fn insert(&mut self, kind: EntityKind, name: &str) {
        if name.is_empty() {
            return;
        }
        let set = match kind {
            EntityKind::Character => &mut self.characters,
            EntityKind::Place => &mut self.places,
            EntityKind::Object => &mut self.objects,
        };
        set.insert(name.to_string());
    }

    /// Register `prefix + character` aliases for every character.
    ///
    /// Keys are stored lowercased; matching happens case-insensitively in
    /// [`SymbolTable::normalize`].
    pub fn build_aliases(&mut self, prefixes: &[&str]) {
        for ch in &self.characters {
            let canonical = ch.trim().to_lowercase();
            for prefix in prefixes {
                let key = format!("{}{}", prefix.to_lowercase(), canonical);
                if key != canonical {
                    self.aliases.insert(key, canonical.clone());
                }
            }
        }
    }

    /// Trim, lowercase, and resolve aliases.
    ///
    /// Idempotent: every alias key is strictly longer than its target, so
    /// resolution terminates at a name that is not itself an alias.
    pub fn normalize(&self, name: &str) -> String {
        let mut current = name.trim().to_lowercase();
        while let Some(target) = self.aliases.get(&current) {
            if target.len() >= current.len() {
                break;
            }
            current = target.clone();
        }
        current
    }

    /// Whether `name` is declared with the given kind.
    pub fn contains(&self, kind: EntityKind, name: &str) -> bool {
        match kind {
            EntityKind::Character => self.characters.contains(name),
            EntityKind::Place => self.places.contains(name),
            EntityKind::Object => self.objects.contains(name),
        }
    }

    /// Whether `name` is declared with any kind.
    pub fn is_known(&self, name: &str) -> bool {
        self.characters.contains(name) || self.places.contains(name) || self.objects.contains(name)
    }
}

fn read_if_exists(path: &Path) -> Result<Option<String>, SymbolError> {
    if !path.exists() {
        return Ok(None);
    }
    std::fs::read_to_string(path)
        .map(Some)
        .map_err(|source| SymbolError::Read {
            path: path.display().to_string(),
            source,
        })
}

/// First fact of one predicate per line, split on `;`.
fn extract(text: &str, re: &Regex) -> BTreeSet<String> {
    let mut atoms = BTreeSet::new();
    for line in text.lines() {
        let line = line.split('%').next().unwrap_or("");
        let Some(caps) = re.captures(line) else {
            continue;
        };
        let Some(args) = caps.get(1) else {
            continue;
        };
        for chunk in args.as_str().split(';') {
            let atom = chunk.trim();
            if is_ground_constant(atom) {
                atoms.insert(atom.to_string());
            }
        }
    }
    atoms
}

/// Variables (`X`, `_`) are not declarations.
fn is_ground_constant(atom: &str) -> bool {
    match atom.chars().next() {
        Some(c) => !(c.is_uppercase() || c == '_'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACTS: &str = "\
% cast
character(alice).
character(jasmine; genie ; aladdin).
place(palace).
object(lamp).
object(X) :- treasure(X).
character(C).
";

    fn table() -> SymbolTable {
        let mut t = SymbolTable::new();
        t.scan_text(FACTS);
        t.build_aliases(&["king ", "princess ", "lamp spirit "]);
        t
    }

    #[test]
    fn scans_semicolon_alternatives() {
        let t = table();
        assert!(t.characters.contains("jasmine"));
        assert!(t.characters.contains("genie"));
        assert!(t.characters.contains("aladdin"));
        assert_eq!(t.characters.len(), 4);
        assert!(t.places.contains("palace"));
        assert!(t.objects.contains("lamp"));
    }

    #[test]
    fn skips_rules_and_variables() {
        let t = table();
        assert!(!t.objects.contains("X"));
        assert!(!t.characters.contains("C"));
    }

    #[test]
    fn location_is_a_fallback_for_place() {
        let mut t = SymbolTable::new();
        t.scan_text("location(saloon; ranch).\n");
        assert!(t.places.contains("saloon"));
        assert!(t.places.contains("ranch"));

        let mut both = SymbolTable::new();
        both.scan_text("place(town).\nlocation(desert).\n");
        assert!(both.places.contains("town"));
        assert!(!both.places.contains("desert"));
    }

    #[test]
    fn prefix_aliases_resolve_case_insensitively() {
        let t = table();
        assert_eq!(t.normalize("Princess Jasmine"), "jasmine");
        assert_eq!(t.normalize("  LAMP SPIRIT genie "), "genie");
        assert_eq!(t.normalize("King Alice"), "alice");
        assert_eq!(t.normalize("Palace"), "palace");
    }

    #[test]
    fn normalization_is_idempotent() {
        let t = table();
        for s in [
            "Princess Jasmine",
            "princess princess jasmine",
            " GENIE ",
            "lamp spirit genie",
            "unknown thing",
            "",
            "ÄRGER",
        ] {
            let once = t.normalize(s);
            assert_eq!(t.normalize(&once), once, "{s:?}");
        }
    }

    #[test]
    fn load_skips_missing_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let present = dir.path().join("domain.lp");
        std::fs::write(&present, "object(meds).\n").unwrap();
        let missing = dir.path().join("nope.lp");
        let t = SymbolTable::load(&[present], &[missing]).unwrap();
        assert!(t.objects.contains("meds"));
    }

    #[test]
    fn for_domain_runs_supplementary_scans() {
        let domain_dir = tempfile::TempDir::new().unwrap();
        let instance_dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(domain_dir.path().join("constraints")).unwrap();
        std::fs::create_dir_all(domain_dir.path().join("prompts")).unwrap();
        std::fs::write(
            domain_dir.path().join("constraints/domain.lp"),
            "object(meds).\ncharacter(carl).\n",
        )
        .unwrap();
        std::fs::write(
            domain_dir.path().join("prompts/2map.txt"),
            "There is a location saloon north of the location ranch.\n",
        )
        .unwrap();
        std::fs::write(
            instance_dir.path().join("instance.lp"),
            "role(timmy, \"a wounded boy\").\n",
        )
        .unwrap();

        let t = SymbolTable::for_domain(
            crate::domain::Domain::Western.profile(),
            domain_dir.path(),
            instance_dir.path(),
        )
        .unwrap();
        assert!(t.characters.contains("carl"));
        assert!(t.characters.contains("timmy"));
        assert!(t.places.contains("saloon"));
        assert!(t.places.contains("ranch"));
        assert!(t.objects.contains("meds"));
    }
}
