//! Fact-file discovery.
//!
//! A domain directory keeps its program under `constraints/`. Variant
//! directories (e.g. `domains/western/variant_b`) override a sibling
//! `base/` directory file by file, so a variant only ships what it changes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::domain::DomainProfile;

/// Instance init files, most specific first.
const INIT_FILES: &[&str] = &["instance_init.lp", "init.lp"];

/// Resolve `constraints/<name>` under the domain directory, falling back to
/// `../base/constraints/<name>`.
pub fn domain_file(domain_dir: &Path, name: &str) -> Option<PathBuf> {
    let own = domain_dir.join("constraints").join(name);
    if own.is_file() {
        return Some(own);
    }
    let base = domain_dir.parent()?.join("base").join("constraints").join(name);
    base.is_file().then_some(base)
}

/// Ordered, de-duplicated solver input files for one (domain, instance)
/// pair. Missing files contribute nothing.
pub fn collect(profile: &DomainProfile, domain_dir: &Path, instance_dir: &Path) -> Vec<PathBuf> {
    let layout = &profile.layout;
    let mut files = Vec::new();

    files.extend(layout.leading.iter().filter_map(|n| domain_file(domain_dir, n)));

    if layout.instance_fragments {
        files.extend(fragments(&instance_dir.join("constraints")));
    }

    if let Some(init) = INIT_FILES
        .iter()
        .map(|n| instance_dir.join(n))
        .find(|p| p.is_file())
    {
        files.push(init);
    }
    let instance = instance_dir.join("instance.lp");
    if instance.is_file() {
        files.push(instance);
    }

    files.extend(layout.trailing.iter().filter_map(|n| domain_file(domain_dir, n)));

    let mut seen = HashSet::new();
    files.retain(|p| seen.insert(p.clone()));
    files
}

/// Sorted `*.lp` files of a directory; empty when it does not exist.
fn fragments(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut out: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|x| x == "lp"))
        .collect();
    out.sort();
    out
}
