// trackfit_sim/src/simulation/config/catalog.rs

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

/// A scenario file found on disk, keyed like `"thin.low_pt"` for
/// `<root>/thin/low_pt.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioEntry {
    pub key: String,
    pub path: PathBuf,
}

/// Walks `root` recursively and returns every `.toml` file, sorted by key.
pub fn discover_scenarios(root: &Path) -> Vec<ScenarioEntry> {
    if !root.exists() {
        warn!("Scenario directory not found at {:?}, nothing to sweep.", root);
        return Vec::new();
    }

    info!("Discovering scenarios under: {:?}", root);

    let mut entries: Vec<ScenarioEntry> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            !e.file_type().is_dir() && e.path().extension().is_some_and(|ext| ext == "toml")
        })
        .map(|e| {
            let path = e.into_path();
            let key = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .with_extension("")
                .to_string_lossy()
                .replace(std::path::MAIN_SEPARATOR, ".");
            ScenarioEntry { key, path }
        })
        .collect();

    entries.sort_by(|a, b| a.key.cmp(&b.key));
    entries
}
