use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::CoreError;
use crate::registry::{LibraryEntry, LibraryRegistry};

pub fn default_stdlib_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../stdlib")
}

/// Loads a registry from a directory of `<module>.json` files.
///
/// Each file holds one module object; the file stem becomes the module name.
/// Nested directories are walked as well, but only the stem is used.
pub fn load_registry(root: impl AsRef<Path>) -> Result<LibraryRegistry, CoreError> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(CoreError::MissingStdlib(root.to_path_buf()));
    }

    let mut registry = LibraryRegistry::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let contents = fs::read_to_string(path)?;
        let module: LibraryEntry =
            serde_json::from_str(&contents).map_err(|err| CoreError::Registry {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        tracing::debug!(module = name, path = %path.display(), "loaded stdlib module");
        registry.insert(name, module);
    }
    Ok(registry)
}
