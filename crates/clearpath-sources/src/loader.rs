//! Source definition loading from TOML files.
//!
//! The default set is embedded in the binary; a directory of `*.toml` files
//! can be loaded instead to update volatile selectors without a rebuild.

use crate::{
    definition::SourceDefinition,
    error::{Result, SourceError},
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Embedded default definitions, in registration order.
const BUILTIN_DEFINITIONS: &[(&str, &str)] = &[
    ("de.toml", include_str!("../definitions/de.toml")),
    ("ny.toml", include_str!("../definitions/ny.toml")),
    ("ca.toml", include_str!("../definitions/ca.toml")),
    ("fl.toml", include_str!("../definitions/fl.toml")),
    ("nj.toml", include_str!("../definitions/nj.toml")),
    ("wa.toml", include_str!("../definitions/wa.toml")),
];

/// Loader for source definitions.
pub struct SourceLoader {
    /// Base directory containing source definitions
    definitions_dir: PathBuf,
}

impl SourceLoader {
    /// Create a new loader with the given definitions directory.
    ///
    /// # Errors
    /// Returns error if the directory doesn't exist.
    pub fn new(definitions_dir: impl Into<PathBuf>) -> Result<Self> {
        let definitions_dir = definitions_dir.into();

        if !definitions_dir.is_dir() {
            return Err(SourceError::DirectoryNotFound {
                path: definitions_dir.display().to_string(),
            });
        }

        Ok(Self { definitions_dir })
    }

    /// The embedded default definitions.
    ///
    /// # Errors
    /// Returns error if an embedded definition is invalid.
    pub fn builtin() -> Result<Vec<SourceDefinition>> {
        BUILTIN_DEFINITIONS
            .iter()
            .map(|(origin, contents)| {
                let definition = parse_definition(contents, origin)?;
                definition.validate()?;
                Ok(definition)
            })
            .collect()
    }

    /// Load all source definitions from the definitions directory.
    ///
    /// Invalid definitions are logged as warnings and skipped. Files are
    /// visited in path order so registration order is stable.
    ///
    /// # Errors
    /// Returns error if the directory can't be read.
    pub fn load_all(&self) -> Result<Vec<SourceDefinition>> {
        let mut definitions = Vec::new();

        Self::walk_and_load_recursive(&self.definitions_dir, &mut definitions)?;

        info!(
            count = definitions.len(),
            dir = %self.definitions_dir.display(),
            "loaded source definitions"
        );

        Ok(definitions)
    }

    fn walk_and_load_recursive(dir: &Path, definitions: &mut Vec<SourceDefinition>) -> Result<()> {
        let mut paths = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        paths.sort();

        for path in paths {
            if path.is_dir() {
                Self::walk_and_load_recursive(&path, definitions)?;
                continue;
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                continue;
            }

            let loaded = std::fs::read_to_string(&path)
                .map_err(SourceError::from)
                .and_then(|contents| parse_definition(&contents, &path.display().to_string()));
            match loaded {
                Ok(definition) => {
                    if let Err(e) = definition.validate() {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "skipping invalid source definition"
                        );
                        continue;
                    }
                    if definitions.iter().any(|d| d.id() == definition.id()) {
                        warn!(path = %path.display(), source_id = %definition.id(), "skipping duplicate source definition");
                        continue;
                    }
                    debug!(source_id = %definition.id(), path = %path.display(), "loaded source definition");
                    definitions.push(definition);
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load source definition"
                    );
                }
            }
        }

        Ok(())
    }
}

fn parse_definition(contents: &str, origin: &str) -> Result<SourceDefinition> {
    toml::from_str(contents).map_err(|source| SourceError::Parse {
        origin: origin.to_string(),
        source,
    })
}
