//! The read-only coaching dataset: blockages, techniques and exercise templates.
//!
//! Loaded once at startup, validated, then shared behind an `Arc` for the
//! lifetime of the process. Nothing writes back to it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// The dataset compiled into the binary, used when no catalog file is configured.
const BUILTIN_CATALOG: &str = include_str!("builtin.json");

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blockage {
    pub id: String,
    pub label: String,
    pub goal: String,
    /// Recommended technique ids, in preference order. May contain duplicates.
    pub techniques: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technique {
    pub id: String,
    pub name: String,
    pub description: String,
    pub exercises: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    blockages: Vec<Blockage>,
    techniques: Vec<Technique>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("cannot read catalog {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate blockage id '{0}'")]
    DuplicateBlockage(String),

    #[error("duplicate technique id '{0}'")]
    DuplicateTechnique(String),

    #[error("blockage '{0}' recommends no techniques")]
    NoTechniques(String),

    #[error("blockage '{blockage}' references unknown technique '{technique}'")]
    DanglingTechnique { blockage: String, technique: String },
}

#[derive(Debug, Default)]
pub struct Catalog {
    blockages: Vec<Blockage>,
    techniques: Vec<Technique>,
    blockage_index: HashMap<String, usize>,
    technique_index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog without validating cross references.
    ///
    /// Later duplicates shadow earlier ones in lookups. Selection over an
    /// inconsistent catalog reports the inconsistency per request instead of
    /// at load time.
    pub fn from_parts(blockages: Vec<Blockage>, techniques: Vec<Technique>) -> Self {
        let blockage_index = blockages
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.clone(), i))
            .collect();
        let technique_index = techniques
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        Self {
            blockages,
            techniques,
            blockage_index,
            technique_index,
        }
    }

    /// Parses and validates a catalog document.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let catalog = Self::from_parts(file.blockages, file.techniques);
        catalog.validate()?;
        Ok(catalog)
    }

    /// The dataset shipped with the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Loads the catalog from `path`, or the built-in one when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let Some(path) = path else {
            tracing::info!("using built-in catalog");
            return Self::builtin();
        };

        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            blockages = catalog.blockages.len(),
            techniques = catalog.techniques.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.blockage_index.len() != self.blockages.len() {
            return Err(CatalogError::DuplicateBlockage(first_duplicate(
                self.blockages.iter().map(|b| b.id.as_str()),
            )));
        }
        if self.technique_index.len() != self.techniques.len() {
            return Err(CatalogError::DuplicateTechnique(first_duplicate(
                self.techniques.iter().map(|t| t.id.as_str()),
            )));
        }

        for blockage in &self.blockages {
            if blockage.techniques.is_empty() {
                return Err(CatalogError::NoTechniques(blockage.id.clone()));
            }
            if let Some(missing) = blockage
                .techniques
                .iter()
                .find(|id| !self.technique_index.contains_key(id.as_str()))
            {
                return Err(CatalogError::DanglingTechnique {
                    blockage: blockage.id.clone(),
                    technique: missing.clone(),
                });
            }
        }

        // Tolerated: the selector falls back to a default prompt.
        for technique in self.techniques.iter().filter(|t| t.exercises.is_empty()) {
            tracing::warn!(technique = %technique.id, "technique has no exercise templates");
        }

        Ok(())
    }

    pub fn blockage(&self, id: &str) -> Option<&Blockage> {
        self.blockage_index.get(id).map(|&i| &self.blockages[i])
    }

    pub fn technique(&self, id: &str) -> Option<&Technique> {
        self.technique_index.get(id).map(|&i| &self.techniques[i])
    }

    /// Blockages in dataset order.
    pub fn blockages(&self) -> &[Blockage] {
        &self.blockages
    }

    pub fn techniques(&self) -> &[Technique] {
        &self.techniques
    }
}

fn first_duplicate<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return id.to_string();
        }
    }
    String::new()
}
