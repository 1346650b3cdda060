use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for one generation run, usually read from `fsdb.yaml`.
///
/// ```yaml
/// package: store
/// root: data
/// output: src/store
/// statements:
///   - /group/users/user -> User
///   - /group/:id/meta -> Meta
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Module name the generated index is written for.
    pub package: String,
    /// Name of the root folder; its collection type is `<Root>Collection`.
    pub root: String,
    /// Directory receiving one file per unit plus `mod.rs`.
    pub output: PathBuf,
    pub statements: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package: "dummy".to_string(),
            root: "data".to_string(),
            output: PathBuf::from("./dummy"),
            statements: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}
