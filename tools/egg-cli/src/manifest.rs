//! eggdev.toml manifest parsing
//!
//! Shared manifest structures used by pack, unpack and the command-list
//! commands. Relative paths are taken from the manifest's directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// eggdev.toml manifest structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EggManifest {
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default)]
    pub pack: PackSection,

    /// Directory the manifest was loaded from
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Project-wide settings
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    /// Schema headers, loaded in order
    #[serde(default)]
    pub schema: Vec<PathBuf>,
}

/// Defaults for `eggdev pack`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackSection {
    /// ROM files and loose-file directories, later ones override earlier
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
}

impl EggManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let mut manifest = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        manifest.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(manifest)
    }

    /// Load the manifest if the file exists
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::debug!("No manifest at {}", path.display());
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid eggdev.toml")
    }

    /// Resolve a manifest-relative path
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn schema_paths(&self) -> Vec<PathBuf> {
        self.project.schema.iter().map(|p| self.resolve(p)).collect()
    }

    pub fn pack_inputs(&self) -> Vec<PathBuf> {
        self.pack.inputs.iter().map(|p| self.resolve(p)).collect()
    }

    pub fn pack_output(&self) -> Option<PathBuf> {
        self.pack.output.as_deref().map(|p| self.resolve(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_empty() {
        let manifest = EggManifest::parse("").unwrap();
        assert!(manifest.project.schema.is_empty());
        assert!(manifest.pack.inputs.is_empty());
        assert!(manifest.pack.output.is_none());
    }

    #[test]
    fn test_manifest_full() {
        let manifest = EggManifest::parse(
            r#"
[project]
schema = ["include/egg_cmd.h", "include/game.h"]

[pack]
inputs = ["base.egg", "data"]
output = "out/game.egg"
"#,
        )
        .unwrap();
        assert_eq!(manifest.project.schema.len(), 2);
        assert_eq!(
            manifest.pack.inputs,
            vec![PathBuf::from("base.egg"), PathBuf::from("data")]
        );
        assert_eq!(manifest.pack.output, Some(PathBuf::from("out/game.egg")));
    }

    #[test]
    fn test_manifest_rejects_unknown_keys() {
        assert!(EggManifest::parse("[project]\nschemas = []\n").is_err());
        assert!(EggManifest::parse("[pack]\ninputs = \"data\"\n").is_err());
        assert!(EggManifest::parse("[project]\nvolatile = true\n").is_err());
    }

    #[test]
    fn test_paths_relative_to_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eggdev.toml");
        std::fs::write(
            &path,
            "[project]\nschema = [\"egg.h\"]\n[pack]\ninputs = [\"data\"]\noutput = \"game.egg\"\n",
        )
        .unwrap();

        let manifest = EggManifest::load_optional(&path).unwrap().unwrap();
        assert_eq!(manifest.schema_paths(), vec![dir.path().join("egg.h")]);
        assert_eq!(manifest.pack_inputs(), vec![dir.path().join("data")]);
        assert_eq!(manifest.pack_output(), Some(dir.path().join("game.egg")));
    }

    #[test]
    fn test_missing_manifest_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(
            EggManifest::load_optional(&dir.path().join("eggdev.toml"))
                .unwrap()
                .is_none()
        );
    }
}
