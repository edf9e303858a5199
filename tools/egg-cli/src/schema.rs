//! Schema options shared by every command that needs the registry

use clap::Args;
use std::path::PathBuf;

use egg_common::Registry;

use crate::manifest::EggManifest;

#[derive(Args, Debug, Default)]
pub struct SchemaArgs {
    /// Schema header defining command and value names (repeatable)
    #[arg(short, long = "schema", value_name = "HEADER")]
    pub schema: Vec<PathBuf>,
}

impl SchemaArgs {
    /// Registry over the manifest's headers followed by the command line's.
    pub fn registry(&self, manifest: Option<&EggManifest>) -> Registry {
        let mut registry = Registry::new();
        let from_manifest = manifest.map(EggManifest::schema_paths).unwrap_or_default();
        for path in from_manifest.into_iter().chain(self.schema.iter().cloned()) {
            tracing::debug!("Schema: {}", path.display());
            registry.add_schema_file(path);
        }
        registry
    }
}
