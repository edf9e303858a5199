//! Unpack command - explode a ROM into a loose-file tree
//!
//! The tree uses the same layout `eggdev pack` reads, so packing it again
//! reproduces the ROM byte for byte. Command lists are decompiled to
//! `<rid>.txt` unless `--raw` is given; all other payloads land in
//! `<rid>.bin`.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use egg_common::cmdlist::Decompiler;
use egg_common::{Registry, Rom};
use egg_shared::CoreTid;

use crate::manifest::EggManifest;
use crate::schema::SchemaArgs;

/// Arguments for the unpack command
#[derive(Args)]
pub struct UnpackArgs {
    /// ROM file to unpack
    pub rom: PathBuf,

    /// Output directory
    #[arg(short, long)]
    pub output: PathBuf,

    /// Keep command lists binary instead of decompiling them
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub schema: SchemaArgs,
}

/// Execute the unpack command
pub fn execute(args: UnpackArgs, manifest: Option<&EggManifest>) -> Result<()> {
    let bytes = std::fs::read(&args.rom)
        .with_context(|| format!("Failed to read ROM: {}", args.rom.display()))?;
    let rom = Rom::decode(&bytes)
        .with_context(|| format!("Failed to decode ROM: {}", args.rom.display()))?;

    let mut registry = args.schema.registry(manifest);
    let count = unpack_rom(&rom, &args.output, &mut registry, args.raw)?;
    tracing::info!("Unpacked {} resources into {}", count, args.output.display());
    Ok(())
}

/// Write every resource of `rom` under `dir`. Returns the file count.
pub fn unpack_rom(rom: &Rom, dir: &Path, registry: &mut Registry, raw: bool) -> Result<usize> {
    registry.require().context("Failed to load schema")?;
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut count = 0;
    for res in rom {
        let (path, contents) = match CoreTid::from_tid(res.tid) {
            Some(CoreTid::Metadata) => (dir.join("metadata"), res.serial.clone()),
            Some(CoreTid::Code) => (dir.join("code.wasm"), res.serial.clone()),
            _ => {
                let type_dir = dir.join(type_dir_name(rom, res.tid));
                let schema = registry.command_schema(res.tid, rom.type_name(res.tid));
                if schema.is_some() && !raw {
                    let text = Decompiler::new(registry, res.tid, Some(rom))
                        .decompile(&res.serial)
                        .with_context(|| format!("Failed to decompile {}:{}", res.tid, res.rid))?;
                    (type_dir.join(format!("{}.txt", res.rid)), text.into_bytes())
                } else {
                    (type_dir.join(format!("{}.bin", res.rid)), res.serial.clone())
                }
            }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("Wrote {}", path.display());
        count += 1;
    }
    Ok(count)
}

/// Type name if known, else the decimal tid.
fn type_dir_name(rom: &Rom, tid: u8) -> String {
    rom.type_name(tid)
        .map(str::to_string)
        .unwrap_or_else(|| tid.to_string())
}
