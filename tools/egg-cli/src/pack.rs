//! Pack command - merge ROMs and loose asset trees into one .egg ROM
//!
//! Each input is one generation: a resource may appear once per input, and
//! later inputs replace resources from earlier ones. Loose files of a type
//! with a command schema are compiled from text unless named `*.bin`;
//! everything else is stored verbatim.

use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use egg_common::cmdlist::Compiler;
use egg_common::{Registry, Rom, RomReader, resolve_path};

use crate::manifest::EggManifest;
use crate::schema::SchemaArgs;

/// Arguments for the pack command
#[derive(Args)]
pub struct PackArgs {
    /// ROM files and loose-file directories, later ones override earlier
    pub inputs: Vec<PathBuf>,

    /// Output .egg file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub schema: SchemaArgs,
}

/// Execute the pack command
pub fn execute(args: PackArgs, manifest: Option<&EggManifest>) -> Result<()> {
    let inputs = if args.inputs.is_empty() {
        manifest.map(EggManifest::pack_inputs).unwrap_or_default()
    } else {
        args.inputs
    };
    if inputs.is_empty() {
        bail!("Nothing to pack: give inputs on the command line or in [pack] inputs");
    }
    let Some(output) = args.output.or_else(|| manifest.and_then(EggManifest::pack_output)) else {
        bail!("No output path: use --output or [pack] output");
    };

    let mut registry = args.schema.registry(manifest);
    let rom = pack_inputs(&inputs, &mut registry)?;
    let bytes = rom.encode().context("Failed to encode ROM")?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write ROM: {}", output.display()))?;

    tracing::info!(
        "Packed {} resources into {} ({} bytes)",
        rom.len(),
        output.display(),
        bytes.len()
    );
    Ok(())
}

/// Merge every input, compile command lists and validate.
pub fn pack_inputs(inputs: &[PathBuf], registry: &mut Registry) -> Result<Rom> {
    let mut rom = Rom::new();
    for input in inputs {
        if input.is_dir() {
            add_tree(&mut rom, registry, input)?;
        } else {
            add_rom_file(&mut rom, input)?;
        }
        if rom.finalize_custom_type_order() {
            tracing::debug!("Custom types renumbered after {}", input.display());
        }
    }
    compile_command_lists(&mut rom, registry)?;
    rom.validate().context("ROM failed validation")?;
    Ok(rom)
}

fn add_rom_file(rom: &mut Rom, path: &Path) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if !RomReader::is_rom(&bytes) {
        bail!("{} is neither a ROM nor a directory", path.display());
    }
    rom.add_rom_serial(&bytes)
        .with_context(|| format!("Failed to decode ROM: {}", path.display()))?;
    tracing::info!("Merged ROM {}", path.display());
    Ok(())
}

/// Add `<dir>/<type>/<file>` plus the special `<dir>/metadata` and
/// `<dir>/code.wasm` as one generation.
fn add_tree(rom: &mut Rom, registry: &mut Registry, dir: &Path) -> Result<()> {
    rom.begin_generation();
    let mut count = 0usize;
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let top_level = entry.depth() == 1;
        if top_level && !matches!(entry.file_name().to_str(), Some("metadata" | "code.wasm")) {
            tracing::warn!("Ignoring {}", path.display());
            continue;
        }

        let identity = resolve_path(path, rom, registry)
            .with_context(|| format!("Bad resource path: {}", path.display()))?;
        let serial =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

        let res = rom
            .claim(identity.tid, identity.rid)
            .with_context(|| format!("Resource defined twice: {}", path.display()))?;
        res.serial = serial;
        res.name = identity.name;
        res.comment = identity.comment;
        res.format = identity.format;
        res.lang = identity.lang;
        res.path = Some(path.to_path_buf());
        count += 1;
    }
    tracing::info!("Added {} files from {}", count, dir.display());
    Ok(())
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}

/// Compile every loose-file resource whose type has a command schema.
fn compile_command_lists(rom: &mut Rom, registry: &mut Registry) -> Result<()> {
    registry.require().context("Failed to load schema")?;

    let mut compiled = Vec::new();
    for res in rom.iter() {
        let Some(path) = &res.path else {
            continue;
        };
        if res.format.as_deref() == Some("bin") {
            continue;
        }
        if registry
            .command_schema(res.tid, rom.type_name(res.tid))
            .is_none()
        {
            continue;
        }
        let text = std::str::from_utf8(&res.serial)
            .with_context(|| format!("Command list is not UTF-8: {}", path.display()))?;
        let bin = Compiler::new(registry, res.tid, Some(&*rom))
            .compile(text)
            .with_context(|| format!("Failed to compile {}", path.display()))?;
        tracing::debug!("Compiled {} ({} bytes)", path.display(), bin.len());
        compiled.push((res.tid, res.rid, bin));
    }

    for (tid, rid, bin) in compiled {
        if let Some(res) = rom.get_mut(tid, rid) {
            res.replace_serial(bin);
        }
    }
    Ok(())
}
