//! Compile and decompile single command-list resources

use anyhow::{Context, Result};
use clap::Args;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use egg_common::cmdlist::{Compiler, Decompiler};
use egg_common::path::resolve_type;
use egg_common::{Registry, Rom};

use crate::manifest::EggManifest;
use crate::schema::SchemaArgs;

/// Arguments for the compile command
#[derive(Args)]
pub struct CompileArgs {
    /// Command-list text, `-` for stdin
    pub input: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Resource type: a name or a decimal tid
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub type_name: String,

    /// ROM used to resolve `TYPE:NAME` references and custom type names
    #[arg(long)]
    pub rom: Option<PathBuf>,

    #[command(flatten)]
    pub schema: SchemaArgs,
}

/// Arguments for the decompile command
#[derive(Args)]
pub struct DecompileArgs {
    /// Binary command list, `-` for stdin
    pub input: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Resource type: a name or a decimal tid
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub type_name: String,

    /// ROM supplying custom type names
    #[arg(long)]
    pub rom: Option<PathBuf>,

    #[command(flatten)]
    pub schema: SchemaArgs,
}

/// Execute the compile command
pub fn compile(args: CompileArgs, manifest: Option<&EggManifest>) -> Result<()> {
    let input = read_input(&args.input)?;
    let text = String::from_utf8(input)
        .with_context(|| format!("Not UTF-8 text: {}", args.input.display()))?;

    let mut registry = args.schema.registry(manifest);
    let mut rom = load_rom(args.rom.as_deref())?;
    let tid = resolve_type(&args.type_name, &mut rom, &mut registry)
        .with_context(|| format!("Unknown resource type: {}", args.type_name))?;
    registry.require().context("Failed to load schema")?;

    let bin = Compiler::new(&registry, tid, Some(&rom))
        .compile(&text)
        .with_context(|| format!("Failed to compile {}", args.input.display()))?;
    write_output(args.output.as_deref(), &bin)?;
    tracing::debug!("Compiled {} bytes for type {}", bin.len(), tid);
    Ok(())
}

/// Execute the decompile command
pub fn decompile(args: DecompileArgs, manifest: Option<&EggManifest>) -> Result<()> {
    let input = read_input(&args.input)?;

    let mut registry = args.schema.registry(manifest);
    let mut rom = load_rom(args.rom.as_deref())?;
    let tid = resolve_type(&args.type_name, &mut rom, &mut registry)
        .with_context(|| format!("Unknown resource type: {}", args.type_name))?;
    registry.require().context("Failed to load schema")?;

    let text = Decompiler::new(&registry, tid, Some(&rom))
        .decompile(&input)
        .with_context(|| format!("Failed to decompile {}", args.input.display()))?;
    write_output(args.output.as_deref(), text.as_bytes())
}

fn load_rom(path: Option<&Path>) -> Result<Rom> {
    let Some(path) = path else {
        return Ok(Rom::new());
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read ROM: {}", path.display()))?;
    Rom::decode(&bytes).with_context(|| format!("Failed to decode ROM: {}", path.display()))
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => std::io::stdout()
            .write_all(bytes)
            .context("Failed to write stdout"),
    }
}
