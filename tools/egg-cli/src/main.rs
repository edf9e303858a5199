//! eggdev - Build tool for Egg ROMs
//!
//! # Commands
//!
//! - `eggdev pack` - Merge ROMs and loose asset trees into one ROM
//! - `eggdev unpack` - Explode a ROM into a loose asset tree
//! - `eggdev list` - Print a ROM's table of contents
//! - `eggdev validate` - Check a ROM decodes and is canonical
//! - `eggdev compile` - Compile a command-list text file
//! - `eggdev decompile` - Decompile a command-list resource
//!
//! # Usage
//!
//! ```bash
//! # Pack loose files over a base ROM
//! eggdev pack base.egg data/ -o game.egg -s include/egg_cmd.h
//!
//! # Inspect the result
//! eggdev list game.egg
//! ```
//!
//! # Manifest (eggdev.toml)
//!
//! Optional; values given on the command line win.
//!
//! ```toml
//! [project]
//! schema = ["include/egg_cmd.h"]
//!
//! [pack]
//! inputs = ["data"]
//! output = "out/game.egg"
//! ```

mod cmdlist;
mod list;
mod manifest;
mod pack;
mod schema;
mod unpack;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::manifest::EggManifest;

/// eggdev - Build tool for Egg ROMs
#[derive(Parser)]
#[command(name = "eggdev")]
#[command(about = "Build tool for Egg ROMs")]
#[command(version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project manifest, read if present
    #[arg(long, global = true, default_value = "eggdev.toml")]
    manifest: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge ROMs and loose asset trees into one ROM
    Pack(pack::PackArgs),

    /// Explode a ROM into a loose asset tree
    Unpack(unpack::UnpackArgs),

    /// Print a ROM's table of contents
    List(list::ListArgs),

    /// Check a ROM decodes and is canonical
    Validate(validate::ValidateArgs),

    /// Compile a command-list text file
    Compile(cmdlist::CompileArgs),

    /// Decompile a command-list resource
    Decompile(cmdlist::DecompileArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let manifest = EggManifest::load_optional(&cli.manifest)?;
    let manifest = manifest.as_ref();

    match cli.command {
        Commands::Pack(args) => pack::execute(args, manifest),
        Commands::Unpack(args) => unpack::execute(args, manifest),
        Commands::List(args) => list::execute(args),
        Commands::Validate(args) => validate::execute(args),
        Commands::Compile(args) => cmdlist::compile(args, manifest),
        Commands::Decompile(args) => cmdlist::decompile(args, manifest),
    }
}
