//! Validate command - check a ROM decodes and is in canonical form

use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::PathBuf;

use egg_common::Rom;

/// Arguments for the validate command
#[derive(Args)]
pub struct ValidateArgs {
    /// ROM file to validate
    pub rom: PathBuf,
}

/// Execute the validate command
pub fn execute(args: ValidateArgs) -> Result<()> {
    println!("Validating ROM: {}", args.rom.display());

    let bytes = std::fs::read(&args.rom)
        .with_context(|| format!("Failed to read ROM: {}", args.rom.display()))?;
    let problems = check_rom(&bytes)?;

    if problems.is_empty() {
        println!("ROM is valid.");
        return Ok(());
    }
    println!();
    println!("=== Problems ===");
    for problem in &problems {
        println!("  {}", problem);
    }
    bail!("{} problem(s) found", problems.len());
}

/// Decode, validate and re-encode `bytes`.
///
/// Fatal decode or validation errors are returned as errors; repairable
/// deviations from canonical form are returned as messages.
pub fn check_rom(bytes: &[u8]) -> Result<Vec<String>> {
    let mut rom = Rom::decode(bytes).context("ROM does not decode")?;
    let decoded = rom.len();
    rom.validate().context("ROM failed validation")?;

    let mut problems = Vec::new();
    if rom.len() != decoded {
        problems.push("missing metadata resource".to_string());
    }
    let canonical = rom.encode().context("ROM does not re-encode")?;
    if canonical.len() < bytes.len() && bytes.starts_with(&canonical) {
        problems.push(format!(
            "{} bytes after the terminator",
            bytes.len() - canonical.len()
        ));
    } else if canonical != bytes && problems.is_empty() {
        problems.push("TOC is not in canonical form".to_string());
    }

    tracing::debug!("{} resources decoded", decoded);
    Ok(problems)
}
