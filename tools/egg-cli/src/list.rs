//! List command - print a ROM's table of contents

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use egg_common::RomReader;
use egg_shared::{CoreTid, LangCode};

/// Arguments for the list command
#[derive(Args)]
pub struct ListArgs {
    /// ROM file to list
    pub rom: PathBuf,
}

/// Execute the list command
pub fn execute(args: ListArgs) -> Result<()> {
    let bytes = std::fs::read(&args.rom)
        .with_context(|| format!("Failed to read ROM: {}", args.rom.display()))?;
    let reader = RomReader::new(&bytes)
        .with_context(|| format!("Not a ROM: {}", args.rom.display()))?;

    println!("{:>5} {:>7}  {:<12} {:>9}", "TID", "RID", "TYPE", "SIZE");
    let mut count = 0usize;
    let mut total = 0usize;
    for entry in reader {
        let entry = entry.with_context(|| format!("Corrupt ROM: {}", args.rom.display()))?;
        println!(
            "{:>5} {:>7}  {:<12} {:>9}",
            entry.tid,
            describe_rid(entry.tid, entry.rid),
            CoreTid::from_tid(entry.tid).map_or("-", CoreTid::name),
            entry.serial.len()
        );
        count += 1;
        total += entry.serial.len();
    }

    println!();
    println!("{} resources, {} payload bytes, {} bytes total", count, total, bytes.len());
    Ok(())
}

/// Strings carry a language in the high bits of their rid.
fn describe_rid(tid: u8, rid: u16) -> String {
    if tid == CoreTid::Strings.tid() && rid > 0x3f {
        let (lang, stem) = LangCode::split_rid(rid);
        format!("{}-{}", lang, stem)
    } else {
        rid.to_string()
    }
}
