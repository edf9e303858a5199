//! Shared types for the Egg console toolchain.
//!
//! Everything here is plain data: ROM format constants, the table of core
//! resource types, and the packed language codes used in resource ids.
//! Both the ROM/command-list core (`egg-common`) and the `eggdev` CLI
//! depend on it.

pub mod ids;
pub mod lang;
pub mod rom_format;

pub use ids::{
    CUSTOM_TID_MAX, CUSTOM_TID_MIN, CoreTid, SCHEMA_TID_MIN, is_custom_tid, is_pinnable_tid,
};
pub use lang::{LangCode, LangError};
pub use rom_format::{EGG_ROM_FORMAT, RomFormat};
