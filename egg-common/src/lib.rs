//! Core of the Egg ROM toolchain
//!
//! This crate holds everything `eggdev` needs to turn loose asset files into
//! a ROM and back, short of the format-specific transcoders:
//!
//! # Modules
//!
//! - [`rom`] - In-memory resource model and the ROM container codec
//! - [`namespace`] - Schema registry scraped from C headers (`#define CMD_*`, `#define NS_*`)
//! - [`cmdlist`] - Compiler and decompiler for command-list resources
//! - [`path`] - Resource identity from loose file paths
//!
//! # Example
//!
//! ```
//! use egg_common::namespace::Registry;
//! use egg_common::cmdlist;
//!
//! let mut registry = Registry::new();
//! registry.add_schema_text("inline", "#define CMD_map_hero 0x21\n");
//!
//! let bin = cmdlist::compile("hero 0x0102", 9, &mut registry, None).unwrap();
//! assert_eq!(bin, [0x21, 0x01, 0x02]);
//! ```

pub mod cmdlist;
pub mod lexer;
pub mod namespace;
pub mod path;
pub mod rom;

pub use cmdlist::{CompileError, DecompileError, compile, decompile};
pub use namespace::{NamespaceError, NamespaceMode, Registry};
pub use path::{PathError, ResourceIdentity, resolve_path};
pub use rom::{Resource, Rom, RomError, RomReader};
