//! Namespace registry
//!
//! Symbol tables scraped from schema headers. Opcode namespaces (`CMD_*`)
//! describe command lists for one resource type; value namespaces (`NS_*`)
//! name integers used as arguments, and `NS_tid_*` names resource types.
//!
//! Sources are queued with [`Registry::add_schema_file`] or
//! [`Registry::add_schema_text`] and only read when something is looked up.

mod schema;

#[cfg(test)]
mod tests;

pub use schema::{Define, parse_define};

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};

use egg_shared::{CoreTid, is_pinnable_tid};
use hashbrown::HashMap;
use thiserror::Error;

/// Which kind of table a namespace is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceMode {
    /// `CMD_<type>_<name>`: opcode bytes for a command list
    Opcode,
    /// `NS_<namespace>_<name>`: plain integer values
    Value,
}

impl fmt::Display for NamespaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceMode::Opcode => write!(f, "command"),
            NamespaceMode::Value => write!(f, "value"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    pub name: String,
    pub id: u32,
    /// Trimmed interior of the trailing `/* */` comment, if any
    pub argspec: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Namespace {
    pub mode: NamespaceMode,
    pub name: String,
    /// Resource type this opcode namespace describes, when known at load time
    pub tid: Option<u8>,
    pub entries: Vec<NamespaceEntry>,
}

impl Namespace {
    fn new(mode: NamespaceMode, name: &str, tid: Option<u8>) -> Self {
        Self {
            mode,
            name: name.to_string(),
            tid,
            entries: Vec::new(),
        }
    }

    pub fn entry(&self, symbol: &str) -> Option<&NamespaceEntry> {
        self.entries.iter().find(|e| e.name == symbol)
    }

    pub fn value_of(&self, symbol: &str) -> Option<u32> {
        self.entry(symbol).map(|e| e.id)
    }

    /// First symbol defined with `id`.
    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("unknown {mode} namespace {name:?}")]
    UnknownNamespace { mode: NamespaceMode, name: String },

    #[error("{symbol:?} not found in {mode} namespace {namespace:?}")]
    UnknownSymbol {
        mode: NamespaceMode,
        namespace: String,
        symbol: String,
    },

    #[error("no name for {id} in {mode} namespace {namespace:?}")]
    UnknownValue {
        mode: NamespaceMode,
        namespace: String,
        id: u32,
    },

    #[error("failed to read schema {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl NamespaceError {
    /// True for a failed lookup, as opposed to a failure to load.
    pub fn is_lookup_miss(&self) -> bool {
        !matches!(self, NamespaceError::Io { .. })
    }
}

#[derive(Debug, Clone)]
enum SchemaSource {
    File(PathBuf),
    Text { label: String, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LoadState {
    #[default]
    Idle,
    Loading,
}

/// Owner of every schema source and the namespaces built from them.
#[derive(Debug, Default)]
pub struct Registry {
    pending: VecDeque<SchemaSource>,
    retained: Vec<SchemaSource>,
    volatile: bool,
    namespaces: Vec<Namespace>,
    index: HashMap<(NamespaceMode, String), usize>,
    state: LoadState,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a schema header for loading on first use.
    pub fn add_schema_file(&mut self, path: impl Into<PathBuf>) {
        self.queue(SchemaSource::File(path.into()));
    }

    /// Queue schema text held in memory. `label` appears in log output.
    pub fn add_schema_text(&mut self, label: &str, text: &str) {
        self.queue(SchemaSource::Text {
            label: label.to_string(),
            text: text.to_string(),
        });
    }

    fn queue(&mut self, source: SchemaSource) {
        self.retained.push(source.clone());
        self.pending.push_back(source);
    }

    /// In volatile mode the source list survives [`Registry::flush`] and is
    /// read again the next time the registry is empty.
    pub fn set_volatile(&mut self, volatile: bool) {
        self.volatile = volatile;
    }

    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    /// Load every pending source.
    ///
    /// Calls made while a load is already in progress return immediately,
    /// so lookups issued during loading see the partially built tables.
    pub fn require(&mut self) -> Result<(), NamespaceError> {
        if self.state == LoadState::Loading {
            return Ok(());
        }
        if self.volatile && self.namespaces.is_empty() && self.pending.is_empty() {
            self.pending.extend(self.retained.iter().cloned());
        }
        if self.pending.is_empty() {
            return Ok(());
        }

        self.state = LoadState::Loading;
        let result = self.drain_pending();
        self.state = LoadState::Idle;
        result
    }

    fn drain_pending(&mut self) -> Result<(), NamespaceError> {
        while let Some(source) = self.pending.pop_front() {
            match source {
                SchemaSource::File(path) => {
                    self.read_schema_file(&path)?;
                }
                SchemaSource::Text { label, text } => {
                    self.read_schema_text(&label, &text);
                }
            }
        }
        Ok(())
    }

    /// Read one schema header now. Returns the number of new symbols.
    pub fn read_schema_file(&mut self, path: &Path) -> Result<usize, NamespaceError> {
        let text = std::fs::read_to_string(path).map_err(|source| NamespaceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.read_schema_text(&path.display().to_string(), &text))
    }

    /// Read schema text now. Returns the number of new symbols.
    pub fn read_schema_text(&mut self, label: &str, text: &str) -> usize {
        let outer = std::mem::replace(&mut self.state, LoadState::Loading);
        let mut added = 0;
        for (i, line) in text.lines().enumerate() {
            if !line.trim_start().starts_with("#define") {
                continue;
            }
            match parse_define(line) {
                Some(def) => {
                    if self.define(&def) {
                        added += 1;
                    }
                }
                None => tracing::debug!("{}:{}: skipping {:?}", label, i + 1, line.trim()),
            }
        }
        self.state = outer;
        tracing::debug!("schema {}: {} symbols", label, added);
        added
    }

    /// Add one symbol. An existing symbol keeps its first definition.
    fn define(&mut self, def: &Define<'_>) -> bool {
        let key = (def.mode, def.namespace.to_ascii_lowercase());
        let p = match self.index.get(&key).copied() {
            Some(p) => p,
            None => {
                let tid = match def.mode {
                    NamespaceMode::Opcode => self.type_for_commands(def.namespace),
                    NamespaceMode::Value => None,
                };
                self.namespaces
                    .push(Namespace::new(def.mode, def.namespace, tid));
                self.index.insert(key, self.namespaces.len() - 1);
                self.namespaces.len() - 1
            }
        };

        let space = &mut self.namespaces[p];
        if space.entry(def.symbol).is_some() {
            tracing::debug!(
                "{} {}_{} already defined, keeping the first",
                def.mode,
                def.namespace,
                def.symbol
            );
            return false;
        }
        space.entries.push(NamespaceEntry {
            name: def.symbol.to_string(),
            id: def.value,
            argspec: def.argspec.map(str::to_string),
        });
        true
    }

    /// Resource type named by an opcode namespace: a core type name, or a
    /// `NS_tid_` symbol loaded before it.
    fn type_for_commands(&mut self, name: &str) -> Option<u8> {
        if let Some(core) = CoreTid::from_name(&name.to_ascii_lowercase()) {
            return Some(core.tid());
        }
        self.lookup_value_from_name(NamespaceMode::Value, "tid", name)
            .ok()
            .and_then(|id| u8::try_from(id).ok())
            .filter(|&tid| is_pinnable_tid(tid))
    }

    pub fn lookup_value_from_name(
        &mut self,
        mode: NamespaceMode,
        namespace: &str,
        token: &str,
    ) -> Result<u32, NamespaceError> {
        self.require()?;
        self.find_value(mode, namespace, token)
    }

    pub fn lookup_name_from_value(
        &mut self,
        mode: NamespaceMode,
        namespace: &str,
        id: u32,
    ) -> Result<&str, NamespaceError> {
        self.require()?;
        self.find_name(mode, namespace, id)
    }

    /// Like [`Registry::lookup_value_from_name`] against what is loaded already.
    pub fn find_value(
        &self,
        mode: NamespaceMode,
        namespace: &str,
        token: &str,
    ) -> Result<u32, NamespaceError> {
        let space = self.expect_namespace(mode, namespace)?;
        space
            .value_of(token)
            .ok_or_else(|| NamespaceError::UnknownSymbol {
                mode,
                namespace: namespace.to_string(),
                symbol: token.to_string(),
            })
    }

    /// Like [`Registry::lookup_name_from_value`] against what is loaded already.
    pub fn find_name(
        &self,
        mode: NamespaceMode,
        namespace: &str,
        id: u32,
    ) -> Result<&str, NamespaceError> {
        let space = self.expect_namespace(mode, namespace)?;
        space.name_of(id).ok_or_else(|| NamespaceError::UnknownValue {
            mode,
            namespace: namespace.to_string(),
            id,
        })
    }

    fn expect_namespace(
        &self,
        mode: NamespaceMode,
        name: &str,
    ) -> Result<&Namespace, NamespaceError> {
        self.namespace(mode, name)
            .ok_or_else(|| NamespaceError::UnknownNamespace {
                mode,
                name: name.to_string(),
            })
    }

    /// Namespace by mode and name. Names compare ASCII case-insensitively.
    pub fn namespace(&self, mode: NamespaceMode, name: &str) -> Option<&Namespace> {
        self.index
            .get(&(mode, name.to_ascii_lowercase()))
            .map(|&p| &self.namespaces[p])
    }

    /// Opcode namespace describing resources of type `tid`.
    ///
    /// Matches on the type id recorded at load time first, then on
    /// `type_name`.
    pub fn command_schema(&self, tid: u8, type_name: Option<&str>) -> Option<&Namespace> {
        self.namespaces
            .iter()
            .find(|n| n.mode == NamespaceMode::Opcode && n.tid == Some(tid))
            .or_else(|| type_name.and_then(|name| self.namespace(NamespaceMode::Opcode, name)))
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// Drop every namespace.
    ///
    /// A volatile registry reloads its sources on the next lookup; otherwise
    /// anything not yet loaded is forgotten too.
    pub fn flush(&mut self) {
        self.namespaces.clear();
        self.index.clear();
        self.pending.clear();
        if !self.volatile {
            self.retained.clear();
        }
    }
}
