//! In-memory resource model.

use std::collections::BTreeSet;
use std::path::PathBuf;

use egg_shared::{CUSTOM_TID_MAX, CUSTOM_TID_MIN, CoreTid, LangCode, is_custom_tid};

use super::RomError;

const CUSTOM_SLOTS: usize = (CUSTOM_TID_MAX - CUSTOM_TID_MIN) as usize + 1;

/// One resource in the model.
///
/// Only `tid`, `rid` and `serial` are persisted in the ROM. The rest
/// describes where the payload came from and is cleared whenever the
/// payload is replaced by a later input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub tid: u8,
    pub rid: u16,
    pub serial: Vec<u8>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub format: Option<String>,
    pub path: Option<PathBuf>,
    pub lang: Option<LangCode>,
    /// Merge generation that last wrote this resource
    pub generation: u32,
}

impl Resource {
    pub fn key(&self) -> (u8, u16) {
        (self.tid, self.rid)
    }

    /// Language of a localized resource.
    ///
    /// Resources decoded from a ROM carry no `lang`, so for strings it is
    /// read back out of the rid's high bits.
    pub fn language(&self) -> Option<LangCode> {
        self.lang.or_else(|| {
            (self.tid == CoreTid::Strings.tid() && self.rid > 0x3f)
                .then(|| LangCode::split_rid(self.rid).0)
        })
    }

    /// Swap in a new payload and hand the old one back.
    pub fn replace_serial(&mut self, serial: Vec<u8>) -> Vec<u8> {
        std::mem::replace(&mut self.serial, serial)
    }

    /// Drop everything that described the previous payload.
    pub fn clear_provenance(&mut self) {
        self.name = None;
        self.comment = None;
        self.format = None;
        self.path = None;
        self.lang = None;
    }
}

/// Sorted collection of resources plus the custom type name table.
///
/// Invariant: `resources` is strictly increasing by `(tid, rid)`.
#[derive(Debug, Clone, Default)]
pub struct Rom {
    resources: Vec<Resource>,
    custom_names: Vec<Option<String>>,
    generation: u32,
}

impl Rom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Resource> {
        self.resources.iter_mut()
    }

    /// Binary search by `(tid, rid)`.
    ///
    /// `Ok(index)` if present, `Err(insertion_point)` otherwise.
    pub fn search(&self, tid: u8, rid: u16) -> Result<usize, usize> {
        self.resources.binary_search_by_key(&(tid, rid), Resource::key)
    }

    pub fn get(&self, tid: u8, rid: u16) -> Option<&Resource> {
        self.search(tid, rid).ok().map(|p| &self.resources[p])
    }

    pub fn get_mut(&mut self, tid: u8, rid: u16) -> Option<&mut Resource> {
        match self.search(tid, rid) {
            Ok(p) => Some(&mut self.resources[p]),
            Err(_) => None,
        }
    }

    pub fn find_by_name(&self, tid: u8, name: &str) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|r| r.tid == tid && r.name.as_deref() == Some(name))
    }

    /// Insert an empty resource at `p`, normally the `Err` half of [`Rom::search`].
    pub fn insert(&mut self, p: usize, tid: u8, rid: u16) -> Result<&mut Resource, RomError> {
        if tid == 0 {
            return Err(RomError::InvalidTid(0));
        }
        if rid == 0 {
            return Err(RomError::InvalidRid(0));
        }
        let key = (tid, rid);
        let after_prev = p == 0 || self.resources.get(p - 1).is_some_and(|r| r.key() < key);
        let before_next = self.resources.get(p).is_none_or(|r| key < r.key());
        if p > self.resources.len() || !after_prev || !before_next {
            return Err(RomError::MisplacedInsert { index: p, tid, rid });
        }
        self.resources.insert(
            p,
            Resource {
                tid,
                rid,
                generation: self.generation,
                ..Default::default()
            },
        );
        Ok(&mut self.resources[p])
    }

    /// Start a new merge generation and return its number.
    ///
    /// Each ROM file or loose-file tree merged into the model is one
    /// generation: writing the same `(tid, rid)` twice within a generation is
    /// an error, while a later generation overrides an earlier one.
    pub fn begin_generation(&mut self) -> u32 {
        self.generation += 1;
        self.generation
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Look up or create `(tid, rid)` for writing in the current generation.
    ///
    /// An existing resource from an older generation is claimed and its
    /// provenance cleared; the caller then replaces the payload.
    pub fn claim(&mut self, tid: u8, rid: u16) -> Result<&mut Resource, RomError> {
        match self.search(tid, rid) {
            Ok(p) => {
                let generation = self.generation;
                let res = &mut self.resources[p];
                if res.generation == generation {
                    return Err(RomError::DuplicateResource { tid, rid });
                }
                tracing::debug!("resource {}:{} overridden by a later input", tid, rid);
                res.generation = generation;
                res.clear_provenance();
                Ok(res)
            }
            Err(p) => self.insert(p, tid, rid),
        }
    }

    /// Drop every zero-length resource.
    pub fn remove_empty(&mut self) -> usize {
        let before = self.resources.len();
        self.resources.retain(|r| !r.serial.is_empty());
        before - self.resources.len()
    }

    /// Name of a core or custom type.
    pub fn type_name(&self, tid: u8) -> Option<&str> {
        if let Some(core) = CoreTid::from_tid(tid) {
            return Some(core.name());
        }
        self.custom_name(tid)
    }

    pub fn custom_name(&self, tid: u8) -> Option<&str> {
        if !is_custom_tid(tid) {
            return None;
        }
        self.custom_names
            .get((tid - CUSTOM_TID_MIN) as usize)
            .and_then(|n| n.as_deref())
    }

    /// Type id for a core or already-named custom type.
    pub fn tid_by_name(&self, name: &str) -> Option<u8> {
        if let Some(core) = CoreTid::from_name(name) {
            return Some(core.tid());
        }
        self.custom_types()
            .find(|(_, n)| *n == name)
            .map(|(tid, _)| tid)
    }

    /// Every named custom type, in id order.
    pub fn custom_types(&self) -> impl Iterator<Item = (u8, &str)> + '_ {
        self.custom_names
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_deref().map(|n| (CUSTOM_TID_MIN + i as u8, n)))
    }

    /// Assign a custom type id to `name`, or return the one it already has.
    ///
    /// Ids in use by unnamed resources (decoded from a ROM) are skipped.
    pub fn name_type(&mut self, name: &str) -> Result<u8, RomError> {
        if let Some(tid) = self.tid_by_name(name) {
            return Ok(tid);
        }
        let in_use = self.unnamed_custom_tids();
        if self.custom_names.len() < CUSTOM_SLOTS {
            self.custom_names.resize(CUSTOM_SLOTS, None);
        }
        let slot = (0..CUSTOM_SLOTS).find(|&i| {
            self.custom_names[i].is_none() && !in_use.contains(&(CUSTOM_TID_MIN + i as u8))
        });
        let Some(slot) = slot else {
            return Err(RomError::CustomTypesExhausted(name.to_string()));
        };
        self.custom_names[slot] = Some(name.to_string());
        let tid = CUSTOM_TID_MIN + slot as u8;
        tracing::debug!("custom type {:?} assigned tid {}", name, tid);
        Ok(tid)
    }

    /// Renumber custom types so their ids follow the alphabetical order of
    /// their names, remapping and re-sorting every resource.
    ///
    /// Run after each generation is fully merged. Returns `false` when the
    /// order was already final.
    pub fn finalize_custom_type_order(&mut self) -> bool {
        let mut named: Vec<(u8, String)> = self
            .custom_types()
            .map(|(tid, name)| (tid, name.to_string()))
            .collect();
        if named.is_empty() {
            return false;
        }
        named.sort_by(|a, b| a.1.cmp(&b.1));

        let pinned = self.unnamed_custom_tids();
        let slots = (CUSTOM_TID_MIN..=CUSTOM_TID_MAX).filter(|tid| !pinned.contains(tid));

        let mut translation: [u8; 256] = std::array::from_fn(|i| i as u8);
        let mut names = vec![None; CUSTOM_SLOTS];
        let mut changed = false;
        for ((old, name), new) in named.into_iter().zip(slots) {
            translation[old as usize] = new;
            changed |= old != new;
            names[(new - CUSTOM_TID_MIN) as usize] = Some(name);
        }
        if !changed {
            return false;
        }

        self.custom_names = names;
        for res in &mut self.resources {
            res.tid = translation[res.tid as usize];
        }
        self.resources.sort_by_key(Resource::key);
        tracing::debug!("renumbered custom types: {:?}", self.custom_types().collect::<Vec<_>>());
        true
    }

    /// Custom ids used by resources whose type has no name.
    fn unnamed_custom_tids(&self) -> BTreeSet<u8> {
        self.resources
            .iter()
            .map(|r| r.tid)
            .filter(|&tid| is_custom_tid(tid) && self.custom_name(tid).is_none())
            .collect()
    }

    /// Insert at the front without the ordering check. Only for repair paths
    /// that have already established the new key sorts first.
    pub(super) fn push_front(&mut self, res: Resource) {
        self.resources.insert(0, res);
    }
}

impl<'a> IntoIterator for &'a Rom {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}
