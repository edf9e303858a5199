//! Pre-encode validation and repair.

use egg_shared::{CoreTid, EGG_ROM_FORMAT};

use super::{Resource, Rom, RomError};

impl Rom {
    /// Check the model is encodable and repair what can be repaired.
    ///
    /// Drops empty resources, then walks the rest checking order, ranges,
    /// payload size and singleton types. If the first resource is not
    /// `metadata:1`, a minimal one is inserted at the front.
    pub fn validate(&mut self) -> Result<(), RomError> {
        let dropped = self.remove_empty();
        if dropped > 0 {
            tracing::debug!("dropped {} empty resources", dropped);
        }

        let mut prev: Option<(u8, u16)> = None;
        for res in self.resources() {
            check_resource(res)?;
            if prev.is_some_and(|p| p >= res.key()) {
                return Err(RomError::OutOfOrder {
                    tid: res.tid,
                    rid: res.rid,
                });
            }
            prev = Some(res.key());
        }

        let metadata = CoreTid::Metadata.tid();
        let has_metadata = self
            .resources()
            .first()
            .is_some_and(|r| r.key() == (metadata, 1));
        if !has_metadata {
            tracing::debug!("no metadata resource, inserting an empty one");
            self.push_front(Resource {
                tid: metadata,
                rid: 1,
                serial: EGG_ROM_FORMAT.metadata_signature.to_vec(),
                generation: self.generation(),
                ..Default::default()
            });
        }
        Ok(())
    }
}

fn check_resource(res: &Resource) -> Result<(), RomError> {
    if res.tid == 0 {
        return Err(RomError::InvalidTid(0));
    }
    if res.rid == 0 {
        return Err(RomError::InvalidRid(0));
    }
    if res.serial.len() > EGG_ROM_FORMAT.max_resource_len {
        return Err(RomError::ResourceTooLarge {
            tid: res.tid,
            rid: res.rid,
            len: res.serial.len(),
            limit: EGG_ROM_FORMAT.max_resource_len,
        });
    }
    if let Some(core) = CoreTid::from_tid(res.tid) {
        if core.is_singleton() && res.rid != 1 {
            return Err(RomError::SingletonRid {
                name: core.name(),
                rid: res.rid,
            });
        }
    }
    Ok(())
}
