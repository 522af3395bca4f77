//! Cache Set Module
//!
//! The three pre-constructed cache instances the system exposes: one per
//! storage kind, built together and addressable individually.

use tracing::info;

use crate::cache::provider::StorageProvider;
use crate::cache::store::{Cache, StorageKind};
use crate::error::CacheError;

// == Cache Set ==
/// The memory, local, and session cache instances.
///
/// The set is the process-lifetime home of the three instances; each is bound
/// to its own backend and they never interact. The serving layer shares one
/// set behind `Arc<RwLock<_>>`.
#[derive(Debug)]
pub struct CacheSet {
    memory: Cache,
    local: Cache,
    session: Cache,
}

impl CacheSet {
    // == Open ==
    /// Constructs all three instances against `provider`.
    ///
    /// Fails with [`CacheError::BackendUnavailable`] if either persistent
    /// store cannot be opened; there is no partial set.
    pub fn open(provider: &dyn StorageProvider) -> Result<Self, CacheError> {
        let set = Self {
            memory: Cache::memory(),
            local: Cache::new(StorageKind::Local, provider)?,
            session: Cache::new(StorageKind::Session, provider)?,
        };
        info!("cache set initialized (memory, local, session)");
        Ok(set)
    }

    // == Accessors ==
    /// The in-process instance.
    pub fn memory(&mut self) -> &mut Cache {
        &mut self.memory
    }

    /// The instance persisted across process restarts.
    pub fn local(&mut self) -> &mut Cache {
        &mut self.local
    }

    /// The instance scoped to the current process run.
    pub fn session(&mut self) -> &mut Cache {
        &mut self.session
    }

    /// The instance bound to `kind`.
    pub fn by_kind(&mut self, kind: StorageKind) -> &mut Cache {
        match kind {
            StorageKind::Memory => &mut self.memory,
            StorageKind::Local => &mut self.local,
            StorageKind::Session => &mut self.session,
        }
    }
}
