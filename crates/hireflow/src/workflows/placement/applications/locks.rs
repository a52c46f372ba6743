use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::domain::ApplicationId;

/// Per-application mutex registry: transitions for one id never interleave, while different
/// ids proceed independently.
#[derive(Debug, Default)]
pub struct ApplicationLocks {
    slots: Mutex<HashMap<ApplicationId, Arc<Mutex<()>>>>,
}

impl ApplicationLocks {
    pub fn with_lock<T>(&self, id: &ApplicationId, work: impl FnOnce() -> T) -> T {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(id.clone()).or_default().clone()
        };

        let result = {
            let _held = slot.lock().unwrap_or_else(PoisonError::into_inner);
            work()
        };

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // Two references remain when nobody else is waiting: the map's and ours.
        if Arc::strong_count(&slot) == 2 {
            slots.remove(id);
        }

        result
    }

    pub fn tracked(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
