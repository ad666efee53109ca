use crate::client::state::{reduce, ViewEvent, ViewState};
use crate::client::storage::SymbolListStorage;
use crate::error::Result;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Owns the current [`ViewState`] snapshot and the durable list mirror
///
/// Dispatch swaps in a new snapshot; readers holding an older `Arc` keep
/// seeing the state they read.
pub struct ViewStateStore<S: SymbolListStorage> {
    state: Mutex<Arc<ViewState>>,
    storage: S,
}

impl<S: SymbolListStorage> ViewStateStore<S> {
    /// Store seeded with the tracked list found in `storage`
    pub fn open(storage: S) -> Result<Self> {
        let companies = storage.load()?;
        info!(count = companies.len(), "Loaded tracked symbols");
        Ok(Self {
            state: Mutex::new(Arc::new(ViewState::with_companies(companies))),
            storage,
        })
    }

    pub fn snapshot(&self) -> Arc<ViewState> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply one event and return the new snapshot
    ///
    /// Add/remove mirror the tracked list before the snapshot is published;
    /// a failed save leaves the state as it was.
    pub fn dispatch(&self, event: ViewEvent) -> Result<Arc<ViewState>> {
        let mut current = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let next = reduce(&current, &event);

        if event.touches_tracked_list() && next.companies != current.companies {
            self.storage.save(&next.companies)?;
            debug!(count = next.companies.len(), "Mirrored tracked symbols");
        }

        let next = Arc::new(next);
        *current = next.clone();
        Ok(next)
    }
}
