//! Session state containers. Each store owns its state, mutates it only
//! through its single async action, and hands out cloned snapshots.

pub mod market;
pub mod suggestions;

pub use market::{MarketState, MarketStore};
pub use suggestions::{SuggestionState, SuggestionStore};

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

// Updates are single assignments, so a poisoned lock still holds consistent state.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}
