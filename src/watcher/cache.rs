use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use semver::Version;
use tracing::{debug, info};

use crate::config::EvictionPolicy;
use crate::scrape::listing::HostVersions;

#[derive(Debug, Clone)]
struct CachedVersion {
    version: Version,
    /// Refresh cycle in which the host was last merged
    last_seen_cycle: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: BTreeMap<String, CachedVersion>,
    cycle: u64,
}

/// In-memory mapping from host label to its advertised version.
///
/// Every operation is a single short critical section. A refresh pass
/// merges page by page, so readers may observe a partially applied pass.
#[derive(Debug, Default)]
pub struct VersionCache {
    state: Mutex<CacheState>,
    policy: EvictionPolicy,
}

impl VersionCache {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            policy,
        }
    }

    /// A panic while holding the lock cannot leave a half-written entry,
    /// so a poisoned lock is still safe to use.
    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Upserts every entry. Existing hosts not in `entries` are kept.
    ///
    /// Returns the number of entries merged.
    pub fn merge(&self, entries: HostVersions) -> usize {
        let count = entries.len();
        let mut state = self.lock_state();
        let cycle = state.cycle;
        for (host, version) in entries {
            state.entries.insert(
                host,
                CachedVersion {
                    version,
                    last_seen_cycle: cycle,
                },
            );
        }
        debug!("Merged {} entries, cache holds {}", count, state.entries.len());
        count
    }

    pub fn get(&self, host: &str) -> Option<Version> {
        self.lock_state()
            .entries
            .get(host)
            .map(|entry| entry.version.clone())
    }

    /// Returns the version of the first host (in key order) containing `needle`.
    pub fn find_containing(&self, needle: &str) -> Option<Version> {
        self.lock_state()
            .entries
            .iter()
            .find(|(host, _)| host.contains(needle))
            .map(|(_, entry)| entry.version.clone())
    }

    pub fn len(&self) -> usize {
        self.lock_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_state().entries.is_empty()
    }

    /// Starts a new refresh cycle; subsequent merges are stamped with it.
    pub fn begin_cycle(&self) -> u64 {
        let mut state = self.lock_state();
        state.cycle += 1;
        state.cycle
    }

    /// Applies the eviction policy after `cycle` completed without failures.
    ///
    /// Returns the number of evicted hosts.
    pub fn evict_stale(&self, cycle: u64) -> usize {
        let EvictionPolicy::AfterMissedCycles { cycles } = self.policy else {
            return 0;
        };

        let mut state = self.lock_state();
        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| cycle.saturating_sub(entry.last_seen_cycle) <= u64::from(cycles));
        let evicted = before - state.entries.len();

        if evicted > 0 {
            info!("Evicted {} hosts not seen since cycle {}", evicted, cycle);
        }
        evicted
    }
}
