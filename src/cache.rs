use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use wayfinder_core::{Location, MapVersion, Permissions, Route, RouteOptions};

use crate::config::CacheConfig;

/// Everything a route is a pure function of
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub version: MapVersion,
    pub permissions: Permissions,
    pub options: RouteOptions,
    pub origin: Location,
    pub destination: Location,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    route: Arc<Route>,
    inserted: Instant,
}

/// Short-lived route results. Inserts are last-writer-wins; expired entries
/// are dropped when touched or when the cache is full.
#[derive(Debug)]
pub struct RouteCache {
    entries: DashMap<RouteKey, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl RouteCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs), config.max_entries)
    }

    pub fn get(&self, key: &RouteKey) -> Option<Arc<Route>> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.inserted.elapsed() < self.ttl => {
                return Some(Arc::clone(&entry.route));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries
                .remove_if(key, |_, entry| entry.inserted.elapsed() >= self.ttl);
        }
        None
    }

    pub fn insert(&self, key: RouteKey, route: Arc<Route>) {
        if self.max_entries == 0 {
            return;
        }
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.purge_expired();
            if self.entries.len() >= self.max_entries {
                self.evict_oldest();
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                route,
                inserted: Instant::now(),
            },
        );
    }

    /// Drops expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.inserted.elapsed() < self.ttl);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().inserted)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
