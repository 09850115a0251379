use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use log::{info, warn};
use wayfinder_core::{BuildError, MapVersion, RouterGraph, RoutingError};

/// The published router graph.
///
/// Readers take one snapshot per request and keep it until they are done;
/// publishing swaps the pointer without waiting for them.
#[derive(Debug, Default)]
pub struct GraphStore {
    current: ArcSwapOption<RouterGraph>,
    /// Latest map version known to exist, published or not
    announced: AtomicU64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that map data of `version` exists. Until a graph of at least
    /// that version is published, [`load`](Self::load) reports `NotYetRoutable`.
    pub fn announce(&self, version: MapVersion) {
        self.announced.fetch_max(version, Ordering::AcqRel);
    }

    pub fn announced(&self) -> MapVersion {
        self.announced.load(Ordering::Acquire)
    }

    /// Takes back the announcement of `version` after its build failed, so
    /// requests go back to the live graph. A newer announcement is kept.
    pub fn withdraw(&self, version: MapVersion) {
        let live = self.version().unwrap_or(0);
        if version <= live {
            return;
        }
        if self
            .announced
            .compare_exchange(version, live, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            warn!("Map v{version} was withdrawn, routing stays on v{live}");
        }
    }

    /// Publishes `graph` unless a newer one is already live.
    ///
    /// # Errors
    ///
    /// [`BuildError::StaleMap`] when the live graph is newer than `graph`
    pub fn publish(&self, graph: RouterGraph) -> Result<MapVersion, BuildError> {
        let version = graph.version();
        let graph = Arc::new(graph);
        let mut newer_live = None;
        self.current.rcu(|current| match current {
            Some(live) if live.version() > version => {
                newer_live = Some(live.version());
                Some(Arc::clone(live))
            }
            _ => {
                newer_live = None;
                Some(Arc::clone(&graph))
            }
        });

        if let Some(live) = newer_live {
            warn!("Discarding router graph v{version}: v{live} is live");
            return Err(BuildError::StaleMap { version, live });
        }
        self.announce(version);
        info!("Published router graph v{version}");
        Ok(version)
    }

    /// Snapshot to route one request on
    pub fn load(&self) -> Result<Arc<RouterGraph>, RoutingError> {
        let Some(graph) = self.current.load_full() else {
            return Err(RoutingError::NotYetRoutable(
                "no map has been published yet".to_string(),
            ));
        };
        let announced = self.announced();
        if graph.version() < announced {
            return Err(RoutingError::NotYetRoutable(format!(
                "map v{announced} is still being prepared"
            )));
        }
        Ok(graph)
    }

    pub fn version(&self) -> Option<MapVersion> {
        self.current.load_full().map(|graph| graph.version())
    }
}
