use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{info, trace, warn};
use rayon::prelude::*;
use wayfinder_core::loading::SnapshotFile;
use wayfinder_core::options::resolve;
use wayfinder_core::{
    BuildConfig, CancelFlag, Error, InstructionTable, Location, MapData, MapVersion, OptionsError,
    Permissions, RawRouteOptions, Route, RouteOptions, RouterGraph, assemble, build_router_graph,
    find_route,
};

use crate::cache::{RouteCache, RouteKey};
use crate::config::ServiceConfig;
use crate::store::GraphStore;

/// One route request as received from the API layer
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub origin: Location,
    pub destination: Location,
    pub permissions: Permissions,
    /// Preferences stored for the caller, possibly written against an older catalog
    pub stored_options: Option<RawRouteOptions>,
    /// Per-request overrides
    pub options: RawRouteOptions,
    pub cancel: CancelFlag,
}

impl RouteRequest {
    pub fn new(origin: Location, destination: Location) -> Self {
        Self {
            origin,
            destination,
            permissions: Permissions::none(),
            stored_options: None,
            options: RawRouteOptions::new(),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_options(mut self, options: RawRouteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_stored_options(mut self, stored: RawRouteOptions) -> Self {
        self.stored_options = Some(stored);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Entry point for the API layer: owns the published graph, the route cache
/// and the service configuration.
pub struct RoutingService {
    config: ServiceConfig,
    store: Arc<GraphStore>,
    cache: RouteCache,
    instructions: InstructionTable,
}

impl RoutingService {
    pub fn new(config: ServiceConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            cache: RouteCache::from_config(&config.cache),
            config,
            store: Arc::new(GraphStore::new()),
            instructions: InstructionTable::default(),
        })
    }

    pub fn with_instructions(mut self, instructions: InstructionTable) -> Self {
        self.instructions = instructions;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    /// Marks map data of `version` as existing; routing pauses until it is published
    pub fn announce(&self, version: MapVersion) {
        self.store.announce(version);
    }

    /// Builds and publishes a graph, blocking the caller.
    ///
    /// # Errors
    ///
    /// Build failures and [`StaleMap`](wayfinder_core::BuildError::StaleMap) when a newer graph is
    /// already live. Either way the live graph keeps serving requests.
    pub fn publish(&self, map: &MapData) -> Result<MapVersion, Error> {
        self.store.announce(map.version);
        build_and_publish(&self.store, map, &self.config.build)
    }

    pub fn publish_snapshot(&self, path: &Path) -> Result<MapVersion, Error> {
        let snapshot = SnapshotFile::read(path)?;
        self.publish(&snapshot.map)
    }

    /// Builds on a separate thread while the current graph keeps serving requests
    pub fn rebuild_in_background(&self, map: MapData) -> JoinHandle<Result<MapVersion, Error>> {
        self.store.announce(map.version);
        let store = Arc::clone(&self.store);
        let build_config = self.config.build.clone();
        thread::spawn(move || {
            info!("Rebuilding router graph for map v{} in background", map.version);
            build_and_publish(&store, &map, &build_config)
        })
    }

    /// Merges built-in defaults, stored preferences and request overrides
    pub fn resolve_options(
        &self,
        graph: &RouterGraph,
        stored: Option<&RawRouteOptions>,
        overrides: &RawRouteOptions,
    ) -> Result<RouteOptions, OptionsError> {
        let catalog = graph.waytypes();
        resolve(
            catalog,
            &RouteOptions::defaults(catalog),
            stored,
            overrides,
            self.config.ignore_unknown_options,
        )
    }

    pub fn route(&self, request: &RouteRequest) -> Result<Arc<Route>, Error> {
        let graph = self.store.load()?;
        let options =
            self.resolve_options(&graph, request.stored_options.as_ref(), &request.options)?;

        let key = RouteKey {
            version: graph.version(),
            permissions: request.permissions.clone(),
            options,
            origin: request.origin,
            destination: request.destination,
        };
        if let Some(route) = self.cache.get(&key) {
            trace!(
                "Route cache hit for {} -> {}",
                request.origin, request.destination
            );
            return Ok(route);
        }

        let path = find_route(
            &graph,
            &request.permissions,
            &key.options,
            &self.config.engine,
            &request.origin,
            &request.destination,
            &request.cancel,
        )?;
        let route = Arc::new(assemble(&path, &graph, &key.options, &self.instructions));
        self.cache.insert(key, Arc::clone(&route));
        Ok(route)
    }

    /// Routes independent requests on the rayon pool, results in request order
    pub fn route_many(&self, requests: &[RouteRequest]) -> Vec<Result<Arc<Route>, Error>> {
        requests
            .par_iter()
            .map(|request| self.route(request))
            .collect()
    }
}

fn build_and_publish(
    store: &GraphStore,
    map: &MapData,
    config: &BuildConfig,
) -> Result<MapVersion, Error> {
    let published = build_router_graph(map, config)
        .and_then(|graph| store.publish(graph))
        .map_err(Error::from);
    if let Err(e) = &published {
        warn!("Map v{} was not published: {e}", map.version);
        store.withdraw(map.version);
    }
    published
}
