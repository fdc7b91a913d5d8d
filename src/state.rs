use std::sync::Arc;

use axum_prometheus::metrics_exporter_prometheus::PrometheusHandle;

use crate::{
    config::{RuntimeConfig, SimulationSettings},
    features::{
        cart::state::{CartState, InMemoryCartState},
        catalog::Catalog,
        chaos::{injector::FaultInjector, random::RandomSource},
    },
};

pub struct AppState {
    pub runtime: Arc<RuntimeConfig>,
    pub catalog: Arc<Catalog>,
    pub carts: Arc<dyn CartState>,
    pub injector: FaultInjector,
    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// State with the seeded catalog and an empty in-memory cart store.
    pub fn new(settings: &SimulationSettings, random: Arc<dyn RandomSource>) -> Self {
        Self::from_runtime(Arc::new(RuntimeConfig::new(settings)), random)
    }

    pub fn from_runtime(runtime: Arc<RuntimeConfig>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            injector: FaultInjector::new(runtime.clone(), random),
            runtime,
            catalog: Arc::new(Catalog::seeded()),
            carts: Arc::new(InMemoryCartState::new()),
            prometheus_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus_handle = Some(handle);
        self
    }
}
