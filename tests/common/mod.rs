#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc};

use shopsim::{
    app::create_app,
    config::SimulationSettings,
    features::chaos::random::{RandomSource, ScriptedRandom},
    state::AppState,
};
use tokio::{net::TcpListener, task::JoinHandle};

pub struct TestServer {
    pub base_url: String,
    pub state: Arc<AppState>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// No latency and no injected failures.
pub fn quiet_settings() -> SimulationSettings {
    SimulationSettings {
        base_latency_ms: 0,
        product_latency_ms: 0,
        cart_latency_ms: 0,
        checkout_latency_ms: 0,
        db_failure_rate: 0.0,
        payment_failure_rate: 0.0,
        chaos_mode: false,
        chaos_latency_multiplier: 10.0,
    }
}

pub async fn spawn_server(settings: SimulationSettings) -> TestServer {
    spawn_server_with_random(settings, Arc::new(ScriptedRandom::constant(0.5))).await
}

pub async fn spawn_server_with_random(
    settings: SimulationSettings,
    random: Arc<dyn RandomSource>,
) -> TestServer {
    let state = Arc::new(AppState::new(&settings, random));
    let app = create_app(state.clone()).expect("router should build");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .expect("server error");
    });

    TestServer {
        base_url: format!("http://{}", addr),
        state,
        handle,
    }
}
