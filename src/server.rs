//! Live layout server
//!
//! Loads a document set, keeps its layout simulating in real time and serves
//! the current positions over HTTP. Changes to the watched documents rebuild
//! the graph.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use notify::{Event, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::controller::SimulationController;
use crate::corpus;
use crate::io::ReaderRegistry;
use crate::snapshot::{LayoutKind, LayoutSnapshot, NodeKind};
use crate::ticker::{self, SharedController, SnapshotSender};

/// Shared state behind every route
#[derive(Clone)]
pub struct AppState {
    controller: SharedController,
    publisher: SnapshotSender,
    snapshots: watch::Receiver<LayoutSnapshot>,
    inputs: Arc<Vec<PathBuf>>,
    registry: Arc<ReaderRegistry>,
    config: Arc<Config>,
}

/// Simulation summary returned by the control routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub layout: LayoutKind,
    pub documents: usize,
    pub running: bool,
    pub enabled: bool,
    pub tick: u64,
}

impl AppState {
    /// Load `inputs` and build the initial layout
    pub fn new(inputs: Vec<PathBuf>, config: Config) -> anyhow::Result<Self> {
        let registry = ReaderRegistry::with_defaults();
        let corpus = corpus::load_inputs(&inputs, &registry, &config.keywords)?;

        let mut controller = SimulationController::new(config.layout_settings())
            .with_enabled(config.layout.simulation_enabled);
        controller.rebuild(&corpus.profiles);

        let (publisher, snapshots) = watch::channel(controller.snapshot());
        Ok(Self {
            controller: ticker::shared(controller),
            publisher: Arc::new(publisher),
            snapshots,
            inputs: Arc::new(inputs),
            registry: Arc::new(registry),
            config: Arc::new(config),
        })
    }

    /// Re-read every document and swap in the new layout
    pub async fn reload(&self) -> anyhow::Result<usize> {
        let corpus = corpus::load_inputs(&self.inputs, &self.registry, &self.config.keywords)?;
        {
            let mut controller = self.controller.lock().await;
            controller.rebuild(&corpus.profiles);
        }
        ticker::publish(&self.controller, &self.publisher).await;
        Ok(corpus.profiles.len())
    }

    async fn status(&self) -> Status {
        let controller = self.controller.lock().await;
        let snapshot = controller.snapshot();
        Status {
            layout: snapshot.layout,
            documents: snapshot
                .nodes
                .iter()
                .filter(|n| n.kind == NodeKind::Document)
                .count(),
            running: controller.is_running(),
            enabled: controller.is_enabled(),
            tick: snapshot.tick,
        }
    }

    /// Apply a lifecycle change and publish the result
    async fn control(&self, change: impl FnOnce(&mut SimulationController)) -> Status {
        {
            let mut controller = self.controller.lock().await;
            change(&mut controller);
        }
        ticker::publish(&self.controller, &self.publisher).await;
        self.status().await
    }
}

/// Latest published layout
pub async fn get_layout(State(state): State<AppState>) -> Json<LayoutSnapshot> {
    Json(state.snapshots.borrow().clone())
}

pub async fn get_status(State(state): State<AppState>) -> Json<Status> {
    Json(state.status().await)
}

pub async fn post_start(State(state): State<AppState>) -> Json<Status> {
    Json(state.control(SimulationController::start).await)
}

pub async fn post_stop(State(state): State<AppState>) -> Json<Status> {
    Json(state.control(SimulationController::stop).await)
}

pub async fn post_toggle(State(state): State<AppState>) -> Json<Status> {
    Json(state.control(SimulationController::toggle).await)
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/layout", get(get_layout))
        .route("/api/status", get(get_status))
        .route("/api/simulation/start", post(post_start))
        .route("/api/simulation/stop", post(post_stop))
        .route("/api/simulation/toggle", post(post_toggle))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Directory to watch for a given input
fn watch_target(input: &Path) -> PathBuf {
    if input.is_dir() {
        input.to_path_buf()
    } else {
        input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Start the layout server
pub async fn serve(inputs: Vec<PathBuf>, config: Config, port: u16) -> anyhow::Result<()> {
    let period = config.simulation.tick_period()?;
    let state = AppState::new(inputs, config)?;

    // Simulation ticker
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ticker_handle = tokio::spawn(ticker::run_ticker(
        state.controller.clone(),
        period,
        state.publisher.clone(),
        shutdown_rx,
    ));

    // Create channel for file change notifications
    let (tx, mut rx) = mpsc::channel::<()>(1);
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                let _ = tx.blocking_send(());
            }
        }
    })?;
    for input in state.inputs.iter() {
        watcher.watch(&watch_target(input), RecursiveMode::NonRecursive)?;
    }

    // Spawn rebuild task
    let reload_state = state.clone();
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            // Debounce: wait a bit for rapid changes to settle
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

            // Drain any additional notifications
            while rx.try_recv().is_ok() {}

            match reload_state.reload().await {
                Ok(documents) => info!(documents, "rebuilt layout"),
                Err(e) => error!("error rebuilding layout: {e}"),
            }
        }
    });

    let app = router(state.clone());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("layout server running at http://localhost:{port}/api/layout");

    // Keep watcher alive
    let _watcher = watcher;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    let _ = shutdown_tx.send(true);
    let steps = ticker_handle.await?;
    info!(steps, "layout server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn state_with(docs: &[(&str, &str)]) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in docs {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let state = AppState::new(vec![dir.path().to_path_buf()], Config::default()).unwrap();
        (dir, state)
    }

    #[tokio::test]
    async fn layout_route_returns_initial_graph() {
        let (_dir, state) = state_with(&[
            ("a.txt", "graph layout physics"),
            ("b.txt", "graph layout poetry"),
        ]);

        let Json(snapshot) = get_layout(State(state)).await;
        assert_eq!(snapshot.layout, LayoutKind::Force);
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.edges.len(), 1);
        assert_eq!(snapshot.edges[0].shared_keywords, vec!["graph", "layout"]);
    }

    #[tokio::test]
    async fn control_routes_change_running_state() {
        let (_dir, state) = state_with(&[("a.txt", "shared words"), ("b.txt", "shared terms")]);

        let Json(status) = get_status(State(state.clone())).await;
        assert!(status.running);
        assert_eq!(status.documents, 2);

        let Json(status) = post_stop(State(state.clone())).await;
        assert!(!status.running);
        assert!(!status.enabled);

        let Json(status) = post_toggle(State(state.clone())).await;
        assert!(status.enabled);
        assert!(status.running);

        let Json(status) = post_toggle(State(state.clone())).await;
        assert!(!status.enabled);
        assert!(!status.running);

        let Json(status) = post_start(State(state.clone())).await;
        assert!(status.running);
        assert!(status.enabled);

        let Json(snapshot) = get_layout(State(state)).await;
        assert!(snapshot.running);
    }

    #[tokio::test]
    async fn reload_picks_up_new_documents() {
        let (dir, state) = state_with(&[("only.txt", "lonely keywords here")]);
        assert_eq!(
            get_layout(State(state.clone())).await.0.layout,
            LayoutKind::Radial
        );

        fs::write(dir.path().join("second.txt"), "keywords again").unwrap();
        assert_eq!(state.reload().await.unwrap(), 2);

        let Json(snapshot) = get_layout(State(state)).await;
        assert_eq!(snapshot.layout, LayoutKind::Force);
        assert_eq!(snapshot.tick, 0);
    }

    #[test]
    fn watch_target_uses_parent_of_files() {
        assert_eq!(watch_target(Path::new("docs/a.txt")), PathBuf::from("docs"));
        assert_eq!(watch_target(Path::new("a.txt")), PathBuf::from("."));
    }
}
