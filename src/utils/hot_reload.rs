// Watches the chaos override file and pushes its settings into the runtime config

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::{
    config::{RuntimeConfig, SettingsOverlay, SimulationSettings},
    constants::hot_reload::{CHANNEL_BUFFER_SIZE, DEBOUNCE_MS},
    errors::AppError,
    utils::logging::log_settings_applied,
};

/// Time to wait before processing file change events (debouncing)
const DEBOUNCE_DELAY: Duration = Duration::from_millis(DEBOUNCE_MS);

/// Maximum retry attempts for watcher creation
const MAX_RETRY_ATTEMPTS: usize = 3;

/// Retry delay for watcher recreation
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Custom error type for hot reload operations
#[derive(Debug, thiserror::Error)]
pub enum HotReloadError {
    #[error("Path resolution failed: {0}")]
    PathResolution(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Watcher creation failed: {0}")]
    WatcherCreation(String),

    #[error("File watching failed: {0}")]
    FileWatching(String),

    #[error("Config reload failed: {0}")]
    ConfigReload(String),
}

impl From<HotReloadError> for AppError {
    fn from(error: HotReloadError) -> Self {
        AppError::HotReloadError(error.to_string())
    }
}

/// Resolves the directory holding `path` and the file name inside it.
///
/// The directory is watched instead of the file itself: mounted config maps
/// replace files through a symlink swap that a file watch would not survive.
fn resolve_watch_target(path: &Path) -> Result<(PathBuf, OsString), HotReloadError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| HotReloadError::PathResolution(format!("{:?} has no file name", path)))?
        .to_os_string();

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let dir = fs::canonicalize(&parent).map_err(|e| {
        HotReloadError::PathResolution(format!("Failed to resolve directory {:?}: {}", parent, e))
    })?;

    if !dir.is_dir() {
        return Err(HotReloadError::FileNotFound(dir));
    }

    Ok((dir, file_name))
}

/// Re-reads the override file and stores `baseline + overrides` into the
/// runtime configuration. A missing file means no overrides, so the baseline
/// is applied. On any other error the runtime configuration is untouched.
pub fn reload_settings(
    path: &Path,
    baseline: &SimulationSettings,
    runtime: &RuntimeConfig,
) -> Result<SimulationSettings, HotReloadError> {
    if !path.exists() {
        warn!("Chaos configuration {:?} is absent, reverting to baseline settings", path);
        runtime.apply(baseline);
        log_settings_applied("baseline", baseline);
        return Ok(baseline.clone());
    }
    if !path.is_file() {
        return Err(HotReloadError::FileNotFound(path.to_path_buf()));
    }

    let overlay = SettingsOverlay::load(path).map_err(|e| {
        HotReloadError::ConfigReload(format!("Failed to parse {:?}: {}", path, e))
    })?;

    let settings = baseline.merged(&overlay);
    settings
        .validate()
        .map_err(|e| HotReloadError::ConfigReload(e.to_string()))?;

    runtime.apply(&settings);
    log_settings_applied(&path.display().to_string(), &settings);
    Ok(settings)
}

/// True when an event touches the watched file or a config-map data link.
fn is_relevant(event: &Event, file_name: &OsString) -> bool {
    if !(event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()) {
        return false;
    }
    event.paths.iter().any(|p| match p.file_name() {
        Some(name) => name == file_name.as_os_str() || name.to_string_lossy().starts_with(".."),
        None => false,
    })
}

/// Watches the chaos override file until the event channel closes.
pub async fn watch_chaos_config(
    config_path: PathBuf,
    baseline: SimulationSettings,
    runtime: Arc<RuntimeConfig>,
) -> Result<(), AppError> {
    info!("Starting chaos configuration watcher...");

    let (watch_dir, file_name) = resolve_watch_target(&config_path).map_err(|e| {
        error!("Failed to resolve chaos configuration path: {}", e);
        AppError::from(e)
    })?;
    let target = watch_dir.join(&file_name);
    info!(watch_dir = ?watch_dir, target = ?target);

    let (tx, mut rx) = mpsc::channel::<Event>(CHANNEL_BUFFER_SIZE);

    // The watcher stops when dropped, so it lives for the whole loop below.
    let mut watcher = create_watcher_with_retry(tx).await?;
    if let Err(e) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
        return Err(HotReloadError::FileWatching(format!(
            "Failed to watch {:?}: {}",
            watch_dir, e
        ))
        .into());
    }

    info!("File watcher successfully started");

    while let Some(event) = rx.recv().await {
        if !is_relevant(&event, &file_name) {
            continue;
        }

        // Debounce: editors and config-map swaps emit bursts of events.
        sleep(DEBOUNCE_DELAY).await;
        while rx.try_recv().is_ok() {}

        info!("Detected change in chaos configuration: {:?}", event.paths);
        match reload_settings(&target, &baseline, &runtime) {
            Ok(_) => info!("Chaos configuration reloaded successfully"),
            Err(e) => error!("Failed to reload chaos configuration: {}. Keeping old settings.", e),
        }
    }

    Ok(())
}

/// Create watcher with retry mechanism
async fn create_watcher_with_retry(
    tx: mpsc::Sender<Event>,
) -> Result<RecommendedWatcher, HotReloadError> {
    let mut attempt = 1;
    loop {
        let watcher_tx = tx.clone();
        let result = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    // Non-blocking send: this runs on the notify thread.
                    if let Err(e) = watcher_tx.try_send(event) {
                        warn!("Failed to send file change event: {}", e);
                    }
                }
                Err(e) => warn!("File watcher error: {}", e),
            },
            notify::Config::default(),
        );

        match result {
            Ok(watcher) => {
                if attempt > 1 {
                    info!("Watcher created successfully on attempt {}", attempt);
                }
                return Ok(watcher);
            }
            Err(e) if attempt >= MAX_RETRY_ATTEMPTS => {
                return Err(HotReloadError::WatcherCreation(format!(
                    "Failed to create watcher after {} attempts: {}",
                    MAX_RETRY_ATTEMPTS, e
                )));
            }
            Err(e) => {
                warn!(
                    "Watcher creation failed on attempt {}: {}. Retrying...",
                    attempt, e
                );
                sleep(RETRY_DELAY).await;
                attempt += 1;
            }
        }
    }
}
