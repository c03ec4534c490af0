//! Settings file watcher for hot reload.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::load_settings;
use crate::config::schema::AppSettings;

/// Live view of the settings file, swapped atomically on reload.
pub type SharedSettings = Arc<ArcSwap<AppSettings>>;

/// Start watching the settings file for changes.
///
/// Returns the shared handle and the watcher guard; the file stops being
/// watched when the guard is dropped. A change that fails to load keeps the
/// current snapshot.
pub fn watch(
    path: PathBuf,
    initial: AppSettings,
) -> Result<(SharedSettings, RecommendedWatcher), notify::Error> {
    let shared: SharedSettings = Arc::new(ArcSwap::from_pointee(initial));

    let sink = shared.clone();
    let reload_path = path.clone();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if event.kind.is_modify() || event.kind.is_create() {
                    tracing::info!(path = ?reload_path, "settings file change detected, reloading");
                    match load_settings(&reload_path) {
                        Ok(settings) => sink.store(Arc::new(settings)),
                        Err(e) => {
                            tracing::error!(
                                "failed to reload settings: {e}; keeping current settings"
                            );
                        }
                    }
                }
            }
            Err(e) => tracing::error!("settings watch error: {e:?}"),
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;

    tracing::info!(path = ?path, "settings watcher started");
    Ok((shared, watcher))
}
