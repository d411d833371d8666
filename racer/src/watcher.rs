//! # Configuration Hot-Reloading
//!
//! Watches the track configuration file while the runner is going. A change
//! only raises a flag; the runner checks it between episodes, re-reads the
//! file and hands the result to the controller, which applies it on its next
//! reset. The watcher callback runs on `notify`'s own thread and never touches
//! the environment.

use anyhow::{anyhow, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// A running watcher and the flag it raises on changes.
///
/// Dropping it stops the watch.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    changed: Arc<AtomicBool>,
}

impl ConfigWatcher {
    /// Take the pending change notification, if any.
    pub fn take_change(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }
}

/// Start watching the configuration file at `path`.
///
/// The parent directory is watched rather than the file, so editors that
/// save by replacing the file are still picked up.
///
/// # Errors
///
/// Returns an error if the watcher cannot be created or the directory cannot
/// be watched.
pub fn start(path: &Path) -> Result<ConfigWatcher> {
    info!("Watching {} for configuration changes", path.display());

    let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let changed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&changed);
    let file = target.clone();
    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        match result {
            Ok(event) => {
                if is_relevant(&event, &file) {
                    flag.store(true, Ordering::Release);
                }
            }
            Err(e) => error!("File watcher error: {e:?}"),
        }
    })
    .map_err(|e| anyhow!("Failed to create file watcher: {e}"))?;

    let directory = watch_root(&target);
    watcher
        .watch(&directory, RecursiveMode::NonRecursive)
        .map_err(|e| anyhow!("Failed to watch {}: {e}", directory.display()))?;

    Ok(ConfigWatcher {
        _watcher: watcher,
        changed,
    })
}

fn watch_root(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Modifications and creations of the watched file
fn is_relevant(event: &Event, file: &Path) -> bool {
    if !event.kind.is_modify() && !event.kind.is_create() {
        return false;
    }
    event
        .paths
        .iter()
        .any(|p| p == file || p.file_name() == file.file_name())
}
