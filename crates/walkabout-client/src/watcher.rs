use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the watcher thread to the main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    SceneChanged(PathBuf),
    ConfigChanged(PathBuf),
    BindingsChanged(PathBuf),
}

/// Files whose edits trigger a reload.
#[derive(Debug, Clone, Default)]
pub struct WatchTargets {
    pub scene: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub bindings: Option<PathBuf>,
}

impl WatchTargets {
    pub fn classify(&self, path: &Path) -> Option<WatchEvent> {
        let matches = |target: &Option<PathBuf>| target.as_deref().is_some_and(|t| same_file(t, path));
        if matches(&self.scene) {
            Some(WatchEvent::SceneChanged(path.to_path_buf()))
        } else if matches(&self.config) {
            Some(WatchEvent::ConfigChanged(path.to_path_buf()))
        } else if matches(&self.bindings) {
            Some(WatchEvent::BindingsChanged(path.to_path_buf()))
        } else {
            None
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Creates a file watcher on the given directory and returns a receiver
/// for reload events. The watcher must be kept alive.
pub fn start_watching(
    watch_dir: &Path,
    targets: WatchTargets,
) -> Result<(RecommendedWatcher, mpsc::Receiver<WatchEvent>), notify::Error> {
    let (tx, rx) = mpsc::channel();

    let mut watcher =
        notify::recommended_watcher(move |result: Result<Event, notify::Error>| match result {
            Ok(event) => {
                if let EventKind::Modify(_) | EventKind::Create(_) = event.kind {
                    for path in &event.paths {
                        if let Some(change) = targets.classify(path) {
                            tracing::info!("File changed: {:?}", path);
                            let _ = tx.send(change);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!("File watcher error: {:?}", e);
            }
        })?;

    watcher.watch(watch_dir, RecursiveMode::Recursive)?;
    tracing::info!("File watcher started on: {:?}", watch_dir);

    Ok((watcher, rx))
}

/// Drain pending events, collapsing duplicates from editors that write twice.
pub fn drain(rx: &mpsc::Receiver<WatchEvent>) -> Vec<WatchEvent> {
    let mut events: Vec<WatchEvent> = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if !events.contains(&event) {
            events.push(event);
        }
    }
    events
}
