//! File watcher driving re-renders.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Which watched input changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchedInput {
    Plan,
    Instance,
}

/// A watcher that monitors the plan and instance files for changes.
pub struct InputWatcher {
    plan_path: PathBuf,
    instance_path: PathBuf,
    update_tx: mpsc::UnboundedSender<WatchedInput>,
}

impl InputWatcher {
    /// Create a new InputWatcher.
    ///
    /// Returns the watcher and a receiver for change notifications.
    pub fn new(
        plan_path: &Path,
        instance_path: &Path,
    ) -> (Self, mpsc::UnboundedReceiver<WatchedInput>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                plan_path: plan_path.to_path_buf(),
                instance_path: instance_path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching both files in a background thread.
    ///
    /// The parent directories are watched rather than the files, so inputs
    /// replaced by rename (editors, mounted volume updates) stay tracked.
    /// The returned watcher must be kept alive for notifications to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let plan_path = self.plan_path.clone();
        let instance_path = self.instance_path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    for path in &event.paths {
                        for input in classify_event(path, &plan_path, &instance_path) {
                            tracing::info!(?input, path = ?path, "Input change detected");
                            let _ = tx.send(input);
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for dir in watch_dirs(&self.plan_path, &self.instance_path) {
            watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(plan = ?self.plan_path, instance = ?self.instance_path, "Input watcher started");
        Ok(watcher)
    }
}

fn watch_dirs(plan_path: &Path, instance_path: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for path in [plan_path, instance_path] {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let dir = dir.canonicalize().unwrap_or(dir);
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

fn classify_event(path: &Path, plan_path: &Path, instance_path: &Path) -> Vec<WatchedInput> {
    // Mounted volumes publish updates by swapping the `..data` symlink, which
    // re-targets every file in the directory at once.
    let swapped = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("..data"));
    if swapped {
        let dir = path.parent();
        return [
            (plan_path, WatchedInput::Plan),
            (instance_path, WatchedInput::Instance),
        ]
        .into_iter()
        .filter(|(watched, _)| same_dir(dir, watched))
        .map(|(_, input)| input)
        .collect();
    }
    classify(path, plan_path, instance_path).into_iter().collect()
}

fn same_dir(dir: Option<&Path>, watched: &Path) -> bool {
    let (Some(dir), Some(parent)) = (dir, watched.parent()) else {
        return false;
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    match (dir.canonicalize(), parent.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => dir == parent,
    }
}

fn classify(path: &Path, plan_path: &Path, instance_path: &Path) -> Option<WatchedInput> {
    if same_file(path, plan_path) {
        Some(WatchedInput::Plan)
    } else if same_file(path, instance_path) {
        Some(WatchedInput::Instance)
    } else {
        None
    }
}

// Event paths are absolute while the configured ones may be relative.
fn same_file(event_path: &Path, watched: &Path) -> bool {
    if event_path == watched {
        return true;
    }
    match (event_path.canonicalize(), watched.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => event_path.file_name().is_some() && event_path.file_name() == watched.file_name(),
    }
}
