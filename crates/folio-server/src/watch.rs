//! Source watching for watch-and-rebuild.
//!
//! Raw `notify` events are collected into a [`ChangeSet`] until the source
//! tree has been quiet for the debounce interval, then the whole batch is
//! handed to the rebuild callback once.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::ServerError;

/// Quiet interval before a batch of changes triggers a rebuild.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Paths changed since the last rebuild.
#[derive(Debug, Default)]
pub(crate) struct ChangeSet {
    paths: BTreeSet<PathBuf>,
}

impl ChangeSet {
    /// Record the paths of a create, modify or remove event.
    ///
    /// Paths under any of `ignored` are skipped.
    pub(crate) fn record(&mut self, event: &Event, ignored: &[PathBuf]) {
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) {
            return;
        }
        for path in &event.paths {
            if ignored.iter().any(|dir| path.starts_with(dir)) {
                continue;
            }
            tracing::debug!(path = %path.display(), kind = ?event.kind, "Source changed");
            self.paths.insert(path.clone());
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub(crate) fn into_paths(self) -> Vec<PathBuf> {
        self.paths.into_iter().collect()
    }
}

/// Watches a source directory and calls back after changes settle.
///
/// Watching stops when the value is dropped.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl SourceWatcher {
    /// Start watching `source_dir` recursively.
    ///
    /// `on_change` runs on a blocking thread with the sorted changed paths.
    /// Changes below `ignored` (typically the output directory) never
    /// trigger it. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Watch`] if the watcher cannot be created.
    pub fn start<F>(
        source_dir: &Path,
        ignored: Vec<PathBuf>,
        debounce: Duration,
        on_change: F,
    ) -> Result<Self, ServerError>
    where
        F: Fn(&[PathBuf]) + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel::<Event>(100);
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                // The callback runs on the watcher's own thread
                Ok(event) => {
                    let _ = tx.blocking_send(event);
                }
                Err(e) => tracing::warn!(error = %e, "Watch error"),
            }
        })?;
        watcher.watch(source_dir, RecursiveMode::Recursive)?;
        tracing::info!(path = %source_dir.display(), "Watching for changes");

        let task = tokio::spawn(debounce_loop(rx, ignored, debounce, Arc::new(on_change)));
        Ok(Self {
            _watcher: watcher,
            task,
        })
    }
}

impl Drop for SourceWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Batch events until `debounce` passes without one, then call `on_change`.
///
/// Returns when the event channel closes.
pub(crate) async fn debounce_loop<F>(
    mut rx: mpsc::Receiver<Event>,
    ignored: Vec<PathBuf>,
    debounce: Duration,
    on_change: Arc<F>,
) where
    F: Fn(&[PathBuf]) + Send + Sync + 'static,
{
    while let Some(event) = rx.recv().await {
        let mut changes = ChangeSet::default();
        changes.record(&event, &ignored);

        let mut closed = false;
        loop {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(Some(event)) => changes.record(&event, &ignored),
                Ok(None) => {
                    closed = true;
                    break;
                }
                Err(_) => break,
            }
        }

        if !changes.is_empty() {
            let paths = changes.into_paths();
            tracing::info!(changed = paths.len(), "Rebuilding");
            let on_change = Arc::clone(&on_change);
            if let Err(e) = tokio::task::spawn_blocking(move || on_change(&paths)).await {
                tracing::error!(error = %e, "Rebuild task failed");
            }
        }
        if closed {
            break;
        }
    }
}
