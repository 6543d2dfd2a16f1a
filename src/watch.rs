//! Filesystem watcher for externally edited documents.
//!
//! Watches the directory holding a document file and collapses bursts of
//! filesystem events (editors typically write via create + rename + modify)
//! into single debounced [`ChangeSignal`]s. The embedder turns each signal
//! into a [`ChangeEvent`](crate::store::ChangeEvent) whose origin comes from
//! [`FileStore::take_pending_write`](crate::store::FileStore::take_pending_write),
//! so the engine's own atomic replaces are attributed while hand edits flow
//! through as external.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread;
use std::time::{Duration, Instant};

use crate::Result;

/// Debounce duration - wait this long after the last event before signalling.
const DEBOUNCE_MS: u64 = 100;

/// A debounced "this document changed on disk" signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSignal {
    /// Path of the watched document.
    pub path: PathBuf,
}

/// Watches one document file for changes.
///
/// The watcher and its debounce thread run until the handle is dropped.
pub struct DocumentWatcher {
    watcher: Option<RecommendedWatcher>,
    thread: Option<thread::JoinHandle<()>>,
}

impl DocumentWatcher {
    /// Start watching `path`, sending debounced signals on `signals`.
    ///
    /// The parent directory is watched rather than the file itself because
    /// atomic replacement renames a sibling temp file over the target, which
    /// some platforms report against the directory.
    pub fn spawn(path: impl AsRef<Path>, signals: Sender<ChangeSignal>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (tx, rx) = channel::<Event>();

        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = tx.send(event);
                }
            },
            Config::default(),
        )?;

        let watch_root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;

        let thread = thread::spawn(move || debounce_loop(path, rx, signals));
        Ok(Self {
            watcher: Some(watcher),
            thread: Some(thread),
        })
    }
}

impl Drop for DocumentWatcher {
    fn drop(&mut self) {
        // dropping the watcher closes the event channel, which ends the loop
        drop(self.watcher.take());
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn debounce_loop(path: PathBuf, events: Receiver<Event>, signals: Sender<ChangeSignal>) {
    let debounce = Duration::from_millis(DEBOUNCE_MS);
    let mut pending = false;
    let mut last_event = Instant::now();

    loop {
        let timeout = if pending {
            debounce.saturating_sub(last_event.elapsed())
        } else {
            // no pending signal, wait indefinitely for the next event
            Duration::from_secs(3600)
        };

        match events.recv_timeout(timeout) {
            Ok(event) => {
                if is_relevant(&event, &path) {
                    pending = true;
                    last_event = Instant::now();
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if pending {
                    pending = false;
                    if signals.send(ChangeSignal { path: path.clone() }).is_err() {
                        break;
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Write-shaped events touching the watched file. Events for sibling files
/// (temp files mid-replace, unrelated documents) are dropped.
fn is_relevant(event: &Event, path: &Path) -> bool {
    let write_shaped = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    if !write_shaped {
        return false;
    }
    event.paths.is_empty()
        || event
            .paths
            .iter()
            .any(|p| p.as_path() == path || p.file_name() == path.file_name())
}
