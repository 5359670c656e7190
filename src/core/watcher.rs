//! Filesystem watcher that keeps a store in sync with external edits
//!
//! A `notify` watcher observes the backing directory (not recursively) and
//! forwards raw events to a dedicated thread. The first relevant event opens
//! a debounce window; everything arriving inside it is coalesced into one
//! full reload. Each reload outcome is reported on a channel.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::core::error::StoreError;
use crate::core::persist::{self, LoadStats};
use crate::core::store::ItemStore;

/// Default quiet period between the first change and the reload
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Outcome of one watcher-triggered reload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Reloaded(LoadStats),
    ReloadFailed(String),
}

enum WatchSignal {
    Fs(notify::Result<Event>),
    Stop,
}

/// Handle to a running watcher. Stops on drop.
pub struct ItemWatcher {
    watcher: Option<RecommendedWatcher>,
    signal: Sender<WatchSignal>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for ItemWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemWatcher")
            .field("running", &self.is_running())
            .finish()
    }
}

impl ItemWatcher {
    /// Start watching `store`'s directory.
    ///
    /// Returns the handle and a receiver of reload outcomes. Dropping the
    /// receiver does not stop the watcher; reloads keep happening.
    pub fn spawn(
        store: Arc<ItemStore>,
        debounce: Duration,
    ) -> Result<(Self, Receiver<StoreEvent>), StoreError> {
        let (signal_tx, signal_rx) = mpsc::channel::<WatchSignal>();
        let (event_tx, event_rx) = mpsc::channel::<StoreEvent>();

        let fs_tx = signal_tx.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = fs_tx.send(WatchSignal::Fs(res));
            },
            Config::default(),
        )?;
        watcher.watch(store.dir(), RecursiveMode::NonRecursive)?;

        tracing::debug!(
            dir = %store.dir().display(),
            debounce_ms = debounce.as_millis() as u64,
            "watching item directory"
        );

        let handle = thread::Builder::new()
            .name("tkt-watcher".to_string())
            .spawn(move || run(store, signal_rx, event_tx, debounce))
            .map_err(|e| StoreError::Watch(notify::Error::io(e)))?;

        Ok((
            Self {
                watcher: Some(watcher),
                signal: signal_tx,
                handle: Some(handle),
            },
            event_rx,
        ))
    }

    /// Stop watching and wait for the worker thread. Safe to call twice.
    pub fn stop(&mut self) {
        // dropping the notify watcher stops new filesystem events
        self.watcher.take();
        let _ = self.signal.send(WatchSignal::Stop);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("watcher thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ItemWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    store: Arc<ItemStore>,
    signals: Receiver<WatchSignal>,
    events: Sender<StoreEvent>,
    debounce: Duration,
) {
    loop {
        // wait for the first relevant change
        match signals.recv() {
            Ok(WatchSignal::Fs(Ok(event))) if is_relevant(&event) => {}
            Ok(WatchSignal::Fs(Ok(_))) => continue,
            Ok(WatchSignal::Fs(Err(err))) => {
                tracing::warn!(error = %err, "filesystem watch error");
                continue;
            }
            Ok(WatchSignal::Stop) | Err(_) => return,
        }

        // coalesce whatever else arrives inside the window
        let deadline = Instant::now() + debounce;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match signals.recv_timeout(remaining) {
                Ok(WatchSignal::Fs(_)) => {}
                Ok(WatchSignal::Stop) | Err(RecvTimeoutError::Disconnected) => return,
                Err(RecvTimeoutError::Timeout) => break,
            }
        }

        let outcome = match store.load() {
            Ok(stats) => StoreEvent::Reloaded(stats),
            Err(err) => {
                tracing::warn!(error = %err, "reload after filesystem change failed");
                StoreEvent::ReloadFailed(err.to_string())
            }
        };
        // nobody listening is fine
        let _ = events.send(outcome);
    }
}

/// Create, modify or remove of an item file
fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| persist::is_item_file(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    use notify::event::{AccessKind, CreateKind};
    use tempfile::tempdir;

    use crate::core::store::StoreOptions;

    fn wait_for<F>(rx: &Receiver<StoreEvent>, mut done: F) -> bool
    where
        F: FnMut(&StoreEvent) -> bool,
    {
        let deadline = Instant::now() + Duration::from_secs(5);
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            match rx.recv_timeout(remaining) {
                Ok(event) if done(&event) => return true,
                Ok(_) => {}
                Err(_) => return false,
            }
        }
        false
    }

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_relevance_filter() {
        assert!(is_relevant(&event(
            EventKind::Create(CreateKind::File),
            "/x/ab12--thing.md"
        )));
        assert!(!is_relevant(&event(
            EventKind::Create(CreateKind::File),
            "/x/.ab12.md.tmp"
        )));
        assert!(!is_relevant(&event(
            EventKind::Create(CreateKind::File),
            "/x/notes.txt"
        )));
        assert!(!is_relevant(&event(
            EventKind::Access(AccessKind::Any),
            "/x/ab12.md"
        )));
    }

    #[test]
    fn test_external_file_is_picked_up() {
        let tmp = tempdir().unwrap();
        let store = Arc::new(ItemStore::open(tmp.path(), StoreOptions::default()).unwrap());
        store.load().unwrap();
        let (mut watcher, rx) = ItemWatcher::spawn(Arc::clone(&store), DEFAULT_DEBOUNCE).unwrap();
        assert!(watcher.is_running());

        fs::write(
            tmp.path().join("zz99--external.md"),
            "---\ntitle: From another editor\n---\n",
        )
        .unwrap();

        let seen = wait_for(&rx, |e| {
            matches!(e, StoreEvent::Reloaded(_)) && store.get("zz99").is_ok()
        });
        assert!(seen, "watcher never reloaded the new file");
        assert_eq!(store.get("zz99").unwrap().title, "From another editor");

        fs::remove_file(tmp.path().join("zz99--external.md")).unwrap();
        let gone = wait_for(&rx, |e| {
            matches!(e, StoreEvent::Reloaded(_)) && store.get("zz99").is_err()
        });
        assert!(gone, "watcher never noticed the removal");

        watcher.stop();
    }

    #[test]
    fn test_bad_file_reports_failure() {
        let tmp = tempdir().unwrap();
        let store = Arc::new(ItemStore::open(tmp.path(), StoreOptions::default()).unwrap());
        store.load().unwrap();
        let (_watcher, rx) = ItemWatcher::spawn(Arc::clone(&store), DEFAULT_DEBOUNCE).unwrap();

        fs::write(tmp.path().join("bad1.md"), "no header").unwrap();
        assert!(wait_for(&rx, |e| matches!(e, StoreEvent::ReloadFailed(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let tmp = tempdir().unwrap();
        let store = Arc::new(ItemStore::open(tmp.path(), StoreOptions::default()).unwrap());
        let (mut watcher, _rx) = ItemWatcher::spawn(store, DEFAULT_DEBOUNCE).unwrap();

        watcher.stop();
        assert!(!watcher.is_running());
        watcher.stop();
        assert!(!watcher.is_running());
    }
}
