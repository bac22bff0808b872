//! File system watcher for live reload.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌──────────────┐
//! │ notify   │──▶│ filter   │──▶│ Debouncer │──▶│ RebuildQueue │
//! │ events   │   │ sources, │   │  (500ms)  │   │  (1 pending) │
//! └──────────┘   │ no temps │   └───────────┘   └──────┬───────┘
//!                └──────────┘                          │
//!                                              build_site() ok
//!                                                      │
//!                                                      ▼
//!                                              BuildClock::mark()
//! ```
//!
//! The event loop runs on its own thread and the rebuild runs on a worker
//! thread behind a queue of capacity one, so builds never overlap and a
//! burst of triggers during a build collapses into one follow-up build.
//! A failed rebuild is logged and leaves the build clock alone. Only a
//! failure before the output reset (an unreadable config) leaves the
//! previous `public/` intact; a later failure leaves it cleared or partly
//! written until the next successful build.

use crate::{
    build::build_site,
    config::{SitePaths, paths},
    log,
};
use anyhow::{Context, Result};
use chrono::Utc;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

// =============================================================================
// Constants
// =============================================================================

pub const DEBOUNCE: Duration = Duration::from_millis(500);
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Source directories watched recursively.
const WATCHED_DIRS: &[&str] = &[paths::POSTS_DIR, paths::PAGES_DIR, paths::THEMES_DIR];

// =============================================================================
// Build Clock
// =============================================================================

/// Completion time of the last successful build, in milliseconds since the
/// Unix epoch. Written by the rebuild worker, read by HTTP handlers.
#[derive(Debug, Clone, Default)]
pub struct BuildClock(Arc<AtomicU64>);

impl BuildClock {
    pub fn new() -> Self {
        let clock = Self::default();
        clock.mark();
        clock
    }

    /// Record a finished build. The value strictly increases on every call.
    pub fn mark(&self) {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        // the closure always returns Some, so this never fails
        let _ = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| Some(now.max(prev + 1)));
    }

    pub fn millis(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts) or a dotfile.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Whether `path` is site source: inside a watched directory, or the config file.
/// Anything under a hidden directory (`posts/.git/`, `themes/.cache/`) is not.
fn is_source_path(path: &Path, root: &Path) -> bool {
    let Ok(rel) = path.strip_prefix(root) else {
        return false;
    };
    if rel
        .components()
        .any(|c| c.as_os_str().to_str().is_some_and(|s| s.starts_with('.')))
    {
        return false;
    }
    let mut components = rel.components();
    let Some(first) = components.next() else {
        return false;
    };
    let first = first.as_os_str();

    WATCHED_DIRS.iter().any(|dir| first == *dir)
        || (first == paths::CONFIG_FILE && components.next().is_none())
}

/// `/site/posts/hello.md` → `posts/hello.md`
fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

// =============================================================================
// Debounce State
// =============================================================================

/// Single-shot timer that every accepted event restarts.
///
/// Time is passed in explicitly so the policy can be tested without sleeping.
#[derive(Debug)]
struct Debouncer {
    delay: Duration,
    pending: FxHashSet<PathBuf>,
    deadline: Option<Instant>,
}

impl Debouncer {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: FxHashSet::default(),
            deadline: None,
        }
    }

    /// Queue a changed path and restart the timer. Temp files are dropped.
    fn add(&mut self, path: PathBuf, now: Instant) -> bool {
        if is_temp_file(&path) {
            return false;
        }
        self.pending.insert(path);
        self.deadline = Some(now + self.delay);
        true
    }

    fn ready(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Drain the pending paths, sorted, and disarm the timer.
    fn take(&mut self) -> Vec<PathBuf> {
        self.deadline = None;
        let mut paths: Vec<_> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    /// How long the event loop may block before the timer needs checking.
    fn timeout(&self, now: Instant) -> Duration {
        self.deadline
            .map_or(IDLE_TIMEOUT, |deadline| deadline.saturating_duration_since(now))
    }
}

// =============================================================================
// Rebuild Queue
// =============================================================================

/// Worker thread that runs rebuilds one at a time.
///
/// At most one request waits behind the running build; further requests
/// are absorbed by the waiting one.
pub struct RebuildQueue {
    tx: SyncSender<()>,
    worker: JoinHandle<()>,
}

impl RebuildQueue {
    pub fn spawn(mut rebuild: impl FnMut() + Send + 'static) -> Self {
        let (tx, rx) = mpsc::sync_channel::<()>(1);
        let worker = thread::spawn(move || {
            for () in rx {
                rebuild();
            }
        });
        Self { tx, worker }
    }

    /// Ask for a rebuild. Returns `false` when one is already waiting.
    pub fn request(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => false,
            Err(TrySendError::Disconnected(())) => {
                log!("watch"; "rebuild worker stopped");
                false
            }
        }
    }

    /// Let the queued rebuild finish, then stop the worker.
    pub fn shutdown(self) {
        drop(self.tx);
        if self.worker.join().is_err() {
            log!("error"; "rebuild worker panicked");
        }
    }
}

// =============================================================================
// Event Loop
// =============================================================================

/// Consume watcher events until the channel closes, calling `on_ready` with
/// the changed source paths each time the debounce timer fires.
fn event_loop(
    rx: &Receiver<notify::Result<Event>>,
    root: &Path,
    delay: Duration,
    mut on_ready: impl FnMut(Vec<PathBuf>),
) {
    let mut debouncer = Debouncer::new(delay);

    loop {
        match rx.recv_timeout(debouncer.timeout(Instant::now())) {
            Ok(Ok(event)) if is_relevant(&event) => {
                let now = Instant::now();
                for path in event.paths {
                    if is_source_path(&path, root) {
                        debouncer.add(path, now);
                    }
                }
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Disconnected) => break,
            // irrelevant events and timeouts fall through to the timer check
            _ => {}
        }

        if debouncer.ready(Instant::now()) {
            on_ready(debouncer.take());
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Running watcher. Dropping or stopping it releases the OS watch handles.
pub struct SiteWatcher {
    watcher: RecommendedWatcher,
    thread: JoinHandle<()>,
}

impl SiteWatcher {
    /// Release the watch handles and wait for any running rebuild.
    pub fn stop(self) {
        drop(self.watcher);
        if self.thread.join().is_err() {
            log!("error"; "watch thread panicked");
        }
    }
}

/// Watch the site sources and rebuild on change, marking `clock` after
/// every successful rebuild.
pub fn spawn_watcher(paths: SitePaths, clock: BuildClock) -> Result<SiteWatcher> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    setup_watchers(&mut watcher, &paths)?;

    let thread = thread::spawn(move || {
        let root = paths.root().to_path_buf();
        let worker_paths = paths.clone();
        let queue = RebuildQueue::spawn(move || rebuild(&worker_paths, &clock));

        event_loop(&rx, &root, DEBOUNCE, |changed| {
            let names: Vec<_> = changed.iter().map(|p| rel_path(p, &root)).collect();
            log!("watch"; "{} changed", names.join(", "));
            if !queue.request() {
                log!("watch"; "rebuild already queued");
            }
        });

        queue.shutdown();
    });

    Ok(SiteWatcher { watcher, thread })
}

fn rebuild(paths: &SitePaths, clock: &BuildClock) {
    log!("watch"; "rebuilding...");
    match build_site(paths) {
        Ok(_) => clock.mark(),
        Err(err) => {
            log!("watch"; "build failed, keeping previous output");
            log!("error"; "{err:#}");
        }
    }
}

/// Watch the content directories recursively and the site root itself, so
/// the config file survives editors that save by rename.
fn setup_watchers(watcher: &mut impl Watcher, paths: &SitePaths) -> Result<()> {
    let root = paths.root();
    let mut watched = Vec::new();

    for dir in WATCHED_DIRS {
        let path = root.join(dir);
        if path.is_dir() {
            watcher
                .watch(&path, RecursiveMode::Recursive)
                .with_context(|| format!("Failed to watch {}", path.display()))?;
            watched.push(format!("{dir}/"));
        }
    }

    watcher
        .watch(root, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", root.display()))?;
    watched.push(paths::CONFIG_FILE.to_owned());

    log!("watch"; "watching {}", watched.join(", "));
    Ok(())
}
