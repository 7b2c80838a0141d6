//! Log file follower
//!
//! [`LogTailer`] reads a file from offset 0 and keeps following it as it
//! grows. At end of file the read task parks on file-change notifications
//! from `notify` and on its cancellation token, whichever fires first.

use crate::error::MonitorError;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

/// Lines (or the fatal error that ended the stream) in file order
pub type LineStream = mpsc::Receiver<Result<String, MonitorError>>;

type WatchEvents = mpsc::UnboundedReceiver<notify::Result<Event>>;

/// Follows an append-only text file
pub struct LogTailer {
    path: PathBuf,
    capacity: usize,
    cancel: CancellationToken,
    watch: Option<(RecommendedWatcher, WatchEvents)>,
    handle: Option<JoinHandle<()>>,
}

impl LogTailer {
    /// Establish the watch on `path`
    ///
    /// `capacity` bounds the number of lines buffered ahead of the consumer.
    ///
    /// # Errors
    /// Returns [`MonitorError::Watch`] if the watcher cannot be created or the
    /// path cannot be watched
    pub fn new(
        path: impl Into<PathBuf>,
        capacity: usize,
        cancel: CancellationToken,
    ) -> Result<Self, MonitorError> {
        let path = path.into();
        let (tx, rx) = mpsc::unbounded_channel();

        let watch_err = |source| MonitorError::Watch {
            path: path.clone(),
            source,
        };
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Receiver gone means the tailer is shutting down
            let _ = tx.send(res);
        })
        .map_err(watch_err)?;
        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(watch_err)?;
        debug!(path = %path.display(), "Watching log file");

        Ok(Self {
            path,
            capacity: capacity.max(1),
            cancel,
            watch: Some((watcher, rx)),
            handle: None,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start producing lines from the beginning of the file
    ///
    /// The stream can be produced only once per tailer. It ends after
    /// [`close`](Self::close), after a fatal error (delivered as the last
    /// item), or when the receiver is dropped.
    ///
    /// # Errors
    /// Returns [`MonitorError::AlreadyOpened`] on a second call and
    /// [`MonitorError::Open`] if the file cannot be opened
    pub async fn open(&mut self) -> Result<LineStream, MonitorError> {
        let Some((watcher, events)) = self.watch.take() else {
            return Err(MonitorError::AlreadyOpened {
                path: self.path.clone(),
            });
        };
        let file = File::open(&self.path)
            .await
            .map_err(|source| MonitorError::Open {
                path: self.path.clone(),
                source,
            })?;

        let (tx, rx) = mpsc::channel(self.capacity);
        let follower = Follower {
            path: self.path.clone(),
            reader: BufReader::new(file),
            events,
            lines: tx,
            cancel: self.cancel.clone(),
        };
        self.handle = Some(tokio::spawn(follower.run(watcher)));
        Ok(rx)
    }

    /// Stop following and release the watch
    pub async fn close(&mut self) {
        self.cancel.cancel();
        self.watch = None;
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            error!(error = %e, "Tailer task failed");
        }
        debug!(path = %self.path.display(), "Stopped following log file");
    }
}

impl std::fmt::Debug for LogTailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogTailer")
            .field("path", &self.path)
            .field("capacity", &self.capacity)
            .field("opened", &self.watch.is_none())
            .finish_non_exhaustive()
    }
}

/// Read side of an opened tailer
struct Follower {
    path: PathBuf,
    reader: BufReader<File>,
    events: WatchEvents,
    lines: mpsc::Sender<Result<String, MonitorError>>,
    cancel: CancellationToken,
}

impl Follower {
    async fn run(mut self, watcher: RecommendedWatcher) {
        // Dropped on return, which removes the watch
        let _watcher = watcher;
        let mut buf = Vec::new();

        loop {
            match self.reader.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    if !self.wait_for_change().await {
                        break;
                    }
                }
                Ok(_) if buf.ends_with(b"\n") => {
                    let line = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\n', '\r'])
                        .to_string();
                    buf.clear();
                    if !self.deliver(Ok(line)).await {
                        break;
                    }
                }
                // Partial line at end of file, the rest is still being written
                Ok(_) => {}
                Err(source) => {
                    error!(path = %self.path.display(), error = %source, "Failed to read log file");
                    let err = MonitorError::Read {
                        path: self.path.clone(),
                        source,
                    };
                    self.deliver(Err(err)).await;
                    break;
                }
            }
        }
        trace!(path = %self.path.display(), "Follower exited");
    }

    /// Block until the file changes; `false` means stop
    async fn wait_for_change(&mut self) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            event = self.events.recv() => match event {
                Some(Ok(event)) => {
                    trace!(kind = ?event.kind, "Log file changed");
                    true
                }
                Some(Err(source)) => {
                    error!(path = %self.path.display(), error = %source, "File watcher failed");
                    let err = MonitorError::WatchEvent {
                        path: self.path.clone(),
                        source,
                    };
                    self.deliver(Err(err)).await;
                    false
                }
                None => false,
            },
        }
    }

    /// Hand one item to the consumer; `false` once nobody is listening
    async fn deliver(&self, item: Result<String, MonitorError>) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.lines.send(item) => sent.is_ok(),
        }
    }
}
