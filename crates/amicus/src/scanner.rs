//! Scan feed abstraction.
//!
//! The ingest pipeline consumes decoded QR text from a [`ScanSource`],
//! keeping the scanner lifecycle independent of whatever produces the
//! frames. The camera and the QR-symbol decoder sit outside this crate;
//! a source only promises that decoded text arrives over a channel, one
//! message per successful frame decode. Frames with no code in them are
//! the steady state while scanning and are never reported as errors.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Errors that can occur while running a scan source.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The feed device or file could not be acquired.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// The source failed to start.
    #[error("failed to start scan source: {0}")]
    StartFailed(String),

    /// The source failed to stop cleanly.
    #[error("failed to stop scan source: {0}")]
    StopFailed(String),

    /// The source is already running.
    #[error("scan source already running")]
    AlreadyRunning,

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for scan source operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Hints passed to the frame producer.
///
/// The pipeline does not depend on these beyond "decoded text arrives";
/// they shape how eagerly frames are sampled.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Frame sampling rate hint.
    pub fps: u32,

    /// Side of the square detection region, in pixels.
    pub box_px: u32,

    /// Prefer the rear-facing camera when one exists.
    pub rear_facing: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            box_px: 250,
            rear_facing: true,
        }
    }
}

impl ScannerConfig {
    /// Interval between sampled frames.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}

/// Cloneable stop signal shared between a source and its consumer.
#[derive(Debug, Clone, Default)]
pub struct ScannerHandle {
    stop_signal: Arc<AtomicBool>,
}

impl ScannerHandle {
    /// Create a fresh handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the source to stop. Idempotent.
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Check whether the stop signal has been sent.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop_signal.load(Ordering::SeqCst)
    }

    /// Reset the signal so the source can be started again.
    pub fn reset(&self) {
        self.stop_signal.store(false, Ordering::SeqCst);
    }
}

/// A producer of decoded QR text.
#[async_trait::async_trait]
pub trait ScanSource: Send + Sync {
    /// The name of this source (for logging).
    fn name(&self) -> &'static str;

    /// Check whether the source is currently delivering.
    fn is_running(&self) -> bool;

    /// Acquire the feed and begin sending decoded text through `tx`.
    ///
    /// On failure the source is left not-running; there is no partial
    /// "started" state to unwind.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::CameraUnavailable`] when the feed cannot be
    /// acquired and [`ScanError::AlreadyRunning`] on a second start.
    async fn start(&mut self, tx: mpsc::Sender<String>) -> Result<()>;

    /// Stop the source. Idempotent; when this returns the feed is released
    /// and no further text will be delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails to stop cleanly.
    async fn stop(&mut self) -> Result<()>;
}

/// A scan source that replays decoded text from a file or stdin.
///
/// Each input line is one frame's decode result; a blank line is a frame
/// with no code in it. This stands in for the camera + decoder boundary in
/// the CLI and in tests, delivering lines at the configured frame cadence.
#[derive(Debug)]
pub struct LineFeedSource {
    input: Option<PathBuf>,
    frame_interval: Duration,
    handle: ScannerHandle,
    running: Arc<AtomicBool>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl LineFeedSource {
    /// Create a source reading from `input`, or stdin when `None`.
    #[must_use]
    pub fn new(input: Option<PathBuf>, config: &ScannerConfig) -> Self {
        Self {
            input,
            frame_interval: config.frame_interval(),
            handle: ScannerHandle::new(),
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// Handle for signalling this source to stop from elsewhere.
    #[must_use]
    pub fn handle(&self) -> ScannerHandle {
        self.handle.clone()
    }

    async fn open_feed(&self) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
        match &self.input {
            Some(path) => {
                let file = tokio::fs::File::open(path).await.map_err(|e| {
                    ScanError::CameraUnavailable(format!(
                        "cannot open feed {}: {e}",
                        path.display()
                    ))
                })?;
                Ok(Box::new(file))
            }
            None => Ok(Box::new(tokio::io::stdin())),
        }
    }
}

#[async_trait::async_trait]
impl ScanSource for LineFeedSource {
    fn name(&self) -> &'static str {
        "line-feed"
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn start(&mut self, tx: mpsc::Sender<String>) -> Result<()> {
        if self.is_running() {
            return Err(ScanError::AlreadyRunning);
        }

        // Acquire the feed before flipping any state, so a failure here
        // leaves the source fully stopped.
        let feed = self.open_feed().await?;
        let mut lines = BufReader::new(feed).lines();

        self.handle.reset();
        self.running.store(true, Ordering::SeqCst);

        let handle = self.handle.clone();
        let running = Arc::clone(&self.running);
        let interval = self.frame_interval;

        debug!(source = self.name(), "Scan source started");
        let task = tokio::spawn(async move {
            loop {
                if handle.should_stop() {
                    break;
                }
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let text = line.trim();
                        if text.is_empty() {
                            // Frame without a code: steady state, keep going.
                        } else if tx.send(text.to_string()).await.is_err() {
                            break;
                        }
                        tokio::time::sleep(interval).await;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "Scan feed read failed, stopping");
                        break;
                    }
                }
            }
            running.store(false, Ordering::SeqCst);
        });

        self.task = Some(task);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.handle.stop();
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        self.running.store(false, Ordering::SeqCst);
        debug!(source = self.name(), "Scan source stopped");
        Ok(())
    }
}
