//! Runs one conversion at a time on a worker thread.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::encoder::{Encoder, FfmpegEncoder};
use crate::error::ConvertError;
use crate::worker::{self, ConversionOutcome, ConversionRequest};
use crate::ConverterConfig;

/// Whether a conversion is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
}

/// Identifies one accepted `start` call.
pub type JobId = u64;

/// Events from the worker thread, tagged with the job they belong to.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionEvent {
    /// Worker picked up the request
    Started(JobId, ConversionRequest),
    /// Percent complete, 0.0 - 100.0
    Progress(JobId, f64),
    /// Terminal event; the converter is idle again when this arrives
    Finished(JobId, ConversionOutcome),
}

impl ConversionEvent {
    pub fn job(&self) -> JobId {
        match self {
            ConversionEvent::Started(id, _)
            | ConversionEvent::Progress(id, _)
            | ConversionEvent::Finished(id, _) => *id,
        }
    }
}

type Notify = Arc<dyn Fn() + Send + Sync>;

/// Single-flight conversion runner.
///
/// `start` never blocks; results come back through `poll_events` or
/// `recv_timeout`.
pub struct BackgroundConverter {
    encoder: Arc<dyn Encoder>,
    temp_dir: PathBuf,
    running: Arc<AtomicBool>,
    next_job: AtomicU64,
    event_tx: Sender<ConversionEvent>,
    event_rx: Receiver<ConversionEvent>,
    notify: Option<Notify>,
}

impl BackgroundConverter {
    pub fn new(encoder: Arc<dyn Encoder>, temp_dir: impl AsRef<Path>) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            encoder,
            temp_dir: temp_dir.as_ref().to_path_buf(),
            running: Arc::new(AtomicBool::new(false)),
            next_job: AtomicU64::new(1),
            event_tx,
            event_rx,
            notify: None,
        }
    }

    /// Converter backed by FFmpeg.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(
            Arc::new(FfmpegEncoder::new(config.clone())),
            &config.temp_dir,
        )
    }

    /// Call `notify` after every event is sent, e.g. to wake a UI loop.
    pub fn with_notify(mut self, notify: impl Fn() + Send + Sync + 'static) -> Self {
        self.notify = Some(Arc::new(notify));
        self
    }

    pub fn state(&self) -> WorkerState {
        if self.running.load(Ordering::SeqCst) {
            WorkerState::Running
        } else {
            WorkerState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == WorkerState::Running
    }

    /// Start converting `request` in the background.
    ///
    /// Returns the id carried by this job's events. Fails with
    /// `AlreadyRunning` while another conversion is in flight; that
    /// conversion is left untouched.
    pub fn start(&self, request: ConversionRequest) -> Result<JobId, ConvertError> {
        if !request.has_input() {
            return Err(ConvertError::MissingInput);
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("Rejected {:?}: a conversion is already running", request.input);
            return Err(ConvertError::AlreadyRunning);
        }

        let job = self.next_job.fetch_add(1, Ordering::SeqCst);
        log::info!(
            "Starting job {} converting {:?} to {} ({:?})",
            job,
            request.input,
            request.format,
            request.output
        );

        let encoder = Arc::clone(&self.encoder);
        let temp_dir = self.temp_dir.clone();
        let running = Arc::clone(&self.running);
        let events = EventSink {
            tx: self.event_tx.clone(),
            notify: self.notify.clone(),
        };

        let spawned = thread::Builder::new()
            .name("vidconv-worker".to_string())
            .spawn(move || {
                events.send(ConversionEvent::Started(job, request.clone()));

                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    worker::convert(encoder.as_ref(), &request, &temp_dir, &mut |percent| {
                        events.send(ConversionEvent::Progress(job, percent))
                    })
                }))
                .unwrap_or_else(|_| {
                    log::error!("Conversion worker panicked");
                    ConversionOutcome::Failure("Conversion worker panicked".to_string())
                });

                running.store(false, Ordering::SeqCst);
                events.send(ConversionEvent::Finished(job, outcome));
            });

        if let Err(e) = spawned {
            self.running.store(false, Ordering::SeqCst);
            return Err(ConvertError::Encode(format!(
                "Failed to start conversion worker: {e}"
            )));
        }
        Ok(job)
    }

    /// Drain pending events without blocking.
    pub fn poll_events(&self) -> Vec<ConversionEvent> {
        self.event_rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ConversionEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

struct EventSink {
    tx: Sender<ConversionEvent>,
    notify: Option<Notify>,
}

impl EventSink {
    fn send(&self, event: ConversionEvent) {
        // The receiver lives in the converter; a send only fails after it is dropped
        let _ = self.tx.send(event);
        if let Some(notify) = &self.notify {
            notify();
        }
    }
}
