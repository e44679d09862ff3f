//! Dedicated background thread that runs filter jobs one at a time.
//!
//! Jobs go in over one channel; stage transitions and results come back over
//! another, tagged with the job's [`RunTicket`]. Ordering of jobs is preserved
//! and no two runs overlap.

use super::{FilterError, FilterPipeline, FilterStage, RunTicket, StickerImage};
use crate::crop::CroppedImage;
use crate::mask::SegmentationModel;
use log::{debug, error, info, warn};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

const THREAD_NAME: &str = "sticker-filter";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkerError {
    #[error("Failed to start filter worker: {0}")]
    Spawn(String),

    #[error("Filter worker has stopped")]
    Disconnected,
}

/// A crop queued for filtering.
#[derive(Debug, Clone)]
pub struct FilterJob {
    pub ticket: RunTicket,
    pub image: CroppedImage,
}

/// Progress reported back from the worker thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerMessage {
    Stage {
        ticket: RunTicket,
        stage: FilterStage,
    },
    Finished {
        ticket: RunTicket,
        result: Result<StickerImage, FilterError>,
    },
}

pub struct FilterWorker {
    job_tx: Option<mpsc::Sender<FilterJob>>,
    events: mpsc::Receiver<WorkerMessage>,
    handle: Option<JoinHandle<()>>,
}

impl FilterWorker {
    /// Start the worker thread, taking ownership of the pipeline.
    pub fn spawn<M>(pipeline: FilterPipeline<M>) -> Result<Self, WorkerError>
    where
        M: SegmentationModel + Send + 'static,
    {
        let (job_tx, job_rx) = mpsc::channel::<FilterJob>();
        let (event_tx, events) = mpsc::channel();

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run_jobs(pipeline, job_rx, event_tx))
            .map_err(|e| WorkerError::Spawn(e.to_string()))?;

        Ok(Self {
            job_tx: Some(job_tx),
            events,
            handle: Some(handle),
        })
    }

    /// Queue a job. It runs after every job submitted before it.
    pub fn submit(&self, job: FilterJob) -> Result<(), WorkerError> {
        let tx = self.job_tx.as_ref().ok_or(WorkerError::Disconnected)?;
        debug!("Queueing filter run {}", job.ticket.generation());
        tx.send(job).map_err(|_| WorkerError::Disconnected)
    }

    /// Collect every message available without blocking.
    pub fn drain(&self) -> Vec<WorkerMessage> {
        self.events.try_iter().collect()
    }

    /// Wait up to `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerMessage> {
        self.events.recv_timeout(timeout).ok()
    }
}

impl Drop for FilterWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the loop once the current job is done
        self.job_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Filter worker thread panicked");
            }
        }
    }
}

fn run_jobs<M: SegmentationModel>(
    pipeline: FilterPipeline<M>,
    jobs: mpsc::Receiver<FilterJob>,
    events: mpsc::Sender<WorkerMessage>,
) {
    while let Ok(FilterJob { ticket, image }) = jobs.recv() {
        info!(
            "Starting filter run {} on {}x{} crop",
            ticket.generation(),
            image.width(),
            image.height()
        );

        let result = pipeline.run(&image, |stage| {
            let _ = events.send(WorkerMessage::Stage { ticket, stage });
        });
        match &result {
            Ok(_) => info!("Filter run {} finished", ticket.generation()),
            Err(err) => warn!("Filter run {} failed: {err}", ticket.generation()),
        }

        if events.send(WorkerMessage::Finished { ticket, result }).is_err() {
            debug!("Filter results receiver dropped, stopping worker");
            break;
        }
    }
}
