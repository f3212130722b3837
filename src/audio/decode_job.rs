//! Background decoding so large files never block the control thread.

use std::{
    path::PathBuf,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
    thread,
    time::{Duration, Instant},
};

use tracing::{info, warn};

use super::codec::DecodeError;
use crate::editor::SampleBuffer;

const WORKER_THREAD_NAME: &str = "epoch123-decode";

struct DecodeJob {
    request_id: u64,
    path: PathBuf,
}

/// Outcome of one queued decode.
#[derive(Debug)]
pub struct DecodeResult {
    pub request_id: u64,
    pub path: PathBuf,
    pub result: Result<SampleBuffer, DecodeError>,
    pub elapsed: Duration,
}

/// Handle to the decode thread. Dropping it ends the thread once queued jobs finish.
pub struct DecodeWorker {
    job_tx: Sender<DecodeJob>,
    result_rx: Receiver<DecodeResult>,
    next_request_id: u64,
}

impl DecodeWorker {
    /// Start the named worker thread.
    pub fn spawn() -> Result<Self, DecodeError> {
        let (job_tx, job_rx) = mpsc::channel::<DecodeJob>();
        let (result_tx, result_rx) = mpsc::channel::<DecodeResult>();
        thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    let started = Instant::now();
                    let result = SampleBuffer::load(&job.path);
                    let elapsed = started.elapsed();
                    match &result {
                        Ok(buffer) => info!(
                            "Decoded {} ({} samples) in {} ms",
                            job.path.display(),
                            buffer.len(),
                            elapsed.as_millis()
                        ),
                        Err(err) => warn!("Failed to decode {}: {err}", job.path.display()),
                    }
                    let sent = result_tx.send(DecodeResult {
                        request_id: job.request_id,
                        path: job.path,
                        result,
                        elapsed,
                    });
                    if sent.is_err() {
                        break;
                    }
                }
            })
            .map_err(|source| DecodeError::SpawnWorker { source })?;
        Ok(Self {
            job_tx,
            result_rx,
            next_request_id: 0,
        })
    }

    /// Queue `path` for decoding and return its request id.
    pub fn request(&mut self, path: impl Into<PathBuf>) -> Result<u64, DecodeError> {
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.job_tx
            .send(DecodeJob {
                request_id,
                path: path.into(),
            })
            .map_err(|_| DecodeError::WorkerGone)?;
        Ok(request_id)
    }

    /// Latest request id handed out, if any.
    pub fn latest_request(&self) -> Option<u64> {
        (self.next_request_id > 0).then_some(self.next_request_id)
    }

    /// Non-blocking poll for a finished decode.
    pub fn try_recv(&self) -> Result<Option<DecodeResult>, DecodeError> {
        match self.result_rx.try_recv() {
            Ok(result) => Ok(Some(result)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(DecodeError::WorkerGone),
        }
    }

    /// Block up to `timeout` for a finished decode.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<DecodeResult>, DecodeError> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => Ok(Some(result)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(DecodeError::WorkerGone),
        }
    }
}
