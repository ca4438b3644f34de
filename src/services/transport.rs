//! Per-file transfer steps driving upload progress.

use crate::{models::upload::SelectedFile, services::clock::Clock};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use thiserror::Error;

/// Progress advances in fixed increments of this size, from 0 to 100.
pub const PROGRESS_STEP: u8 = 20;

/// The progress values reported for every file: 0, 20, 40, 60, 80, 100.
pub fn progress_steps() -> impl Iterator<Item = u8> {
    (0..=100u8).step_by(PROGRESS_STEP as usize)
}

#[derive(Debug, Error)]
#[error("transfer of `{file_name}` failed at {progress}%: {reason}")]
pub struct TransferError {
    pub file_name: String,
    pub progress: u8,
    pub reason: String,
}

/// Moves one file through its transfer, one progress step at a time.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Complete the step that brings `file` to `progress` percent.
    async fn transfer_step(&self, file: &SelectedFile, progress: u8) -> Result<(), TransferError>;
}

/// Stand-in for network latency: every step simply waits on the clock.
pub struct SimulatedTransport {
    clock: Arc<dyn Clock>,
    step_delay: Duration,
}

impl SimulatedTransport {
    pub fn new(clock: Arc<dyn Clock>, step_delay: Duration) -> Self {
        Self { clock, step_delay }
    }
}

#[async_trait]
impl UploadTransport for SimulatedTransport {
    async fn transfer_step(&self, _file: &SelectedFile, _progress: u8) -> Result<(), TransferError> {
        self.clock.sleep(self.step_delay).await;
        Ok(())
    }
}
