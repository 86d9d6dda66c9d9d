//! Shared transcript handle.
//!
//! A stream session merges into the transcript while the caller may take
//! snapshots (for display or a mid-response save). The lock is held for a
//! single merge or copy and never across an I/O wait.

use chatline_domain::Transcript;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Clone-cheap handle to one conversation's transcript
#[derive(Debug, Clone, Default)]
pub struct SharedTranscript {
    inner: Arc<Mutex<Transcript>>,
}

impl SharedTranscript {
    pub fn new(transcript: Transcript) -> Self {
        Self {
            inner: Arc::new(Mutex::new(transcript)),
        }
    }

    /// Lock for a short, non-suspending mutation or inspection.
    pub async fn lock(&self) -> MutexGuard<'_, Transcript> {
        self.inner.lock().await
    }

    /// Copy of the transcript as it is right now, partial turn included.
    pub async fn snapshot(&self) -> Transcript {
        self.inner.lock().await.clone()
    }

    /// Swap in another conversation, returning the previous one.
    pub async fn replace(&self, transcript: Transcript) -> Transcript {
        std::mem::replace(&mut *self.inner.lock().await, transcript)
    }
}
