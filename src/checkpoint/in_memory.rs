use crate::checkpoint::{Checkpoint, LogPosition};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// In-memory checkpoint. The flushed/non-flushed split is theoretically modeled so the
/// rest of the system exercises the same contract a disk-backed checkpoint would have.
///
/// Clones share state, so tests and observers can hold a handle while the tracker owns
/// the writing side.
#[derive(Clone)]
pub struct InMemoryCheckpoint {
    non_flushed: Arc<AtomicU64>,
    flushed: Arc<AtomicU64>,
}

impl InMemoryCheckpoint {
    pub fn new() -> Self {
        InMemoryCheckpoint {
            non_flushed: Arc::new(AtomicU64::new(0)),
            flushed: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Checkpoint for InMemoryCheckpoint {
    fn read(&self) -> LogPosition {
        LogPosition::new(self.flushed.load(Ordering::SeqCst))
    }

    fn read_non_flushed(&self) -> LogPosition {
        LogPosition::new(self.non_flushed.load(Ordering::SeqCst))
    }

    fn write(&mut self, position: LogPosition) {
        let previous = self.non_flushed.swap(position.as_u64(), Ordering::SeqCst);

        // Panic here, because a backwards write means the caller's monotonicity tracking
        // is broken.
        assert!(
            position.as_u64() >= previous,
            "Checkpoint can only ratchet forward. Current={:?}, New={:?}",
            previous,
            position
        );
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        self.flushed
            .store(self.non_flushed.load(Ordering::SeqCst), Ordering::SeqCst);
        Ok(())
    }
}
