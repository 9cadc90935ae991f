use std::{fmt, io};

/// LogPosition is a byte offset into the event log. Position 0 means nothing has been
/// written yet.
#[derive(Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash)]
pub struct LogPosition(u64);

impl LogPosition {
    pub fn new(position: u64) -> Self {
        LogPosition(position)
    }

    pub fn zero() -> Self {
        LogPosition(0)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for LogPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Checkpoint is a durable, monotonic marker of log progress. The storage engine is the
/// durability authority; this trait only exposes its read/write contract.
///
/// `write()` advances the in-memory (non-flushed) value. The value is not guaranteed to
/// survive a crash until `flush()` returns Ok.
pub trait Checkpoint {
    /// Read the last flushed position, i.e. the value guaranteed to survive a crash.
    fn read(&self) -> LogPosition;

    /// Read the last written position, which may not have been flushed yet.
    fn read_non_flushed(&self) -> LogPosition;

    /// Advance the checkpoint to `position`. Callers must follow up with `flush()` to
    /// make the new value durable.
    fn write(&mut self, position: LogPosition);

    /// Make the last written value durable.
    fn flush(&mut self) -> Result<(), io::Error>;
}
