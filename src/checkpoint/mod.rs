mod api;
mod in_memory;

pub use api::Checkpoint;
pub use api::LogPosition;
pub use in_memory::InMemoryCheckpoint;
