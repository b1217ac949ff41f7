pub mod file_store;
pub mod memory_store;
pub mod types;

pub use self::file_store::FileStore;
pub use self::memory_store::MemoryStore;
pub use self::types::SnapshotStore;
