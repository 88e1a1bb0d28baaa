pub mod store;

pub use store::{FileStore, MemoryStore, ProgressStore, StorageError};
