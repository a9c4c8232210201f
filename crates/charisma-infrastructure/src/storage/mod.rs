//! Key-value store implementations and the versioned document helper.

mod file_store;
mod memory_store;
mod versioned_document;

pub use file_store::FileKeyValueStore;
pub use memory_store::InMemoryKeyValueStore;
pub use versioned_document::VersionedDocument;
