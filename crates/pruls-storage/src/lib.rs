//! Pruls Storage Library
//!
//! Remote object storage behind two narrow traits: [`ObjectStorage`] hands out
//! a write sink and a read stream for a named object, [`ObjectSink`] accepts
//! bytes and must be finished before the object becomes readable.
//!
//! The only implementation, [`ObjectStoreStorage`], sits on top of the
//! `object_store` crate and covers Google Cloud Storage, Amazon S3 (and
//! S3-compatible providers), a local directory and an in-memory store.

pub mod credentials;
pub mod factory;
pub mod object;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use object::ObjectStoreStorage;
pub use pruls_core::StorageBackend;
pub use traits::{ByteStream, ObjectSink, ObjectStorage, StorageError, StorageResult};
