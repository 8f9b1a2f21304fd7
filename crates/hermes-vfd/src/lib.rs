//! Paged address-translation and I/O engine for a buffer-store-backed
//! file driver: converts arbitrary byte-range reads/writes into
//! whole-page blob operations against a [`buffer_store::BufferStore`],
//! with optional POSIX backing-file persistence.

mod backing;
mod codec;
mod config;
mod engine;
mod error;
mod file;
mod presence;
mod registration;

pub use backing::{BackingFile, HostOpenFlags};
pub use codec::{blob_name, page_index, BLOB_NAME_FIELD_WIDTH};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use file::{FileObject, LastOp, MAXADDR};
pub use presence::PresenceSet;
pub use registration::{current, register, terminate, DriverId, FilePropertyList};
