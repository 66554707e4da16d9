//! Storage location resolution and persistence
//!
//! One resolver instance owns the process-wide "where do recordings live"
//! value and hands it to the recorder and catalog as an explicit argument.

mod resolver;

pub use resolver::{Resolution, StorageLocation, StorageLocationResolver};
