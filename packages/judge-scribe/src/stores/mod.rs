//! Credential store implementations.
//!
//! Available backends:
//! - `MemoryCredentialStore` - In-memory (tests, one-shot CLI runs)
//! - `JsonFileStore` - One JSON object on disk

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryCredentialStore;
