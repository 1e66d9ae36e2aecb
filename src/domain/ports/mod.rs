//! Domain Ports (Interfaces)
//!
//! Infrastructure provides the concrete implementations.

pub mod manifest_source;

#[cfg(test)]
pub use manifest_source::MemoryManifestSource;
pub use manifest_source::ManifestSource;
