//! Domain Layer
//!
//! Request types and their rules, free of I/O.
//!
//! ## Structure
//!
//! - `manifest` - Manifest matching, component names, decoded groups
//! - `cluster` - Cluster request (network, version, masters role)
//! - `pipeline` - Stages, actions, build projects, structural validation
//! - `buildspec` - Build command phases
//! - `stack` - Named, environment-bound envelope around a request
//! - `ports` - Traits implemented by the infrastructure layer

pub mod buildspec;
pub mod cluster;
pub mod manifest;
pub mod pipeline;
pub mod ports;
pub mod stack;
