//! bibliomed-common — Shared error type and HTTP plumbing used across all Bibliomed crates.

pub mod error;
pub mod sandbox;

pub use error::{BibliomedError, Result};
pub use sandbox::SandboxClient;
