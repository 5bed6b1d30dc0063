//! Domain layer of the portal assistant client.
//!
//! Pure types and transforms shared by the stream client, the lifecycle
//! controller and front ends. Nothing in here performs I/O.

pub mod error;
pub mod markdown;
pub mod reference;
pub mod session;

// Re-export common error type
pub use error::{AssistError, Result};
