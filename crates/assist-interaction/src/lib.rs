//! Transport layer of the portal assistant client.
//!
//! - `stream_client`: `StreamingRequestClient`, one cancellable SSE request per `open`
//! - `handler`: callback (`StreamHandler`), cancellation and opener seams
//! - `sse`: `text/event-stream` frame decoding
//! - `config`: endpoint settings loaded from `~/.config/portal-assist/config.toml`

pub mod config;
mod dispatch;
pub mod handler;
pub mod sse;
pub mod stream_client;

pub use config::ClientConfig;
pub use handler::{CancellationHandle, StreamHandler, StreamOpener};
pub use stream_client::StreamingRequestClient;
