//! # Adapters Layer (Outer Hexagon)
//!
//! In-memory implementations of the outbound ports. Tests use them to
//! observe what the proxies send and to script get-method answers; embedders
//! can use [`RecordingSender`] for dry runs.

pub mod recording_sender;
pub mod scripted_get_methods;

pub use recording_sender::*;
pub use scripted_get_methods::*;
