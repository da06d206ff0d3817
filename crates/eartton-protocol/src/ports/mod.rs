//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the two boundaries the protocol client talks
//! through.
//!
//! - **Driven Ports (Outbound)**: `MessageSender`, `GetMethodExecutor`
//! - No concrete implementations in this module

pub mod outbound;

pub use outbound::*;
