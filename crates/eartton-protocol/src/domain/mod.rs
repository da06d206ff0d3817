//! # Domain Layer (Inner Hexagon)
//!
//! Pure protocol logic: cells, their codecs, address derivation and the
//! operation registry.
//! NO I/O, NO async, NO shared mutable state.
//!
//! - Dependencies point INWARD only (contracts and adapters depend on this).
//! - Every encoder here is a pure function of its inputs.

pub mod boc;
pub mod builder;
pub mod cell;
pub mod entities;
pub mod operations;
pub mod reader;
pub mod services;
pub mod stack;
pub mod state;
pub mod value_objects;

pub use builder::*;
pub use cell::*;
pub use entities::*;
pub use operations::*;
pub use reader::*;
pub use services::*;
pub use stack::*;
pub use state::*;
pub use value_objects::*;
