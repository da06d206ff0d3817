//! # Eartton Test Suite
//!
//! Unified test crate for the protocol client.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── ledger_sim.rs     # In-process ledger answering sends and get-methods
//! └── integration/      # End-to-end flows and wire goldens
//!     ├── issuer_flows.rs
//!     ├── holder_flows.rs
//!     └── wire_format.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p eartton-tests
//!
//! # By category
//! cargo test -p eartton-tests integration::
//!
//! # Benchmarks
//! cargo bench -p eartton-tests
//! ```

pub mod ledger_sim;

/// Installs a test-writer tracing subscriber once; `RUST_LOG` filters it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
