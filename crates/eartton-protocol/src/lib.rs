//! # Eartton Protocol - Token Protocol Client
//!
//! Client-side protocol layer for the Eartton fungible token: constructs,
//! addresses, sends and queries operations against three deployed ledger
//! programs.
//!
//! ## Purpose
//!
//! Everything that crosses the wire is a tree of [`Cell`](domain::Cell)s.
//! This crate builds and reads those trees bit-exactly, derives program
//! addresses from code plus initial data, maps every request to its opcode
//! and layout, and wraps it all in typed contract proxies. Signing, network
//! transport and on-ledger execution stay behind the ports.
//!
//! ## Programs
//!
//! | Program | Proxy | Role |
//! |---------|-------|------|
//! | Issuer | `IssuerContract` | mint, pause, blacklist, token parameters |
//! | Account | `AccountContract` | per-holder balance: transfer, burn, stake, farming |
//! | StakingPool | `StakingPoolContract` | farming pool accounting |
//!
//! ## Cell Limits
//!
//! | Limit | Value | Enforcement |
//! |-------|-------|-------------|
//! | data bits per cell | 1023 | `CellBuilder` → `CapacityExceeded` |
//! | children per cell | 4 | `CellBuilder` → `TooManyChildren` |
//! | amount | `< 2^120` | `Amount::new` → `ValueOutOfRange` |
//! | record shape | exact | `CellReader::ensure_consumed` → `TrailingData` |
//!
//! ## Outbound Dependencies
//!
//! | Boundary | Trait | Purpose |
//! |----------|-------|---------|
//! | Send | `MessageSender` | sign and submit outbound messages |
//! | Query | `GetMethodExecutor` | run read-only get-methods |
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Cell / builder / reader | `domain/cell.rs`, `domain/builder.rs`, `domain/reader.rs` | bit-level codec |
//! | Bag of cells | `domain/boc.rs` | byte serialization of cell trees |
//! | Address deriver | `domain/services.rs` | state-init hash addressing |
//! | Operation registry | `domain/operations.rs` | opcodes and message layouts |
//! | State layouts | `domain/state.rs` | initial program data |
//! | Proxies | `contracts/` | typed sends and get methods |
//! | Query client | `query.rs` | get-method invocation |
//!
//! ## Usage Example
//!
//! ```ignore
//! use eartton_protocol::prelude::*;
//!
//! let config = IssuerConfig::new(owner, offchain_content(url)?, account_code);
//! let issuer = IssuerContract::create_from_config(&config, issuer_code, &ProtocolConfig::from_env()?)?;
//! issuer.send_deploy(&wallet).await?;
//! issuer.send_mint(&wallet, owner, Amount::from_whole_tokens(1000), 0).await?;
//!
//! let params = issuer.get_eartton_params(&client).await?;
//! assert_eq!(params.burn_rate, 100);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod contracts;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod query;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Cells
    pub use crate::domain::boc;
    pub use crate::domain::builder::CellBuilder;
    pub use crate::domain::cell::Cell;
    pub use crate::domain::reader::CellReader;

    // Value objects and entities
    pub use crate::domain::entities::{OutboundMessage, ProgramKind, SendMode, StateInit};
    pub use crate::domain::value_objects::{Address, Amount, Hash};

    // Domain services
    pub use crate::domain::services::{derive_address, offchain_content, parse_offchain_content};

    // Operations and state
    pub use crate::domain::operations::{opcodes, schema_for, Operation, REGISTRY};
    pub use crate::domain::stack::{QueryResult, StackValue};
    pub use crate::domain::state::{AccountState, IssuerState, PoolState};

    // Ports
    pub use crate::ports::outbound::{GetMethodExecutor, GetMethodOutput, MessageSender};

    // Contracts
    pub use crate::contracts::{
        AccountContract, ContractInstance, DeployPayload, EarttonParams, IssuerContract,
        PoolData, StakingData, StakingPoolContract, TransferRequest, UserData, WalletData,
    };
    pub use crate::query::QueryClient;

    // Config
    pub use crate::config::{ConfigError, IssuerConfig, ProtocolConfig};

    // Errors
    pub use crate::errors::{BocError, CodecError, ContractError, TransportError};

    // Adapters
    pub use crate::adapters::{RecordingSender, ScriptedGetMethods};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
