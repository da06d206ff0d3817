//! # Query Client
//!
//! Invokes named read-only get-methods through a [`GetMethodExecutor`] and
//! hands back a positional [`QueryResult`].
//!
//! A non-success exit code means "no successful result" and surfaces as
//! [`ContractError::GetMethodFailed`]. There are no retries.

use crate::domain::stack::{QueryResult, StackValue};
use crate::domain::value_objects::Address;
use crate::errors::ContractError;
use crate::ports::outbound::GetMethodExecutor;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Cloneable handle over a get-method executor.
#[derive(Clone)]
pub struct QueryClient {
    executor: Arc<dyn GetMethodExecutor>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient").finish_non_exhaustive()
    }
}

impl QueryClient {
    /// Wraps `executor`.
    pub fn new(executor: Arc<dyn GetMethodExecutor>) -> Self {
        Self { executor }
    }

    /// Runs `method` on the program at `address`.
    ///
    /// # Errors
    ///
    /// `Transport` if the executor fails, `GetMethodFailed` on a non-success
    /// exit code.
    #[instrument(skip(self, args), fields(address = %address))]
    pub async fn invoke(
        &self,
        address: Address,
        method: &str,
        args: Vec<StackValue>,
    ) -> Result<QueryResult, ContractError> {
        let output = self.executor.run_get_method(address, method, args).await?;
        if !output.is_success() {
            warn!(exit_code = output.exit_code, "Get-method failed");
            return Err(ContractError::GetMethodFailed {
                method: method.to_string(),
                exit_code: output.exit_code,
            });
        }
        debug!(values = output.stack.len(), "Get-method returned");
        Ok(QueryResult::new(output.stack))
    }
}
