//! # Scripted Get-Methods
//!
//! `GetMethodExecutor` answering from a table of canned outputs.

use crate::domain::stack::StackValue;
use crate::domain::value_objects::Address;
use crate::errors::TransportError;
use crate::ports::outbound::{GetMethodExecutor, GetMethodOutput};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

/// One recorded invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetMethodCall {
    /// Program address.
    pub address: Address,
    /// Method name.
    pub method: String,
    /// Arguments passed.
    pub args: Vec<StackValue>,
}

/// In-memory get-method executor for tests.
///
/// Unscripted `(address, method)` pairs are rejected.
#[derive(Debug, Default)]
pub struct ScriptedGetMethods {
    responses: RwLock<HashMap<(Address, String), GetMethodOutput>>,
    calls: Mutex<Vec<GetMethodCall>>,
}

impl ScriptedGetMethods {
    /// Empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `method` on `address` with a successful `stack`.
    pub fn respond(&self, address: Address, method: &str, stack: Vec<StackValue>) {
        self.set_output(address, method, GetMethodOutput::success(stack));
    }

    /// Answers `method` on `address` with a failing `exit_code`.
    pub fn fail(&self, address: Address, method: &str, exit_code: i32) {
        self.set_output(
            address,
            method,
            GetMethodOutput {
                exit_code,
                stack: Vec::new(),
            },
        );
    }

    /// Sets the raw output for `method` on `address`.
    pub fn set_output(&self, address: Address, method: &str, output: GetMethodOutput) {
        self.responses
            .write()
            .insert((address, method.to_string()), output);
    }

    /// Invocations so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<GetMethodCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl GetMethodExecutor for ScriptedGetMethods {
    async fn run_get_method(
        &self,
        address: Address,
        method: &str,
        args: Vec<StackValue>,
    ) -> Result<GetMethodOutput, TransportError> {
        self.calls.lock().push(GetMethodCall {
            address,
            method: method.to_string(),
            args,
        });
        self.responses
            .read()
            .get(&(address, method.to_string()))
            .cloned()
            .ok_or_else(|| TransportError::Rejected(format!("no program answers `{method}`")))
    }
}
