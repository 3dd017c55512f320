//! Workflow-scoped secrets stored in the macOS Keychain.
//!
//! Secrets are generic passwords with account = bundle id and service = the
//! secret's name, managed through the `security` tool.

use std::time::Duration;

use super::process::{ScriptError, run_command};
use crate::log_error;

/// Key/value secret storage.
pub trait CredentialStore {
    fn get(&self, name: &str) -> Result<String, ScriptError>;
    fn set(&self, name: &str, secret: &str) -> Result<(), ScriptError>;
}

#[derive(Debug, Clone)]
pub struct Keychain {
    program: String,
    account: String,
    timeout: Duration,
}

impl Keychain {
    pub fn new(account: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: "security".to_string(),
            account: account.into(),
            timeout,
        }
    }

    /// Use a different `security`-compatible binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn find_args(&self, name: &str) -> Vec<String> {
        ["find-generic-password", "-w", "-a", self.account.as_str(), "-s", name]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn add_args(&self, name: &str, secret: &str) -> Vec<String> {
        [
            "add-generic-password",
            "-a",
            self.account.as_str(),
            "-s",
            name,
            "-w",
            secret,
            "-U",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

impl CredentialStore for Keychain {
    fn get(&self, name: &str) -> Result<String, ScriptError> {
        run_command(&self.program, &self.find_args(name), self.timeout).inspect_err(|e| {
            log_error!("Error getting password '{name}': {e}");
        })
    }

    fn set(&self, name: &str, secret: &str) -> Result<(), ScriptError> {
        run_command(&self.program, &self.add_args(name, secret), self.timeout)
            .map(|_| ())
            .inspect_err(|_| log_error!("Error adding password '{name}'"))
    }
}
