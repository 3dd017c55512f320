//! Ordered, read-only set of registered commands.
//!
//! Registration order is part of the dispatch contract: menu items and
//! exact-keyword lookups both walk commands in the order they were added.

use std::collections::HashSet;

use crate::log_debug;

use super::command::{Action, Command, Filter};
use super::error::RegistryError;

pub struct Registry {
    commands: Vec<Box<dyn Command>>,
}

impl Registry {
    /// Build a registry, validating keyword uniqueness and capabilities.
    pub fn new(commands: Vec<Box<dyn Command>>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for c in &commands {
            let def = c.about();
            if def.keyword.is_empty() {
                return Err(RegistryError::EmptyKeyword);
            }
            if def.keyword.contains(' ') {
                return Err(RegistryError::KeywordWithSpace(def.keyword));
            }
            if c.as_filter().is_none() && c.as_action().is_none() {
                return Err(RegistryError::NoCapability(def.keyword));
            }
            if !seen.insert(def.keyword.clone()) {
                return Err(RegistryError::DuplicateKeyword(def.keyword));
            }
        }
        Ok(Self { commands })
    }

    pub fn empty() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.iter().map(|c| c.as_ref())
    }

    /// Enabled commands in registration order; disabled ones are logged.
    pub fn enabled(&self) -> impl Iterator<Item = &dyn Command> {
        self.iter().filter(|c| {
            let def = c.about();
            if !def.enabled {
                log_debug!("Skipping disabled command '{}'", def.keyword);
            }
            def.enabled
        })
    }

    /// First enabled filter whose keyword equals `keyword`.
    pub fn filter(&self, keyword: &str) -> Option<&dyn Filter> {
        self.enabled()
            .filter(|c| c.about().keyword == keyword)
            .find_map(|c| c.as_filter())
    }

    /// First enabled action whose keyword equals `keyword`.
    pub fn action(&self, keyword: &str) -> Option<&dyn Action> {
        self.enabled()
            .filter(|c| c.about().keyword == keyword)
            .find_map(|c| c.as_action())
    }
}
