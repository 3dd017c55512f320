/*!
command.rs - command descriptors and capabilities.

A command is anything implementing `Command`. It advertises its capabilities
by overriding `as_filter` / `as_action`:

  - Filter: produces an ordered list of items for (argument, data)
  - Action: performs a side effect for (argument, data) and returns status text

A command may be both. The registry rejects commands that are neither.
*/

use anyhow::Result;
use std::collections::BTreeMap;

use super::envelope::{Envelope, ModKey};
use super::items::{Item, ItemMod};

/// Static descriptor of a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandDef {
    /// Unique, space-free keyword.
    pub keyword: String,
    pub description: String,
    pub enabled: bool,
    /// Fixed argument used for the command's menu item. Commands without a
    /// Filter capability only appear in the menu when this is set.
    pub arg: Option<Envelope>,
    pub mods: BTreeMap<ModKey, ItemMod>,
}

impl CommandDef {
    /// Enabled descriptor with no fixed argument and no modifiers.
    pub fn new(keyword: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            description: description.into(),
            enabled: true,
            arg: None,
            mods: BTreeMap::new(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_arg(mut self, arg: Envelope) -> Self {
        self.arg = Some(arg);
        self
    }

    pub fn with_mod(mut self, key: ModKey, m: ItemMod) -> Self {
        self.mods.insert(key, m);
        self
    }

    /// Menu item synthesized from the descriptor.
    pub fn keyword_item(&self) -> Item {
        let arg = self
            .arg
            .clone()
            .unwrap_or_else(|| Envelope::for_keyword(&self.keyword));
        let mut item = Item::new(&self.keyword)
            .subtitle(&self.description)
            .autocomplete(&self.keyword)
            .arg(arg);
        for (key, m) in &self.mods {
            item.add_mod(key.clone(), m.clone());
        }
        item
    }
}

/// A registrant. Capability accessors default to "not supported".
pub trait Command {
    fn about(&self) -> CommandDef;

    fn as_filter(&self) -> Option<&dyn Filter> {
        None
    }

    fn as_action(&self) -> Option<&dyn Action> {
        None
    }
}

/// A command that lists items.
pub trait Filter: Command {
    fn items(&self, arg: &str, data: &str) -> Result<Vec<Item>>;
}

/// A command that does something.
pub trait Action: Command {
    fn run(&self, arg: &str, data: &str) -> Result<String>;
}
