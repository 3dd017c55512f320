//! Alfred Dispatch: request routing for Alfred workflows driven by repeated,
//! stateless process invocations.
//!
//! A workflow registers commands (filters that list items, actions that do
//! something), then hands each invocation's arguments to
//! [`Workflow::dispatch`]. Continuation state travels between invocations in
//! an [`Envelope`].

pub mod catalog;
pub mod config;
pub mod host;
pub mod utils;
pub mod workflow;

pub use config::WorkflowContext;
pub use workflow::{
    Action, Command, CommandDef, Envelope, Filter, Item, ItemMod, ModKey, Mode, Outcome,
    Registry, Request, Workflow,
};
