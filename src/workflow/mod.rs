/*!
Dispatch core.

Layout:
  envelope.rs   Envelope / Mode / ModKey / LoopbackBlock (continuation codec)
  request.rs    argv -> Request (arg, envelope, final-stage flag)
  command.rs    CommandDef + Command / Filter / Action capabilities
  registry.rs   ordered, validated command set
  keyword.rs    keyword / remainder / autocomplete prefix resolution
  fuzzy.rs      Matcher oracle (predicate + ranker)
  items.rs      Item + response payload rendering
  dispatch.rs   Workflow + the tell / do / final-stage state machine
  error.rs      CodecError / DispatchError / RegistryError

Conventions:
  - Nothing here reads the environment; context arrives via `WorkflowContext`.
  - Nothing here writes to stdout directly; `Workflow::dispatch` takes a writer.
*/

pub mod command;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod fuzzy;
pub mod items;
pub mod keyword;
pub mod registry;
pub mod request;

pub use command::{Action, Command, CommandDef, Filter};
pub use dispatch::{Outcome, Workflow};
pub use envelope::{Envelope, LoopbackBlock, ModKey, Mode};
pub use error::{CodecError, DispatchError, RegistryError};
pub use fuzzy::{FuzzyMatcher, Matcher};
pub use items::{Item, ItemMod};
pub use keyword::{Resolution, resolve, split_command};
pub use registry::Registry;
pub use request::{Request, normalize_flags, parse_invocation};
