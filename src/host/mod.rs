//! Host-side collaborators: script execution, dialogs, secrets.
//!
//! Everything here shells out (osascript, security) and is kept behind
//! traits (`ScriptRunner`, `CredentialStore`) so dispatch can be exercised
//! without a host present.

pub mod dialog;
pub mod keychain;
pub mod process;
pub mod script;

pub use dialog::{Dialog, Dialogs, parse_dialog_response};
pub use keychain::{CredentialStore, Keychain};
pub use process::ScriptError;
pub use script::{OsaScriptRunner, Script, ScriptRunner, applescript_quote};
