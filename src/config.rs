/*!
config.rs - explicit workflow context.

The host describes the running workflow through environment variables. They
are read once at startup into a `WorkflowContext`, which is then passed to
whatever needs it; nothing else in the crate reads the environment.

Variables:
  alfred_workflow_bundleid     bundle id (loopback target, keychain account)
  alfred_workflow_name         dialog title
  alfred_workflow_cache        cache directory
  alfred_workflow_data         data directory
  alfred_short_version         host version ("4", "5") -> app name
  alfred_debug                 "1" when the host debugger is open
  ALFRED_DISPATCH_TRIGGER      loopback trigger name (default "start")
  ALFRED_DISPATCH_OSASCRIPT    script runner command line (default "osascript")
  ALFRED_DISPATCH_TIMEOUT_SECS script timeout in seconds (default 30)
  ALFRED_DISPATCH_CATALOG      command catalog path (default <data>/commands.yaml)
*/

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::log_info;

pub const DEFAULT_TRIGGER: &str = "start";
pub const DEFAULT_SCRIPT_RUNNER: &str = "osascript";
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CATALOG_FILE: &str = "commands.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowContext {
    pub bundle_id: String,
    pub name: String,
    pub cache_dir: PathBuf,
    pub data_dir: PathBuf,
    pub short_version: String,
    pub debug: bool,
    pub trigger: String,
    pub script_runner: String,
    pub script_timeout: Duration,
    pub catalog: Option<PathBuf>,
}

impl Default for WorkflowContext {
    fn default() -> Self {
        Self {
            bundle_id: String::new(),
            name: String::new(),
            cache_dir: PathBuf::new(),
            data_dir: PathBuf::new(),
            short_version: String::new(),
            debug: false,
            trigger: DEFAULT_TRIGGER.to_string(),
            script_runner: DEFAULT_SCRIPT_RUNNER.to_string(),
            script_timeout: DEFAULT_SCRIPT_TIMEOUT,
            catalog: None,
        }
    }
}

impl WorkflowContext {
    /// Read the context from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the context through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let script_timeout = match get("ALFRED_DISPATCH_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    log_info!("Ignoring invalid ALFRED_DISPATCH_TIMEOUT_SECS '{raw}'");
                    defaults.script_timeout
                }
            },
            None => defaults.script_timeout,
        };

        Self {
            bundle_id: get("alfred_workflow_bundleid").unwrap_or_default(),
            name: get("alfred_workflow_name").unwrap_or_default(),
            cache_dir: get("alfred_workflow_cache").map(PathBuf::from).unwrap_or_default(),
            data_dir: get("alfred_workflow_data").map(PathBuf::from).unwrap_or_default(),
            short_version: get("alfred_short_version").unwrap_or_default(),
            debug: get("alfred_debug").is_some_and(|v| v.trim() == "1"),
            trigger: get("ALFRED_DISPATCH_TRIGGER").unwrap_or(defaults.trigger),
            script_runner: get("ALFRED_DISPATCH_OSASCRIPT").unwrap_or(defaults.script_runner),
            script_timeout,
            catalog: get("ALFRED_DISPATCH_CATALOG").map(PathBuf::from),
        }
    }

    /// Host application name used in scripts ("Alfred 5", or "Alfred").
    pub fn app_name(&self) -> String {
        if self.short_version.is_empty() {
            "Alfred".to_string()
        } else {
            format!("Alfred {}", self.short_version)
        }
    }

    /// Catalog location: explicit path, else `<data dir>/commands.yaml`.
    /// `None` when neither is known.
    pub fn catalog_path(&self) -> Option<PathBuf> {
        if let Some(p) = &self.catalog {
            return Some(p.clone());
        }
        if self.data_dir.as_os_str().is_empty() {
            return None;
        }
        Some(self.data_dir.join(DEFAULT_CATALOG_FILE))
    }

    /// Create the cache and data directories if they are set.
    pub fn create_dirs(&self) -> Result<()> {
        for dir in [&self.cache_dir, &self.data_dir] {
            if dir.as_os_str().is_empty() {
                continue;
            }
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }
}
