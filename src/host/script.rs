/*!
script.rs - host automation scripts.

`Script` values can only be produced by the builders in this module, and every
value interpolated into a script goes through `applescript_quote`. Scripts
cross a process boundary as source text, so an unescaped quote in a query or
bundle id would change what the host executes.

Runner command line (default "osascript") is split with shell-style rules and
the script is appended as `-e <script>`, e.g.:

  osascript -e 'tell application "System Events" to key code 53'
*/

use shell_words::split as shell_split;
use std::fmt;
use std::time::Duration;

use super::process::{ScriptError, run_command};
use crate::log_trace;

/* ---- Quoting ---- */

/// Render `value` as an AppleScript string literal, quotes included.
pub fn applescript_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/* ---- Script ---- */

/// A complete, safely assembled automation script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script(String);

impl Script {
    /// Fire an external trigger in a workflow.
    pub fn run_trigger(app: &str, trigger: &str, bundle_id: &str, argument: &str) -> Self {
        Script(format!(
            "tell application {} to run trigger {} in workflow {} with argument {}",
            applescript_quote(app),
            applescript_quote(trigger),
            applescript_quote(bundle_id),
            applescript_quote(argument),
        ))
    }

    /// Press a key via System Events.
    pub fn key_code(code: u16) -> Self {
        Script(format!(
            "tell application \"System Events\" to key code {code}"
        ))
    }

    /// Open a URL with the default handler.
    pub fn open_location(url: &url::Url) -> Self {
        Script(format!("open location {}", applescript_quote(url.as_str())))
    }

    /// Script body from already-escaped lines. Crate-internal so that only
    /// builders which quote their inputs can reach it.
    pub(crate) fn from_lines(lines: Vec<String>) -> Self {
        Script(lines.join("\n"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/* ---- Runner ---- */

/// Key code of Escape; dismisses the launcher window.
pub const ESCAPE_KEY_CODE: u16 = 53;

/// Executes scripts synchronously.
pub trait ScriptRunner {
    fn run(&self, script: &Script) -> Result<String, ScriptError>;

    /// Close the host's active window.
    fn dismiss_window(&self) -> Result<(), ScriptError> {
        self.run(&Script::key_code(ESCAPE_KEY_CODE)).map(|_| ())
    }
}

/// Runs scripts through `osascript` (or a configured replacement).
#[derive(Debug, Clone)]
pub struct OsaScriptRunner {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Default for OsaScriptRunner {
    /// Plain `osascript` with the default timeout.
    fn default() -> Self {
        Self {
            program: crate::config::DEFAULT_SCRIPT_RUNNER.to_string(),
            args: Vec::new(),
            timeout: crate::config::DEFAULT_SCRIPT_TIMEOUT,
        }
    }
}

impl OsaScriptRunner {
    /// Build from a command line such as `"osascript"` or
    /// `"/usr/bin/osascript -l AppleScript"`.
    pub fn from_command_line(raw: &str, timeout: Duration) -> Result<Self, ScriptError> {
        let parts =
            shell_split(raw.trim()).map_err(|e| ScriptError::InvalidCommand(e.to_string()))?;
        let Some((program, args)) = parts.split_first() else {
            return Err(ScriptError::InvalidCommand(
                "runner command line is empty".to_string(),
            ));
        };
        if program.is_empty() {
            return Err(ScriptError::InvalidCommand(
                "empty program name".to_string(),
            ));
        }
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full argument vector for `script`.
    fn argv(&self, script: &Script) -> Vec<String> {
        let mut argv = self.args.clone();
        argv.push("-e".to_string());
        argv.push(script.as_str().to_string());
        argv
    }
}

impl ScriptRunner for OsaScriptRunner {
    fn run(&self, script: &Script) -> Result<String, ScriptError> {
        log_trace!("running script: {script}");
        run_command(&self.program, &self.argv(script), self.timeout)
    }
}

/* ---- Tests ---- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_escapes_breakout_characters() {
        assert_eq!(applescript_quote("plain"), "\"plain\"");
        assert_eq!(
            applescript_quote("a\"b\\c\nd"),
            "\"a\\\"b\\\\c\\nd\""
        );
    }

    #[test]
    fn trigger_script_quotes_every_value() {
        let script = Script::run_trigger("Alfred 4", "start", "com.x\"y", r#"{"a":"b"}"#);
        assert_eq!(
            script.as_str(),
            r#"tell application "Alfred 4" to run trigger "start" in workflow "com.x\"y" with argument "{\"a\":\"b\"}""#
        );
    }

    #[test]
    fn key_code_script() {
        assert_eq!(
            Script::key_code(ESCAPE_KEY_CODE).as_str(),
            "tell application \"System Events\" to key code 53"
        );
    }

    #[test]
    fn open_location_script() {
        let url = url::Url::parse("https://example.com/a?q=\"x\"").unwrap();
        let script = Script::open_location(&url);
        assert!(script.as_str().starts_with("open location \"https://example.com/a?q="));
        assert_eq!(script.as_str().matches('"').count(), 2, "query quote is percent-encoded");
    }

    #[test]
    fn runner_command_line_parsing() {
        let r = OsaScriptRunner::from_command_line(
            "/usr/bin/osascript -l AppleScript",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(r.program(), "/usr/bin/osascript");
        let argv = r.argv(&Script::key_code(1));
        assert_eq!(argv[..3], ["-l", "AppleScript", "-e"]);

        assert!(OsaScriptRunner::from_command_line("   ", Duration::from_secs(1)).is_err());
        assert!(OsaScriptRunner::from_command_line("\"unterminated", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn default_runner_is_plain_osascript() {
        let r = OsaScriptRunner::default();
        assert_eq!(r.program(), "osascript");
        assert_eq!(r.timeout(), crate::config::DEFAULT_SCRIPT_TIMEOUT);
        assert_eq!(r.argv(&Script::key_code(1))[0], "-e");
    }

    #[cfg(unix)]
    #[test]
    fn runner_executes_through_configured_program() {
        // `sh -c <cmd> -e <script>`: sh runs <cmd> with $0=-e and $1=<script>.
        let r = OsaScriptRunner::from_command_line("sh -c 'printf %s \"$1\"'", Duration::from_secs(5))
            .unwrap();
        let out = r.run(&Script::key_code(7)).unwrap();
        assert_eq!(out, "tell application \"System Events\" to key code 7");
    }
}
