//! Modal dialogs shown through the host application.
//!
//! Dialogs are built with `Dialog`, rendered into a `Script` (all values
//! quoted) and run through any `ScriptRunner`.

use super::process::ScriptError;
use super::script::{Script, ScriptRunner, applescript_quote};
use crate::log_debug;

/// A `display dialog` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub app: String,
    pub title: String,
    pub prompt: String,
    pub buttons: Vec<String>,
    pub default_button: String,
    /// Adds a text field pre-filled with this value.
    pub default_answer: Option<String>,
    pub hidden_answer: bool,
}

impl Dialog {
    pub fn new(app: impl Into<String>, title: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            title: title.into(),
            prompt: prompt.into(),
            buttons: vec!["Ok".to_string()],
            default_button: "Ok".to_string(),
            default_answer: None,
            hidden_answer: false,
        }
    }

    pub fn buttons(mut self, buttons: &[&str], default_button: &str) -> Self {
        self.buttons = buttons.iter().map(|b| b.to_string()).collect();
        self.default_button = default_button.to_string();
        self
    }

    pub fn answer(mut self, default_answer: impl Into<String>, hidden: bool) -> Self {
        self.default_answer = Some(default_answer.into());
        self.hidden_answer = hidden;
        self
    }

    pub fn to_script(&self) -> Script {
        let app = applescript_quote(&self.app);
        let buttons = self
            .buttons
            .iter()
            .map(|b| applescript_quote(b))
            .collect::<Vec<_>>()
            .join(", ");

        let mut display = format!(
            "  display dialog {} with title {}",
            applescript_quote(&self.prompt),
            applescript_quote(&self.title)
        );
        if let Some(answer) = &self.default_answer {
            display.push_str(&format!(" default answer {}", applescript_quote(answer)));
        }
        display.push_str(&format!(
            " buttons {{{buttons}}} default button {} with icon appIcon",
            applescript_quote(&self.default_button)
        ));
        if self.default_answer.is_some() && self.hidden_answer {
            display.push_str(" with hidden answer");
        }

        Script::from_lines(vec![
            format!("tell application {app}"),
            "  activate".to_string(),
            format!("  set appPath to (path to application {app})"),
            "  set appIcon to path to resource \"appicon.icns\" in bundle (appPath as alias)"
                .to_string(),
            display,
            "end tell".to_string(),
        ])
    }
}

/// Parse `button returned:X, text returned:Y` into `(button, text)`.
///
/// The text part is taken verbatim to the end of the line, so answers that
/// contain ", " survive.
pub fn parse_dialog_response(response: &str) -> (String, String) {
    const BUTTON: &str = "button returned:";
    const TEXT: &str = "text returned:";

    let response = response.trim();
    let (head, text) = match response.find(TEXT) {
        Some(idx) => (&response[..idx], response[idx + TEXT.len()..].to_string()),
        None => (response, String::new()),
    };
    let button = head
        .split(", ")
        .find_map(|part| part.trim().strip_prefix(BUTTON))
        .unwrap_or("")
        .trim_end_matches(',')
        .to_string();
    (button, text)
}

/// Dialog helpers bound to one workflow's app name and title.
pub struct Dialogs<'a> {
    runner: &'a dyn ScriptRunner,
    app: String,
    title: String,
}

impl<'a> Dialogs<'a> {
    pub fn new(runner: &'a dyn ScriptRunner, app: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            runner,
            app: app.into(),
            title: title.into(),
        }
    }

    /// Ask a yes/no question.
    pub fn confirm(&self, prompt: &str, default_yes: bool) -> Result<bool, ScriptError> {
        let default = if default_yes { "Yes" } else { "No" };
        let script = Dialog::new(&self.app, &self.title, prompt)
            .buttons(&["Yes", "No"], default)
            .to_script();
        let response = self.runner.run(&script)?;
        let (button, _) = parse_dialog_response(&response);
        Ok(button == "Yes")
    }

    /// Ask for a value. A user cancel is reported as `("Cancel", "")`.
    pub fn input(
        &self,
        prompt: &str,
        default_value: &str,
        hidden: bool,
    ) -> Result<(String, String), ScriptError> {
        let script = Dialog::new(&self.app, &self.title, format!("{prompt}:"))
            .buttons(&["Cancel", "Ok"], "Ok")
            .answer(default_value, hidden)
            .to_script();
        match self.runner.run(&script) {
            Ok(response) => {
                log_debug!("got response: '{response}'");
                Ok(parse_dialog_response(&response))
            }
            Err(e) if e.output().contains("User canceled") => {
                log_debug!("User canceled");
                Ok(("Cancel".to_string(), String::new()))
            }
            Err(e) => Err(e),
        }
    }

    /// Show a message with a single Ok button.
    pub fn message(&self, message: &str) -> Result<(), ScriptError> {
        let script = Dialog::new(&self.app, &self.title, message).to_script();
        self.runner.run(&script).map(|_| ())
    }
}
