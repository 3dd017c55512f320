/*!
dispatch.rs - the mode state machine.

One call to `Workflow::dispatch` handles one invocation:

  Request ──► final stage? ──(mode tell/back)──► loopback trigger, stop
                  │
                  ▼
            resolve keyword
                  │
        ┌─────────┼──────────────┐
        ▼         ▼              ▼
      tell        do           other
   list/filter  run action   "Invalid mode"
   emit items   print text

Rules worth keeping in mind:
  - Mode unset means "tell". "back" is only meaningful at the final stage,
    where the envelope's data is decoded once more on top of itself.
  - An upstream error (malformed request, setup failure) never runs a
    command; tell mode renders it as a single "Error: ..." item. A setup
    failure at the final stage still defers, so the error shows up in the
    looped-back invocation.
  - Command failures never escape as errors: they become item titles or
    output text. The only `Err` this returns is a failed write.
  - Script-runner failures (loopback trigger, window dismiss) are logged and
    otherwise ignored.
*/

use std::io::{self, Write};

use crate::config::WorkflowContext;
use crate::host::{Dialogs, Keychain, Script, ScriptRunner};
use crate::{log_debug, log_error, log_info};

use super::envelope::{Envelope, LoopbackBlock, Mode};
use super::error::DispatchError;
use super::fuzzy::{FuzzyMatcher, Matcher};
use super::items::{self, Item};
use super::keyword::{Resolution, resolve};
use super::registry::Registry;
use super::request::Request;

/// What an invocation ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Tell mode: the item list that was emitted.
    Items(Vec<Item>),
    /// Do mode: the text that was printed (possibly empty, then nothing was).
    Output(String),
    /// Final stage handed continuation back to the host.
    Deferred(LoopbackBlock),
    /// Unrecognized mode; a diagnostic line was printed.
    InvalidMode(String),
}

/// A workflow: context, commands and host collaborators.
pub struct Workflow {
    ctx: WorkflowContext,
    registry: Registry,
    runner: Box<dyn ScriptRunner>,
    matcher: Box<dyn Matcher>,
}

impl Workflow {
    pub fn new(ctx: WorkflowContext, registry: Registry, runner: Box<dyn ScriptRunner>) -> Self {
        Self {
            ctx,
            registry,
            runner,
            matcher: Box::new(FuzzyMatcher),
        }
    }

    /// Replace the fuzzy oracle.
    pub fn with_matcher(mut self, matcher: Box<dyn Matcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn context(&self) -> &WorkflowContext {
        &self.ctx
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Dialog helpers titled with the workflow name.
    pub fn dialogs(&self) -> Dialogs<'_> {
        Dialogs::new(self.runner.as_ref(), self.ctx.app_name(), &self.ctx.name)
    }

    /// Keychain scoped to this workflow's bundle id.
    pub fn keychain(&self) -> Keychain {
        Keychain::new(&self.ctx.bundle_id, self.ctx.script_timeout)
    }

    /// Handle one invocation, writing the response to `out`.
    pub fn dispatch(&self, request: Request, out: &mut dyn Write) -> io::Result<Outcome> {
        let Request {
            argument,
            mut envelope,
            final_stage,
            error,
        } = request;

        // Setup failures still defer: the looped-back tell invocation is the
        // one whose items the host shows.
        let may_defer = matches!(error, None | Some(DispatchError::Setup(_)));
        if may_defer
            && final_stage
            && let Some(block) = self.defer(&mut envelope)
        {
            return Ok(Outcome::Deferred(block));
        }

        if envelope.mode.is_none() {
            envelope.mode = Some(Mode::Tell);
        }

        let resolution = if error.is_none() {
            let r = resolve(&argument, &envelope.keyword);
            log_debug!("set keyword to '{}'", r.keyword);
            r
        } else {
            Resolution {
                keyword: String::new(),
                remainder: String::new(),
                prefix: String::new(),
            }
        };

        match envelope.effective_mode() {
            Mode::Tell => {
                let list = self.tell(&resolution, &envelope, error);
                items::emit(out, &list, &envelope)?;
                Ok(Outcome::Items(list))
            }
            Mode::Do => {
                let output = self.act(&argument, &resolution, &envelope, error);
                if !output.is_empty() {
                    writeln!(out, "{output}")?;
                }
                Ok(Outcome::Output(output))
            }
            other => {
                writeln!(out, "Invalid mode: '{other}'")?;
                Ok(Outcome::InvalidMode(other.to_string()))
            }
        }
    }

    /* ---- final stage ---- */

    /// Defer tell/back requests to the host via the loopback trigger.
    /// Returns `None` when the request should be dispatched normally.
    fn defer(&self, envelope: &mut Envelope) -> Option<LoopbackBlock> {
        if envelope.mode.is_none() {
            envelope.mode = Some(Mode::Tell);
        }

        if envelope.mode == Some(Mode::Back) {
            log_debug!("going back");
            let inner = envelope.data.clone();
            if let Err(e) = envelope.overlay(&inner) {
                log_error!("Couldn't decode data for back: {e}");
            }
        }

        if !matches!(envelope.mode, Some(Mode::Back) | Some(Mode::Tell)) {
            return None;
        }

        let block = LoopbackBlock::new("", envelope);
        let script = Script::run_trigger(
            &self.ctx.app_name(),
            &self.ctx.trigger,
            &self.ctx.bundle_id,
            &block.encode(),
        );
        match self.runner.run(&script) {
            Ok(out) => log_debug!("loopback: {out}"),
            Err(e) => log_error!("Error running loopback script: {e}"),
        }
        Some(block)
    }

    /* ---- tell ---- */

    fn tell(
        &self,
        res: &Resolution,
        envelope: &Envelope,
        mut error: Option<DispatchError>,
    ) -> Vec<Item> {
        let mut items = Vec::new();

        if error.is_none() {
            log_debug!("tell: data={envelope:?}, arg='{}'", res.remainder);

            let explicit = !envelope.keyword.is_empty();
            let filter = self.registry.filter(&res.keyword);

            if explicit || filter.is_some() {
                // A typed keyword that names a filter drills down as if the
                // menu item had been selected; its items complete after
                // "<keyword> ".
                let prefix = if explicit || res.prefix.ends_with(' ') {
                    res.prefix.clone()
                } else {
                    format!("{} ", res.keyword)
                };
                match filter {
                    Some(f) => {
                        log_debug!("Adding items for '{}'", res.keyword);
                        match f.items(&res.remainder, &envelope.data) {
                            Ok(found) => items.extend(found.into_iter().map(|mut item| {
                                if !item.autocomplete.is_empty() {
                                    item.autocomplete = format!("{prefix}{}", item.autocomplete);
                                }
                                item
                            })),
                            Err(e) => error = Some(DispatchError::command(e)),
                        }
                    }
                    None => log_debug!("No enabled filter for '{}'", res.keyword),
                }
            } else {
                for c in self.registry.enabled() {
                    let def = c.about();
                    if !self.matcher.matches(&def.keyword, &res.keyword) {
                        continue;
                    }
                    if c.as_filter().is_some() || def.arg.is_some() {
                        log_debug!("Adding menu item for '{}'", def.keyword);
                        items.push(def.keyword_item());
                    }
                }
            }

            if !res.remainder.is_empty() {
                self.matcher.rank(&mut items, &res.remainder);
            }
        }

        if let Some(e) = error {
            log_error!("Error: {e}");
            return vec![Item::new(format!("Error: {e}"))];
        }
        if items.is_empty() {
            return vec![Item::new("No results")];
        }
        items
    }

    /* ---- do ---- */

    fn act(
        &self,
        argument: &str,
        res: &Resolution,
        envelope: &Envelope,
        error: Option<DispatchError>,
    ) -> String {
        if let Some(e) = error {
            return format!("Error: {e}");
        }

        if envelope.modifier.is_none()
            && let Err(e) = self.runner.dismiss_window()
        {
            log_info!("Couldn't dismiss window: {e}");
        }

        let Some(action) = self.registry.action(&res.keyword) else {
            let unresolved = if argument.is_empty() {
                res.keyword.as_str()
            } else {
                argument
            };
            return format!("Error: {}", DispatchError::NoValidCommand(unresolved.to_string()));
        };

        log_debug!("do: keyword='{}', arg='{}'", res.keyword, res.remainder);
        match action.run(&res.remainder, &envelope.data) {
            Ok(output) => output,
            Err(e) => format!("Error: {}", DispatchError::command(e)),
        }
    }
}

/* ---- Tests ---- */
