/*!
catalog.rs - commands declared in a YAML or JSON file.

Shape (YAML shown; JSON with the same keys is accepted for *.json paths):

  commands:
    - keyword: gh
      description: Open GitHub
      url: https://github.com            # action with a fixed argument
    - keyword: docs
      description: Documentation links
      enabled: true                      # optional, default true
      links:                             # filter + action
        - title: Rust std
          url: https://doc.rust-lang.org/std/
        - title: Tokio
          url: https://docs.rs/tokio
          subtitle: async runtime

Each entry must have exactly one of `url` / `links`. URLs are validated when
the catalog is loaded so a typo surfaces as an error item, not at click time.
*/

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::rc::Rc;
use url::Url;

use crate::config::WorkflowContext;
use crate::host::{Script, ScriptRunner};
use crate::log_info;
use crate::workflow::{
    Action, Command, CommandDef, Envelope, Filter, FuzzyMatcher, Item, Matcher, Registry,
};

/* ---- File format ---- */

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Catalog {
    #[serde(default)]
    pub commands: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub keyword: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    pub url: Option<String>,
    pub links: Option<Vec<LinkEntry>>,
}

fn enabled_default() -> bool {
    true
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
pub struct LinkEntry {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub subtitle: Option<String>,
}

impl Catalog {
    /// Parse catalog text; `.json` paths are JSON, anything else YAML.
    pub fn parse(raw: &str, path: &Path) -> Result<Self> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(raw).context("failed to parse JSON catalog")
        } else {
            serde_yaml::from_str(raw).context("failed to parse YAML catalog")
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;
        Self::parse(&raw, path)
    }

    /// Build commands; every entry is validated first.
    pub fn into_commands(self, runner: Rc<dyn ScriptRunner>) -> Result<Vec<Box<dyn Command>>> {
        let mut out: Vec<Box<dyn Command>> = Vec::with_capacity(self.commands.len());
        for entry in self.commands {
            let keyword = entry.keyword.clone();
            let def = CommandDef::new(&entry.keyword, &entry.description).enabled(entry.enabled);
            match (entry.url, entry.links) {
                (Some(raw), None) => {
                    let url = parse_url(&raw).with_context(|| format!("command '{keyword}'"))?;
                    out.push(Box::new(OpenUrl::new(def, url, runner.clone())));
                }
                (None, Some(links)) => {
                    for link in &links {
                        parse_url(&link.url).with_context(|| {
                            format!("command '{keyword}', link '{}'", link.title)
                        })?;
                    }
                    out.push(Box::new(LinkList {
                        def,
                        links,
                        runner: runner.clone(),
                    }));
                }
                (Some(_), Some(_)) => {
                    bail!("command '{keyword}': use either 'url' or 'links', not both")
                }
                (None, None) => bail!("command '{keyword}': needs 'url' or 'links'"),
            }
        }
        Ok(out)
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw.trim()).with_context(|| format!("invalid URL '{raw}'"))
}

fn open(runner: &dyn ScriptRunner, url: &Url) -> Result<String> {
    runner
        .run(&Script::open_location(url))
        .with_context(|| format!("failed to open {url}"))?;
    Ok(format!("Opened {url}"))
}

/// Registry for the context's catalog. A missing catalog is an empty
/// registry; an unreadable or invalid one is an error.
pub fn load_registry(ctx: &WorkflowContext, runner: Rc<dyn ScriptRunner>) -> Result<Registry> {
    let Some(path) = ctx.catalog_path() else {
        log_info!("No catalog configured; starting with no commands");
        return Ok(Registry::empty());
    };
    if !path.exists() {
        log_info!("Catalog {} not found; starting with no commands", path.display());
        return Ok(Registry::empty());
    }
    let commands = Catalog::load(&path)?.into_commands(runner)?;
    Registry::new(commands).with_context(|| format!("invalid catalog: {}", path.display()))
}

/* ---- Commands ---- */

/// Action that opens one fixed URL.
struct OpenUrl {
    def: CommandDef,
    url: Url,
    runner: Rc<dyn ScriptRunner>,
}

impl OpenUrl {
    fn new(def: CommandDef, url: Url, runner: Rc<dyn ScriptRunner>) -> Self {
        let arg = Envelope::action(&def.keyword, url.as_str());
        Self {
            def: def.with_arg(arg),
            url,
            runner,
        }
    }
}

impl Command for OpenUrl {
    fn about(&self) -> CommandDef {
        self.def.clone()
    }

    fn as_action(&self) -> Option<&dyn Action> {
        Some(self)
    }
}

impl Action for OpenUrl {
    fn run(&self, _arg: &str, data: &str) -> Result<String> {
        let url = if data.is_empty() {
            self.url.clone()
        } else {
            parse_url(data)?
        };
        open(self.runner.as_ref(), &url)
    }
}

/// Filter over titled links; selecting one opens it.
struct LinkList {
    def: CommandDef,
    links: Vec<LinkEntry>,
    runner: Rc<dyn ScriptRunner>,
}

impl Command for LinkList {
    fn about(&self) -> CommandDef {
        self.def.clone()
    }

    fn as_filter(&self) -> Option<&dyn Filter> {
        Some(self)
    }

    fn as_action(&self) -> Option<&dyn Action> {
        Some(self)
    }
}

impl Filter for LinkList {
    fn items(&self, arg: &str, _data: &str) -> Result<Vec<Item>> {
        let matcher = FuzzyMatcher;
        let query = arg.trim();
        Ok(self
            .links
            .iter()
            .filter(|l| matcher.matches(&l.title, query))
            .map(|l| {
                Item::new(&l.title)
                    .subtitle(l.subtitle.as_deref().unwrap_or(l.url.as_str()))
                    .autocomplete(&l.title)
                    .arg(Envelope::action(&self.def.keyword, &l.url))
            })
            .collect())
    }
}

impl Action for LinkList {
    fn run(&self, _arg: &str, data: &str) -> Result<String> {
        if data.is_empty() {
            bail!("no link selected");
        }
        open(self.runner.as_ref(), &parse_url(data)?)
    }
}

/* ---- Tests ---- */
