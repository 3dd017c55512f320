use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::rc::Rc;

use alfred_dispatch::catalog;
use alfred_dispatch::config::WorkflowContext;
use alfred_dispatch::host::{OsaScriptRunner, ScriptRunner};
use alfred_dispatch::utils::{self, monotonic_ms};
use alfred_dispatch::workflow::{DispatchError, Registry, Workflow, normalize_flags, parse_invocation};
use alfred_dispatch::{log_debug, log_error, log_info};

/// Alfred Dispatch - catalog-driven Alfred workflow entry point
///
/// Invocation shapes (as configured in the workflow's script filter / run script):
///   alfred-dispatch -- "{query}"              typed query, or an encoded envelope
///   alfred-dispatch -- "{query}" "$data"      query plus envelope
///   alfred-dispatch -final -- "$data"         terminal stage of a chain
///   alfred-dispatch -v -- "{query}"           extra flags go before `--`
///
/// Everything after `--` is positional, so queries such as `-v` or `--help`
/// are passed through untouched. When `--` is left out it is inserted after
/// any leading `-final`/`--final`, and no other flag is recognized.
/// The Go-style single-dash `-final` is accepted and treated as `--final`.
///
/// Commands come from a YAML/JSON catalog:
///   ALFRED_DISPATCH_CATALOG, else <alfred_workflow_data>/commands.yaml
///
/// Env:
///   alfred_debug=1                 debug logging (stderr)
///   ALFRED_DISPATCH_OSASCRIPT      script runner command line (default "osascript")
///   ALFRED_DISPATCH_TRIGGER        loopback trigger name (default "start")
///   ALFRED_DISPATCH_TIMEOUT_SECS   script timeout (default 30)
///
/// Output always goes to stdout and the process exits 0; failures are
/// rendered as an error item so the host can show them.
#[derive(Parser, Debug)]
#[command(
    name = "alfred-dispatch",
    version,
    author,
    about = "Alfred Dispatch - stateless command dispatch for Alfred workflows"
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long)]
    quiet: bool,

    /// Terminal stage of an invocation chain
    #[arg(
        long = "final",
        action = clap::ArgAction::Set,
        require_equals = true,
        num_args = 0..=1,
        default_missing_value = "true",
        default_value = "false"
    )]
    final_stage: bool,

    /// Argument and/or encoded envelope
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARG")]
    args: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_flags(std::env::args()));
    let ctx = WorkflowContext::from_env();

    utils::init_logging(utils::derive_level(cli.verbose, cli.quiet, ctx.debug));
    let started = monotonic_ms();

    if let Err(e) = ctx.create_dirs() {
        log_info!("{e:#}");
    }

    let runner = build_runner(&ctx);
    let shared: Rc<dyn ScriptRunner> = Rc::new(runner.clone());

    let mut request = parse_invocation(&cli.args, cli.final_stage);
    let registry = match catalog::load_registry(&ctx, shared) {
        Ok(r) => {
            log_debug!("Loaded {} command(s)", r.len());
            r
        }
        Err(e) => {
            log_error!("{e:#}");
            if request.error.is_none() {
                request = request.with_error(DispatchError::Setup(format!("{e:#}")));
            }
            Registry::empty()
        }
    };

    let workflow = Workflow::new(ctx, registry, Box::new(runner));
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match workflow.dispatch(request, &mut out) {
        Ok(outcome) => log_debug!("Outcome: {outcome:?}"),
        Err(e) => log_error!("Failed to write response: {e}"),
    }
    out.flush()?;

    log_debug!("Finished in {} ms", monotonic_ms() - started);
    Ok(())
}

/// Configured runner, or plain `osascript` if the configured command line
/// cannot be parsed.
fn build_runner(ctx: &WorkflowContext) -> OsaScriptRunner {
    match OsaScriptRunner::from_command_line(&ctx.script_runner, ctx.script_timeout) {
        Ok(r) => r,
        Err(e) => {
            log_error!("Invalid script runner '{}': {e}; using default", ctx.script_runner);
            OsaScriptRunner::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(list: &[&str]) -> Cli {
        let raw = list.iter().map(|s| s.to_string());
        Cli::try_parse_from(normalize_flags(raw)).unwrap()
    }

    #[test]
    fn dash_query_is_positional() {
        let cli = parse(&["bin", "-v"]);
        assert_eq!(cli.args, vec!["-v"]);
        assert_eq!(cli.verbose, 0);

        let cli = parse(&["bin", "-q", r#"{"mode":"do"}"#]);
        assert_eq!(cli.args, vec!["-q", r#"{"mode":"do"}"#]);
        assert!(!cli.quiet);

        let cli = parse(&["bin", "--help"]);
        assert_eq!(cli.args, vec!["--help"]);
    }

    #[test]
    fn final_flag_forms() {
        let cli = parse(&["bin", "-final", r#"{"keyword":"find"}"#]);
        assert!(cli.final_stage);
        assert_eq!(cli.args, vec![r#"{"keyword":"find"}"#]);

        let cli = parse(&["bin", "--final=false", "--", "q"]);
        assert!(!cli.final_stage);
        assert_eq!(cli.args, vec!["q"]);

        let cli = parse(&["bin", "-final", "--", "-final"]);
        assert!(cli.final_stage);
        assert_eq!(cli.args, vec!["-final"]);
    }

    #[test]
    fn configured_flags_before_separator() {
        let cli = parse(&["bin", "-vv", "--", "find", ""]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.args, vec!["find", ""]);
    }
}
