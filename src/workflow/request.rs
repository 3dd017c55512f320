/*!
request.rs - turn process arguments into a typed request.

Accepted shapes (flags, then `--`, then positionals):

  workflow -- (arg|envelope)          one positional: envelope if it decodes, else arg
  workflow -- arg envelope            two positionals: first is always the arg
  workflow -final -- envelope         final-stage variant of either shape above
  workflow -v -- arg envelope         extra flags only before an explicit `--`

The host passes the typed query verbatim, so anything after the flag block is
a positional even when it starts with `-`. `normalize_flags` inserts the `--`
when the invocation leaves it out.

Zero or more than two positionals is a malformed request. Malformed requests
are not process failures: the error rides along in `Request::error` and is
rendered by tell mode as a single error item.
*/

use crate::{log_debug, log_info};

use super::envelope::Envelope;
use super::error::DispatchError;

/// One decoded invocation.
#[derive(Debug, Default)]
pub struct Request {
    /// Raw argument (typed query or item argument).
    pub argument: String,
    pub envelope: Envelope,
    /// Set when the invocation is the terminal stage of a chain.
    pub final_stage: bool,
    /// Upstream parse/setup failure; when set no command runs.
    pub error: Option<DispatchError>,
}

impl Request {
    pub fn new(argument: impl Into<String>, envelope: Envelope) -> Self {
        Self {
            argument: argument.into(),
            envelope,
            final_stage: false,
            error: None,
        }
    }

    pub fn final_stage(mut self, final_stage: bool) -> Self {
        self.final_stage = final_stage;
        self
    }

    /// Attach a failure that should be reported instead of dispatching.
    pub fn with_error(mut self, err: DispatchError) -> Self {
        self.error = Some(err);
        self
    }
}

/// Parse positional arguments into a request.
pub fn parse_invocation(positional: &[String], final_stage: bool) -> Request {
    let mut req = Request::default().final_stage(final_stage);

    match positional {
        [] => req.error = Some(DispatchError::NoArguments),
        [only] => match Envelope::decode(only) {
            Ok(env) => req.envelope = env,
            Err(e) => {
                log_debug!("Couldn't parse first arg as data: {e}");
                req.argument = only.clone();
            }
        },
        [arg, data] => {
            req.argument = arg.clone();
            if !data.is_empty() {
                match Envelope::decode(data) {
                    Ok(env) => req.envelope = env,
                    Err(e) => log_info!("Couldn't parse second arg as data: {e}"),
                }
            }
        }
        more => {
            req.error = Some(DispatchError::TooManyArguments { count: more.len() })
        }
    }

    req
}

/// `-final`, `-final=..`, `--final`, `--final=..` as `--final..`; anything
/// else is not a final-stage flag.
fn final_flag(arg: &str) -> Option<String> {
    let rest = arg
        .strip_prefix("--final")
        .or_else(|| arg.strip_prefix("-final"))?;
    (rest.is_empty() || rest.starts_with('=')).then(|| format!("--final{rest}"))
}

/// Prepare raw process arguments for the CLI parser.
///
/// The flag block is the leading run of final-stage flags (Go-style `-final`
/// is rewritten to `--final`). Other flags such as `-v` / `-q` belong to the
/// block only when the invocation carries its own `--` separator. A `--` is
/// inserted after the block when missing, so a query like `-v` or `--help`
/// always reaches the parser as a positional.
pub fn normalize_flags<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut out: Vec<String> = args.next().into_iter().collect();
    let rest: Vec<String> = args.collect();
    let separated = rest.iter().any(|a| a == "--");

    let mut rest = rest.into_iter().peekable();
    while let Some(arg) = rest.peek() {
        if arg == "--" {
            break;
        }
        if let Some(flag) = final_flag(arg) {
            out.push(flag);
        } else if separated && arg.starts_with('-') {
            out.push(arg.clone());
        } else {
            break;
        }
        rest.next();
    }

    if rest.peek().map(String::as_str) != Some("--") {
        out.push("--".to_string());
    }
    out.extend(rest);
    out
}

/* ---- Tests ---- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::envelope::Mode;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn zero_args_is_malformed() {
        let req = parse_invocation(&[], false);
        assert!(matches!(req.error, Some(DispatchError::NoArguments)));
    }

    #[test]
    fn three_args_is_malformed() {
        let req = parse_invocation(&args(&["a", "b", "c"]), false);
        assert!(matches!(
            req.error,
            Some(DispatchError::TooManyArguments { count: 3 })
        ));
    }

    #[test]
    fn single_plain_arg_is_argument() {
        let req = parse_invocation(&args(&["find foo"]), false);
        assert!(req.error.is_none());
        assert_eq!(req.argument, "find foo");
        assert_eq!(req.envelope, Envelope::default());
    }

    #[test]
    fn single_envelope_arg_is_decoded() {
        let req = parse_invocation(&args(&[r#"{"keyword":"find"}"#]), false);
        assert_eq!(req.argument, "");
        assert_eq!(req.envelope.keyword, "find");
    }

    #[test]
    fn two_args_first_is_always_argument() {
        let req = parse_invocation(
            &args(&[r#"{"keyword":"x"}"#, r#"{"mode":"do","keyword":"open"}"#]),
            false,
        );
        assert_eq!(req.argument, r#"{"keyword":"x"}"#);
        assert_eq!(req.envelope.keyword, "open");
        assert_eq!(req.envelope.mode, Some(Mode::Do));
    }

    #[test]
    fn two_args_bad_data_keeps_default_envelope() {
        let req = parse_invocation(&args(&["q", "{broken"]), false);
        assert!(req.error.is_none(), "decode failure is not an error");
        assert_eq!(req.argument, "q");
        assert_eq!(req.envelope, Envelope::default());
    }

    #[test]
    fn two_args_empty_data_is_skipped() {
        let req = parse_invocation(&args(&["q", ""]), true);
        assert!(req.final_stage);
        assert_eq!(req.envelope, Envelope::default());
    }

    #[test]
    fn normalize_rewrites_leading_go_flags() {
        assert_eq!(
            normalize_flags(args(&["bin", "-final", "data"])),
            args(&["bin", "--final", "--", "data"])
        );
        assert_eq!(
            normalize_flags(args(&["bin", "-final=false", "x"])),
            args(&["bin", "--final=false", "--", "x"])
        );
        assert_eq!(
            normalize_flags(args(&["bin", "--final", "--", "x"])),
            args(&["bin", "--final", "--", "x"])
        );
    }

    #[test]
    fn normalize_keeps_dash_queries_positional() {
        assert_eq!(
            normalize_flags(args(&["bin", "-v"])),
            args(&["bin", "--", "-v"])
        );
        assert_eq!(
            normalize_flags(args(&["bin", "--help", r#"{"mode":"do"}"#])),
            args(&["bin", "--", "--help", r#"{"mode":"do"}"#])
        );
        assert_eq!(
            normalize_flags(args(&["bin", "query", "-final"])),
            args(&["bin", "--", "query", "-final"])
        );
        assert_eq!(
            normalize_flags(args(&["bin", "-final", "-finalize"])),
            args(&["bin", "--final", "--", "-finalize"])
        );
        assert_eq!(normalize_flags(args(&["bin"])), args(&["bin", "--"]));
    }

    #[test]
    fn normalize_allows_config_flags_before_explicit_separator() {
        assert_eq!(
            normalize_flags(args(&["bin", "-v", "-final", "--", "-q"])),
            args(&["bin", "-v", "--final", "--", "-q"])
        );
    }
}
