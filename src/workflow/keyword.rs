//! Keyword resolution.
//!
//! Pure string handling; never consults the registry.

/// Outcome of resolving a raw argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub keyword: String,
    /// Argument passed on to the command.
    pub remainder: String,
    /// Prepended to item autocompletes; empty when the keyword came from the
    /// envelope.
    pub prefix: String,
}

/// Split `arg` at the first space into `(keyword, rest)`.
pub fn split_command(arg: &str) -> (&str, &str) {
    match arg.split_once(' ') {
        Some((cmd, rest)) => (cmd, rest),
        None => (arg, ""),
    }
}

/// Resolve the keyword for a request.
///
/// A non-empty `known` keyword (from the envelope) wins and the argument is
/// only trimmed of surrounding spaces. Otherwise the keyword is parsed out of
/// `arg`, and the prefix is the keyword plus a space when anything followed
/// it in the original argument.
pub fn resolve(arg: &str, known: &str) -> Resolution {
    if !known.is_empty() {
        return Resolution {
            keyword: known.to_string(),
            remainder: arg.trim_matches(' ').to_string(),
            prefix: String::new(),
        };
    }

    let (keyword, rest) = split_command(arg);
    let mut prefix = keyword.to_string();
    if arg.len() > keyword.len() {
        prefix.push(' ');
    }
    Resolution {
        keyword: keyword.to_string(),
        remainder: rest.to_string(),
        prefix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(keyword: &str, remainder: &str, prefix: &str) -> Resolution {
        Resolution {
            keyword: keyword.into(),
            remainder: remainder.into(),
            prefix: prefix.into(),
        }
    }

    #[test]
    fn bare_keyword() {
        assert_eq!(resolve("find", ""), res("find", "", "find"));
    }

    #[test]
    fn keyword_and_rest() {
        for (k, rest) in [("find", "foo"), ("x", "a b c"), ("gh", " lead")] {
            let arg = format!("{k} {rest}");
            assert_eq!(resolve(&arg, ""), res(k, rest, &format!("{k} ")));
        }
    }

    #[test]
    fn trailing_space_only() {
        assert_eq!(resolve("find ", ""), res("find", "", "find "));
    }

    #[test]
    fn empty_argument() {
        assert_eq!(resolve("", ""), res("", "", ""));
    }

    #[test]
    fn known_keyword_trims_spaces_only() {
        assert_eq!(resolve("  foo bar \t ", "find"), res("find", "foo bar \t", ""));
    }

    #[test]
    fn resolution_is_deterministic() {
        assert_eq!(resolve("a b", ""), resolve("a b", ""));
    }
}
