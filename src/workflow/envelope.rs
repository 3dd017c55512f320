/*!
envelope.rs - continuation state exchanged between invocations.

An `Envelope` is the only state that survives from one process launch to the
next. It travels as a JSON string: as an item's `arg`, as the `data` workflow
variable attached to every emitted item, and nested inside a `LoopbackBlock`
when the final stage defers to the host.

Every field is a plain string on the wire (empty fields are omitted), so the
encoded form can be embedded in a script string literal and decoded again
without loss.

Wire shape:
  {"keyword":"find","mode":"tell","mod":"cmd","data":"..."}
*/

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::error::CodecError;

/* ---- Mode ---- */

/// Dispatch mode carried by an envelope.
///
/// Unknown strings are kept verbatim in `Other` so the dispatcher can name
/// them in its "invalid mode" diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mode {
    Tell,
    Do,
    Back,
    Other(String),
}

impl Mode {
    pub fn as_str(&self) -> &str {
        match self {
            Mode::Tell => "tell",
            Mode::Do => "do",
            Mode::Back => "back",
            Mode::Other(s) => s,
        }
    }
}

impl From<String> for Mode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "tell" => Mode::Tell,
            "do" => Mode::Do,
            "back" => Mode::Back,
            _ => Mode::Other(s),
        }
    }
}

impl From<Mode> for String {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* ---- Modifier keys ---- */

/// Modifier key held while an item was actioned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModKey {
    Cmd,
    Alt,
    Ctrl,
    Shift,
    Fn,
    Other(String),
}

impl ModKey {
    pub fn as_str(&self) -> &str {
        match self {
            ModKey::Cmd => "cmd",
            ModKey::Alt => "alt",
            ModKey::Ctrl => "ctrl",
            ModKey::Shift => "shift",
            ModKey::Fn => "fn",
            ModKey::Other(s) => s,
        }
    }
}

impl From<String> for ModKey {
    fn from(s: String) -> Self {
        match s.as_str() {
            "cmd" => ModKey::Cmd,
            "alt" => ModKey::Alt,
            "ctrl" => ModKey::Ctrl,
            "shift" => ModKey::Shift,
            "fn" => ModKey::Fn,
            _ => ModKey::Other(s),
        }
    }
}

impl From<ModKey> for String {
    fn from(k: ModKey) -> Self {
        match k {
            ModKey::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ModKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* ---- Envelope ---- */

/// Continuation state for a single invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Resolved keyword. Empty means the raw argument must be parsed.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "String::is_empty"
    )]
    pub keyword: String,

    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub mode: Option<Mode>,

    /// Modifier held at selection time.
    #[serde(
        rename = "mod",
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub modifier: Option<ModKey>,

    /// Opaque, command-specific payload.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "String::is_empty"
    )]
    pub data: String,
}

/// `null` reads as an empty string.
fn null_as_empty<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

/// Treat `""` the same as an absent field.
fn non_empty<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    Ok(raw.filter(|s| !s.is_empty()).map(T::from))
}

impl Envelope {
    /// Envelope that only names a keyword (menu drill-down target).
    pub fn for_keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    /// Envelope that runs `keyword`'s action with `data`.
    pub fn action(keyword: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            mode: Some(Mode::Do),
            modifier: None,
            data: data.into(),
        }
    }

    /// Decode an envelope. Only JSON objects are accepted; bare strings,
    /// numbers and `null` are decode failures.
    pub fn decode(raw: &str) -> Result<Self, CodecError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(CodecError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Decode `raw` on top of this envelope: fields present in `raw` replace
    /// the current ones, absent fields are left as they are. On error the
    /// envelope is unchanged.
    pub fn overlay(&mut self, raw: &str) -> Result<(), CodecError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(CodecError::NotAnObject);
        }
        let patch: EnvelopePatch = serde_json::from_value(value)?;
        if let Some(k) = patch.keyword {
            self.keyword = k;
        }
        if let Some(m) = patch.mode {
            self.mode = (!m.is_empty()).then(|| Mode::from(m));
        }
        if let Some(m) = patch.modifier {
            self.modifier = (!m.is_empty()).then(|| ModKey::from(m));
        }
        if let Some(d) = patch.data {
            self.data = d;
        }
        Ok(())
    }

    /// Mode with the "unset means tell" rule applied.
    pub fn effective_mode(&self) -> Mode {
        self.mode.clone().unwrap_or(Mode::Tell)
    }
}

#[derive(Deserialize)]
struct EnvelopePatch {
    keyword: Option<String>,
    mode: Option<String>,
    #[serde(rename = "mod")]
    modifier: Option<String>,
    data: Option<String>,
}

/* ---- Loopback block ---- */

/// Trigger argument handed to the host when continuation is deferred.
///
/// Shape: `{"alfredworkflow":{"arg":"","variables":{"data":"<envelope>"}}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopbackBlock {
    alfredworkflow: LoopbackBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct LoopbackBody {
    arg: String,
    variables: LoopbackVariables,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct LoopbackVariables {
    #[serde(skip_serializing_if = "String::is_empty")]
    data: String,
}

impl LoopbackBlock {
    pub fn new(arg: impl Into<String>, envelope: &Envelope) -> Self {
        Self {
            alfredworkflow: LoopbackBody {
                arg: arg.into(),
                variables: LoopbackVariables {
                    data: envelope.encode(),
                },
            },
        }
    }

    /// The serialized envelope carried in `variables.data`.
    pub fn data(&self) -> &str {
        &self.alfredworkflow.variables.data
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

/* ---- Tests ---- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_fields_read_as_absent() {
        let env = Envelope::decode(r#"{"mode":"do","keyword":"open","data":null}"#).unwrap();
        assert_eq!(env, Envelope::action("open", ""));

        let env = Envelope::decode(r#"{"keyword":null,"mode":null,"mod":null}"#).unwrap();
        assert_eq!(env, Envelope::default());
    }

    #[test]
    fn encode_omits_empty_fields() {
        assert_eq!(Envelope::default().encode(), "{}");
        assert_eq!(
            Envelope::for_keyword("find").encode(),
            r#"{"keyword":"find"}"#
        );
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let env = Envelope {
            keyword: "open".into(),
            mode: Some(Mode::Do),
            modifier: Some(ModKey::Cmd),
            data: "path with \"quotes\" and \\ slashes".into(),
        };
        let back = Envelope::decode(&env.encode()).unwrap();
        assert_eq!(back, env);
    }

    #[test]
    fn unknown_mode_is_kept_verbatim() {
        let env = Envelope::decode(r#"{"mode":"sideways"}"#).unwrap();
        assert_eq!(env.mode, Some(Mode::Other("sideways".into())));
        assert_eq!(env.encode(), r#"{"mode":"sideways"}"#);
    }

    #[test]
    fn empty_mode_reads_as_unset() {
        let env = Envelope::decode(r#"{"mode":"","mod":""}"#).unwrap();
        assert_eq!(env.mode, None);
        assert_eq!(env.modifier, None);
        assert_eq!(env.effective_mode(), Mode::Tell);
    }

    #[test]
    fn non_object_inputs_fail() {
        for raw in ["find", "42", "null", "\"x\"", "[]", ""] {
            assert!(Envelope::decode(raw).is_err(), "should reject {raw:?}");
        }
    }

    #[test]
    fn overlay_replaces_only_present_fields() {
        let mut env = Envelope {
            keyword: "k".into(),
            mode: Some(Mode::Back),
            modifier: Some(ModKey::Alt),
            data: r#"{"keyword":"inner","data":"d"}"#.into(),
        };
        let inner = env.data.clone();
        env.overlay(&inner).unwrap();
        assert_eq!(env.keyword, "inner");
        assert_eq!(env.data, "d");
        assert_eq!(env.mode, Some(Mode::Back), "absent mode is kept");
        assert_eq!(env.modifier, Some(ModKey::Alt));
    }

    #[test]
    fn overlay_error_leaves_envelope_untouched() {
        let mut env = Envelope::action("open", "not json");
        let before = env.clone();
        assert!(env.overlay("not json").is_err());
        assert_eq!(env, before);
    }

    #[test]
    fn loopback_block_shape() {
        let env = Envelope {
            mode: Some(Mode::Tell),
            ..Envelope::default()
        };
        let block = LoopbackBlock::new("", &env);
        assert_eq!(
            block.encode(),
            r#"{"alfredworkflow":{"arg":"","variables":{"data":"{\"mode\":\"tell\"}"}}}"#
        );
        assert_eq!(Envelope::decode(block.data()).unwrap(), env);
    }
}
