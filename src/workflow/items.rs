/*!
items.rs - result items and the response payload.

Payload (one line on stdout):

  {"items":[{"title":"...","subtitle":"...","autocomplete":"...",
             "arg":"<envelope json>","valid":true,
             "mods":{"cmd":{"subtitle":"...","arg":"<envelope json>","valid":true}},
             "variables":{"data":"<current envelope json>"}}]}

`arg` values are envelopes encoded as strings, so selecting an item feeds the
envelope straight back into the next invocation as its single positional
argument. A modifier's `arg` additionally records which key was held.
*/

use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

use super::envelope::{Envelope, ModKey};

/// Alternate subtitle/argument shown while a modifier key is held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemMod {
    pub subtitle: String,
    pub arg: Option<Envelope>,
}

impl ItemMod {
    pub fn new(subtitle: impl Into<String>, arg: Option<Envelope>) -> Self {
        Self {
            subtitle: subtitle.into(),
            arg,
        }
    }
}

/// One candidate shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub title: String,
    pub subtitle: String,
    pub autocomplete: String,
    pub arg: Option<Envelope>,
    pub mods: BTreeMap<ModKey, ItemMod>,
}

impl Item {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn autocomplete(mut self, autocomplete: impl Into<String>) -> Self {
        self.autocomplete = autocomplete.into();
        self
    }

    pub fn arg(mut self, arg: Envelope) -> Self {
        self.arg = Some(arg);
        self
    }

    pub fn add_mod(&mut self, key: ModKey, m: ItemMod) {
        self.mods.insert(key, m);
    }

    pub fn with_mod(mut self, key: ModKey, m: ItemMod) -> Self {
        self.add_mod(key, m);
        self
    }

    /// Wire form, with `current` attached as the `data` variable.
    fn to_wire(&self, current: &str) -> WireItem {
        let mods = self
            .mods
            .iter()
            .map(|(key, m)| {
                let arg = m.arg.as_ref().map(|env| {
                    let mut env = env.clone();
                    env.modifier = Some(key.clone());
                    env.encode()
                });
                let wire = WireMod {
                    subtitle: m.subtitle.clone(),
                    valid: arg.is_some(),
                    arg,
                };
                (key.to_string(), wire)
            })
            .collect();

        let arg = self.arg.as_ref().map(Envelope::encode);
        WireItem {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            autocomplete: self.autocomplete.clone(),
            valid: arg.is_some(),
            arg,
            mods,
            variables: WireVariables {
                data: current.to_string(),
            },
        }
    }
}

/* ---- Wire types ---- */

#[derive(Serialize)]
struct Payload {
    items: Vec<WireItem>,
}

#[derive(Serialize)]
struct WireItem {
    title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    subtitle: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    autocomplete: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    arg: Option<String>,
    valid: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    mods: BTreeMap<String, WireMod>,
    variables: WireVariables,
}

#[derive(Serialize)]
struct WireMod {
    #[serde(skip_serializing_if = "String::is_empty")]
    subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    arg: Option<String>,
    valid: bool,
}

#[derive(Serialize)]
struct WireVariables {
    #[serde(skip_serializing_if = "String::is_empty")]
    data: String,
}

/// Serialize `items` with `current` attached to each one.
pub fn render(items: &[Item], current: &Envelope) -> String {
    let data = current.encode();
    let payload = Payload {
        items: items.iter().map(|i| i.to_wire(&data)).collect(),
    };
    serde_json::to_string(&payload).unwrap_or_else(|_| String::from(r#"{"items":[]}"#))
}

/// Write the payload as a single line.
pub fn emit(out: &mut dyn Write, items: &[Item], current: &Envelope) -> std::io::Result<()> {
    writeln!(out, "{}", render(items, current))
}
