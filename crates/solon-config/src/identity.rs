//! Entity identity: a name/key pair.

use crate::component::Component;
use crate::error::ConfigError;
use crate::fidelity::Fidelity;
use crate::normalize::{Context, Halt};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The identity of an entity: a human-readable name and an immutable key.
///
/// Both fields are optional because the source that populated the
/// configuration may not have been able to determine them; an identity with
/// an absent field carries [`Incomplete`](Fidelity::is_incomplete) fidelity
/// rather than failing validation outright.
///
/// Post-normalization invariants for the fields that *are* present:
///
/// - `name` is non-empty, printable, and contains no whitespace.
/// - `key` parses as an RFC 4122/9562 UUID in its canonical 36-character
///   hyphenated form, and is normalized to lowercase.
///
/// # Example
///
/// ```
/// use solon_config::Identity;
///
/// let identity = Identity::new("bank", "19cb98d5-dd17-4daf-ae00-1b413b7b899a");
/// assert_eq!(identity.to_string(), "bank/19cb98d5-dd17-4daf-ae00-1b413b7b899a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Identity {
    /// The entity's human-readable name, if known.
    pub name: Option<String>,
    /// The entity's unique key, if known.
    pub key: Option<String>,
}

impl Identity {
    /// Creates an identity with both fields present.
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            key: Some(key.into()),
        }
    }
}

impl Component for Identity {
    fn fidelity(&self) -> Fidelity {
        if self.name.is_none() || self.key.is_none() {
            Fidelity::incomplete()
        } else {
            Fidelity::immaculate()
        }
    }

    fn label(&self) -> String {
        format!("identity:{self}")
    }

    fn normalize(&mut self, ctx: &mut Context) -> Result<(), Halt> {
        if let Some(name) = &self.name {
            if !is_valid_name(name) {
                ctx.fail(ConfigError::invalid_identity_name(name))?;
            }
        }

        if let Some(key) = &self.key {
            match canonicalize_key(key) {
                Some(canonical) => self.key = Some(canonical),
                None => ctx.fail(ConfigError::invalid_identity_key(key))?,
            }
        }

        Ok(())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.name.as_deref().unwrap_or("?"),
            self.key.as_deref().unwrap_or("?"),
        )
    }
}

/// Returns `true` if `name` is non-empty, printable, and whitespace-free.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| !c.is_whitespace() && !c.is_control())
}

/// Parses `key` as a canonically shaped UUID and returns its lowercase
/// hyphenated form, or `None` if the key is malformed.
///
/// Only the 36-character 8-4-4-4-12 shape is accepted. [`Uuid`] also parses
/// simple, braced, and URN textual forms, so the shape is checked first.
fn canonicalize_key(key: &str) -> Option<String> {
    if !has_canonical_shape(key) {
        return None;
    }
    Uuid::parse_str(key)
        .ok()
        .map(|uuid| uuid.as_hyphenated().to_string())
}

fn has_canonical_shape(key: &str) -> bool {
    key.len() == 36
        && key.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}
