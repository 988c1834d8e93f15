//! Identifier assembly and the shorthand alias.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::bits::BitVector;
use crate::error::{Error, Result};
use crate::layout::{check_width, Layout};

/// Prefix placed in front of the bit string.
pub const DEFAULT_PREFIX: &str = "File_Local_Namespace_";

/// Default shorthand alias.
pub const DEFAULT_SHORTHAND: &str = "FLN";

/// A generated module name: `prefix` followed by the flags, MSB first.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Concatenate `prefix` and `bits`.
    pub fn assemble(prefix: &str, bits: &BitVector) -> Self {
        let mut name = String::with_capacity(prefix.len() + bits.width() as usize);
        name.push_str(prefix);
        for bit in bits.iter_msb_first() {
            name.push(if bit { '1' } else { '0' });
        }
        Self(name)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

/// Short name bound to the most recent identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Shorthand {
    pub alias: String,
    pub target: Identifier,
}

/// Settings for one compilation unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub prefix: String,
    pub shorthand: String,
    pub suppress_shorthand: bool,
    pub layout: Layout,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            shorthand: DEFAULT_SHORTHAND.to_string(),
            suppress_shorthand: false,
            layout: Layout::default(),
        }
    }
}

impl GeneratorConfig {
    /// Check the bit width, and that the prefix and shorthand are usable as
    /// Rust identifiers.
    pub fn validate(&self) -> Result<()> {
        check_width(self.layout.bit_width())?;
        check_name("prefix", &self.prefix)?;
        if !self.suppress_shorthand {
            check_name("shorthand", &self.shorthand)?;
        }
        Ok(())
    }
}

/// True if `name` starts with a letter or underscore and continues with
/// alphanumerics or underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    if name == "_" {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn check_name(kind: &'static str, name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(Error::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}
