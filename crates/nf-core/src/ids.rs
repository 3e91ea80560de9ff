use core::fmt;
use core::str::FromStr;

use crate::CoreError;

/// Characters that would break the `[target]/Attribute=value` syntax.
const RESERVED: &[char] = &['[', ']', '/', '='];

/// Target specification understood by `nvidia-settings`, e.g. `gpu:0` or `fan:1`.
///
/// The value is validated once on construction so it can be spliced into
/// `--assign`/`--query` arguments without further checks.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DeviceTarget(String);

impl DeviceTarget {
    pub fn new(target: impl Into<String>) -> Result<Self, CoreError> {
        let target = target.into();
        if target.is_empty() {
            return Err(CoreError::InvalidTarget {
                target,
                reason: "must not be empty",
            });
        }
        if target.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidTarget {
                target,
                reason: "must not contain whitespace",
            });
        }
        if target.contains(RESERVED) {
            return Err(CoreError::InvalidTarget {
                target,
                reason: "must not contain '[', ']', '/' or '='",
            });
        }
        Ok(Self(target))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Target wrapped in brackets, as written before an attribute name.
    pub fn bracketed(&self) -> String {
        format!("[{}]", self.0)
    }
}

impl FromStr for DeviceTarget {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceTarget({})", self.0)
    }
}

impl fmt::Display for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
