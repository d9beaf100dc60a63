use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace partition of the settings store.
///
/// `Local` values stay on this device. `Roaming` values are synchronized by an
/// external agent, which signals the store's change channel after it merges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Local,
    Roaming,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Local => "local",
            Scope::Roaming => "roaming",
        }
    }

    pub fn is_roaming(&self) -> bool {
        matches!(self, Scope::Roaming)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
