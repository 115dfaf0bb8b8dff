//! Entity kinds, the classification unit for watched keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the configuration entity schemas stored under an engine prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Host,
    Listener,
    Backend,
    Frontend,
}

impl EntityKind {
    /// Every known kind, in a fixed order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Host,
        EntityKind::Listener,
        EntityKind::Backend,
        EntityKind::Frontend,
    ];

    /// Lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Host => "host",
            EntityKind::Listener => "listener",
            EntityKind::Backend => "backend",
            EntityKind::Frontend => "frontend",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| crate::Error::InvalidFormat(format!("unknown entity kind: '{s}'")))
    }
}
