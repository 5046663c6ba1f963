//! Opaque caller identity (spec §3 "VisitorTag", §4.10).
//!
//! A `VisitorTag` is an ownership tag only — it does not authenticate.
//! It is minted once per client (cookie absent) and carried for the
//! lifetime of that cookie.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorTag(uuid::Uuid);

impl VisitorTag {
    /// Mint a fresh 128-bit identifier for a first-contact visitor.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn as_str_repr(&self) -> String {
        self.0.to_string()
    }
}

impl Default for VisitorTag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VisitorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for VisitorTag {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(uuid::Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn roundtrips_through_string() {
        let tag = VisitorTag::new();
        let encoded = tag.to_string();
        let parsed = VisitorTag::from_str(&encoded).unwrap();
        assert_eq!(tag, parsed);
    }

    #[test]
    fn two_fresh_tags_differ() {
        assert_ne!(VisitorTag::new(), VisitorTag::new());
    }
}
