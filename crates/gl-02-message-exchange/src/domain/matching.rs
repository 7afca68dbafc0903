//! # Content Match Policy
//!
//! How a subscriber's claimed content is compared to the published content.
//!
//! | Case | `Coverage` | `Canonical` |
//! |------|------------|-------------|
//! | identical documents | match | match |
//! | key order differs | match | match |
//! | subscriber has an extra key | match | no match |
//! | subscriber is missing a key | no match | no match |
//! | `1` vs `"1"` | match | no match |
//!
//! A service instance picks one policy at construction and applies it to
//! every validation.

use crate::errors::ExchangeError;
use serde::{Deserialize, Serialize};
use shared_types::{render_scalar, Content};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Every published key must be present in the subscribed content with the
    /// same scalar rendering. Only published keys are visited.
    #[default]
    Coverage,
    /// Sorted-key JSON encodings must be byte-identical.
    Canonical,
}

impl MatchPolicy {
    /// Strict boolean verdict; there is no partial match.
    #[must_use]
    pub fn matches(self, published: &Content, subscribed: &Content) -> bool {
        match self {
            Self::Coverage => published.iter().all(|(key, expected)| {
                subscribed
                    .get(key)
                    .is_some_and(|claimed| render_scalar(claimed) == render_scalar(expected))
            }),
            Self::Canonical => published.to_canonical_json() == subscribed.to_canonical_json(),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coverage => "coverage",
            Self::Canonical => "canonical",
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchPolicy {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coverage" => Ok(Self::Coverage),
            "canonical" => Ok(Self::Canonical),
            _ => Err(ExchangeError::UnknownPolicy(s.to_string())),
        }
    }
}
