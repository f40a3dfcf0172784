//! Authority claims: the nodes of the compiled graph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::scope::Scope;

/// Condition key whose value names the claim this one delegates to.
pub const CONDITION_DELEGATES_TO: &str = "delegates_to";
/// Condition key whose value names the claim this one revokes.
pub const CONDITION_REVOKES: &str = "revokes";
/// Condition key whose value names the claim this one supersedes.
pub const CONDITION_SUPERSEDES: &str = "supersedes";

/// Semantic type of a claim. The four types are mutually exclusive.
///
/// Delegation grants only the right to issue further claims; it never
/// confers the right to act directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    /// Grants the subject the right to perform the action.
    Permission,
    /// Forbids the subject from performing the action.
    Prohibition,
    /// Requires the subject to perform the action.
    Obligation,
    /// Grants the subject the right to issue further claims within a
    /// contained scope.
    Delegation,
}

impl ClaimType {
    /// The canonical string form (`permission`, `prohibition`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Permission => "permission",
            Self::Prohibition => "prohibition",
            Self::Obligation => "obligation",
            Self::Delegation => "delegation",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimType {
    type Err = ();

    /// Case-sensitive parse of the canonical string form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "permission" => Ok(Self::Permission),
            "prohibition" => Ok(Self::Prohibition),
            "obligation" => Ok(Self::Obligation),
            "delegation" => Ok(Self::Delegation),
            _ => Err(()),
        }
    }
}

/// A single authority claim.
///
/// Claims are immutable once created: the normalizer creates them, the
/// validator and resolver may drop them, and nothing mutates one in place.
/// A claim's `id` is unique within one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Identifier, unique within the owning artifact.
    pub id: String,
    /// Semantic type.
    #[serde(rename = "type")]
    pub claim_type: ClaimType,
    /// Who the claim binds (role, user, system).
    pub subject: String,
    /// What the claim covers (read, write, execute, ...).
    pub action: String,
    /// What the claim applies to (path, endpoint, ...). Supports trailing
    /// wildcard patterns at query time.
    pub resource: String,
    /// Boundaries on applicability.
    #[serde(default)]
    pub scope: Scope,
    /// Opaque key-value conditions, preserved verbatim. Only
    /// `delegates_to`, `revokes`, and `supersedes` are currently
    /// meaningful; each names a single claim and triggers edge creation.
    #[serde(default)]
    pub conditions: Map<String, Value>,
    /// The authority source this claim derives from.
    pub source_id: String,
}

impl Claim {
    /// Reads a single-claim-ID condition value, if present and a string.
    #[must_use]
    pub fn condition_str(&self, key: &str) -> Option<&str> {
        self.conditions.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_type_round_trips_through_str() {
        for (s, t) in [
            ("permission", ClaimType::Permission),
            ("prohibition", ClaimType::Prohibition),
            ("obligation", ClaimType::Obligation),
            ("delegation", ClaimType::Delegation),
        ] {
            assert_eq!(s.parse::<ClaimType>(), Ok(t));
            assert_eq!(t.as_str(), s);
        }
    }

    #[test]
    fn claim_type_parse_is_case_sensitive() {
        assert!("Permission".parse::<ClaimType>().is_err());
        assert!("PROHIBITION".parse::<ClaimType>().is_err());
        assert!("grant".parse::<ClaimType>().is_err());
    }

    #[test]
    fn condition_str_ignores_non_string_values() {
        let mut conditions = Map::new();
        conditions.insert(CONDITION_REVOKES.to_string(), Value::from(42));
        let claim = Claim {
            id: "c1".to_string(),
            claim_type: ClaimType::Permission,
            subject: "s".to_string(),
            action: "a".to_string(),
            resource: "r".to_string(),
            scope: Scope::default(),
            conditions,
            source_id: "src".to_string(),
        };
        assert_eq!(claim.condition_str(CONDITION_REVOKES), None);
    }
}
