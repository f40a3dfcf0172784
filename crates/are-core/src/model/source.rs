//! Authority sources and their precedence-bearing types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The legitimacy origin of a body of claims.
///
/// Authority types are strictly ordered: sovereign > legal > regulatory >
/// organizational > contractual. The ordering feeds the first component of
/// the conflict-resolution precedence key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityType {
    /// Sovereign mandate; highest precedence.
    Sovereign,
    /// Statute law.
    Legal,
    /// Regulatory instrument.
    Regulatory,
    /// Organizational policy.
    Organizational,
    /// Contractual obligation; lowest precedence.
    Contractual,
}

impl AuthorityType {
    /// Precedence rank of this authority type. Lower ranks win.
    #[must_use]
    pub const fn order(self) -> u8 {
        match self {
            Self::Sovereign => 0,
            Self::Legal => 1,
            Self::Regulatory => 2,
            Self::Organizational => 3,
            Self::Contractual => 4,
        }
    }
}

/// An immutable reference object defining where a body of claims derives
/// its legitimacy.
///
/// The `metadata` table may carry a `"claims"` key whose value is a
/// sequence of claim records; the normalizer extracts and parses those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthoritySource {
    /// Unique source identifier. Registration is last-writer-wins on this
    /// key.
    pub id: String,
    /// The authority type, used for precedence ranking.
    #[serde(rename = "type")]
    pub source_type: AuthorityType,
    /// Human-readable name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Semantic-version string (`1.2.3`, `v2.0.0-beta`, ...).
    #[serde(default)]
    pub version: String,
    /// Opaque metadata; `metadata["claims"]` carries raw claim payloads.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_order_is_strict() {
        assert!(AuthorityType::Sovereign.order() < AuthorityType::Legal.order());
        assert!(AuthorityType::Legal.order() < AuthorityType::Regulatory.order());
        assert!(AuthorityType::Regulatory.order() < AuthorityType::Organizational.order());
        assert!(AuthorityType::Organizational.order() < AuthorityType::Contractual.order());
    }

    #[test]
    fn authority_type_serializes_snake_case() {
        let json = serde_json::to_string(&AuthorityType::Organizational).unwrap();
        assert_eq!(json, r#""organizational""#);
        let back: AuthorityType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AuthorityType::Organizational);
    }
}
