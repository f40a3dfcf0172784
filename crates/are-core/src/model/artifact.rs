//! Compiled artifacts and pipeline outcomes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::claim::Claim;
use super::graph::AuthorityGraph;

/// The compiled output binding downstream systems to authority.
///
/// An artifact exists from the moment the normalizer emits it until the
/// caller discards it. It is never mutated after emission; stages consume
/// an artifact and return a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityArtifact {
    /// Freshly minted identity, new on every compilation.
    pub id: Uuid,
    /// The source this artifact was compiled from.
    pub source_id: String,
    /// Surviving claims, in normalization order.
    pub claims: Vec<Claim>,
    /// The claim graph. Always initialized by the normalizer.
    pub graph: AuthorityGraph,
    /// UTC instant of normalization.
    pub generated_at: DateTime<Utc>,
}

impl AuthorityArtifact {
    /// All claim IDs, sorted, for deterministic failure reporting.
    #[must_use]
    pub fn sorted_claim_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.claims.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        ids
    }
}

/// The pipeline stage at which compilation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Claim parsing or graph construction rejected the source.
    Normalization,
    /// A structural invariant does not hold.
    Validation,
    /// Conflict resolution could not select a winner.
    Resolution,
}

impl FailureStage {
    /// The canonical stage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normalization => "normalization",
            Self::Validation => "validation",
            Self::Resolution => "resolution",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fail-closed compilation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationFailure {
    /// Where the pipeline stopped.
    pub failure_stage: FailureStage,
    /// Human text naming the violated invariant.
    pub violated_invariant: String,
    /// Sorted IDs of the claims that participated.
    pub involved_claim_ids: Vec<String>,
    /// Always `true`: ambiguity never degrades to a permissive default.
    pub fail_closed: bool,
}

/// The result of one pipeline invocation. Callers dispatch exhaustively;
/// failure is never conflated with an absent success.
#[derive(Debug, Clone, PartialEq)]
pub enum CompilationOutcome {
    /// The artifact compiled and a canonical proof was emitted.
    Success {
        /// The compiled artifact.
        artifact: AuthorityArtifact,
        /// The canonical, byte-stable proof document.
        proof: String,
    },
    /// An invariant was violated; nothing was emitted.
    Failure(CompilationFailure),
}

impl CompilationOutcome {
    /// Returns the artifact and proof, or `None` on failure.
    #[must_use]
    pub fn success(self) -> Option<(AuthorityArtifact, String)> {
        match self {
            Self::Success { artifact, proof } => Some((artifact, proof)),
            Self::Failure(_) => None,
        }
    }

    /// Returns the failure, or `None` on success.
    #[must_use]
    pub fn failure(self) -> Option<CompilationFailure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_stage_names_are_canonical() {
        assert_eq!(FailureStage::Normalization.to_string(), "normalization");
        assert_eq!(FailureStage::Validation.to_string(), "validation");
        assert_eq!(FailureStage::Resolution.to_string(), "resolution");
    }

    #[test]
    fn sorted_claim_ids_sorts() {
        let mut artifact = AuthorityArtifact {
            id: Uuid::nil(),
            source_id: "src".to_string(),
            claims: Vec::new(),
            graph: AuthorityGraph::empty(),
            generated_at: Utc::now(),
        };
        for id in ["z", "a", "m"] {
            artifact.claims.push(Claim {
                id: id.to_string(),
                claim_type: crate::model::ClaimType::Permission,
                subject: "s".to_string(),
                action: "a".to_string(),
                resource: "r".to_string(),
                scope: crate::model::Scope::default(),
                conditions: serde_json::Map::new(),
                source_id: "src".to_string(),
            });
        }
        assert_eq!(artifact.sorted_claim_ids(), vec!["a", "m", "z"]);
    }
}
