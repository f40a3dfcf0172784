//! Read-only runtime queries over a compiled artifact.
//!
//! Responses are advisory reflections of compiled authority; enforcing
//! systems must apply constraints independently. Queries never raise:
//! absence of authority renders as a deny decision with the artifact as
//! the answering authority.

mod matcher;

use std::sync::RwLock;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{AuthorityArtifact, Claim, ClaimType, Scope};

/// Reason attached to a prohibition-backed deny.
const REASON_PROHIBITED: &str = "prohibited by authority";
/// Reason attached to a permission-backed allow.
const REASON_PERMITTED: &str = "permitted by authority";
/// Reason attached to the fail-closed default deny.
const REASON_NO_AUTHORITY: &str = "no applicable authority found - failing closed";

/// A scope rendered for query responses: RFC-3339 strings for present
/// time bounds, `null` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSummary {
    /// Jurisdictions the claim applies in; empty means all.
    pub jurisdictions: Vec<String>,
    /// Operations the claim covers; empty means all.
    pub operations: Vec<String>,
    /// Start bound, RFC-3339, if present.
    pub time_start: Option<String>,
    /// End bound, RFC-3339, if present.
    pub time_end: Option<String>,
}

impl From<&Scope> for ScopeSummary {
    fn from(scope: &Scope) -> Self {
        let render = |t: &chrono::DateTime<chrono::Utc>| {
            t.to_rfc3339_opts(SecondsFormat::Secs, true)
        };
        Self {
            jurisdictions: scope.jurisdictions.clone(),
            operations: scope.operations.clone(),
            time_start: scope.time_start.as_ref().map(render),
            time_end: scope.time_end.as_ref().map(render),
        }
    }
}

/// The advisory answer to an `is_authorized` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationDecision {
    /// Whether the action is allowed.
    pub allowed: bool,
    /// The claim that decided the answer, or the artifact ID for the
    /// fail-closed default.
    pub authority_id: String,
    /// Human-readable grounds for the decision.
    pub reason: String,
    /// The deciding claim's scope; empty for the fail-closed default.
    pub scope: ScopeSummary,
}

/// One obligation applying to a query context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObligationRecord {
    /// The obligation claim's ID.
    pub claim_id: String,
    /// The obliged action.
    pub action: String,
    /// The obligation's scope.
    pub scope: ScopeSummary,
    /// The obligation's conditions, verbatim.
    pub conditions: Map<String, Value>,
}

/// One claim matching a query, as reported by `get_authority_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicableClaim {
    /// Claim ID.
    pub id: String,
    /// Claim type.
    #[serde(rename = "type")]
    pub claim_type: ClaimType,
    /// The claim's scope.
    pub scope: ScopeSummary,
    /// The claim's conditions, verbatim.
    pub conditions: Map<String, Value>,
}

/// Everything known about which authority applies to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityInfo {
    /// The queried artifact's ID.
    pub artifact_id: String,
    /// Every claim whose pattern matches the query, any type.
    pub applicable_claims: Vec<ApplicableClaim>,
    /// Total claims in the artifact, matched or not.
    pub total_claims: usize,
}

/// A read-only view over one compiled artifact.
///
/// Holds the artifact by value behind a read lock (no current operation
/// writes; the lock future-proofs the interface for artifact swapping).
#[derive(Debug)]
pub struct RuntimeInterface {
    artifact: RwLock<AuthorityArtifact>,
}

impl RuntimeInterface {
    /// Wraps a compiled artifact for querying.
    #[must_use]
    pub fn new(artifact: AuthorityArtifact) -> Self {
        Self {
            artifact: RwLock::new(artifact),
        }
    }

    /// Answers "may `subject` perform `action` on `resource`?".
    ///
    /// Collects pattern-matching claims; any Prohibition denies, else any
    /// Permission allows, else the default is deny (fail closed).
    /// Prohibition strictly dominates Permission.
    #[must_use]
    pub fn is_authorized(
        &self,
        subject: &str,
        action: &str,
        resource: &str,
    ) -> AuthorizationDecision {
        let artifact = self.artifact.read().expect("lock poisoned");
        let applicable: Vec<&Claim> = artifact
            .claims
            .iter()
            .filter(|claim| Self::claim_matches(claim, subject, action, resource))
            .collect();

        if let Some(prohibition) = applicable
            .iter()
            .find(|claim| claim.claim_type == ClaimType::Prohibition)
        {
            return AuthorizationDecision {
                allowed: false,
                authority_id: prohibition.id.clone(),
                reason: REASON_PROHIBITED.to_string(),
                scope: ScopeSummary::from(&prohibition.scope),
            };
        }

        if let Some(permission) = applicable
            .iter()
            .find(|claim| claim.claim_type == ClaimType::Permission)
        {
            return AuthorizationDecision {
                allowed: true,
                authority_id: permission.id.clone(),
                reason: REASON_PERMITTED.to_string(),
                scope: ScopeSummary::from(&permission.scope),
            };
        }

        AuthorizationDecision {
            allowed: false,
            authority_id: artifact.id.to_string(),
            reason: REASON_NO_AUTHORITY.to_string(),
            scope: ScopeSummary::default(),
        }
    }

    /// Every Obligation claim matching the query context.
    #[must_use]
    pub fn get_obligations(
        &self,
        subject: &str,
        action: &str,
        resource: &str,
    ) -> Vec<ObligationRecord> {
        let artifact = self.artifact.read().expect("lock poisoned");
        artifact
            .claims
            .iter()
            .filter(|claim| claim.claim_type == ClaimType::Obligation)
            .filter(|claim| Self::claim_matches(claim, subject, action, resource))
            .map(|claim| ObligationRecord {
                claim_id: claim.id.clone(),
                action: claim.action.clone(),
                scope: ScopeSummary::from(&claim.scope),
                conditions: claim.conditions.clone(),
            })
            .collect()
    }

    /// Every matching claim of any type, with artifact context.
    #[must_use]
    pub fn get_authority_info(
        &self,
        subject: &str,
        action: &str,
        resource: &str,
    ) -> AuthorityInfo {
        let artifact = self.artifact.read().expect("lock poisoned");
        let applicable_claims = artifact
            .claims
            .iter()
            .filter(|claim| Self::claim_matches(claim, subject, action, resource))
            .map(|claim| ApplicableClaim {
                id: claim.id.clone(),
                claim_type: claim.claim_type,
                scope: ScopeSummary::from(&claim.scope),
                conditions: claim.conditions.clone(),
            })
            .collect();

        AuthorityInfo {
            artifact_id: artifact.id.to_string(),
            applicable_claims,
            total_claims: artifact.claims.len(),
        }
    }

    /// A copy of the underlying artifact.
    #[must_use]
    pub fn artifact(&self) -> AuthorityArtifact {
        self.artifact.read().expect("lock poisoned").clone()
    }

    fn claim_matches(claim: &Claim, subject: &str, action: &str, resource: &str) -> bool {
        matcher::matches(&claim.subject, subject)
            && matcher::matches(&claim.action, action)
            && matcher::matches(&claim.resource, resource)
    }
}
