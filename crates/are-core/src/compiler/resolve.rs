//! Stage 3: revocation, supersession, and conflict resolution.
//!
//! Order of operations: revocation edges drop their targets, supersession
//! edges drop theirs, and the remaining Permission/Prohibition claims are
//! grouped by `(subject, action, resource)`. Every group with more than
//! one member is a conflict (including same-type duplicates, so ambiguity
//! is surfaced rather than silently carried) and exactly one winner
//! survives per group, selected by the precedence key.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::error::CompileError;
use crate::model::{AuthorityArtifact, AuthoritySource, Claim, ClaimType, EdgeType};

use super::normalize::build_graph;
use super::precedence::PrecedenceKey;

/// Drops every claim targeted by a `Revokes` edge. A claim both revoked
/// and referenced elsewhere is removed unconditionally.
pub(crate) fn apply_revocations(artifact: &mut AuthorityArtifact) {
    drop_edge_targets(artifact, EdgeType::Revokes);
}

/// Drops every claim targeted by a `Supersedes` edge.
pub(crate) fn apply_supersessions(artifact: &mut AuthorityArtifact) {
    drop_edge_targets(artifact, EdgeType::Supersedes);
}

fn drop_edge_targets(artifact: &mut AuthorityArtifact, edge_type: EdgeType) {
    let dropped: HashSet<&str> = artifact
        .graph
        .edges
        .iter()
        .filter(|edge| edge.edge_type == edge_type)
        .map(|edge| edge.to_id.as_str())
        .collect();

    if dropped.is_empty() {
        return;
    }

    let claims = std::mem::take(&mut artifact.claims);
    artifact.claims = claims
        .into_iter()
        .filter(|claim| !dropped.contains(claim.id.as_str()))
        .collect();
}

/// Partitions Permission/Prohibition claims into conflict groups keyed by
/// `(subject, action, resource)`. Delegation and Obligation claims never
/// participate. Groups come back in sorted key order for deterministic
/// resolution.
pub(crate) fn find_conflicts(claims: &[Claim]) -> Vec<Vec<Claim>> {
    let mut grouped: BTreeMap<(String, String, String), Vec<Claim>> = BTreeMap::new();

    for claim in claims {
        if matches!(
            claim.claim_type,
            ClaimType::Delegation | ClaimType::Obligation
        ) {
            continue;
        }
        grouped
            .entry((
                claim.subject.clone(),
                claim.action.clone(),
                claim.resource.clone(),
            ))
            .or_default()
            .push(claim.clone());
    }

    grouped
        .into_values()
        .filter(|group| group.len() > 1)
        .collect()
}

/// Resolves all conflicts in a validated artifact.
///
/// The precedence keys are computed against the artifact's graph as of
/// entry (the normalizer's layout), so delegation depth reflects the full
/// pre-resolution edge set. The graph is rebuilt over the survivors at the
/// end, preserving only edges whose endpoints still exist.
///
/// # Errors
///
/// Returns [`CompileError::UnresolvableConflict`] if a conflict group
/// yields no single winner.
pub(crate) fn resolve_conflicts(
    mut artifact: AuthorityArtifact,
    sources: &HashMap<String, AuthoritySource>,
) -> Result<AuthorityArtifact, CompileError> {
    apply_revocations(&mut artifact);
    apply_supersessions(&mut artifact);

    let mut losers: HashSet<String> = HashSet::new();
    for group in find_conflicts(&artifact.claims) {
        let winner = select_winner(&group, sources, &artifact)?;
        debug!(
            winner = %winner,
            group_size = group.len(),
            "resolved conflict group"
        );
        losers.extend(
            group
                .iter()
                .filter(|claim| claim.id != winner)
                .map(|claim| claim.id.clone()),
        );
    }

    if !losers.is_empty() {
        artifact.claims.retain(|claim| !losers.contains(&claim.id));
    }

    artifact.graph = build_graph(&artifact.claims);
    Ok(artifact)
}

/// Selects the conflict winner: the group member with the minimum
/// precedence key, ties broken by input order (stable sort).
///
/// Returns the winner's claim ID, or fails closed if the group is empty
/// and no winner exists.
fn select_winner(
    group: &[Claim],
    sources: &HashMap<String, AuthoritySource>,
    artifact: &AuthorityArtifact,
) -> Result<String, CompileError> {
    let mut ranked: Vec<(PrecedenceKey, &Claim)> = group
        .iter()
        .map(|claim| (PrecedenceKey::compute(claim, sources, &artifact.graph), claim))
        .collect();
    ranked.sort_by(|a, b| a.0.cmp(&b.0));

    match ranked.first() {
        Some((_, winner)) => Ok(winner.id.clone()),
        None => {
            let mut claim_ids: Vec<String> =
                group.iter().map(|claim| claim.id.clone()).collect();
            claim_ids.sort();
            Err(CompileError::UnresolvableConflict { claim_ids })
        },
    }
}
