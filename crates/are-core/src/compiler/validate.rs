//! Stage 2: structural invariant validation.
//!
//! Checks, in order: the nodes table exists, every claim is a well-formed
//! node of the graph, claim IDs are unique, delegations stay
//! scope-contained within their delegators, every edge endpoint resolves,
//! and the full edge graph is acyclic over all edge types.

use std::collections::{BTreeMap, HashSet};

use crate::error::CompileError;
use crate::model::{AuthorityArtifact, AuthorityGraph, Claim, ClaimType, EdgeType};

/// Validates an artifact against the structural invariants.
///
/// An empty artifact with an initialized empty graph is valid; an artifact
/// whose nodes table is missing is not.
///
/// # Errors
///
/// Returns the first violated invariant as a [`CompileError`].
pub(crate) fn validate_artifact(artifact: &AuthorityArtifact) -> Result<(), CompileError> {
    let Some(nodes) = artifact.graph.nodes.as_ref() else {
        return Err(CompileError::NilGraph);
    };

    if artifact.claims.is_empty() && nodes.is_empty() {
        return Ok(());
    }

    let mut seen_ids = HashSet::new();
    for claim in &artifact.claims {
        validate_claim(claim, &artifact.graph)?;
        if !seen_ids.insert(claim.id.as_str()) {
            return Err(CompileError::InvalidClaimField {
                field: "id".to_string(),
                reason: format!("duplicate claim ID: {}", claim.id),
            });
        }
        if !nodes.contains_key(&claim.id) {
            return Err(CompileError::InvalidEdgeReference {
                node_id: claim.id.clone(),
            });
        }
    }

    validate_graph(&artifact.graph, nodes)?;
    Ok(())
}

/// Per-claim checks: required fields are non-empty, and delegation claims
/// stay within their delegator's scope.
fn validate_claim(claim: &Claim, graph: &AuthorityGraph) -> Result<(), CompileError> {
    for (field, value) in [
        ("id", &claim.id),
        ("subject", &claim.subject),
        ("action", &claim.action),
        ("resource", &claim.resource),
        ("source_id", &claim.source_id),
    ] {
        if value.is_empty() {
            return Err(CompileError::InvalidClaimField {
                field: field.to_string(),
                reason: format!("claim {} has empty {field}", claim.id),
            });
        }
    }

    if claim.claim_type == ClaimType::Delegation {
        validate_delegation_scope(claim, graph)?;
    }

    Ok(())
}

/// Finds the delegator (the source of an incoming `Delegates` edge) and
/// checks scope containment. A delegation with no delegator in the graph
/// is a root grant and passes.
fn validate_delegation_scope(
    claim: &Claim,
    graph: &AuthorityGraph,
) -> Result<(), CompileError> {
    let delegator = graph
        .edges
        .iter()
        .find(|edge| edge.to_id == claim.id && edge.edge_type == EdgeType::Delegates)
        .and_then(|edge| graph.node(&edge.from_id));

    if let Some(delegator) = delegator {
        if !claim.scope.is_contained_in(&delegator.scope) {
            return Err(CompileError::DelegationScopeViolation {
                claim_id: claim.id.clone(),
            });
        }
    }

    Ok(())
}

/// Edge integrity plus acyclicity.
fn validate_graph(
    graph: &AuthorityGraph,
    nodes: &BTreeMap<String, Claim>,
) -> Result<(), CompileError> {
    for edge in &graph.edges {
        for endpoint in [&edge.from_id, &edge.to_id] {
            if !nodes.contains_key(endpoint) {
                return Err(CompileError::InvalidEdgeReference {
                    node_id: endpoint.clone(),
                });
            }
        }
    }

    if has_cycles(graph, nodes) {
        return Err(CompileError::CyclicGraph);
    }

    Ok(())
}

/// Depth-first cycle detection over every edge type.
///
/// Nodes are visited in sorted ID order so detection is reproducible. Any
/// node revisited while on the recursion stack signals a cycle.
fn has_cycles(graph: &AuthorityGraph, nodes: &BTreeMap<String, Claim>) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut on_stack: HashSet<&str> = HashSet::new();

    // BTreeMap keys iterate in sorted order already.
    for node_id in nodes.keys() {
        if !visited.contains(node_id.as_str())
            && visit(node_id, graph, &mut visited, &mut on_stack)
        {
            return true;
        }
    }
    false
}

fn visit<'a>(
    node_id: &'a str,
    graph: &'a AuthorityGraph,
    visited: &mut HashSet<&'a str>,
    on_stack: &mut HashSet<&'a str>,
) -> bool {
    visited.insert(node_id);
    on_stack.insert(node_id);

    for edge in &graph.edges {
        if edge.from_id != node_id {
            continue;
        }
        let neighbor = edge.to_id.as_str();
        if !visited.contains(neighbor) {
            if visit(neighbor, graph, visited, on_stack) {
                return true;
            }
        } else if on_stack.contains(neighbor) {
            return true;
        }
    }

    on_stack.remove(node_id);
    false
}
