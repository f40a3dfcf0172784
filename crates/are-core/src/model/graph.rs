//! The authority graph: claims as nodes, typed directed edges.
//!
//! Edges are plain data, never object references. The claim list and the
//! node table both key on claim IDs, so acyclicity is a pure data property
//! checked by the validator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::claim::Claim;

/// Relationship type between two claims. Directional.
///
/// The derived ordering (declaration order) matches the lexicographic
/// ordering of the snake_case string forms, so edge sorting is stable
/// across representations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// `from` delegates authority to `to`.
    Delegates,
    /// `from` revokes `to`.
    Revokes,
    /// `from` supersedes `to`.
    Supersedes,
}

/// A directed edge between two claims.
///
/// Both endpoints must resolve to nodes in the owning graph; the validator
/// rejects dangling references.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Edge {
    /// Source claim ID.
    pub from_id: String,
    /// Target claim ID.
    pub to_id: String,
    /// Relationship type.
    pub edge_type: EdgeType,
}

/// The directed graph over one artifact's claims.
///
/// `nodes` is optional on purpose: a `None` table is the `NilGraph`
/// validation failure, distinct from an initialized empty table (which is
/// valid). The map is a `BTreeMap` so iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorityGraph {
    /// Claim nodes keyed by claim ID. `None` means the graph was never
    /// constructed.
    pub nodes: Option<BTreeMap<String, Claim>>,
    /// Directed edges, sorted by `(from_id, to_id, edge_type)`.
    pub edges: Vec<Edge>,
}

impl AuthorityGraph {
    /// An initialized graph with no nodes and no edges.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            nodes: Some(BTreeMap::new()),
            edges: Vec::new(),
        }
    }

    /// Number of nodes, or 0 when the table is missing.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.as_ref().map_or(0, BTreeMap::len)
    }

    /// Looks up a node by claim ID.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Claim> {
        self.nodes.as_ref().and_then(|nodes| nodes.get(id))
    }
}
