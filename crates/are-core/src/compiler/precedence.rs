//! The precedence key: a strictly ordered tuple selecting conflict winners.
//!
//! Keys compare lexicographically and the minimum wins. Components, in
//! order: authority rank of the claim's source, the source's parsed
//! version triple (ascending, so lower versions win), the claim's
//! delegation depth (closer to root wins), and the negated scope
//! specificity (more specific wins).

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{AuthorityGraph, AuthoritySource, Claim, EdgeType};

/// Sentinel depth for a delegation walk that revisits a node. Cannot occur
/// on a validated artifact.
const CYCLE_DEPTH: u32 = 999;

/// Semantic-version pattern: optional leading `v`, one to three decimal
/// components, optional pre-release and build metadata (both ignored for
/// ordering).
static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:-([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?$",
    )
    .expect("VERSION_REGEX should compile")
});

/// The comparable tuple used to select a single winner among conflicting
/// claims. Derived ordering is lexicographic over the field order; smaller
/// keys win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct PrecedenceKey {
    /// Authority rank of the claim's source (Sovereign = 0).
    authority_order: u8,
    /// `(major, minor, patch)` parsed from the source version. Compared
    /// ascending: lower triples win ties on authority rank.
    version: (u64, u64, u64),
    /// Length of the `Delegates` chain terminating at this claim.
    delegation_depth: u32,
    /// Negated scope specificity, so more specific claims sort first.
    negated_specificity: i64,
}

impl PrecedenceKey {
    /// Computes the key for one claim.
    ///
    /// A claim whose source was never registered ranks with authority
    /// order 0 and version `(0, 0, 0)`, mirroring the zero-value source
    /// the reference resolver would read.
    pub(crate) fn compute(
        claim: &Claim,
        sources: &HashMap<String, AuthoritySource>,
        graph: &AuthorityGraph,
    ) -> Self {
        let (authority_order, version) = sources.get(&claim.source_id).map_or(
            (0, (0, 0, 0)),
            |source| (source.source_type.order(), parse_version(&source.version)),
        );

        Self {
            authority_order,
            version,
            delegation_depth: delegation_depth(claim, graph),
            negated_specificity: -claim.scope.specificity(),
        }
    }
}

/// Parses a version string into a `(major, minor, patch)` triple.
///
/// Missing components default to zero; pre-release and build metadata are
/// ignored. Empty or unparseable strings collapse to `(0, 0, 0)`.
pub(crate) fn parse_version(version: &str) -> (u64, u64, u64) {
    let Some(captures) = VERSION_REGEX.captures(version) else {
        return (0, 0, 0);
    };

    let component = |i: usize| {
        captures
            .get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    (component(1), component(2), component(3))
}

/// Length of the delegation chain terminating at `claim`, measured by
/// walking incoming `Delegates` edges toward the root.
///
/// Each step follows the first incoming edge in the graph's sorted edge
/// order, matching the deterministic edge layout produced by
/// normalization.
fn delegation_depth(claim: &Claim, graph: &AuthorityGraph) -> u32 {
    let mut depth = 0;
    let mut current: &str = &claim.id;
    let mut visited = HashSet::new();

    loop {
        if !visited.insert(current) {
            return CYCLE_DEPTH;
        }

        let parent = graph
            .edges
            .iter()
            .find(|edge| edge.to_id == current && edge.edge_type == EdgeType::Delegates)
            .map(|edge| edge.from_id.as_str());

        match parent {
            Some(parent) => {
                depth += 1;
                current = parent;
            },
            None => return depth,
        }
    }
}
