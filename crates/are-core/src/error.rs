//! Error taxonomy for the compilation pipeline.
//!
//! Every stage stops at its first error; the pipeline driver wraps that
//! error into a [`CompilationFailure`](crate::model::CompilationFailure)
//! naming the stage. No error is recovered silently and no partial artifact
//! is ever returned.

use thiserror::Error;

/// Errors produced by the compilation pipeline.
///
/// The `Display` strings are part of the public contract: they are carried
/// verbatim as the `violated_invariant` of a failure outcome, and callers
/// match on their content for diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompileError {
    /// A source arrived without an identifier.
    #[error("source ID is empty")]
    EmptySourceId,

    /// A claim record lacks a required field or carries an unknown type.
    #[error("invalid claim field '{field}': {reason}")]
    InvalidClaimField {
        /// The offending field name (`id`, `type`, `subject`, ...).
        field: String,
        /// Why the field was rejected.
        reason: String,
    },

    /// An artifact reached the validator without an initialized nodes
    /// table.
    ///
    /// Distinct from an *empty* graph, which is valid: a missing table
    /// means the artifact never went through graph construction.
    #[error("graph nodes map is missing")]
    NilGraph,

    /// An edge endpoint names a node that does not exist in the graph.
    #[error("edge references non-existent node: {node_id}")]
    InvalidEdgeReference {
        /// The dangling node identifier.
        node_id: String,
    },

    /// A delegation's scope is not contained within its delegator's scope.
    #[error("delegation scope exceeds delegator scope for claim {claim_id}")]
    DelegationScopeViolation {
        /// The delegatee claim whose scope escapes.
        claim_id: String,
    },

    /// The edge graph contains a cycle (over all edge types).
    #[error("authority graph contains cycles")]
    CyclicGraph,

    /// A conflict group yielded no single winner.
    #[error("unresolvable authority conflict for claims {claim_ids:?} - failing closed")]
    UnresolvableConflict {
        /// The claims participating in the conflict, sorted.
        claim_ids: Vec<String>,
    },

    /// A scope's `time_start` is after its `time_end`.
    #[error("invalid scope: time_start must not be after time_end")]
    InvalidScope,

    /// The caller's cancellation signal was observed at a stage entry.
    #[error("compilation cancelled")]
    Cancelled,
}
