//! The authority compiler: a five-stage pipeline from source to artifact.
//!
//! [`AuthorityCompiler`] owns the only shared mutable state in the engine,
//! a source table keyed by source ID (last-writer-wins) that the conflict
//! resolver consults for precedence ranking. The pipeline itself is
//! synchronous and single-threaded per invocation; the compiler may be
//! shared across threads.

mod normalize;
mod precedence;
mod proof;
mod resolve;
mod validate;

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::error::CompileError;
use crate::model::{
    AuthorityArtifact, AuthorityGraph, AuthoritySource, CompilationFailure,
    CompilationOutcome, FailureStage,
};

/// Transforms authority sources into compiled, verifiable artifacts.
///
/// Thread-safe: the source table is guarded by a reader-writer lock.
/// Writers (normalization) hold the write lock only to insert one entry;
/// readers (precedence resolution) copy the table under the read lock and
/// release it before doing any work.
#[derive(Debug, Default)]
pub struct AuthorityCompiler {
    sources: RwLock<HashMap<String, AuthoritySource>>,
}

impl AuthorityCompiler {
    /// Creates a compiler with an empty source table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source's identity and mints an empty artifact for it.
    ///
    /// This is the cheap admission probe: it verifies the source has an
    /// identity without touching its claim payload. Full compilation goes
    /// through [`process`](Self::process).
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::EmptySourceId`] if the source has no ID.
    pub fn ingest(&self, source: &AuthoritySource) -> Result<AuthorityArtifact, CompileError> {
        if source.id.is_empty() {
            return Err(CompileError::EmptySourceId);
        }

        Ok(AuthorityArtifact {
            id: Uuid::new_v4(),
            source_id: source.id.clone(),
            claims: Vec::new(),
            graph: AuthorityGraph::empty(),
            generated_at: Utc::now(),
        })
    }

    /// Stage 1: normalizes a source into a fresh artifact.
    ///
    /// Registers the source under its ID for later precedence lookup
    /// (last-writer-wins), parses its claim payload, and builds the
    /// initial graph.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Cancelled`] if the token is already
    /// cancelled, [`CompileError::EmptySourceId`] for an unidentified
    /// source, or the first claim parse error.
    pub fn normalize(
        &self,
        source: &AuthoritySource,
        cancel: &CancelToken,
    ) -> Result<AuthorityArtifact, CompileError> {
        if cancel.is_cancelled() {
            return Err(CompileError::Cancelled);
        }

        if source.id.is_empty() {
            return Err(CompileError::EmptySourceId);
        }

        self.sources
            .write()
            .expect("lock poisoned")
            .insert(source.id.clone(), source.clone());

        let claims = normalize::parse_claims(source)?;
        let graph = normalize::build_graph(&claims);

        Ok(AuthorityArtifact {
            id: Uuid::new_v4(),
            source_id: source.id.clone(),
            claims,
            graph,
            generated_at: Utc::now(),
        })
    }

    /// Stage 2: validates the artifact's structural invariants.
    ///
    /// Check order: initialized nodes table, per-claim required fields,
    /// claim-ID uniqueness, delegation scope containment, edge endpoint
    /// integrity, acyclicity over all edge types.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self, artifact: &AuthorityArtifact) -> Result<(), CompileError> {
        validate::validate_artifact(artifact)
    }

    /// Stage 3: applies revocations and supersessions, then resolves the
    /// remaining conflicts via the precedence key (fail-closed).
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Cancelled`] if the token is already
    /// cancelled, or [`CompileError::UnresolvableConflict`] when a group
    /// yields no single winner.
    pub fn resolve_conflicts(
        &self,
        artifact: AuthorityArtifact,
        cancel: &CancelToken,
    ) -> Result<AuthorityArtifact, CompileError> {
        if cancel.is_cancelled() {
            return Err(CompileError::Cancelled);
        }

        // Copy the table so the read lock is released before key
        // computation.
        let sources = self.sources.read().expect("lock poisoned").clone();
        resolve::resolve_conflicts(artifact, &sources)
    }

    /// Stage 4a: generates enforcement artifacts.
    ///
    /// Identity today; reserved for enforcement-target code generation.
    #[must_use]
    pub fn compile(&self, artifact: AuthorityArtifact) -> AuthorityArtifact {
        artifact
    }

    /// Stage 4b: attaches compiled artifacts to downstream systems.
    ///
    /// Identity today; reserved alongside [`compile`](Self::compile).
    pub fn bind(&self, _artifact: &AuthorityArtifact) {}

    /// Stage 5: emits the canonical proof document.
    ///
    /// The output is deterministic: key-sorted, two-space-indented JSON
    /// whose bytes depend only on the artifact's fields.
    #[must_use]
    pub fn emit_proof(&self, artifact: &AuthorityArtifact) -> String {
        proof::emit_proof(artifact)
    }

    /// Runs the full pipeline with a never-cancelled token.
    #[must_use]
    pub fn process(&self, source: AuthoritySource) -> CompilationOutcome {
        self.process_with_cancel(source, &CancelToken::new())
    }

    /// Runs Normalize → Validate → Resolve → Compile → Bind → Emit.
    ///
    /// The first stage error is converted into a fail-closed
    /// [`CompilationFailure`]; success returns the artifact and its proof.
    /// Cancellation is honored at the normalizer and resolver entries
    /// only; past the resolver the pipeline runs to completion.
    #[must_use]
    pub fn process_with_cancel(
        &self,
        source: AuthoritySource,
        cancel: &CancelToken,
    ) -> CompilationOutcome {
        info!(source_id = %source.id, "starting compilation");

        let artifact = match self.normalize(&source, cancel) {
            Ok(artifact) => artifact,
            Err(err) => {
                error!(source_id = %source.id, error = %err, "normalization failed");
                return fail(FailureStage::Normalization, &err, Vec::new());
            },
        };
        info!(
            source_id = %source.id,
            claims = artifact.claims.len(),
            "normalized claims"
        );

        if let Err(err) = self.validate(&artifact) {
            error!(artifact_id = %artifact.id, error = %err, "validation failed");
            return fail(FailureStage::Validation, &err, artifact.sorted_claim_ids());
        }

        // The resolver consumes the artifact; keep the IDs for failure
        // reporting.
        let claim_ids = artifact.sorted_claim_ids();
        let artifact = match self.resolve_conflicts(artifact, cancel) {
            Ok(artifact) => artifact,
            Err(err) => {
                error!(source_id = %source.id, error = %err, "conflict resolution failed");
                return fail(FailureStage::Resolution, &err, claim_ids);
            },
        };
        info!(
            artifact_id = %artifact.id,
            claims = artifact.claims.len(),
            "conflict resolution complete"
        );

        let artifact = self.compile(artifact);
        self.bind(&artifact);
        let proof = self.emit_proof(&artifact);

        info!(artifact_id = %artifact.id, "compilation successful");
        CompilationOutcome::Success { artifact, proof }
    }

    /// Snapshot of the registered sources, for diagnostics.
    #[must_use]
    pub fn registered_source_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sources
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

fn fail(
    stage: FailureStage,
    err: &CompileError,
    involved_claim_ids: Vec<String>,
) -> CompilationOutcome {
    CompilationOutcome::Failure(CompilationFailure {
        failure_stage: stage,
        violated_invariant: err.to_string(),
        involved_claim_ids,
        fail_closed: true,
    })
}
