//! # are-core
//!
//! Core library for the Authority Realization Engine (ARE) - a governance
//! compiler that transforms structured authority sources (laws, regulations,
//! organizational policies, contracts, sovereign mandates) into compiled,
//! verifiable authority artifacts with deterministic proofs.
//!
//! The compiler runs a five-stage pipeline:
//!
//! 1. **Normalize** — parse claim payloads, build the authority graph, mint
//!    artifact identity.
//! 2. **Validate** — assert structural invariants: acyclicity, edge
//!    integrity, delegation scope containment.
//! 3. **Resolve** — apply revocations and supersessions, then select a
//!    single winner per conflict group via a strictly ordered precedence
//!    key.
//! 4. **Compile/Bind** — finalize the artifact (reserved for future
//!    enforcement-target code generation).
//! 5. **Emit proof** — serialize a canonical, byte-stable summary.
//!
//! Every ambiguity fails closed: compilation either produces a
//! [`CompilationOutcome::Success`] with a proof, or a
//! [`CompilationOutcome::Failure`] naming the stage and violated invariant.
//! Runtime queries over a compiled artifact never escalate: absence of
//! authority is a deny decision.
//!
//! ## Example
//!
//! ```
//! use are_core::compiler::AuthorityCompiler;
//! use are_core::model::{AuthoritySource, AuthorityType, CompilationOutcome};
//!
//! let compiler = AuthorityCompiler::new();
//! let source = AuthoritySource {
//!     id: "policy-1".to_string(),
//!     source_type: AuthorityType::Organizational,
//!     name: "Example Policy".to_string(),
//!     description: String::new(),
//!     version: "1.0.0".to_string(),
//!     metadata: serde_json::Map::new(),
//! };
//!
//! match compiler.process(source) {
//!     CompilationOutcome::Success { artifact, proof } => {
//!         assert!(proof.contains(&artifact.source_id));
//!     },
//!     CompilationOutcome::Failure(failure) => {
//!         panic!("unexpected failure: {}", failure.violated_invariant);
//!     },
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cancel;
pub mod compiler;
pub mod error;
pub mod model;
pub mod runtime;

pub use cancel::CancelToken;
pub use compiler::AuthorityCompiler;
pub use error::CompileError;
pub use model::{
    AuthorityArtifact, AuthorityGraph, AuthoritySource, AuthorityType, Claim, ClaimType,
    CompilationFailure, CompilationOutcome, Edge, EdgeType, FailureStage, Scope,
};
pub use runtime::{
    ApplicableClaim, AuthorityInfo, AuthorizationDecision, ObligationRecord, RuntimeInterface,
    ScopeSummary,
};
