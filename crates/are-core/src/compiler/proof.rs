//! Stage 5: canonical proof emission.
//!
//! The proof is a key-sorted, two-space-indented JSON document summarizing
//! the finalized artifact. Claims are listed sorted by ID regardless of
//! their order in the artifact, so two compilations of field-equal
//! artifacts emit byte-identical proofs modulo the freshly-generated
//! `artifact_id` and `generated_at` values.

use chrono::SecondsFormat;
use serde_json::{json, Map, Value};

use crate::model::AuthorityArtifact;

/// Emits the canonical proof document for an artifact.
///
/// `serde_json`'s default object map is ordered, so every object in the
/// document serializes with lexicographically sorted keys; pretty-printing
/// uses two-space indentation.
#[must_use]
pub(crate) fn emit_proof(artifact: &AuthorityArtifact) -> String {
    let mut sorted_claims: Vec<_> = artifact.claims.iter().collect();
    sorted_claims.sort_by(|a, b| a.id.cmp(&b.id));

    let claims: Vec<Value> = sorted_claims
        .into_iter()
        .map(|claim| {
            json!({
                "action": claim.action,
                "id": claim.id,
                "resource": claim.resource,
                "source_id": claim.source_id,
                "subject": claim.subject,
                "type": claim.claim_type.as_str(),
            })
        })
        .collect();

    let mut document = Map::new();
    document.insert("artifact_id".to_string(), json!(artifact.id.to_string()));
    document.insert("claims".to_string(), Value::Array(claims));
    document.insert("claims_count".to_string(), json!(artifact.claims.len()));
    document.insert(
        "generated_at".to_string(),
        json!(artifact
            .generated_at
            .to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    document.insert(
        "graph".to_string(),
        json!({
            "edges": artifact.graph.edges.len(),
            "nodes": artifact.graph.node_count(),
        }),
    );
    document.insert("source_id".to_string(), json!(artifact.source_id));

    serde_json::to_string_pretty(&Value::Object(document))
        .expect("proof document contains no non-serializable values")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::compiler::normalize::build_graph;
    use crate::model::{Claim, ClaimType, Scope};

    fn claim(id: &str, resource: &str) -> Claim {
        Claim {
            id: id.to_string(),
            claim_type: ClaimType::Permission,
            subject: "user".to_string(),
            action: "read".to_string(),
            resource: resource.to_string(),
            scope: Scope::default(),
            conditions: serde_json::Map::new(),
            source_id: "src".to_string(),
        }
    }

    fn artifact_of(claims: Vec<Claim>) -> AuthorityArtifact {
        let graph = build_graph(&claims);
        AuthorityArtifact {
            id: Uuid::nil(),
            source_id: "src".to_string(),
            claims,
            graph,
            generated_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn proof_lists_claims_sorted_by_id() {
        let proof = emit_proof(&artifact_of(vec![claim("claim_b", "/b"), claim("claim_a", "/a")]));
        let a_pos = proof.find("claim_a").unwrap();
        let b_pos = proof.find("claim_b").unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn proof_keys_are_lexicographically_sorted() {
        let proof = emit_proof(&artifact_of(vec![claim("c1", "/r")]));
        let artifact_id_pos = proof.find("artifact_id").unwrap();
        let claims_pos = proof.find("\"claims\"").unwrap();
        let generated_pos = proof.find("generated_at").unwrap();
        let source_pos = proof.find("\"source_id\"").unwrap();
        assert!(artifact_id_pos < claims_pos);
        assert!(claims_pos < generated_pos);
        assert!(generated_pos < source_pos);
    }

    #[test]
    fn proof_is_byte_stable_for_equal_artifacts() {
        let one = emit_proof(&artifact_of(vec![claim("c1", "/r"), claim("c2", "/r2")]));
        let two = emit_proof(&artifact_of(vec![claim("c2", "/r2"), claim("c1", "/r")]));
        assert_eq!(one, two);
    }

    #[test]
    fn proof_counts_and_timestamp_format() {
        let proof = emit_proof(&artifact_of(vec![claim("c1", "/r")]));
        assert!(proof.contains(r#""claims_count": 1"#));
        assert!(proof.contains(r#""generated_at": "2024-06-01T12:00:00Z""#));
        assert!(proof.contains(r#""nodes": 1"#));
    }
}
