//! Stage 1: normalization of a source's claim payload.
//!
//! Parses `metadata["claims"]` into strongly-typed claim records and builds
//! the initial authority graph. Records that are not key-value objects are
//! skipped silently; a record that *is* an object but fails to parse aborts
//! normalization with the first parse error.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::CompileError;
use crate::model::{
    AuthorityGraph, AuthoritySource, Claim, ClaimType, Edge, EdgeType, Scope,
    CONDITION_DELEGATES_TO, CONDITION_REVOKES, CONDITION_SUPERSEDES,
};

/// Metadata key under which a source carries its raw claim records.
pub(crate) const CLAIMS_KEY: &str = "claims";

/// Parses every claim record in the source's metadata.
///
/// Claims come back in input order. A missing or non-array `"claims"`
/// value yields an empty list.
pub(crate) fn parse_claims(source: &AuthoritySource) -> Result<Vec<Claim>, CompileError> {
    let Some(Value::Array(records)) = source.metadata.get(CLAIMS_KEY) else {
        return Ok(Vec::new());
    };

    let mut claims = Vec::new();
    for record in records {
        // Non-object entries in the sequence are not claim records.
        let Value::Object(record) = record else {
            continue;
        };
        claims.push(parse_claim(record, &source.id)?);
    }
    Ok(claims)
}

/// Parses one claim record.
///
/// Requires non-empty `id`, `type`, `subject`, `action`, `resource`;
/// `type` must be one of the four claim types in its case-sensitive string
/// form. `scope` and `conditions` are optional.
fn parse_claim(
    record: &serde_json::Map<String, Value>,
    source_id: &str,
) -> Result<Claim, CompileError> {
    let id = require_string(record, "id")?;
    let type_str = require_string(record, "type")?;
    let claim_type: ClaimType = type_str.parse().map_err(|()| {
        CompileError::InvalidClaimField {
            field: "type".to_string(),
            reason: format!("unknown claim type: {type_str}"),
        }
    })?;
    let subject = require_string(record, "subject")?;
    let action = require_string(record, "action")?;
    let resource = require_string(record, "resource")?;

    let scope = parse_scope(record.get("scope"));
    scope.validate()?;

    let conditions = match record.get("conditions") {
        Some(Value::Object(map)) => map.clone(),
        _ => serde_json::Map::new(),
    };

    Ok(Claim {
        id: id.to_string(),
        claim_type,
        subject: subject.to_string(),
        action: action.to_string(),
        resource: resource.to_string(),
        scope,
        conditions,
        source_id: source_id.to_string(),
    })
}

/// Extracts a required non-empty string field from a claim record.
fn require_string<'a>(
    record: &'a serde_json::Map<String, Value>,
    field: &str,
) -> Result<&'a str, CompileError> {
    match record.get(field).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CompileError::InvalidClaimField {
            field: field.to_string(),
            reason: format!("claim {field} is required"),
        }),
    }
}

/// Parses an optional scope record. Missing sub-fields default to empty
/// sets; time fields that are not RFC-3339 strings decay to absent rather
/// than erroring.
fn parse_scope(value: Option<&Value>) -> Scope {
    let Some(Value::Object(record)) = value else {
        return Scope::default();
    };

    Scope {
        jurisdictions: parse_string_list(record.get("jurisdictions")),
        operations: parse_string_list(record.get("operations")),
        time_start: parse_time(record.get("time_start")),
        time_end: parse_time(record.get("time_end")),
    }
}

/// Collects the string entries of a sequence, dropping everything else.
fn parse_string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(Value::as_str)
        .map(ToString::to_string)
        .collect()
}

/// Parses an RFC-3339 date-time, decaying to `None` on any mismatch.
fn parse_time(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Builds the authority graph over a claim set in two passes: first every
/// claim becomes a node, then conditions referencing an existing node add
/// edges. References to non-existent nodes are dropped silently.
///
/// Edges come back sorted by `(from_id, to_id, edge_type)` so graph
/// construction is deterministic for any claim ordering.
pub(crate) fn build_graph(claims: &[Claim]) -> AuthorityGraph {
    let mut nodes = std::collections::BTreeMap::new();
    for claim in claims {
        nodes.insert(claim.id.clone(), claim.clone());
    }

    let mut edges = Vec::new();
    for claim in claims {
        for (key, edge_type) in [
            (CONDITION_DELEGATES_TO, EdgeType::Delegates),
            (CONDITION_REVOKES, EdgeType::Revokes),
            (CONDITION_SUPERSEDES, EdgeType::Supersedes),
        ] {
            if let Some(target) = claim.condition_str(key) {
                if nodes.contains_key(target) {
                    edges.push(Edge {
                        from_id: claim.id.clone(),
                        to_id: target.to_string(),
                        edge_type,
                    });
                }
            }
        }
    }
    edges.sort();

    AuthorityGraph {
        nodes: Some(nodes),
        edges,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::AuthorityType;

    fn source_with_claims(claims: Value) -> AuthoritySource {
        let mut metadata = serde_json::Map::new();
        metadata.insert(CLAIMS_KEY.to_string(), claims);
        AuthoritySource {
            id: "src".to_string(),
            source_type: AuthorityType::Organizational,
            name: "test".to_string(),
            description: String::new(),
            version: "1.0".to_string(),
            metadata,
        }
    }

    #[test]
    fn parses_a_full_claim_record() {
        let source = source_with_claims(json!([{
            "id": "c1",
            "type": "permission",
            "subject": "engineer",
            "action": "read",
            "resource": "/code/*",
            "scope": {
                "jurisdictions": ["US"],
                "operations": ["read"],
                "time_start": "2023-01-01T00:00:00Z",
            },
            "conditions": {"note": "x"},
        }]));

        let claims = parse_claims(&source).unwrap();
        assert_eq!(claims.len(), 1);
        let claim = &claims[0];
        assert_eq!(claim.claim_type, ClaimType::Permission);
        assert_eq!(claim.scope.jurisdictions, vec!["US"]);
        assert!(claim.scope.time_start.is_some());
        assert!(claim.scope.time_end.is_none());
        assert_eq!(claim.source_id, "src");
        assert_eq!(claim.conditions.len(), 1);
    }

    #[test]
    fn missing_claims_key_yields_no_claims() {
        let source = AuthoritySource {
            id: "src".to_string(),
            source_type: AuthorityType::Legal,
            name: "test".to_string(),
            description: String::new(),
            version: String::new(),
            metadata: serde_json::Map::new(),
        };
        assert!(parse_claims(&source).unwrap().is_empty());
    }

    #[test]
    fn non_object_records_are_skipped() {
        let source = source_with_claims(json!([
            "not a record",
            42,
            {
                "id": "c1", "type": "permission", "subject": "s",
                "action": "a", "resource": "r",
            },
        ]));
        let claims = parse_claims(&source).unwrap();
        assert_eq!(claims.len(), 1);
    }

    #[test]
    fn missing_required_field_aborts() {
        let source = source_with_claims(json!([{
            "id": "c1", "type": "permission", "subject": "s", "action": "a",
        }]));
        let err = parse_claims(&source).unwrap_err();
        assert!(matches!(
            err,
            CompileError::InvalidClaimField { field, .. } if field == "resource"
        ));
    }

    #[test]
    fn unknown_claim_type_aborts() {
        let source = source_with_claims(json!([{
            "id": "c1", "type": "grant", "subject": "s",
            "action": "a", "resource": "r",
        }]));
        let err = parse_claims(&source).unwrap_err();
        assert!(matches!(
            err,
            CompileError::InvalidClaimField { field, .. } if field == "type"
        ));
    }

    #[test]
    fn unparseable_time_decays_to_absent() {
        let source = source_with_claims(json!([{
            "id": "c1", "type": "permission", "subject": "s",
            "action": "a", "resource": "r",
            "scope": {"time_start": "yesterday", "time_end": 99},
        }]));
        let claims = parse_claims(&source).unwrap();
        assert!(claims[0].scope.time_start.is_none());
        assert!(claims[0].scope.time_end.is_none());
    }

    #[test]
    fn inverted_time_bounds_abort() {
        let source = source_with_claims(json!([{
            "id": "c1", "type": "permission", "subject": "s",
            "action": "a", "resource": "r",
            "scope": {
                "time_start": "2025-01-01T00:00:00Z",
                "time_end": "2023-01-01T00:00:00Z",
            },
        }]));
        assert_eq!(parse_claims(&source).unwrap_err(), CompileError::InvalidScope);
    }

    fn claim(id: &str, conditions: Value) -> Claim {
        Claim {
            id: id.to_string(),
            claim_type: ClaimType::Permission,
            subject: "s".to_string(),
            action: "a".to_string(),
            resource: "r".to_string(),
            scope: Scope::default(),
            conditions: match conditions {
                Value::Object(map) => map,
                _ => serde_json::Map::new(),
            },
            source_id: "src".to_string(),
        }
    }

    #[test]
    fn build_graph_adds_edges_for_known_targets() {
        let claims = vec![
            claim("a", json!({"delegates_to": "b"})),
            claim("b", json!({})),
            claim("c", json!({"revokes": "a", "supersedes": "b"})),
        ];
        let graph = build_graph(&claims);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edges.len(), 3);
        // Sorted by (from, to, type).
        assert_eq!(graph.edges[0].from_id, "a");
        assert_eq!(graph.edges[1], Edge {
            from_id: "c".to_string(),
            to_id: "a".to_string(),
            edge_type: EdgeType::Revokes,
        });
    }

    #[test]
    fn build_graph_drops_dangling_references() {
        let claims = vec![claim("a", json!({"delegates_to": "ghost"}))];
        let graph = build_graph(&claims);
        assert_eq!(graph.node_count(), 1);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn build_graph_is_order_insensitive_on_edges() {
        let forward = vec![
            claim("a", json!({"delegates_to": "b"})),
            claim("b", json!({"revokes": "a"})),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(build_graph(&forward).edges, build_graph(&reversed).edges);
    }
}
